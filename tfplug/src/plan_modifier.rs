//! Built-in plan modifiers

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Marks an attribute as requiring replacement when its value changes
pub struct RequiresReplaceIfChanged;

impl RequiresReplaceIfChanged {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for RequiresReplaceIfChanged {
    fn description(&self) -> String {
        "changing this attribute forces a new resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let state = &request.state_value.value;
        let plan = &request.plan_value.value;

        // Creation has no prior value to compare against.
        let requires_replace = !state.is_null()
            && !state.is_unknown()
            && !plan.is_unknown()
            && !state.semantically_equal(plan);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Keeps the prior state value when the planned value is unknown
///
/// Used on server-assigned attributes like `id` that never change after
/// creation, so plans do not show them as "known after apply".
pub struct UseStateForUnknown;

impl UseStateForUnknown {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "value does not change after creation".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let plan_value = match (&request.plan_value.value, &request.state_value.value) {
            (Dynamic::Unknown, Dynamic::Null) => request.plan_value,
            (Dynamic::Unknown, _) => request.state_value,
            _ => request.plan_value,
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, DynamicValue};

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: DynamicValue::new(plan.clone()),
            state_value: DynamicValue::new(state),
            plan_value: DynamicValue::new(plan),
            path: AttributePath::new("connection_id"),
        }
    }

    #[test]
    fn requires_replace_does_not_trigger_on_same_value() {
        let response = RequiresReplaceIfChanged
            .modify(request(Dynamic::from("1234"), Dynamic::from("1234")));
        assert!(!response.requires_replace);
    }

    #[test]
    fn requires_replace_triggers_on_different_value() {
        let response = RequiresReplaceIfChanged
            .modify(request(Dynamic::from("1234"), Dynamic::from("5678")));
        assert!(response.requires_replace);
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn requires_replace_ignores_creation_and_unknowns() {
        assert!(
            !RequiresReplaceIfChanged
                .modify(request(Dynamic::Null, Dynamic::from("1234")))
                .requires_replace
        );
        assert!(
            !RequiresReplaceIfChanged
                .modify(request(Dynamic::from("1234"), Dynamic::Unknown))
                .requires_replace
        );
    }

    #[test]
    fn requires_replace_compares_lists_structurally() {
        let numbers = |n: &str| Dynamic::List(vec![Dynamic::from(n)]);
        assert!(
            !RequiresReplaceIfChanged
                .modify(request(numbers("+15551234567"), numbers("+15551234567")))
                .requires_replace
        );
        assert!(
            RequiresReplaceIfChanged
                .modify(request(numbers("+15551234567"), numbers("+15557654321")))
                .requires_replace
        );
    }

    #[test]
    fn use_state_for_unknown_preserves_state() {
        let response =
            UseStateForUnknown.modify(request(Dynamic::from("bg-123"), Dynamic::Unknown));
        assert_eq!(response.plan_value.value, Dynamic::from("bg-123"));
    }

    #[test]
    fn use_state_for_unknown_stays_unknown_on_create() {
        let response = UseStateForUnknown.modify(request(Dynamic::Null, Dynamic::Unknown));
        assert!(response.plan_value.is_unknown());
    }

    #[test]
    fn use_state_for_unknown_keeps_known_plan() {
        let response =
            UseStateForUnknown.modify(request(Dynamic::from("old"), Dynamic::from("new")));
        assert_eq!(response.plan_value.value, Dynamic::from("new"));
    }
}
