//! Import helpers for resources

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Writes the import ID verbatim into `attr_path` of an otherwise empty state.
///
/// The server follows import with a read, which fills the remaining
/// attributes. Example: ID "2a3b-..." -> state.id = "2a3b-...".
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    if request.id.trim().is_empty() {
        response.diagnostics.push(
            Diagnostic::error(
                "Invalid import ID",
                format!("An ID is required to import {}", request.type_name),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    let mut state = DynamicValue::object();
    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                "Failed to set import ID",
                format!("Could not set {} to '{}': {}", attr_path, request.id, e),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(id: &str) -> ImportResourceStateResponse {
        let request = ImportResourceStateRequest {
            type_name: "telnyx_fqdn".to_string(),
            id: id.to_string(),
        };
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(
            &Context::new(),
            AttributePath::new("id"),
            &request,
            &mut response,
        );
        response
    }

    #[test]
    fn passthrough_sets_id() {
        let response = import("1293384261075731499");

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.imported_resources.len(), 1);
        let imported = &response.imported_resources[0];
        assert_eq!(imported.type_name, "telnyx_fqdn");
        assert_eq!(
            imported.state.get_string(&AttributePath::new("id")).unwrap(),
            "1293384261075731499"
        );
    }

    #[test]
    fn passthrough_rejects_blank_id() {
        let response = import("  ");

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid import ID");
    }
}
