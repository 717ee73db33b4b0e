use super::*;
use crate::api::Client;
use crate::resources::state::Object;
use mockito::{Matcher, Server};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

async fn configured(server_url: &str) -> BillingGroupResource {
    let client = Client::new(server_url, "test-key").unwrap();
    let provider_data: Arc<dyn Any + Send + Sync> = Arc::new(TelnyxProviderData::new(client));

    let mut resource = BillingGroupResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

fn planned(id: Dynamic, name: &str) -> DynamicValue {
    let mut obj = Object::new();
    obj.insert("id".to_string(), id);
    obj.insert("name".to_string(), Dynamic::from(name));
    obj.insert("organization_id".to_string(), Dynamic::Unknown);
    obj.insert("created_at".to_string(), Dynamic::Unknown);
    obj.insert("updated_at".to_string(), Dynamic::Unknown);
    into_state(obj)
}

const GROUP_BODY: &str = r#"{"data":{
    "id":"f5586561-8ff0-4291-a0ac-84fe544797bd",
    "record_type":"billing_group",
    "name":"Test Billing Group Terraform",
    "organization_id":"f1486bae-f067-460c-ad43-73a92848f902",
    "created_at":"2019-10-15T10:07:15.527000+00:00",
    "updated_at":"2019-10-15T10:07:15.527000+00:00"
}}"#;

#[tokio::test]
async fn test_schema_marks_id_computed() {
    let resource = BillingGroupResource::new();
    let response = resource.schema(Context::new(), ResourceSchemaRequest).await;

    let schema = response.schema;
    assert_eq!(schema.version, 0);
    assert!(schema.attribute("name").unwrap().required);
    let id = schema.attribute("id").unwrap();
    assert!(id.computed && !id.optional);
    assert_eq!(id.plan_modifiers.len(), 1);
    assert!(schema.attribute("organization_id").unwrap().computed);
}

#[tokio::test]
async fn test_validate_rejects_blank_name() {
    let resource = BillingGroupResource::new();
    let response = resource
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: "telnyx_billing_group".to_string(),
                config: planned(Dynamic::Null, "  "),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Invalid name");
}

#[tokio::test]
async fn test_create_fills_computed_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/billing_groups")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(
            json!({"name": "Test Billing Group Terraform"}),
        ))
        .with_status(200)
        .with_body(GROUP_BODY)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let plan = planned(Dynamic::Unknown, "Test Billing Group Terraform");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    mock.assert_async().await;
    assert!(response.diagnostics.is_empty());
    let state = response.new_state;
    assert_eq!(
        state.get_string(&AttributePath::new("id")).unwrap(),
        "f5586561-8ff0-4291-a0ac-84fe544797bd"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("organization_id")).unwrap(),
        "f1486bae-f067-460c-ad43-73a92848f902"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("created_at")).unwrap(),
        "2019-10-15T10:07:15.527Z"
    );
}

#[tokio::test]
async fn test_create_surfaces_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/billing_groups")
        .with_status(422)
        .with_body(r#"{"errors":[{"code":"10015","title":"Bad Request","detail":"name is invalid"}]}"#)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let plan = planned(Dynamic::Unknown, "x");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Failed to create billing group");
    assert!(response.diagnostics[0].detail.starts_with("API error:"));
}

#[tokio::test]
async fn test_read_not_found_removes_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/billing_groups/gone")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                current_state: planned(Dynamic::from("gone"), "old"),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn test_read_error_keeps_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/billing_groups/abc")
        .with_status(500)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let current = planned(Dynamic::from("abc"), "kept");
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                current_state: current,
            },
        )
        .await;

    assert_eq!(response.diagnostics[0].summary, "Failed to read billing group");
    let state = response.new_state.unwrap();
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "kept");
}

#[tokio::test]
async fn test_update_patches_by_prior_id() {
    let mut server = Server::new_async().await;
    let body = GROUP_BODY.replace(
        "Test Billing Group Terraform",
        "Updated Billing Group Terraform",
    );
    let mock = server
        .mock("PATCH", "/billing_groups/f5586561-8ff0-4291-a0ac-84fe544797bd")
        .match_body(Matcher::Json(json!({"name": "Updated Billing Group Terraform"})))
        .with_body(body)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let id = Dynamic::from("f5586561-8ff0-4291-a0ac-84fe544797bd");
    let plan = planned(id.clone(), "Updated Billing Group Terraform");
    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                prior_state: planned(id, "Test Billing Group Terraform"),
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    mock.assert_async().await;
    assert!(response.diagnostics.is_empty());
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("name"))
            .unwrap(),
        "Updated Billing Group Terraform"
    );
}

#[tokio::test]
async fn test_delete_treats_not_found_as_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/billing_groups/gone")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                prior_state: planned(Dynamic::from("gone"), "old"),
            },
        )
        .await;

    mock.assert_async().await;
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn test_unconfigured_create_reports_error() {
    let resource = BillingGroupResource::new();
    let plan = planned(Dynamic::Unknown, "x");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "telnyx_billing_group".to_string(),
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    assert_eq!(response.diagnostics[0].summary, "Provider not configured");
}
