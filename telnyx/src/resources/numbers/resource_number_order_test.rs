use super::*;
use crate::resources::state::strs_to_list;
use mockito::{Matcher, Server};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

const ORDER_ID: &str = "12ade33a-21c0-473b-b055-b3c836e1c292";

const ORDER_BODY: &str = r#"{"data":{
    "id":"12ade33a-21c0-473b-b055-b3c836e1c292",
    "record_type":"number_order",
    "phone_numbers":[{
        "id":"dc8e4d67-33a0-4629-a4ea-9a6b4a9b1a7b",
        "record_type":"number_order_phone_number",
        "phone_number":"+19705555098",
        "status":"pending",
        "regulatory_requirements":[{
            "requirement_id":"8ffb3622-7c6b-4ccc-b65f-7a3dc0099576",
            "field_value":"45f45a04-b4be-4592-95b1-9306b9db2b21",
            "field_type":"address"
        }]
    }],
    "phone_numbers_count":1,
    "connection_id":"346789098765567",
    "messaging_profile_id":"abc85f64-5717-4562-b3fc-2c9600",
    "billing_group_id":"abc85f64-5717-4562-b3fc-2c9600",
    "customer_reference":"MY REF 001",
    "sub_number_orders_ids":["3fa85f64-5717-4562-b3fc-2c963f66afa6"],
    "status":"pending",
    "created_at":"2018-01-01T00:00:00.000000Z",
    "updated_at":"2018-01-01T00:00:00.000000Z",
    "requirements_met":true
}}"#;

async fn configured(server_url: &str) -> NumberOrderResource {
    let client = Client::new(server_url, "test-key").unwrap();
    let data: Arc<dyn Any + Send + Sync> = Arc::new(TelnyxProviderData::new(client));
    let mut resource = NumberOrderResource::new();
    resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(data),
            },
        )
        .await;
    resource
}

fn planned() -> DynamicValue {
    let mut number = Object::new();
    number.insert("phone_number".into(), Dynamic::from("+19705555098"));
    number.insert("id".into(), Dynamic::Unknown);
    number.insert("status".into(), Dynamic::Unknown);
    number.insert("regulatory_requirements".into(), Dynamic::Unknown);

    let mut plan = Object::new();
    plan.insert("id".into(), Dynamic::Unknown);
    plan.insert("connection_id".into(), Dynamic::from("346789098765567"));
    plan.insert(
        "billing_group_id".into(),
        Dynamic::from("abc85f64-5717-4562-b3fc-2c9600"),
    );
    plan.insert(
        "messaging_profile_id".into(),
        Dynamic::from("abc85f64-5717-4562-b3fc-2c9600"),
    );
    plan.insert("customer_reference".into(), Dynamic::from("MY REF 001"));
    plan.insert("phone_numbers".into(), Dynamic::List(vec![Dynamic::Map(number)]));
    into_state(plan)
}

fn prior_with_sub_orders(ids: &[&str]) -> DynamicValue {
    let mut prior = Object::new();
    prior.insert("id".into(), Dynamic::from(ORDER_ID));
    prior.insert("sub_number_orders_ids".into(), strs_to_list(ids));
    into_state(prior)
}

async fn delete(resource: &NumberOrderResource, prior: DynamicValue) -> DeleteResourceResponse {
    resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "telnyx_number_order".to_string(),
                prior_state: prior,
            },
        )
        .await
}

#[tokio::test]
async fn test_schema_forces_replacement_of_ordered_numbers() {
    let schema = NumberOrderResource::new()
        .schema(Context::new(), ResourceSchemaRequest)
        .await
        .schema;

    for name in ["phone_numbers", "connection_id", "billing_group_id"] {
        let attribute = schema.attribute(name).unwrap();
        assert!(attribute.required, "{} should be required", name);
        assert_eq!(attribute.plan_modifiers.len(), 1, "{}", name);
    }
    let profile = schema.attribute("messaging_profile_id").unwrap();
    assert!(!profile.required);
    assert_eq!(profile.plan_modifiers.len(), 1);
    assert!(schema
        .attribute("customer_reference")
        .unwrap()
        .plan_modifiers
        .is_empty());

    let nested = schema
        .attribute("phone_numbers")
        .unwrap()
        .nested_type
        .as_ref()
        .unwrap();
    let phone_number = nested
        .attributes
        .iter()
        .find(|a| a.name == "phone_number")
        .unwrap();
    assert_eq!(phone_number.validators.len(), 1);
}

#[tokio::test]
async fn test_create_maps_numbers_and_requirements() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/number_orders")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::Json(json!({
            "phone_numbers": [{"phone_number": "+19705555098"}],
            "connection_id": "346789098765567",
            "messaging_profile_id": "abc85f64-5717-4562-b3fc-2c9600",
            "billing_group_id": "abc85f64-5717-4562-b3fc-2c9600",
            "customer_reference": "MY REF 001"
        })))
        .with_status(200)
        .with_body(ORDER_BODY)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "telnyx_number_order".to_string(),
                planned_state: planned(),
                config: planned(),
            },
        )
        .await;

    mock.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), ORDER_ID);
    assert_eq!(
        state.get_string(&AttributePath::new("status")).unwrap(),
        "pending"
    );
    assert_eq!(
        state
            .get_string(
                &AttributePath::new("phone_numbers")
                    .index(0)
                    .attribute("status")
            )
            .unwrap(),
        "pending"
    );
    assert_eq!(
        state
            .get_string(
                &AttributePath::new("phone_numbers")
                    .index(0)
                    .attribute("regulatory_requirements")
                    .index(0)
                    .attribute("field_type")
            )
            .unwrap(),
        "address"
    );
    assert_eq!(
        state
            .get_string_list(&AttributePath::new("sub_number_orders_ids"))
            .unwrap(),
        vec!["3fa85f64-5717-4562-b3fc-2c963f66afa6"]
    );
    assert_eq!(
        state.get_string(&AttributePath::new("created_at")).unwrap(),
        "2018-01-01T00:00:00Z"
    );
}

#[tokio::test]
async fn test_create_rejects_entry_without_number() {
    let server = Server::new_async().await;
    let mut plan = Object::new();
    plan.insert("connection_id".into(), Dynamic::from("1"));
    plan.insert("billing_group_id".into(), Dynamic::from("2"));
    plan.insert(
        "phone_numbers".into(),
        Dynamic::List(vec![Dynamic::Map(Object::new())]),
    );
    let plan = into_state(plan);

    let resource = configured(&server.url()).await;
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "telnyx_number_order".to_string(),
                planned_state: plan.clone(),
                config: plan,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Missing phone_number");
}

#[tokio::test]
async fn test_update_only_sends_customer_reference() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", format!("/number_orders/{}", ORDER_ID).as_str())
        .match_body(Matcher::Json(json!({
            "customer_reference": "MY REF 002",
            "regulatory_requirements": []
        })))
        .with_body(ORDER_BODY.replace("MY REF 001", "MY REF 002"))
        .create_async()
        .await;

    let mut plan = Object::new();
    plan.insert("id".into(), Dynamic::from(ORDER_ID));
    plan.insert("customer_reference".into(), Dynamic::from("MY REF 002"));
    let plan = into_state(plan);

    let resource = configured(&server.url()).await;
    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "telnyx_number_order".to_string(),
                prior_state: prior_with_sub_orders(&[]),
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
            .get_string(&AttributePath::new("customer_reference"))
            .unwrap(),
        "MY REF 002"
    );
}

#[tokio::test]
async fn test_read_missing_order_removes_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", format!("/number_orders/{}", ORDER_ID).as_str())
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "telnyx_number_order".to_string(),
                current_state: prior_with_sub_orders(&[]),
            },
        )
        .await;

    assert!(response.new_state.is_none());
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn test_delete_cancels_open_sub_orders_only() {
    let mut server = Server::new_async().await;
    let _gone = server
        .mock("GET", "/sub_number_orders/gone")
        .with_status(404)
        .with_body(r#"{"errors":[]}"#)
        .create_async()
        .await;
    let _closed = server
        .mock("GET", "/sub_number_orders/closed")
        .with_body(r#"{"data":{"id":"closed","status":"cancelled"}}"#)
        .create_async()
        .await;
    let _open = server
        .mock("GET", "/sub_number_orders/open")
        .with_body(r#"{"data":{"id":"open","status":"pending"}}"#)
        .create_async()
        .await;
    let cancel_open = server
        .mock("PATCH", "/sub_number_orders/open/cancel")
        .match_body(Matcher::Json(json!({})))
        .with_body(r#"{"data":{"id":"open","status":"cancelled"}}"#)
        .expect(1)
        .create_async()
        .await;
    let cancel_closed = server
        .mock("PATCH", "/sub_number_orders/closed/cancel")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = delete(&resource, prior_with_sub_orders(&["gone", "closed", "open"])).await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    cancel_open.assert_async().await;
    cancel_closed.assert_async().await;
}

#[tokio::test]
async fn test_delete_stops_at_first_failure() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", "/sub_number_orders/first")
        .with_body(r#"{"data":{"id":"first","status":"pending"}}"#)
        .create_async()
        .await;
    let cancel_first = server
        .mock("PATCH", "/sub_number_orders/first/cancel")
        .with_status(422)
        .with_body(r#"{"errors":[{"code":"10015","title":"Invalid state"}]}"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/sub_number_orders/second")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = delete(&resource, prior_with_sub_orders(&["first", "second"])).await;

    cancel_first.assert_async().await;
    second.assert_async().await;
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Failed to cancel sub number order first"
    );
}

#[tokio::test]
async fn test_delete_aborts_when_sub_order_cannot_be_read() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", "/sub_number_orders/first")
        .with_status(500)
        .with_body(r#"{"errors":[{"code":"10007","title":"Unexpected error"}]}"#)
        .create_async()
        .await;
    let cancel_first = server
        .mock("PATCH", "/sub_number_orders/first/cancel")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = delete(&resource, prior_with_sub_orders(&["first"])).await;

    cancel_first.assert_async().await;
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Failed to read sub number order first"
    );
}

#[tokio::test]
async fn test_delete_fetches_sub_orders_when_state_has_none() {
    let mut server = Server::new_async().await;
    let order = server
        .mock("GET", format!("/number_orders/{}", ORDER_ID).as_str())
        .with_body(ORDER_BODY)
        .create_async()
        .await;
    let _sub = server
        .mock("GET", "/sub_number_orders/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .with_body(r#"{"data":{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","status":"deleted"}}"#)
        .create_async()
        .await;

    let resource = configured(&server.url()).await;
    let response = delete(&resource, prior_with_sub_orders(&[])).await;

    order.assert_async().await;
    assert!(response.diagnostics.is_empty());
}
