//! End-to-end lifecycle tests through the in-process provider server

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use serial_test::serial;
use std::collections::HashMap;
use telnyx::TelnyxProvider;
use tfplug::context::Context;
use tfplug::server::ProviderServer;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

const GROUP_ID: &str = "f5586561-8ff0-4291-a0ac-84fe544797bd";

fn object(entries: Vec<(&str, Dynamic)>) -> DynamicValue {
    let map: HashMap<String, Dynamic> = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    DynamicValue::new(Dynamic::Map(map))
}

fn strings(values: &[&str]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| Dynamic::from(*v)).collect())
}

fn group_body(name: &str) -> String {
    json!({
        "data": {
            "record_type": "billing_group",
            "id": GROUP_ID,
            "organization_id": "f1486bae-f067-460c-ad43-73a92848f902",
            "name": name,
            "created_at": "2019-10-15T10:07:15.527000+00:00",
            "updated_at": "2019-10-15T10:07:15.527000+00:00"
        }
    })
    .to_string()
}

async fn configured_server(mock: &ServerGuard) -> ProviderServer<TelnyxProvider> {
    telnyx::logging::init();
    let server = ProviderServer::new(TelnyxProvider::new());
    let diagnostics = server
        .configure_provider(
            Context::new(),
            object(vec![
                ("endpoint", Dynamic::from(mock.url())),
                ("api_key", Dynamic::from("test-key")),
            ]),
        )
        .await;
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    server
}

/// Plans and applies a create, returning the new state
async fn create(
    server: &ProviderServer<TelnyxProvider>,
    type_name: &str,
    config: DynamicValue,
) -> DynamicValue {
    let plan = server
        .plan_resource_change(
            Context::new(),
            type_name,
            DynamicValue::null(),
            config.clone(),
            config.clone(),
        )
        .await;
    assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);

    let applied = server
        .apply_resource_change(
            Context::new(),
            type_name,
            DynamicValue::null(),
            plan.planned_state,
            config,
        )
        .await;
    assert!(applied.diagnostics.is_empty(), "{:?}", applied.diagnostics);
    applied.new_state
}

#[tokio::test]
async fn billing_group_create_read_update_delete() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;
    let path = format!("/billing_groups/{}", GROUP_ID);

    let create_mock = mock
        .mock("POST", "/billing_groups")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(
            json!({"name": "Test Billing Group Terraform"}),
        ))
        .with_body(group_body("Test Billing Group Terraform"))
        .create_async()
        .await;
    let config = object(vec![(
        "name",
        Dynamic::from("Test Billing Group Terraform"),
    )]);
    let created = create(&server, "telnyx_billing_group", config).await;
    create_mock.assert_async().await;
    assert_eq!(
        created.get_string(&AttributePath::new("id")).unwrap(),
        GROUP_ID
    );

    let read_mock = mock
        .mock("GET", path.as_str())
        .with_body(group_body("Test Billing Group Terraform"))
        .create_async()
        .await;
    let read = server
        .read_resource(Context::new(), "telnyx_billing_group", created.clone())
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state.as_ref(), Some(&created));
    read_mock.remove_async().await;

    let renamed = object(vec![(
        "name",
        Dynamic::from("Updated Billing Group Terraform"),
    )]);
    let plan = server
        .plan_resource_change(
            Context::new(),
            "telnyx_billing_group",
            created.clone(),
            renamed.clone(),
            renamed.clone(),
        )
        .await;
    assert!(plan.requires_replace.is_empty());
    assert_eq!(
        plan.planned_state.get_string(&AttributePath::new("id")).unwrap(),
        GROUP_ID
    );
    assert_eq!(
        plan.planned_state.get(&AttributePath::new("updated_at")),
        Some(&Dynamic::Unknown)
    );

    let update_mock = mock
        .mock("PATCH", path.as_str())
        .match_body(Matcher::Json(
            json!({"name": "Updated Billing Group Terraform"}),
        ))
        .with_body(group_body("Updated Billing Group Terraform"))
        .create_async()
        .await;
    let updated = server
        .apply_resource_change(
            Context::new(),
            "telnyx_billing_group",
            created.clone(),
            plan.planned_state,
            renamed,
        )
        .await;
    update_mock.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);

    let _reread_mock = mock
        .mock("GET", path.as_str())
        .with_body(group_body("Updated Billing Group Terraform"))
        .create_async()
        .await;
    let reread = server
        .read_resource(Context::new(), "telnyx_billing_group", updated.new_state.clone())
        .await
        .new_state
        .unwrap();
    assert_eq!(
        reread.get_string(&AttributePath::new("name")).unwrap(),
        "Updated Billing Group Terraform"
    );

    let delete_mock = mock
        .mock("DELETE", path.as_str())
        .with_body(group_body("Updated Billing Group Terraform"))
        .create_async()
        .await;
    let destroy_plan = server
        .plan_resource_change(
            Context::new(),
            "telnyx_billing_group",
            reread.clone(),
            DynamicValue::null(),
            DynamicValue::null(),
        )
        .await;
    assert!(destroy_plan.planned_state.is_null());
    let destroyed = server
        .apply_resource_change(
            Context::new(),
            "telnyx_billing_group",
            reread,
            destroy_plan.planned_state,
            DynamicValue::null(),
        )
        .await;
    delete_mock.assert_async().await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(destroyed.new_state.is_null());
}

#[tokio::test]
async fn import_reads_the_same_state_as_create() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let _create_mock = mock
        .mock("POST", "/billing_groups")
        .with_body(group_body("Test Billing Group Terraform"))
        .create_async()
        .await;
    let created = create(
        &server,
        "telnyx_billing_group",
        object(vec![("name", Dynamic::from("Test Billing Group Terraform"))]),
    )
    .await;

    let _read_mock = mock
        .mock("GET", format!("/billing_groups/{}", GROUP_ID).as_str())
        .with_body(group_body("Test Billing Group Terraform"))
        .create_async()
        .await;
    let imported = server
        .import_resource_state(Context::new(), "telnyx_billing_group", GROUP_ID)
        .await;

    assert!(imported.diagnostics.is_empty(), "{:?}", imported.diagnostics);
    assert_eq!(imported.imported_resources.len(), 1);
    assert_eq!(imported.imported_resources[0].state, created);
}

#[tokio::test]
async fn import_of_missing_object_fails() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;
    let _read_mock = mock
        .mock("GET", "/fqdns/missing")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;

    let imported = server
        .import_resource_state(Context::new(), "telnyx_fqdn", "missing")
        .await;

    assert!(imported.imported_resources.is_empty());
    assert_eq!(
        imported.diagnostics[0].summary,
        "Cannot import non-existent remote object"
    );
}

#[tokio::test]
async fn absent_objects_are_dropped_and_deletes_succeed() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;
    let path = "/messaging_profiles/16fd2706-8baf-433b-82eb-8c7fada847da";
    let _get = mock
        .mock("GET", path)
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;
    let delete = mock
        .mock("DELETE", path)
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"10005","title":"Resource not found"}]}"#)
        .create_async()
        .await;

    let state = object(vec![
        ("id", Dynamic::from("16fd2706-8baf-433b-82eb-8c7fada847da")),
        ("name", Dynamic::from("gone")),
    ]);

    let read = server
        .read_resource(Context::new(), "telnyx_messaging_profile", state.clone())
        .await;
    assert!(read.new_state.is_none());
    assert!(read.diagnostics.is_empty());

    let destroyed = server
        .apply_resource_change(
            Context::new(),
            "telnyx_messaging_profile",
            state,
            DynamicValue::null(),
            DynamicValue::null(),
        )
        .await;
    delete.assert_async().await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(destroyed.new_state.is_null());
}

#[tokio::test]
async fn unset_connection_fields_take_defaults_and_codecs_round_trip() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let create_mock = mock
        .mock("POST", "/fqdn_connections")
        .match_body(Matcher::PartialJson(json!({
            "connection_name": "tf-fqdn",
            "anchorsite_override": "Latency",
            "transport_protocol": "UDP",
            "inbound": {
                "codecs": ["OPUS", "G722"],
                "sip_subdomain_receive_settings": "only_my_connections"
            }
        })))
        .with_body(
            r#"{"data":{
                "id":"1293384261075731499",
                "connection_name":"tf-fqdn",
                "user_name":"tf-user",
                "inbound":{"codecs":["OPUS","G722"]}
            }}"#,
        )
        .create_async()
        .await;

    let inbound = HashMap::from([("codecs".to_string(), strings(&["OPUS", "G722"]))]);
    let config = object(vec![
        ("connection_name", Dynamic::from("tf-fqdn")),
        ("username", Dynamic::from("tf-user")),
        ("password", Dynamic::from("tf-password")),
        ("inbound", Dynamic::Map(inbound)),
    ]);
    let state = create(&server, "telnyx_fqdn_connection", config).await;
    create_mock.assert_async().await;

    assert_eq!(
        state
            .get_string(&AttributePath::new("anchorsite_override"))
            .unwrap(),
        "Latency"
    );
    assert_eq!(
        state
            .get_string_list(&AttributePath::new("inbound").attribute("codecs"))
            .unwrap(),
        vec!["OPUS", "G722"]
    );
    assert_eq!(
        state
            .get_string(&AttributePath::new("inbound").attribute("sip_subdomain_receive_settings"))
            .unwrap(),
        "only_my_connections"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("password")).unwrap(),
        "tf-password"
    );
}

#[tokio::test]
async fn whitelisted_destinations_round_trip_in_order() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let _create = mock
        .mock("POST", "/messaging_profiles")
        .match_body(Matcher::PartialJson(json!({
            "name": "tf-messaging",
            "enabled": true,
            "whitelisted_destinations": ["US", "CA", "GB"]
        })))
        .with_body(
            r#"{"data":{
                "id":"16fd2706-8baf-433b-82eb-8c7fada847da",
                "name":"tf-messaging",
                "enabled":true,
                "webhook_url":"",
                "whitelisted_destinations":["US","CA","GB"]
            }}"#,
        )
        .create_async()
        .await;

    let config = object(vec![
        ("name", Dynamic::from("tf-messaging")),
        ("enabled", Dynamic::Bool(true)),
        ("whitelisted_destinations", strings(&["US", "CA", "GB"])),
    ]);
    let state = create(&server, "telnyx_messaging_profile", config).await;

    assert_eq!(
        state
            .get_string_list(&AttributePath::new("whitelisted_destinations"))
            .unwrap(),
        vec!["US", "CA", "GB"]
    );
    assert_eq!(
        state
            .get_string(&AttributePath::new("webhook_api_version"))
            .unwrap(),
        "2"
    );
}

#[tokio::test]
async fn number_order_destroy_stops_at_first_failed_cancel() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let _first = mock
        .mock("GET", "/sub_number_orders/first")
        .with_body(r#"{"data":{"id":"first","status":"pending"}}"#)
        .create_async()
        .await;
    let _cancel = mock
        .mock("PATCH", "/sub_number_orders/first/cancel")
        .with_status(500)
        .with_body("upstream unavailable")
        .create_async()
        .await;
    let second = mock
        .mock("GET", "/sub_number_orders/second")
        .expect(0)
        .create_async()
        .await;

    let prior = object(vec![
        ("id", Dynamic::from("12ade33a-21c0-473b-b055-b3c836e1c292")),
        ("sub_number_orders_ids", strings(&["first", "second"])),
    ]);
    let destroyed = server
        .apply_resource_change(
            Context::new(),
            "telnyx_number_order",
            prior.clone(),
            DynamicValue::null(),
            DynamicValue::null(),
        )
        .await;

    second.assert_async().await;
    assert_eq!(destroyed.diagnostics.len(), 1);
    assert!(destroyed.diagnostics[0].detail.contains("upstream unavailable"));
    assert_eq!(destroyed.new_state, prior);
}

#[tokio::test]
async fn number_order_rejects_non_e164_numbers() {
    let mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let number = HashMap::from([("phone_number".to_string(), Dynamic::from("9705555098"))]);
    let config = object(vec![
        ("connection_id", Dynamic::from("346789098765567")),
        ("billing_group_id", Dynamic::from(GROUP_ID)),
        ("phone_numbers", Dynamic::List(vec![Dynamic::Map(number)])),
    ]);

    let diagnostics = server
        .validate_resource_config(Context::new(), "telnyx_number_order", config)
        .await;

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].attribute,
        Some(
            AttributePath::new("phone_numbers")
                .index(0)
                .attribute("phone_number")
        )
    );
}

#[tokio::test]
async fn number_order_messaging_profile_change_forces_replacement() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let create_mock = mock
        .mock("POST", "/number_orders")
        .match_body(Matcher::PartialJson(json!({
            "connection_id": "346789098765567",
            "messaging_profile_id": ""
        })))
        .with_body(
            r#"{"data":{
                "id":"12ade33a-21c0-473b-b055-b3c836e1c292",
                "phone_numbers":[{"id":"n-1","phone_number":"+19705555098","status":"pending"}],
                "connection_id":"346789098765567",
                "billing_group_id":"f5586561-8ff0-4291-a0ac-84fe544797bd",
                "sub_number_orders_ids":["s-1"],
                "status":"pending"
            }}"#,
        )
        .create_async()
        .await;

    let number = HashMap::from([("phone_number".to_string(), Dynamic::from("+19705555098"))]);
    let config = object(vec![
        ("connection_id", Dynamic::from("346789098765567")),
        ("billing_group_id", Dynamic::from(GROUP_ID)),
        ("phone_numbers", Dynamic::List(vec![Dynamic::Map(number.clone())])),
    ]);
    let created = create(&server, "telnyx_number_order", config).await;
    create_mock.assert_async().await;
    assert_eq!(
        created
            .get_string(&AttributePath::new("messaging_profile_id"))
            .unwrap(),
        ""
    );

    let with_profile = object(vec![
        ("connection_id", Dynamic::from("346789098765567")),
        ("billing_group_id", Dynamic::from(GROUP_ID)),
        ("messaging_profile_id", Dynamic::from("mp-1")),
        ("phone_numbers", Dynamic::List(vec![Dynamic::Map(number)])),
    ]);
    let plan = server
        .plan_resource_change(
            Context::new(),
            "telnyx_number_order",
            created,
            with_profile.clone(),
            with_profile,
        )
        .await;

    assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
    assert_eq!(
        plan.requires_replace,
        vec![AttributePath::new("messaging_profile_id")]
    );
    assert_eq!(
        plan.planned_state
            .get_string(&AttributePath::new("messaging_profile_id"))
            .unwrap(),
        "mp-1"
    );
}

#[tokio::test]
async fn concurrent_reads_share_one_client() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let mut mocks = Vec::new();
    for i in 0..5 {
        mocks.push(
            mock.mock("GET", format!("/fqdns/{}", i).as_str())
                .with_body(format!(
                    r#"{{"data":{{"id":"{}","connection_id":"1","fqdn":"sip{}.example.com","port":5060,"dns_record_type":"a"}}}}"#,
                    i, i
                ))
                .expect(1)
                .create_async()
                .await,
        );
    }

    let reads = (0..5).map(|i| {
        let server = &server;
        async move {
            let state = object(vec![("id", Dynamic::from(i.to_string()))]);
            server.read_resource(Context::new(), "telnyx_fqdn", state).await
        }
    });
    let responses = futures::future::join_all(reads).await;

    for (i, response) in responses.into_iter().enumerate() {
        let state = response.new_state.unwrap();
        assert_eq!(
            state.get_string(&AttributePath::new("fqdn")).unwrap(),
            format!("sip{}.example.com", i)
        );
    }
    for m in mocks {
        m.assert_async().await;
    }
}

#[tokio::test]
async fn fractional_integer_attributes_are_rejected() {
    let mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let inbound = HashMap::from([("channel_limit".to_string(), Dynamic::Number(2.5))]);
    let cases = vec![
        (
            "telnyx_fqdn",
            object(vec![("port", Dynamic::Number(5060.5))]),
            AttributePath::new("port"),
        ),
        (
            "telnyx_fqdn_connection",
            object(vec![("inbound", Dynamic::Map(inbound))]),
            AttributePath::new("inbound").attribute("channel_limit"),
        ),
        (
            "telnyx_outbound_voice_profile",
            object(vec![("concurrent_call_limit", Dynamic::Number(10.2))]),
            AttributePath::new("concurrent_call_limit"),
        ),
        (
            "telnyx_call_control_application",
            object(vec![("webhook_timeout_secs", Dynamic::Number(7.5))]),
            AttributePath::new("webhook_timeout_secs"),
        ),
    ];

    for (type_name, config, path) in cases {
        let diagnostics = server
            .validate_resource_config(Context::new(), type_name, config)
            .await;
        let fractional: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.detail.contains("whole number"))
            .collect();
        assert_eq!(fractional.len(), 1, "{}: {:?}", type_name, diagnostics);
        assert_eq!(fractional[0].attribute, Some(path), "{}", type_name);
    }

    let lookup = server
        .validate_data_source_config(
            Context::new(),
            "telnyx_phone_number_lookup",
            object(vec![("limit", Dynamic::Number(1.5))]),
        )
        .await;
    assert_eq!(lookup.len(), 1, "{:?}", lookup);
    assert!(lookup[0].detail.contains("whole number"));
}

#[tokio::test]
async fn phone_number_lookup_validates_and_reads() {
    let mut mock = Server::new_async().await;
    let server = configured_server(&mock).await;

    let invalid = server
        .validate_data_source_config(
            Context::new(),
            "telnyx_phone_number_lookup",
            object(vec![("limit", Dynamic::Number(0.0))]),
        )
        .await;
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].attribute, Some(AttributePath::new("limit")));

    let lookup = mock
        .mock("GET", "/available_phone_numbers")
        .match_query(Matcher::UrlEncoded(
            "filter[national_destination_code]".into(),
            "970".into(),
        ))
        .with_body(
            r#"{"data":[
                {"phone_number":"+19705555098","features":[{"name":"voice"}]},
                {"phone_number":"+19705555099","features":[]}
            ]}"#,
        )
        .create_async()
        .await;

    let config = object(vec![("national_destination_code", Dynamic::from("970"))]);
    let valid = server
        .validate_data_source_config(Context::new(), "telnyx_phone_number_lookup", config.clone())
        .await;
    assert!(valid.is_empty(), "{:?}", valid);

    let read = server
        .read_data_source(Context::new(), "telnyx_phone_number_lookup", config)
        .await;
    lookup.assert_async().await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let numbers = read
        .state
        .get_list(&AttributePath::new("phone_numbers"))
        .unwrap();
    assert_eq!(numbers.len(), 2);
    assert_eq!(
        read.state
            .get_string(&AttributePath::new("phone_numbers").index(1).attribute("phone_number"))
            .unwrap(),
        "+19705555099"
    );

    assert_eq!(server.stop_provider(Context::new()).await, None);
}

#[tokio::test]
#[serial]
async fn provider_config_falls_back_to_environment() {
    std::env::set_var("TELNYX_API_KEY", "KEY0123456789");
    let server = ProviderServer::new(TelnyxProvider::new());
    let diagnostics = server
        .configure_provider(Context::new(), DynamicValue::object())
        .await;
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);

    std::env::remove_var("TELNYX_API_KEY");
    let server = ProviderServer::new(TelnyxProvider::new());
    let diagnostics = server
        .configure_provider(Context::new(), DynamicValue::object())
        .await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].detail,
        "api_key is required (set in provider config or TELNYX_API_KEY env var)"
    );

    let unconfigured = server
        .read_resource(
            Context::new(),
            "telnyx_billing_group",
            object(vec![("id", Dynamic::from(GROUP_ID))]),
        )
        .await;
    assert!(!unconfigured.diagnostics.is_empty());
}
