use meshform_foundation::VirtualServiceDataSource;
use meshform_kernel::appmesh::{AppMeshError, Tag, VirtualServiceStatusCode};
use meshform_kernel::context::ReadContext;
use meshform_kernel::datasource::read_data_source;
use meshform_kernel::tags::IgnoreTagsConfig;
use meshform_testing::{
    MockAppMeshClient, VirtualServiceFixture, aws_client, config, read_virtual_service,
};
use serde_json::json;

const ACCOUNT_A: &str = "111122223333";
const ACCOUNT_B: &str = "444455556666";

fn basic_input() -> serde_json::Value {
    json!({ "mesh_name": "m1", "name": "vs1" })
}

#[tokio::test]
async fn same_account_lookup_projects_every_attribute() {
    let mock = MockAppMeshClient::new();
    let fixture = VirtualServiceFixture::new("m1", "vs1")
        .owned_by(ACCOUNT_A)
        .virtual_node("vn1");
    let arn = fixture.arn();
    mock.set_virtual_service(fixture.build()).await;
    mock.set_tags(vec![Tag::new("env", "prod"), Tag::new("aws:internal", "x")])
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(outcome.is_success(), "{:?}", outcome.diagnostics);
    let state = outcome.state.unwrap();
    assert_eq!(state["id"], "vs1");
    assert_eq!(state["name"], "vs1");
    assert_eq!(state["arn"], arn.as_str());
    assert_eq!(state["created_date"], "2024-03-04T05:06:07+00:00");
    assert_eq!(state["last_updated_date"], "2024-06-07T08:09:10+00:00");
    assert_eq!(state["mesh_name"], "m1");
    assert_eq!(state["mesh_owner"], ACCOUNT_A);
    assert_eq!(state["resource_owner"], ACCOUNT_A);
    assert_eq!(
        state["spec"],
        json!([{ "provider": [{ "virtual_node": [{ "virtual_node_name": "vn1" }] }] }])
    );
    assert_eq!(state["tags"], json!({ "env": "prod" }));

    assert_eq!(mock.list_tags_calls().await, vec![arn]);
    meshform_testing::assert_list_tags_called!(mock, 1);
}

#[tokio::test]
async fn shared_mesh_skips_tag_listing() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .owned_by(ACCOUNT_B)
            .virtual_node("vn1")
            .build(),
    )
    .await;
    mock.set_tags(vec![Tag::new("env", "prod")]).await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(outcome.is_success());
    let state = outcome.state.unwrap();
    assert_eq!(state["tags"], json!({}));
    assert_eq!(state["mesh_owner"], ACCOUNT_B);
    assert_eq!(state["resource_owner"], ACCOUNT_B);
    meshform_testing::assert_list_tags_called!(mock, 0);
}

#[tokio::test]
async fn tag_gate_follows_mesh_owner_not_resource_owner() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .mesh_owner(ACCOUNT_A)
            .resource_owner(ACCOUNT_B)
            .build(),
    )
    .await;
    mock.set_tags(vec![Tag::new("team", "mesh")]).await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    let state = outcome.state.unwrap();
    assert_eq!(state["mesh_owner"], ACCOUNT_A);
    assert_eq!(state["resource_owner"], ACCOUNT_B);
    assert_eq!(state["tags"], json!({ "team": "mesh" }));
    meshform_testing::assert_list_tags_called!(mock, 1);
}

#[tokio::test]
async fn explicit_mesh_owner_is_passed_through() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .owned_by(ACCOUNT_B)
            .virtual_node("vn1")
            .build(),
    )
    .await;

    let input = json!({ "mesh_name": "m1", "mesh_owner": ACCOUNT_B, "name": "vs1" });
    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), input)
        .await
        .unwrap();

    let calls = mock.describe_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mesh_name, "m1");
    assert_eq!(calls[0].mesh_owner.as_deref(), Some(ACCOUNT_B));
    assert_eq!(calls[0].virtual_service_name, "vs1");

    assert_eq!(outcome.state.unwrap()["tags"], json!({}));
    meshform_testing::assert_list_tags_called!(mock, 0);
}

#[tokio::test]
async fn omitted_mesh_owner_is_resolved_by_the_control_plane() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(VirtualServiceFixture::new("m1", "vs1").owned_by(ACCOUNT_A).build())
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert_eq!(mock.describe_calls().await[0].mesh_owner, None);
    assert_eq!(outcome.state.unwrap()["mesh_owner"], ACCOUNT_A);
}

#[tokio::test]
async fn not_found_reports_one_error_and_no_state() {
    let mock = MockAppMeshClient::new();
    mock.set_describe_error(AppMeshError::NotFound("vs1 not found".into()))
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(outcome.state.is_none());
    assert_eq!(outcome.diagnostics.len(), 1);
    let summary = &outcome.diagnostics.errors().next().unwrap().summary;
    assert_eq!(
        summary,
        "reading App Mesh Virtual Service (vs1): couldn't find resource"
    );
    meshform_testing::assert_list_tags_called!(mock, 0);
}

#[tokio::test]
async fn deleted_service_reads_as_not_found() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .status(VirtualServiceStatusCode::Deleted)
            .build(),
    )
    .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(outcome.state.is_none());
    assert!(outcome.diagnostics.errors().next().unwrap().summary.starts_with(
        "reading App Mesh Virtual Service (vs1): couldn't find resource"
    ));
}

#[tokio::test]
async fn other_describe_failures_use_the_same_prefix() {
    let mock = MockAppMeshClient::new();
    mock.set_describe_error(AppMeshError::Service("ServiceUnavailableException".into()))
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(outcome.state.is_none());
    assert_eq!(
        outcome.diagnostics.errors().next().unwrap().summary,
        "reading App Mesh Virtual Service (vs1): ServiceUnavailableException"
    );
}

#[tokio::test]
async fn virtual_router_provider_is_flattened_alone() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .owned_by(ACCOUNT_A)
            .virtual_router("vr1")
            .build(),
    )
    .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    let state = outcome.state.unwrap();
    assert_eq!(
        state["spec"],
        json!([{ "provider": [{ "virtual_router": [{ "virtual_router_name": "vr1" }] }] }])
    );
    assert!(state["spec"][0]["provider"][0].get("virtual_node").is_none());
}

#[tokio::test]
async fn service_without_spec_flattens_to_empty_list() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(
        VirtualServiceFixture::new("m1", "vs1")
            .owned_by(ACCOUNT_A)
            .without_spec()
            .build(),
    )
    .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert_eq!(outcome.state.unwrap()["spec"], json!([]));
}

#[tokio::test]
async fn tag_list_failure_keeps_id_and_projected_attributes() {
    let mock = MockAppMeshClient::new();
    let fixture = VirtualServiceFixture::new("m1", "vs1")
        .owned_by(ACCOUNT_A)
        .virtual_node("vn1");
    let arn = fixture.arn();
    mock.set_virtual_service(fixture.build()).await;
    mock.set_tags_error(AppMeshError::Forbidden("AccessDeniedException".into()))
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics.errors().next().unwrap().summary,
        format!(
            "listing tags for App Mesh Virtual Service ({arn}): ForbiddenException: AccessDeniedException"
        )
    );

    let state = outcome.state.unwrap();
    assert_eq!(state["id"], "vs1");
    assert_eq!(state["arn"], arn.as_str());
    assert!(state.get("tags").is_none());
}

#[tokio::test]
async fn platform_and_caller_ignored_tags_never_reach_state() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(VirtualServiceFixture::new("m1", "vs1").owned_by(ACCOUNT_A).build())
        .await;
    mock.set_tags(vec![
        Tag::new("env", "prod"),
        Tag::new("aws:cloudformation:stack-id", "s"),
        Tag::new("team", "mesh"),
        Tag::new("kubernetes.io/cluster", "c1"),
        Tag::new("cost-center", "42"),
    ])
    .await;

    let ignore = IgnoreTagsConfig::new()
        .with_key("team")
        .with_key_prefix("kubernetes.io/");
    let outcome = read_virtual_service(&mock, ACCOUNT_A, ignore, basic_input())
        .await
        .unwrap();

    assert_eq!(
        outcome.state.unwrap()["tags"],
        json!({ "env": "prod", "cost-center": "42" })
    );
}

#[tokio::test]
async fn invalid_configuration_never_calls_upstream() {
    let mock = MockAppMeshClient::new();

    let outcome = read_virtual_service(
        &mock,
        ACCOUNT_A,
        IgnoreTagsConfig::new(),
        json!({ "mesh_name": "", "arn": "arn:aws:appmesh:::x" }),
    )
    .await
    .unwrap();

    assert!(outcome.state.is_none());
    assert_eq!(outcome.diagnostics.errors().count(), 3);
    assert!(mock.describe_calls().await.is_empty());
}

#[tokio::test]
async fn cancelled_read_sets_nothing() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(VirtualServiceFixture::new("m1", "vs1").owned_by(ACCOUNT_A).build())
        .await;

    let ctx = ReadContext::new();
    ctx.cancellation_token().cancel();

    let outcome = read_data_source(
        &VirtualServiceDataSource::new(),
        &ctx,
        config(basic_input()).unwrap(),
        &aws_client(&mock, ACCOUNT_A),
    )
    .await;

    assert!(outcome.state.is_none());
    assert_eq!(
        outcome.diagnostics.errors().next().unwrap().summary,
        "reading App Mesh Virtual Service (vs1): context canceled"
    );
    meshform_testing::assert_list_tags_called!(mock, 0);
}

#[tokio::test]
async fn timestamps_round_trip_through_rfc3339() {
    let mock = MockAppMeshClient::new();
    mock.set_virtual_service(VirtualServiceFixture::new("m1", "vs1").owned_by(ACCOUNT_A).build())
        .await;

    let outcome = read_virtual_service(&mock, ACCOUNT_A, IgnoreTagsConfig::new(), basic_input())
        .await
        .unwrap();
    let state = outcome.state.unwrap();

    for name in ["created_date", "last_updated_date"] {
        let raw = state[name].as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(raw).unwrap();
        assert_eq!(
            parsed.to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            raw,
            "{name}"
        );
    }
}
