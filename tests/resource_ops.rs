//! Resource operation tests against a wiremock server.

use dtrack::{BomTarget, BomUpload, DtClient, DtError, Entity, ResourceKind};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_json(uuid: &str, name: &str) -> serde_json::Value {
    json!({
        "uuid": uuid,
        "name": name,
        "version": "1.0.0",
        "classifier": "APPLICATION",
        "active": true
    })
}

async fn client_for(mock_server: &MockServer) -> DtClient {
    DtClient::new("test-token", &mock_server.uri()).unwrap()
}

#[tokio::test]
async fn test_get_binds_instance_and_filters_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1", "acme-app")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let project = client
        .project()
        .get("p-1", Some(&["uuid", "name", "absent"][..]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(project.path().as_str(), "project/p-1");
    assert_eq!(project.kind(), ResourceKind::Project);
    assert_eq!(project.len(), 2);
    assert!(project.contains_key("name"));
    assert!(!project.contains_key("version"));
}

#[tokio::test]
async fn test_get_and_list_agree() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            project_json("p-1", "acme-app"),
            project_json("p-2", "acme-core")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/p-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-2", "acme-core")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let fields = &["uuid", "name"][..];
    let listed = client.project().list(Some(fields), &[]).await.unwrap();
    let fetched = client
        .project()
        .get("p-2", Some(fields))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(&listed[1], fetched.data());
}

#[tokio::test]
async fn test_get_many_reads_list_instances() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/component/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "a", "purl": "pkg:maven/com.ext/a@1", "classifier": "LIBRARY"},
            {"name": "b", "purl": "pkg:maven/com.ext/b@1", "classifier": "LIBRARY"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/tag/fake-tag-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "a"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let components = client
        .component()
        .project()
        .get_many("p-1", Some(&["purl", "classifier"][..]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(components.len(), 2);
    for component in &components {
        assert_eq!(component.len(), 2);
        assert!(!component.contains_key("name"));
    }

    let tagged = client
        .project()
        .tag()
        .get_many("fake-tag-1", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].str_field("name"), Some("a"));
}

#[tokio::test]
async fn test_get_many_wraps_single_object_and_absence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1", "acme-app")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/project/tag/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;

    let single = client.project().get_many("p-1", None).await.unwrap().unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].uuid(), Some("p-1"));

    let missing = client.project().tag().get_many("missing", None).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_get_on_list_instance_points_to_get_many() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/tag/fake-tag-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "a"}])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client
        .project()
        .tag()
        .get("fake-tag-1", None)
        .await
        .unwrap_err();

    assert!(matches!(err, DtError::UnexpectedPayload(ref m) if m.contains("get_many")));
}

#[tokio::test]
async fn test_project_components_use_project_scope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1", "acme-app")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/component/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "uuid": "c-1",
                "name": "jackson-databind",
                "purl": "pkg:maven/com.fasterxml.jackson.core/jackson-databind@2.15.2"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let project = client.project().get("p-1", None).await.unwrap().unwrap();
    let components = project.component().list(None, &[]).await.unwrap();

    assert_eq!(components.len(), 1);
    assert_eq!(components[0].str_field("name"), Some("jackson-databind"));
}

#[tokio::test]
async fn test_create_binds_to_returned_uuid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/project"))
        .and(body_partial_json(json!({"name": "deleteme"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(project_json("p-9", "deleteme")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let mut entry = Entity::new();
    entry.insert("name", "deleteme");
    entry.insert("version", "1.0");

    let created = client.project().create(&entry).await.unwrap();
    assert_eq!(created.path().as_str(), "project/p-9");
    assert_eq!(created.uuid(), Some("p-9"));
    assert!(created.is_project());
}

#[tokio::test]
async fn test_update_patches_instance() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/project/p-1"))
        .and(body_partial_json(json!({"description": "updated"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": "p-1",
            "name": "acme-app",
            "description": "updated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let mut patch = Entity::new();
    patch.insert("description", "updated");

    let updated = client.project().update("p-1", &patch).await.unwrap();
    assert_eq!(updated.str_field("description"), Some("updated"));
}

#[tokio::test]
async fn test_upload_only_to_bom() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-1"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.project().upload(&json!({})).await.unwrap_err();

    assert!(matches!(err, DtError::BadRequest { status: 400, .. }));
}

#[tokio::test]
async fn test_upload_bom_returns_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/bom"))
        .and(body_partial_json(json!({
            "project": "p-1",
            "bom": "e30="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let upload = BomUpload::from_bytes(
        b"{}".to_vec(),
        BomTarget::Uuid {
            project: "p-1".to_string(),
        },
    );

    let response = client.bom().upload(&upload).await.unwrap();
    assert_eq!(response.str_field("token"), Some("t-1"));
}

#[tokio::test]
async fn test_delete_bound_instance_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1", "acme-app")))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let project = client.project().get("p-1", None).await.unwrap().unwrap();

    project.delete(Some("ignored")).await.unwrap();
}

#[tokio::test]
async fn test_delete_requires_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/project/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.project().delete(Some("p-1")).await.unwrap_err();

    match err {
        DtError::UnexpectedStatus { status, detail } => {
            assert_eq!(status, 200);
            assert!(detail.contains("queued"));
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.project().delete(Some("gone")).await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_project_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/lookup"))
        .and(query_param("name", "acme-app"))
        .and(query_param("version", "1.0.0"))
        .and(query_param("pageSize", "10000"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("p-1", "acme-app")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let project = client
        .project()
        .lookup(&[("name", "acme-app"), ("version", "1.0.0")])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(project.path().as_str(), "project/p-1");
    assert!(project.is_project());
}

#[tokio::test]
async fn test_project_lookup_without_uuid_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/project/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "acme-app"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client
        .project()
        .lookup(&[("name", "acme-app")])
        .await
        .unwrap_err();

    assert!(matches!(err, DtError::MissingIdentifier(_)));
}

#[tokio::test]
async fn test_generic_lookup_keeps_lookup_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/component/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "jackson"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let found = client
        .component()
        .lookup(&[("name", "jackson")])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.path().as_str(), "component/lookup");
    assert_eq!(found.kind(), ResourceKind::Generic);
}

#[tokio::test]
async fn test_unknown_relation_is_rejected() {
    let client = DtClient::new("test-token", "http://localhost:8081/api/v1").unwrap();
    let err = client.project().relation("revision").unwrap_err();

    assert!(matches!(err, DtError::UnsupportedRelation(ref name) if name == "revision"));
}
