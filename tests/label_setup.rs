//! End-to-end label setup against a mocked GitHub API

use gh_label_setup::{sync_repository_labels, Error, GithubSettings};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LABELS_PATH: &str = "/repos/octo/widgets/labels";

fn settings(api_url: String) -> GithubSettings {
    GithubSettings {
        access_token: "test-token".to_string(),
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
        api_url,
    }
}

async fn mount_remote_labels(server: &MockServer, labels: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(labels))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn yaml_config_wins_and_defaults_are_removed() {
    let server = MockServer::start().await;
    mount_remote_labels(
        &server,
        json!([
            {"name": "bug", "color": "d73a4a", "description": "Something isn't working"},
            {"name": "wontfix", "color": "ffffff", "description": null},
            {"name": "area: api", "color": "1d76db", "description": "API surface"}
        ]),
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{LABELS_PATH}/bug")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{LABELS_PATH}/wontfix")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    // The update still targets "bug" after it was deleted
    Mock::given(method("PATCH"))
        .and(path(format!("{LABELS_PATH}/bug")))
        .and(body_json(json!({
            "new_name": "bug",
            "color": "fc2929",
            "description": ""
        })))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("labels.yaml"),
        "- name: bug\n  color: \"#fc2929\"\n- name: \"area: api\"\n  color: \"#1d76db\"\n  description: API surface\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("labels.json"), r#"[{"name": "other"}]"#).unwrap();

    let result = sync_repository_labels(&settings(server.uri()), dir.path())
        .await
        .unwrap();

    assert_eq!(result.deleted, 2);
    assert_eq!(result.unchanged, 1);
    assert_eq!(result.created, 0);
    assert_eq!(
        result.errors,
        vec!["Status 404. Failed to update label `bug`.".to_string()]
    );
}

#[tokio::test]
async fn nameless_entry_aborts_before_any_mutation() {
    let server = MockServer::start().await;
    mount_remote_labels(&server, json!([{"name": "bug", "color": "d73a4a", "description": ""}])).await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("labels.json"),
        r##"[{"name": "first"}, {"color": "#fff", "description": "x"}, {"name": "later"}]"##,
    )
    .unwrap();

    let result = sync_repository_labels(&settings(server.uri()), dir.path()).await;

    assert!(matches!(
        result,
        Err(Error::InvalidLabelEntry { index: 2, .. })
    ));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.method.as_str() == "GET"));
}

#[tokio::test]
async fn failed_listing_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("labels.yaml"), "- name: bug\n").unwrap();

    let result = sync_repository_labels(&settings(server.uri()), dir.path()).await;

    assert!(matches!(
        result,
        Err(Error::RemoteFetch {
            status: 401,
            page: 1
        })
    ));
}

#[tokio::test]
async fn missing_config_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LABELS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("_remove.yaml"), "- name: bug\n").unwrap();

    let result = sync_repository_labels(&settings(server.uri()), dir.path()).await;

    assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
}
