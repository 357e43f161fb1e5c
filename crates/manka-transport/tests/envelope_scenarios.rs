//! End-to-end envelope handling for both transports against a mock backend.

use std::sync::Arc;

use manka_core::{
    ClientConfig, HttpClient, HttpClientExt, HttpError, RuntimeTarget, envelope::DEFAULT_ERROR_MESSAGE,
};
use manka_session::{AuthSession, LOGIN_PATH, RecordingNavigator, storage::MemoryStore};
use manka_transport::{MankaApi, build_client, protocol::MankaArchive};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const TARGETS: [RuntimeTarget; 2] = [RuntimeTarget::Browser, RuntimeTarget::Embedded];

struct Harness {
    client: Arc<dyn HttpClient>,
    session: Arc<AuthSession>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(server_url: &str, target: RuntimeTarget) -> Harness {
    let navigator = Arc::new(RecordingNavigator::new());
    let session = Arc::new(AuthSession::new(
        Arc::new(MemoryStore::new()),
        navigator.clone(),
    ));
    let config = ClientConfig::default()
        .with_server_url(server_url)
        .with_target(target);
    let client = build_client(&config, Arc::clone(&session)).unwrap();
    Harness {
        client,
        session,
        navigator,
    }
}

async fn mount(server: &MockServer, verb: &str, route: &str, body: Value) {
    Mock::given(method(verb))
        .and(path(format!("/api/v1{route}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn scenario_a_success_resolves_with_data() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/manka/123/detail",
        json!({"code": 0, "msg": "", "data": {"archiveId": "123", "archiveName": "Test"}}),
    )
    .await;

    for target in TARGETS {
        let h = harness(&server.uri(), target);
        let envelope = h
            .client
            .get::<MankaArchive>("/manka/123/detail", None)
            .await
            .unwrap();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.data.archive_id, "123");
        assert_eq!(envelope.data.archive_name, "Test");
    }
}

#[tokio::test]
async fn scenario_b_login_then_sign_in() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/user/login",
        json!({"code": 0, "msg": "", "data": {}}),
    )
    .await;

    for target in TARGETS {
        let h = harness(&server.uri(), target);
        let data: Value = h
            .client
            .post_json("/user/login", &json!({"userName": "u", "password": "p"}))
            .await
            .unwrap();
        assert_eq!(data, json!({}));
        assert!(!h.session.is_authenticated());

        h.session.sign_in();
        assert!(h.session.is_authenticated());

        let api = MankaApi::new(Arc::clone(&h.client), Arc::clone(&h.session));
        api.logout();
        api.login("u", "p").await.unwrap();
        assert!(h.session.is_authenticated());
    }
}

#[tokio::test]
async fn scenario_c_unauthorized_signs_out_and_redirects() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/favorite/list",
        json!({"code": 401, "msg": "unauthorized", "data": null}),
    )
    .await;

    for target in TARGETS {
        let h = harness(&server.uri(), target);
        h.session.sign_in();
        let mut transitions = h.session.subscribe();

        let err = h
            .client
            .get::<Value>("/favorite/list", None)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some(401));
        assert_eq!(err.message(), Some("unauthorized"));
        assert!(!h.session.is_authenticated());
        assert_eq!(h.navigator.redirects(), vec![LOGIN_PATH.to_string()]);
        assert_eq!(
            transitions.try_recv().unwrap(),
            manka_session::AuthTransition::Expired
        );
    }
}

#[tokio::test]
async fn scenario_d_empty_message_uses_default() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/favorite/add",
        json!({"code": 500, "msg": "", "data": null}),
    )
    .await;

    for target in TARGETS {
        let h = harness(&server.uri(), target);
        h.session.sign_in();
        let err = h
            .client
            .post::<Value>("/favorite/add", Some(json!({"archiveId": "1"})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::App(_)));
        assert_eq!(err.code(), Some(500));
        assert_eq!(err.message(), Some(DEFAULT_ERROR_MESSAGE));
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
        assert!(h.session.is_authenticated());
        assert_eq!(h.navigator.count(), 0);
    }
}

#[tokio::test]
async fn scenario_e_connection_error_is_network_error() {
    let unused = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", unused.local_addr().unwrap());
    drop(unused);

    for target in TARGETS {
        let h = harness(&url, target);
        h.session.sign_in();
        let err = h
            .client
            .get::<Value>("/manka/1/detail", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
        assert!(err.is_network());
        assert_eq!(err.code(), None);
        assert!(h.session.is_authenticated());
        assert_eq!(h.navigator.count(), 0);
    }
}

#[tokio::test]
async fn non_200_status_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 0, "msg": "", "data": null
        })))
        .mount(&server)
        .await;

    for target in TARGETS {
        let h = harness(&server.uri(), target);
        let err = h.client.get::<Value>("/anything", None).await.unwrap_err();
        match err {
            HttpError::Network {
                status,
                status_text,
            } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
            }
            other => panic!("unexpected error for {target}: {other:?}"),
        }
    }
}
