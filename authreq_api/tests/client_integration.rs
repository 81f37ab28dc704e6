use std::sync::{Arc, Mutex};

use authreq_api::session::{ACCESS_TOKEN_KEY, USER_INFO_KEY};
use authreq_api::{
    status_message, Client, Credentials, Error, KeyValueStore, MemoryStore, Method, Navigator,
    Notifier, RequestOptions, SessionStore, StoredSession, NETWORK_FAILURE_MESSAGE,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

#[derive(Default)]
struct RecordingNavigator {
    replaced: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.replaced.lock().unwrap().push(path.to_string());
    }
}

struct Harness {
    client: Client,
    session: Arc<StoredSession<MemoryStore>>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(base_url: &str, token: Option<&str>) -> Harness {
    let session = Arc::new(StoredSession::new(MemoryStore::new()));
    if let Some(token) = token {
        session.set_token(token);
        session.set_user_info(r#"{"name":"admin"}"#);
    }
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = Client::with_base_url(base_url, session.clone())
        .unwrap()
        .with_notifier(notifier.clone())
        .with_navigator(navigator.clone());
    Harness {
        client,
        session,
        notifier,
        navigator,
    }
}

/// Serves every connection with a fixed status line. Needed where the reason
/// phrase matters: `MockServer` always sends the canonical one.
async fn raw_status_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/goods"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok123"));
    let resp = h.client.get("/goods").await.unwrap();
    assert_eq!(resp.status.as_u16(), 200);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn sends_empty_bearer_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/goods"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let resp = h.client.get("/goods").await.unwrap();
    assert!(resp.is_success());

    // The server side strips trailing whitespace from header values.
    let requests = mock_server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap().trim_end(), "Bearer");
}

#[tokio::test]
async fn caller_headers_survive_and_auth_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("X-Request-Id", "abc"))
        .and(header("Authorization", "Bearer tok"))
        .and(query_param("include", "roles"))
        .and(body_json(serde_json::json!({"name": "ann"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let opts = RequestOptions::default()
        .with_header("X-Request-Id", "abc")
        .with_header("Authorization", "Basic Zm9vOmJhcg==")
        .with_param("include", "roles")
        .with_json(&serde_json::json!({"name": "ann"}))
        .unwrap();
    let resp = h.client.post("/users", opts).await.unwrap();
    assert_eq!(resp.status.as_u16(), 201);
}

#[tokio::test]
async fn custom_interceptor_runs_before_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/goods"))
        .and(header("X-Client", "admin"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let client = h.client.with_interceptor(|url: String, opts: RequestOptions| {
        (
            format!("/v2{}", url),
            opts.with_header("X-Client", "admin")
                .with_header("Authorization", "overwritten"),
        )
    });
    let resp = client.get("/goods").await.unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string(load_fixture("unauthorized.json")))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("expired"));
    let resp = h.client.get("/user").await.unwrap();

    assert_eq!(resp.status.as_u16(), 401);
    assert_eq!(resp.text(), load_fixture("unauthorized.json"));
    assert_eq!(h.session.token(), None);
    assert_eq!(h.session.store().get(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.session.store().get(USER_INFO_KEY), None);
    assert_eq!(h.navigator.replaced(), vec!["/login".to_string()]);
    assert_eq!(
        h.notifier.messages(),
        vec![format!("{}[ Token has expired ]", status_message(401).unwrap())]
    );
}

#[tokio::test]
async fn repeated_unauthorized_is_harmless() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string(load_fixture("unauthorized.json")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("expired"));
    h.client.get("/user").await.unwrap();
    let resp = h.client.get("/user").await.unwrap();

    assert_eq!(resp.status.as_u16(), 401);
    assert!(h.session.store().is_empty());
    assert_eq!(h.navigator.replaced().len(), 2);
    assert_eq!(h.notifier.messages().len(), 2);
}

#[tokio::test]
async fn unauthorized_with_malformed_body_still_logs_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("expired"));
    h.client.get("/user").await.unwrap();

    assert_eq!(h.session.token(), None);
    assert_eq!(h.navigator.replaced(), vec!["/login".to_string()]);
    assert_eq!(
        h.notifier.messages(),
        vec![status_message(401).unwrap().to_string()]
    );
}

#[tokio::test]
async fn validation_error_lists_first_message_per_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(load_fixture("validation_error.json")),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let resp = h
        .client
        .post("/users", RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(resp.status.as_u16(), 422);
    assert_eq!(h.session.token().as_deref(), Some("tok"));
    assert!(h.navigator.replaced().is_empty());
    assert_eq!(
        h.notifier.messages(),
        vec![format!(
            "{}[ The email must be a valid email address.The name field is required. ]",
            status_message(422).unwrap()
        )]
    );
}

#[tokio::test]
async fn bad_request_appends_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/category/3"))
        .respond_with(ResponseTemplate::new(400).set_body_string(load_fixture("bad_request.json")))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let resp = h.client.delete("/category/3").await.unwrap();

    assert_eq!(resp.status.as_u16(), 400);
    assert_eq!(
        h.notifier.messages(),
        vec![format!(
            "{}[ Category still has goods attached ]",
            status_message(400).unwrap()
        )]
    );
}

#[tokio::test]
async fn unknown_status_uses_status_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/brew"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let resp = h.client.get("/brew").await.unwrap();

    assert_eq!(resp.status.as_u16(), 418);
    assert_eq!(h.notifier.messages(), vec!["I'm a teapot".to_string()]);
}

#[tokio::test]
async fn server_error_uses_table_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/goods"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let resp = h.client.get("/goods").await.unwrap();

    assert_eq!(resp.status.as_u16(), 503);
    assert_eq!(
        h.notifier.messages(),
        vec![status_message(503).unwrap().to_string()]
    );
}

#[tokio::test]
async fn network_failure_reports_and_returns_err() {
    // Nothing listens on the discard port.
    let h = harness("http://127.0.0.1:9", Some("tok"));
    let result = h.client.get("/goods").await;

    let err = result.unwrap_err();
    assert!(err.is_no_response());
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(
        h.notifier.messages(),
        vec![NETWORK_FAILURE_MESSAGE.to_string()]
    );
    assert_eq!(h.session.token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn invalid_header_is_treated_as_no_response() {
    let mock_server = MockServer::start().await;
    let h = harness(&mock_server.uri(), Some("tok"));

    let opts = RequestOptions::new(Method::GET).with_header("X-Bad", "line\nbreak");
    let err = h.client.request("/goods", opts).await.unwrap_err();

    assert!(matches!(err, Error::InvalidHeader { .. }));
    assert_eq!(
        h.notifier.messages(),
        vec![NETWORK_FAILURE_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn get_json_decodes_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":7,"name":"admin"}"#))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let user: serde_json::Value = h.client.get_json("/user").await.unwrap();
    assert_eq!(user["id"], 7);
}

#[tokio::test]
async fn get_json_surfaces_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    let err = h
        .client
        .get_json::<serde_json::Value>("/user")
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, status_message(404).unwrap());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test]
async fn credentials_policy_controls_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "sid=abc; Path=/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/goods"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tok"));
    h.client.get("/session").await.unwrap();
    h.client.get("/goods").await.unwrap();
    h.client
        .request(
            "/goods",
            RequestOptions::default().with_credentials(Credentials::Omit),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let goods: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/goods")
        .collect();
    assert_eq!(goods.len(), 2);
    assert_eq!(
        goods[0].headers.get("cookie").map(|v| v.to_str().unwrap()),
        Some("sid=abc")
    );
    assert!(goods[1].headers.get("cookie").is_none());
}

#[tokio::test]
async fn unknown_status_keeps_server_reason_phrase() {
    let base = raw_status_server("499 Client Closed Request").await;

    let h = harness(&base, Some("tok"));
    let resp = h.client.get("/x").await.unwrap();

    assert_eq!(resp.status.as_u16(), 499);
    assert_eq!(resp.status_text, "Client Closed Request");
    assert_eq!(
        h.notifier.messages(),
        vec!["Client Closed Request".to_string()]
    );
}

#[tokio::test]
async fn custom_reason_phrase_beats_canonical_one() {
    let base = raw_status_server("418 Go Away").await;

    let h = harness(&base, Some("tok"));
    let resp = h.client.get("/x").await.unwrap();

    assert_eq!(resp.status.as_u16(), 418);
    assert_eq!(h.notifier.messages(), vec!["Go Away".to_string()]);
}
