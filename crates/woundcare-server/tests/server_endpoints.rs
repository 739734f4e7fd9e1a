use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use woundcare_server::{AppConfig, build_app};

async fn start_server(cfg: AppConfig) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&cfg).expect("build app");

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn server_endpoints_work() {
    let (base, shutdown_tx, handle) = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "Woundcare Portal");
    assert_eq!(body["status"], "ok");

    // GET /healthz preserves a caller's request id
    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-42");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let body: Value = client
        .get(format!("{base}/readyz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ready");

    // Education page and details
    let body: Value = client
        .get(format!("{base}/education?locale=ko"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["locale"], "ko");
    assert_eq!(body["topics"].as_array().unwrap().len(), 4);

    let resp = client
        .get(format!("{base}/education/topics/foot-protection"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["icon"], "footprints");

    let resp = client
        .get(format!("{base}/education/examples/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn callback_without_identity_config() {
    let mut cfg = AppConfig::default();
    cfg.server.public_origin = Some("https://portal.example.org".into());
    let (base, shutdown_tx, handle) = start_server(cfg).await;
    let client = no_redirect_client();

    // No code
    let resp = client
        .get(format!("{base}/auth/callback?next=/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "https://portal.example.org/login");

    // Code but no identity service configured
    let resp = client
        .get(format!("{base}/auth/callback?code=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&resp),
        "https://portal.example.org/login?error=configuration"
    );
    assert!(resp.headers().get("set-cookie").is_none());

    // Repeated keys still end in a redirect
    for (query, expected) in [
        ("code=a&code=b", "https://portal.example.org/login?error=configuration"),
        ("next=/a&next=/b", "https://portal.example.org/login"),
        ("code=&code=b", "https://portal.example.org/login"),
        ("code=%E0%A4%A&next=%", "https://portal.example.org/login?error=configuration"),
    ] {
        let resp = client
            .get(format!("{base}/auth/callback?{query}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "query {query}");
        assert_eq!(location(&resp), expected, "query {query}");
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn callback_exchanges_first_code_of_repeated_keys() {
    let identity = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(body_partial_json(json!({"auth_code": "first"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"msg": "invalid_grant"})),
        )
        .expect(1)
        .mount(&identity)
        .await;

    let (base, shutdown_tx, handle) = start_server(configured(&identity)).await;
    let resp = no_redirect_client()
        .get(format!("{base}/auth/callback?code=first&next=/a&code=second&next=/b"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&resp),
        "https://portal.example.org/login?error=invalid_grant"
    );

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

async fn identity_mock(privacy_agreed: bool, metadata: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "pkce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "user_metadata": metadata
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"privacy_agreed": privacy_agreed}])),
        )
        .mount(&server)
        .await;
    server
}

fn configured(identity: &MockServer) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.server.public_origin = Some("https://portal.example.org".into());
    cfg.identity.url = Some(identity.uri());
    cfg.identity.anon_key = Some("anon".into());
    cfg
}

#[tokio::test]
async fn callback_routes_authenticated_users() {
    let cases = [
        (json!({"role": "clinician"}), false, "/clinician/register"),
        (json!({}), true, "/dashboard"),
        (json!({"role": "patient"}), false, "/privacy-agreement"),
    ];

    for (metadata, agreed, expected) in cases {
        let identity = identity_mock(agreed, metadata).await;
        let (base, shutdown_tx, handle) = start_server(configured(&identity)).await;

        let resp = no_redirect_client()
            .get(format!("{base}/auth/callback?code=abc"))
            .header("cookie", "sb-auth-token-code-verifier=verifier")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&resp), format!("https://portal.example.org{expected}"));

        let cookies: Vec<_> = resp
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("sb-auth-token=base64-")));
        assert!(cookies.iter().any(|c| c.starts_with("sb-auth-token-code-verifier=")));

        let _ = shutdown_tx.send(());
        let _ = handle.await;
    }
}

#[tokio::test]
async fn callback_exchange_error_is_forwarded() {
    let identity = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant", "error_description": "code expired"})),
        )
        .expect(1)
        .mount(&identity)
        .await;

    let (base, shutdown_tx, handle) = start_server(configured(&identity)).await;
    let resp = no_redirect_client()
        .get(format!("{base}/auth/callback?code=stale"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&resp),
        "https://portal.example.org/login?error=code+expired"
    );
    assert!(resp.headers().get("set-cookie").is_none());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
