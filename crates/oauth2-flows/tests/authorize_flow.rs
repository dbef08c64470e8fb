use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use oauth2_flows::prelude::*;
use tower::ServiceExt;

fn app(store: Arc<MemoryStore>, mode: ResponseMode, allow: bool) -> Router {
    let consent = move |_: &OAuthRequest| -> Result<Consent, BoxError> {
        Ok(if allow {
            Consent::granted(Some(User::with_id("u-1")))
        } else {
            Consent::denied()
        })
    };

    let flow = AuthorizationGrantFlow::new(
        store.clone(),
        store,
        Arc::new(RandomTokenGenerator),
        Arc::new(consent),
    )
    .with_response_mode(mode);

    Router::new()
        .route("/authorize", get(authorize_handler).post(authorize_handler))
        .with_state(Arc::new(flow))
}

fn registered_store(scopes: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_client(
        Client::new("abc", "https://app/cb").with_scopes(scopes.iter().copied()),
    );
    store
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn location(response: &axum::response::Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("location header")
        .to_string()
}

const SCENARIO_QUERY: &str =
    "/authorize?response_type=code&client_id=abc&redirect_uri=https%3A%2F%2Fapp%2Fcb&scope=read%20write";

#[tokio::test]
async fn issues_code_by_redirect() {
    let store = registered_store(&["read", "write", "admin"]);
    let app = app(store.clone(), ResponseMode::Redirect, true);

    let response = app
        .oneshot(Request::get(SCENARIO_QUERY).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    let code = location
        .strip_prefix("https://app/cb?code=")
        .expect("success redirect");

    let saved = store.auth_code(code).expect("code persisted");
    assert_eq!(saved.client_id, "abc");
    assert_eq!(saved.scopes, vec!["read".to_string(), "write".to_string()]);
    assert_eq!(saved.user.map(|u| u.id), Some("u-1".to_string()));
}

#[tokio::test]
async fn echoes_state_on_redirect() {
    let app = app(
        registered_store(&["read", "write"]),
        ResponseMode::Redirect,
        true,
    );
    let uri = format!("{SCENARIO_QUERY}&state=xyz");

    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(location(&response).ends_with("&state=xyz"));
}

#[tokio::test]
async fn state_with_control_byte_still_redirects() {
    let store = registered_store(&["read", "write"]);
    let app = app(store.clone(), ResponseMode::Redirect, true);
    let uri = format!("{SCENARIO_QUERY}&state=a%0Ab");

    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    let code = location
        .strip_prefix("https://app/cb?code=")
        .and_then(|rest| rest.strip_suffix("&state=a%0Ab"))
        .expect("success redirect with encoded state");
    assert!(store.auth_code(code).is_some());
    assert_eq!(store.auth_code_count(), 1);
}

#[tokio::test]
async fn form_post_is_accepted() {
    let app = app(registered_store(&["read"]), ResponseMode::Redirect, true);

    let response = app
        .oneshot(
            Request::post("/authorize")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "response_type=code&client_id=abc&redirect_uri=https%3A%2F%2Fapp%2Fcb&scope=read",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("https://app/cb?code="));
}

#[tokio::test]
async fn direct_mode_returns_json() {
    let store = registered_store(&["read", "write"]);
    let app = app(store.clone(), ResponseMode::Direct, true);
    let uri = format!("{SCENARIO_QUERY}&state=s1");

    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], "s1");
    let code = body["authCode"].as_str().expect("authCode");
    assert!(store.auth_code(code).is_some());
}

#[tokio::test]
async fn invalid_scope_is_rendered_directly() {
    let store = registered_store(&["read"]);
    let app = app(store.clone(), ResponseMode::Redirect, true);

    let response = app
        .oneshot(Request::get(SCENARIO_QUERY).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "error": "invalid_request",
            "error_description": "invalid scopes for this client write"
        })
    );
    assert_eq!(store.auth_code_count(), 0);
}

#[tokio::test]
async fn unknown_client_is_rendered_directly() {
    let app = app(
        Arc::new(MemoryStore::new()),
        ResponseMode::Redirect,
        true,
    );

    let response = app
        .oneshot(Request::get(SCENARIO_QUERY).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"Service\""
    );
    assert_eq!(body_json(response).await["error"], "invalid_client");
}

#[tokio::test]
async fn missing_response_type_is_rendered_directly() {
    let app = app(registered_store(&["read"]), ResponseMode::Redirect, true);

    let response = app
        .oneshot(
            Request::get("/authorize?client_id=abc&redirect_uri=https%3A%2F%2Fapp%2Fcb&scope=read")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error_description"],
        "Invalid response_type parameter (must be \"code\")"
    );
}

#[tokio::test]
async fn denied_consent_redirects_with_error() {
    let store = registered_store(&["read", "write"]);
    let app = app(store.clone(), ResponseMode::Redirect, false);

    let response = app
        .oneshot(Request::get(SCENARIO_QUERY).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "https://app/cb?error=access_denied&error_description=The user denied access to your application&code=403"
    );
    assert_eq!(store.auth_code_count(), 0);
}

#[tokio::test]
async fn denied_consent_in_direct_mode_is_json() {
    let app = app(registered_store(&["read", "write"]), ResponseMode::Direct, false);

    let response = app
        .oneshot(Request::get(SCENARIO_QUERY).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "access_denied");
}
