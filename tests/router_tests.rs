use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use employee_api::{
    AppConfig, AppState, create_app,
    models::{Employee, StatusResponse, TokenResponse},
    repository::IdPolicy,
};
use tower::util::ServiceExt;

// --- Helpers ---

async fn send(state: &AppState, request: Request<Body>) -> Response {
    create_app(state.clone()).oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn form_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(state: &AppState) -> String {
    let response = send(
        state,
        json_request(
            "POST",
            "/login",
            None,
            serde_json::json!({ "login": "james.bond", "password": "james123!" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json::<TokenResponse>(response).await.token
}

async fn create(state: &AppState, token: &str, name: &str) -> Employee {
    let response = send(
        state,
        json_request(
            "POST",
            "/employees",
            Some(token),
            serde_json::json!({ "fullName": name, "age": 40, "email": "e@x.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// --- Public routes ---

#[tokio::test]
async fn test_ping_and_status() {
    let state = AppState::new(AppConfig::default());

    let response = send(&state, bare_request("GET", "/ping", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "pong");

    let response = send(&state, bare_request("GET", "/status", None)).await;
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "health": "OK", "sessionsCount": 0 }));
}

#[tokio::test]
async fn test_login_token_is_live_session() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    assert_eq!(token.len(), 55);
    assert!(token.chars().all(|c| c.is_ascii_alphabetic()));
    assert!(state.sessions.exists(&token));
}

#[tokio::test]
async fn test_login_accepts_form_body() {
    let state = AppState::new(AppConfig::default());
    let response = send(
        &state,
        form_request("POST", "/login", None, "login=james.bond&password=james123%21"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.sessions.count(), 1);
}

#[tokio::test]
async fn test_bad_credentials_create_no_session() {
    let state = AppState::new(AppConfig::default());

    for (login, password) in [
        ("james.bond", "wrong"),
        ("James.Bond", "james123!"),
        ("", ""),
    ] {
        let response = send(
            &state,
            json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({ "login": login, "password": password }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = send(&state, bare_request("GET", "/status", None)).await;
    let status: StatusResponse = body_json(response).await;
    assert_eq!(status.sessions_count, 0);
}

#[tokio::test]
async fn test_login_with_unparseable_body_is_bad_request() {
    let state = AppState::new(AppConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    assert_eq!(send(&state, request).await.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::from("login=x"))
        .unwrap();
    assert_eq!(send(&state, request).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.sessions.count(), 0);
}

#[tokio::test]
async fn test_logout_is_idempotent_and_revokes() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    for _ in 0..2 {
        let response = send(&state, bare_request("DELETE", "/logout", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&state, bare_request("GET", "/employees", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_only_revokes_its_own_token() {
    let state = AppState::new(AppConfig::default());
    let first = login(&state).await;
    let second = login(&state).await;

    send(&state, bare_request("DELETE", "/logout", Some(&first))).await;

    assert!(!state.sessions.exists(&first));
    assert!(state.sessions.exists(&second));
}

#[tokio::test]
async fn test_logout_without_header_succeeds() {
    let state = AppState::new(AppConfig::default());
    let response = send(&state, bare_request("DELETE", "/logout", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// --- Authorization gate ---

#[tokio::test]
async fn test_employee_routes_require_token() {
    let state = AppState::new(AppConfig::default());

    for (method, uri) in [
        ("GET", "/employees"),
        ("POST", "/employees"),
        ("GET", "/employees/0"),
        ("PUT", "/employees/0"),
        ("DELETE", "/employees/0"),
    ] {
        let response = send(&state, bare_request(method, uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        let response = send(&state, bare_request(method, uri, Some("made-up"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_raw_and_lowercase_bearer_are_accepted() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    for value in [token.clone(), format!("bearer   {}", token)] {
        let request = Request::builder()
            .uri("/employees")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&state, request).await.status(), StatusCode::OK);
    }
}

// --- Employee registry ---

#[tokio::test]
async fn test_create_appends_and_assigns_increasing_ids() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    let a = create(&state, &token, "A").await;
    let b = create(&state, &token, "B").await;
    assert_eq!((a.id, b.id), (0, 1));

    let response = send(&state, bare_request("GET", "/employees", Some(&token))).await;
    let list: Vec<Employee> = body_json(response).await;
    assert_eq!(list, vec![a, b]);
}

#[tokio::test]
async fn test_create_accepts_form_body() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    let response = send(
        &state,
        form_request(
            "POST",
            "/employees",
            Some(&token),
            "fullName=Form+Person&age=28&email=f%40x.com",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let employee: Employee = body_json(response).await;
    assert_eq!(employee.full_name, "Form Person");
    assert_eq!(employee.email, "f@x.com");
}

#[tokio::test]
async fn test_create_with_bad_body_is_bad_request() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    for body in [
        serde_json::json!({ "fullName": "A", "email": "a@x.com" }),
        serde_json::json!({ "fullName": "A", "age": 300, "email": "a@x.com" }),
        serde_json::json!([1, 2, 3]),
    ] {
        let response = send(&state, json_request("POST", "/employees", Some(&token), body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(state.repo.list().is_empty());
}

#[tokio::test]
async fn test_update_is_a_partial_patch() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    let original = create(&state, &token, "A").await;

    let response = send(
        &state,
        form_request("PUT", "/employees/0", Some(&token), "fullName=X&email="),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let fetched = state.repo.get(0).unwrap();
    assert_eq!(fetched.full_name, "X");
    assert_eq!(fetched.age, original.age);
    assert_eq!(fetched.email, original.email);
}

#[tokio::test]
async fn test_update_reads_query_string_fields() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    create(&state, &token, "A").await;

    let response = send(&state, bare_request("PUT", "/employees/0?age=55", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let updated: Employee = body_json(response).await;
    assert_eq!(updated.age, 55);
    assert_eq!(updated.full_name, "A");
}

#[tokio::test]
async fn test_update_unknown_id_and_bad_age() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    create(&state, &token, "A").await;

    let response = send(&state, form_request("PUT", "/employees/9", Some(&token), "age=1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&state, form_request("PUT", "/employees/0", Some(&token), "age=old")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_id_wins_over_bad_fields() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    let response = send(&state, bare_request("PUT", "/employees/9?age=1&age=2", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &state,
        json_request("PUT", "/employees/9", Some(&token), serde_json::json!({ "age": "31" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_accepts_multipart_body() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    create(&state, &token, "A").await;

    let body = "--XX\r\n\
                Content-Disposition: form-data; name=\"age\"\r\n\
                \r\n\
                31\r\n\
                --XX\r\n\
                Content-Disposition: form-data; name=\"fullName\"\r\n\
                \r\n\
                \r\n\
                --XX--\r\n";
    let request = Request::builder()
        .method("PUT")
        .uri("/employees/0")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XX")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();

    let response = send(&state, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let updated: Employee = body_json(response).await;
    assert_eq!(updated.age, 31);
    assert_eq!(updated.full_name, "A");
    assert_eq!(state.repo.get(0).unwrap().age, 31);
}

#[tokio::test]
async fn test_update_rejects_unsupported_body() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    let original = create(&state, &token, "A").await;

    let response = send(
        &state,
        json_request("PUT", "/employees/0", Some(&token), serde_json::json!({ "age": "31" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("application/json"));
    assert_eq!(state.repo.get(0).unwrap(), original);
}

#[tokio::test]
async fn test_form_content_type_is_case_insensitive() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    create(&state, &token, "A").await;

    let request = Request::builder()
        .method("PUT")
        .uri("/employees/0")
        .header(header::CONTENT_TYPE, "Application/X-WWW-Form-Urlencoded; charset=UTF-8")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("age=33"))
        .unwrap();
    let response = send(&state, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(state.repo.get(0).unwrap().age, 33);

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "APPLICATION/X-WWW-FORM-URLENCODED")
        .body(Body::from("login=james.bond&password=james123%21"))
        .unwrap();
    let response = send(&state, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_remove_then_get_and_remove_again_are_not_found() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;
    create(&state, &token, "A").await;

    let response = send(&state, bare_request("DELETE", "/employees/0", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    let response = send(&state, bare_request("GET", "/employees/0", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Employee could not be found");

    let response = send(&state, bare_request("DELETE", "/employees/0", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    let response = send(&state, bare_request("GET", "/employees/abc", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let state = AppState::new(AppConfig::default());
    let token = login(&state).await;

    let response = send(&state, bare_request("GET", "/employees/", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, bare_request("GET", "/ping/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tail_policy_reuses_freed_tail_id() {
    let config = AppConfig {
        id_policy: IdPolicy::FollowTail,
        ..AppConfig::default()
    };
    let state = AppState::new(config);
    let token = login(&state).await;

    create(&state, &token, "A").await;
    create(&state, &token, "B").await;
    send(&state, bare_request("DELETE", "/employees/1", Some(&token))).await;

    assert_eq!(create(&state, &token, "C").await.id, 1);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let state = AppState::new(AppConfig::default());
    let response = send(&state, bare_request("GET", "/ping", None)).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let state = AppState::new(AppConfig::default());
    let response = send(&state, bare_request("GET", "/api-docs/openapi.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = body_json(response).await;
    for path in ["/login", "/logout", "/employees", "/employees/{id}"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
