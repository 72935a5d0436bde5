use std::time::Duration;

use googletest::{assert_that, prelude::none};
use helpers::{TestApp, json_response, ok_json, wait_for_key};
use redact::Secret;
use reqwest::{Method, StatusCode};
use rentscope_client::api::Credentials;
use rentscope_client::{GatewayClient, GatewayConfig, GatewayError, RequestOptions};
use rentscope_router::Navigator;
use rentscope_storage::keys;
use serde_json::{Value, json};

mod helpers;

#[tokio::test]
async fn the_bearer_token_is_attached_when_logged_in() {
    let app = TestApp::new(|_| ok_json(json!([])));

    app.client.catalog().cities().await.unwrap();
    assert_that!(app.backend.last_request().header("authorization"), none());

    app.log_in("abc").await;
    app.client.catalog().cities().await.unwrap();
    assert_eq!(
        app.backend.last_request().header("authorization"),
        Some("Bearer abc")
    );
}

#[tokio::test]
async fn base_headers_and_language_are_always_set() {
    let app = TestApp::new(|_| ok_json(json!({})));

    app.client.catalog().dashboard().await.unwrap();
    let request = app.backend.last_request();
    assert_eq!(request.path, "/api/dashboard");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept-language"), Some("zh-CN"));
    assert_eq!(request.timeout, Some(Duration::from_secs(45)));

    app.locale.set_locale("en-US").await.unwrap();
    app.client.catalog().dashboard().await.unwrap();
    assert_eq!(
        app.backend.last_request().header("accept-language"),
        Some("en-US")
    );
}

#[tokio::test]
async fn image_proxy_calls_keep_their_shorter_timeout() {
    let app = TestApp::new(|_| ok_json(json!({"data": "aGVsbG8="})));

    app.client
        .images()
        .base64("https://img.example.com/a.jpg")
        .await
        .unwrap();

    let request = app.backend.last_request();
    assert_eq!(request.path, "/api/proxy/image");
    assert_eq!(request.timeout, Some(Duration::from_secs(10)));
    assert_eq!(
        request.query.as_deref(),
        Some("url=https%3A%2F%2Fimg.example.com%2Fa.jpg")
    );
}

#[tokio::test]
async fn purge_requests_are_sent_as_admin() {
    let app = TestApp::new(|_| ok_json(json!({"message": "ok"})));
    app.log_in("abc").await;

    app.client.settings().purge().await.unwrap();
    let request = app.backend.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/settings/purge");
    assert_eq!(request.header("x-user-role"), Some("admin"));

    app.client.settings().info().await.unwrap();
    assert_that!(app.backend.last_request().header("x-user-role"), none());
}

#[tokio::test]
async fn json_bodies_are_sent_as_is() {
    let app = TestApp::new(|_| ok_json(json!({"message": "ok"})));

    app.client
        .settings()
        .update(&json!({"crawl_interval": 30}))
        .await
        .unwrap();
    let request = app.backend.last_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/api/settings");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.json(), json!({"crawl_interval": 30}));

    app.client
        .ip()
        .add_proxy(&json!({"host": "10.0.0.2", "port": 8080}))
        .await
        .unwrap();
    let request = app.backend.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.json(), json!({"host": "10.0.0.2", "port": 8080}));
}

#[tokio::test]
async fn the_role_override_wins_over_the_purge_rule() {
    let app = TestApp::new(|_| ok_json(json!({"message": "ok"})));
    app.session.set_role_override(Some("auditor")).await.unwrap();

    app.client.settings().purge().await.unwrap();
    assert_eq!(
        app.backend.last_request().header("x-user-role"),
        Some("auditor")
    );

    app.client.settings().info().await.unwrap();
    assert_eq!(
        app.backend.last_request().header("x-user-role"),
        Some("auditor")
    );
}

#[tokio::test]
async fn a_401_clears_the_session_and_redirects_to_login() {
    let app = TestApp::at("/task-list", |_| {
        json_response(401, json!({"detail": "无效的认证凭据"}))
    });
    app.log_in("stale").await;
    app.session.set_role_override(Some("admin")).await.unwrap();

    let err = app.client.tasks().list(&json!({})).await.unwrap_err();

    // The session is already gone when the caller sees the error.
    assert!(!app.session.is_authenticated().await.unwrap());
    assert!(app.session.snapshot().await.unwrap().is_empty());
    assert_eq!(
        app.navigator.history(),
        vec!["/task-list", "/login?redirect=%2Ftask-list"]
    );
    assert!(matches!(err, GatewayError::AuthExpired { .. }), "{err:?}");
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.detail(), Some("无效的认证凭据"));
}

#[tokio::test]
async fn the_401_redirect_drops_the_query_string() {
    let app = TestApp::at("/house-list?city=bj#top", |_| {
        json_response(401, json!({"detail": "Token expired"}))
    });
    app.log_in("stale").await;

    let err = app.client.houses().list(&json!({"city": "bj"})).await.unwrap_err();

    assert!(matches!(err, GatewayError::AuthExpired { .. }), "{err:?}");
    assert_eq!(
        app.navigator.history(),
        vec!["/house-list?city=bj#top", "/login?redirect=%2Fhouse-list"]
    );
}

#[tokio::test]
async fn a_401_on_the_login_page_does_not_navigate() {
    let app = TestApp::at("/login", |_| {
        json_response(401, json!({"detail": "用户名或密码错误"}))
    });

    let err = app
        .client
        .auth()
        .login(&Credentials {
            username: "alice".into(),
            password: Secret::new("wrong".into()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::AuthExpired { .. }), "{err:?}");
    assert_eq!(app.navigator.navigations(), 0);
    assert_eq!(app.navigator.current_path(), "/login");
}

#[tokio::test]
async fn backend_error_payloads_are_propagated_verbatim() {
    let payload = json!({"detail": [{"loc": ["body", "city"], "msg": "field required"}]});
    let app = TestApp::new({
        let payload = payload.clone();
        move |_| json_response(422, payload.clone())
    });

    let err = app
        .client
        .tasks()
        .create_crawl(&json!({"pages": 3}))
        .await
        .unwrap_err();

    match err {
        GatewayError::Backend { status, payload: p } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(p, payload);
        }
        other => panic!("Expected a backend error, got {other:?}"),
    }
    // Non-401 failures leave the user where they are.
    assert_eq!(app.navigator.navigations(), 0);
}

#[tokio::test]
async fn non_json_error_bodies_are_propagated_as_text() {
    let app = TestApp::new(|_| {
        http::Response::builder()
            .status(500)
            .body(b"Internal Server Error: db down".to_vec())
            .unwrap()
    });

    let err = app.client.houses().get(7).await.unwrap_err();

    match &err {
        GatewayError::Backend { status, payload } => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(payload, &json!("Internal Server Error: db down"));
        }
        other => panic!("Expected a backend error, got {other:?}"),
    }
    assert_that!(err.detail(), none());
}

#[tokio::test]
async fn errors_with_an_empty_body_only_carry_the_status() {
    let app = TestApp::new(|_| {
        http::Response::builder()
            .status(502)
            .body(Vec::new())
            .unwrap()
    });

    let err = app.client.houses().get(7).await.unwrap_err();

    assert!(
        matches!(err, GatewayError::Status { status } if status == StatusCode::BAD_GATEWAY),
        "{err:?}"
    );
    assert!(err.payload().is_none());
}

#[tokio::test]
async fn unreachable_backends_surface_as_transport_errors() {
    let store = rentscope_storage::KeyValueStore::new(
        rentscope_storage_memory::InMemoryKeyValueStore::new(),
    );
    let locale = std::sync::Arc::new(rentscope_i18n::LocaleController::with_state(
        store.clone(),
        std::sync::Arc::new(rentscope_i18n::HeadlessDocument::new()),
        rentscope_i18n::Catalog::new(),
        rentscope_i18n::LocaleState::default(),
    ));
    let client = GatewayClient::builder(
        GatewayConfig {
            // Nothing listens on port 1.
            origin: "http://127.0.0.1:1".into(),
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        },
        store,
        locale,
        std::sync::Arc::new(rentscope_router::InMemoryNavigator::default()),
    )
    .build();

    let err = client.catalog().cities().await.unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn success_payloads_are_unwrapped() {
    let app = TestApp::new(|request| match request.path.as_str() {
        "/api/tasks/count" => ok_json(json!({"count": 12})),
        "/api/tasks/3" => http::Response::builder()
            .status(204)
            .body(Vec::new())
            .unwrap(),
        _ => ok_json(json!(null)),
    });

    let count = app
        .client
        .tasks()
        .count(&json!({"status": "done", "city": null}))
        .await
        .unwrap();
    assert_eq!(count, json!({"count": 12}));
    assert_eq!(
        app.backend.last_request().query.as_deref(),
        Some("status=done")
    );

    let deleted = app.client.tasks().delete(3).await.unwrap();
    assert_eq!(deleted, Value::Null);
    assert_eq!(app.backend.last_request().method, Method::DELETE);
}

#[tokio::test]
async fn export_uses_the_suggested_filename() {
    let app = TestApp::new(|_| {
        http::Response::builder()
            .status(200)
            .header("content-type", "text/csv")
            .header(
                "content-disposition",
                r#"attachment; filename="houses_2024.csv""#,
            )
            .body(b"id,title\n1,Sunny flat\n".to_vec())
            .unwrap()
    });

    let exported = app
        .client
        .export()
        .houses(&json!({"city": "北京"}))
        .await
        .unwrap();

    assert_eq!(exported.filename, "houses_2024.csv");
    assert_eq!(exported.download.bytes().as_ref(), b"id,title\n1,Sunny flat\n");
    assert_eq!(exported.download.content_type(), "text/csv;charset=utf-8");
    assert_eq!(app.backend.last_request().path, "/api/export/houses");

    let dir = tempfile::tempdir().unwrap();
    let dir = camino::Utf8Path::from_path(dir.path()).unwrap();
    let saved = exported.save_into(dir).await.unwrap();
    assert_eq!(saved, dir.join("houses_2024.csv"));
    assert_eq!(
        std::fs::read(&saved).unwrap(),
        b"id,title\n1,Sunny flat\n".to_vec()
    );
}

#[tokio::test]
async fn export_falls_back_to_the_default_filename() {
    let app = TestApp::new(|_| {
        http::Response::builder()
            .status(200)
            .body(b"id\n".to_vec())
            .unwrap()
    });

    let exported = app.client.export().houses(&json!({})).await.unwrap();

    assert_eq!(exported.filename, "houses.csv");
}

#[tokio::test]
async fn crawl_submissions_are_timestamped_even_when_they_fail() {
    let app = TestApp::new(|_| json_response(500, json!({"detail": "crawler offline"})));
    let before = jiff::Timestamp::now().as_millisecond();

    let err = app
        .client
        .tasks()
        .create_selenium_crawl(&json!({"city": "上海", "pages": 1}))
        .await
        .unwrap_err();

    assert_eq!(err.detail(), Some("crawler offline"));
    let recorded: i64 = wait_for_key(&app.store, keys::LAST_CRAWL_TASK_START_TIME)
        .await
        .parse()
        .unwrap();
    assert!(recorded >= before);
    assert_eq!(app.backend.last_request().path, "/api/tasks/selenium_crawl");
    assert_eq!(
        app.backend.last_request().json(),
        json!({"city": "上海", "pages": 1})
    );
}

#[tokio::test]
async fn other_calls_are_not_timestamped() {
    let app = TestApp::new(|_| ok_json(json!([])));

    app.client.tasks().list(&json!({"limit": 5})).await.unwrap();
    tokio::task::yield_now().await;

    assert_that!(
        app.store.get(keys::LAST_CRAWL_TASK_START_TIME).await.unwrap(),
        none()
    );
}

#[tokio::test]
async fn logging_in_starts_a_session() {
    let app = TestApp::at("/login", |_| {
        ok_json(json!({
            "token": "fresh-token",
            "token_type": "bearer",
            "expires_at": "2026-10-20T00:00:00",
            "user": {"id": 1, "username": "alice", "email": "alice@example.com", "is_admin": true}
        }))
    });

    app.client
        .auth()
        .login(&Credentials {
            username: "alice".into(),
            password: Secret::new("s3cret".into()),
        })
        .await
        .unwrap();

    assert_eq!(
        app.backend.last_request().json(),
        json!({"username": "alice", "password": "s3cret"})
    );
    let token = app.session.token().await.unwrap().unwrap();
    assert_eq!(token.expose_secret(), "fresh-token");
    assert_eq!(
        app.session.effective_role().await.unwrap().as_deref(),
        Some("admin")
    );

    app.client.catalog().cities().await.unwrap();
    assert_eq!(
        app.backend.last_request().header("authorization"),
        Some("Bearer fresh-token")
    );
}

#[tokio::test]
async fn registration_without_a_token_does_not_start_a_session() {
    let app = TestApp::new(|_| json_response(201, json!({"message": "注册成功"})));

    app.client
        .auth()
        .register(&json!({"username": "bob", "password": "pw", "email": "bob@example.com"}))
        .await
        .unwrap();

    assert!(!app.session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn logging_out_clears_the_session_even_if_the_backend_fails() {
    let app = TestApp::new(|_| json_response(500, json!({"detail": "登出失败"})));
    app.log_in("abc").await;

    let err = app.client.auth().logout().await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(app.session.snapshot().await.unwrap().is_empty());
    assert_eq!(app.backend.last_request().header("authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn deleting_the_account_clears_the_session() {
    let app = TestApp::new(|_| ok_json(json!({"message": "账户已删除"})));
    app.log_in("abc").await;

    app.client
        .auth()
        .delete_account(&Secret::new("pw d".into()))
        .await
        .unwrap();

    let request = app.backend.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.query.as_deref(), Some("password=pw+d"));
    assert!(!app.session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn syncing_the_profile_refreshes_the_cached_user() {
    let app = TestApp::new(|_| {
        ok_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "is_admin": false,
            "created_at": "2024-01-01T00:00:00"
        }))
    });
    app.log_in("abc").await;

    let user = app.client.auth().sync_profile().await.unwrap();

    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(app.session.user().await.unwrap(), Some(user));
    assert!(app.session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn raw_requests_go_through_the_same_pipeline() {
    let app = TestApp::new(|_| ok_json(json!({"total": 42})));
    app.log_in("abc").await;

    let payload = app
        .client
        .send(
            Method::GET,
            "/statistics/summary",
            RequestOptions::new().param("city", "杭州"),
        )
        .await
        .unwrap();

    assert_eq!(payload, json!({"total": 42}));
    let request = app.backend.last_request();
    assert_eq!(request.path, "/api/statistics/summary");
    assert_eq!(request.query.as_deref(), Some("city=%E6%9D%AD%E5%B7%9E"));
    assert_eq!(request.header("authorization"), Some("Bearer abc"));
}
