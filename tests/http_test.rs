//! End-to-end tests of the login flow through the router

use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::http::Request;
use axum::http::Response;
use axum::http::StatusCode;
use axum::http::header;
use clap::Parser;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use tower_sessions::SessionManagerLayer;

use gatekeep::config::Config;
use gatekeep::database;
use gatekeep::state::AppState;

struct TestApp {
    router: Router,
    _db_dir: TempDir,
    _static_root: TempDir,
}

async fn test_app() -> TestApp {
    let db_dir = tempfile::tempdir().expect("should create a temp dir");
    let url = format!("sqlite://{}", db_dir.path().join("app.sqlite").display());
    let pool = database::connect(&url)
        .await
        .expect("should open the test database");
    database::migrate(&pool)
        .await
        .expect("should migrate the test database");

    // two static dirs side by side, with a file next to them that must stay private
    let static_root = tempfile::tempdir().expect("should create a temp dir");
    let first = static_root.path().join("first");
    let second = static_root.path().join("second");
    std::fs::create_dir(&first).expect("should create static dir");
    std::fs::create_dir(&second).expect("should create static dir");
    std::fs::write(first.join("shared.txt"), "from first").expect("should write static file");
    std::fs::write(second.join("shared.txt"), "from second").expect("should write static file");
    std::fs::write(second.join("app.js"), "console.log('hi');")
        .expect("should write static file");
    std::fs::write(static_root.path().join("secret.txt"), "TOP SECRET")
        .expect("should write private file");

    let dirs = format!("{},{}", first.display(), second.display());
    let config = Config::try_parse_from([
        "gatekeep",
        "--bcrypt-cost",
        "4",
        "--database-url",
        &url,
        "--static-dir",
        &dirs,
    ])
    .expect("test config should parse");

    let router = gatekeep::router(AppState::new(pool, config))
        .layer(SessionManagerLayer::new(MemoryStore::default()));

    TestApp {
        router,
        _db_dir: db_dir,
        _static_root: static_root,
    }
}

impl TestApp {
    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).expect("request should build"))
            .await
            .expect("router is infallible")
    }

    async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(
                request
                    .body(Body::from(form.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("router is infallible")
    }
}

fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

#[tokio::test]
async fn test_register_login_logout_flow() {
    let app = test_app().await;

    let response = app
        .post_form("/register", "username=alice&password=s3cret", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let cookie = session_cookie(&response).expect("flash should start a session");

    let response = app.get("/", Some(&cookie)).await;
    assert!(body_text(response).await.contains("Registration successful."));

    let response = app
        .post_form("/login", "username=alice&password=s3cret", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/user"));
    let cookie = session_cookie(&response).expect("login should set a session cookie");

    let response = app.get("/user", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Hello, alice"));
    assert!(body.contains("Successful login."));

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let response = app.get("/user", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // a second logout on the same session is fine
    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_anonymous_user_page_redirects_to_login() {
    let app = test_app().await;

    let response = app.get("/user", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_duplicate_registration_shows_generic_error() {
    let app = test_app().await;

    app.post_form("/register", "username=alice&password=s3cret", None)
        .await;
    let response = app
        .post_form("/register", "username=alice&password=other", None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Failed to register user. Try another username.")
    );
}

#[tokio::test]
async fn test_bad_logins_show_the_same_message() {
    let app = test_app().await;

    app.post_form("/register", "username=alice&password=s3cret", None)
        .await;

    let wrong_password = app
        .post_form("/login", "username=alice&password=nope", None)
        .await;
    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert!(session_cookie(&wrong_password).is_none());
    let wrong_password = body_text(wrong_password).await;

    let unknown_user = app
        .post_form("/login", "username=mallory&password=s3cret", None)
        .await;
    let unknown_user = body_text(unknown_user).await;

    assert!(wrong_password.contains("Invalid login."));
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_forms_render() {
    let app = test_app().await;

    for uri in ["/register", "/login"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(r#"name="username""#));
        assert!(body.contains(r#"name="password""#));
    }
}

#[tokio::test]
async fn test_static_files_search_directories_in_order() {
    let app = test_app().await;

    let response = app.get("/s/shared.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "from first");

    let response = app.get("/s/app.js", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "console.log('hi');");

    let response = app.get("/s/missing.css", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_stay_inside_their_directories() {
    let app = test_app().await;

    for uri in [
        "/s/..%2Fsecret.txt",
        "/s/..%2F..%2Fsecret.txt",
        "/s/%2Fetc%2Fpasswd",
        "/s/..",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(!body_text(response).await.contains("TOP SECRET"));
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = test_app().await;

    let response = app.get("/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}
