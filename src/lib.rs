pub mod auth;
pub mod config;
pub mod database;
mod extensions;
mod home;
pub mod known_errors;
mod notfoundpage;
pub mod state;
mod staticfiles;
mod theme;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// All routes of the site. The caller adds the session layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home_page))
        .route(
            "/register",
            get(auth::signup::register_get).post(auth::signup::register_post),
        )
        .route(
            "/login",
            get(auth::signin::login_get).post(auth::signin::login_post),
        )
        .route("/user", get(home::user_page))
        .route("/logout", get(auth::signout::logout_get))
        .route("/s/{filename}", get(staticfiles::serve_static))
        .fallback(notfoundpage::not_found_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
