use axum::response::Redirect;
use tower_sessions::Session;

use super::authenticator::logout;

pub async fn logout_get(session: Session) -> Redirect {
    logout(&session).await;

    Redirect::to("/")
}
