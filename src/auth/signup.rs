use axum::extract::Form;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::Markup;
use tower_sessions::Session;

use super::CredentialsForm;
use super::SessionAuthenticator;
use super::layout::credentials_page;
use crate::database::DbConn;
use crate::extensions::flash;
use crate::state::AppState;

fn register_page(error_message: Option<&str>) -> Markup {
    credentials_page("Register", "/register", error_message)
}

pub async fn register_get() -> Markup {
    register_page(None)
}

pub async fn register_post(
    State(state): State<AppState>,
    session: Session,
    mut db: DbConn,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let mut store = db.credentials();
    let mut authenticator = SessionAuthenticator::new(&mut store, state.bcrypt_cost());

    match authenticator.register(&form.username, &form.password).await {
        Ok(_) => {
            flash(&session, "Registration successful.").await;
            Redirect::to("/").into_response()
        }
        Err(e) => register_page(Some(&e.to_string())).into_response(),
    }
}
