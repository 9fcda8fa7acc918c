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

fn login_page(error_message: Option<&str>) -> Markup {
    credentials_page("Log in", "/login", error_message)
}

pub async fn login_get() -> Markup {
    login_page(None)
}

pub async fn login_post(
    State(state): State<AppState>,
    session: Session,
    mut db: DbConn,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let mut store = db.credentials();
    let mut authenticator = SessionAuthenticator::new(&mut store, state.bcrypt_cost());

    match authenticator
        .login(&session, &form.username, &form.password)
        .await
    {
        Ok(_) => {
            flash(&session, "Successful login.").await;
            Redirect::to("/user").into_response()
        }
        Err(e) => login_page(Some(&e.to_string())).into_response(),
    }
}
