use maud::Markup;
use maud::html;
use tower_sessions::Session;

use crate::auth::require_authentication;
use crate::database::DbConn;
use crate::extensions::take_flash;
use crate::known_errors::NotAuthenticated;
use crate::theme::flash_message;
use crate::theme::theme;
use crate::theme::theme_with_title;

pub async fn home_page(session: Session) -> Markup {
    let flash = take_flash(&session).await;

    theme(html! {
        (flash_message(flash.as_deref()))
        h1 { "Gatekeep" }
        p {
            a href="/register" { "Create an account" }
            " or "
            a href="/login" { "log in" }
            " to see your page."
        }
    })
}

/// Only reachable with a logged in session.
pub async fn user_page(
    session: Session,
    mut db: DbConn,
) -> Result<Markup, NotAuthenticated> {
    let user = require_authentication(&session, &mut db.credentials()).await?;
    let flash = take_flash(&session).await;

    Ok(theme_with_title(
        Some(&user.username),
        html! {
            (flash_message(flash.as_deref()))
            h1 { "Hello, " (user.username) }
            p { "You are logged in." }
            p { a href="/logout" { "Log out" } }
        },
    ))
}
