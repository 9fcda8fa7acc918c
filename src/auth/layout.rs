use maud::Markup;
use maud::html;

use crate::theme::theme_with_title;

/// Username/password form shared by the register and login pages.
pub fn credentials_page(title: &str, action: &str, error_message: Option<&str>) -> Markup {
    theme_with_title(
        Some(title),
        html! {
            h2 { (title) }

            @if let Some(error_message) = error_message {
                p id="error_message" class="error" { (error_message) }
            }

            form method="POST" action=(action) {
                div {
                    label for="username" { "Username" }
                    input type="text" name="username" id="username" maxlength="50" required;
                }
                div {
                    label for="password" { "Password" }
                    input type="password" name="password" id="password" required;
                }
                button type="submit" { (title) }
            }
        },
    )
}
