use maud::DOCTYPE;
use maud::Markup;
use maud::html;

pub fn theme(content: Markup) -> Markup {
    theme_with_title(None, content)
}

pub fn theme_with_title(title: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" class="h-full bg-white text-gray-900" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="stylesheet" href="/s/style.css";
                @if let Some(title) = title {
                    title { (title) " - Gatekeep" }
                } @else {
                    title { "Gatekeep" }
                }
            }
            body {
                nav class="nav" {
                    a href="/" { "Home" }
                    " "
                    a href="/user" { "My page" }
                    " "
                    a href="/register" { "Register" }
                    " "
                    a href="/login" { "Log in" }
                    " "
                    a href="/logout" { "Log out" }
                }
                (content)
            }
        }
    }
}

/// The flash area shown at the top of a page.
pub fn flash_message(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p id="flash_message" class="flash" { (message) }
        }
    }
}
