use axum::http::StatusCode;
use maud::Markup;
use maud::html;

use crate::theme;

pub async fn not_found_page() -> (StatusCode, Markup) {
    (
        StatusCode::NOT_FOUND,
        theme::theme_with_title(
            Some("Not found"),
            html! {
                p {
                    "Page not found"
                }
            },
        ),
    )
}
