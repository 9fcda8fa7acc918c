use tower_sessions::Session;

const FLASH_KEY: &str = "flash";

/// Queues a one-shot message for the next rendered page.
pub async fn flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(FLASH_KEY, message).await {
        tracing::warn!("failed to store flash message: {e}");
    }
}

/// Removes and returns the pending flash message, if any.
pub async fn take_flash(session: &Session) -> Option<String> {
    session
        .remove::<String>(FLASH_KEY)
        .await
        .ok()
        .flatten()
}
