//! One-shot flash messages carried in the session between a redirect and
//! the next rendered page.

use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

pub const SESSION_COOKIE_NAME: &str = "catalog_session";

const FLASH_KEY: &str = "_flashes";

pub fn create_session_layer() -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Queue a message for the next rendered page.
pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await
}

/// Drain queued messages. Each message is returned exactly once.
pub async fn take(session: &Session) -> Result<Vec<String>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_flashes_are_consumed_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push(&session, "Product added").await.unwrap();
        push(&session, "Deleted").await.unwrap();

        assert_eq!(take(&session).await.unwrap(), vec!["Product added", "Deleted"]);
        assert!(take(&session).await.unwrap().is_empty());
    }
}
