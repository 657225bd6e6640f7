use std::sync::Arc;

use uuid::Uuid;

use crate::config::MAX_NOTIFICATION_PAGE;
use crate::database::NotificationStore;
use crate::error::{Error, Result};
use crate::models::notification::Notification;

/// Recipient-side operations. Creation belongs to the fan-out service only.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    default_limit: i64,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, default_limit: i64) -> Self {
        Self {
            store,
            default_limit: clamp_limit(Some(default_limit), MAX_NOTIFICATION_PAGE),
        }
    }

    pub async fn list(&self, recipient_uid: &str, limit: Option<i64>) -> Result<Vec<Notification>> {
        let limit = clamp_limit(limit, self.default_limit);
        self.store.list_notifications(recipient_uid, limit).await
    }

    pub async fn unread_count(&self, recipient_uid: &str) -> Result<i64> {
        self.store.unread_count(recipient_uid).await
    }

    /// Marking an already-read notification succeeds without a change.
    pub async fn mark_read(&self, id: Uuid, recipient_uid: &str) -> Result<bool> {
        let outcome = self.store.mark_read(id, recipient_uid).await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!("Notification {} not found", id)));
        }
        Ok(outcome.is_effective())
    }

    pub async fn mark_all_read(&self, recipient_uid: &str) -> Result<u64> {
        let updated = self.store.mark_all_read(recipient_uid).await?;
        tracing::debug!(recipient = %recipient_uid, updated, "notifications marked read");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, recipient_uid: &str) -> Result<()> {
        let outcome = self.store.delete_notification(id, recipient_uid).await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!("Notification {} not found", id)));
        }
        Ok(())
    }
}

fn clamp_limit(requested: Option<i64>, fallback: i64) -> i64 {
    requested.unwrap_or(fallback).clamp(1, MAX_NOTIFICATION_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::notification::{NotificationType, Priority};
    use chrono::{Duration, Utc};

    fn notification(uid: &str, minutes_ago: i64) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_firebase_uid: uid.into(),
            kind: NotificationType::AdminAction,
            title: "Heads up".into(),
            message: format!("{} minutes ago", minutes_ago),
            priority: Priority::Medium,
            source: None,
            read: false,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 50), 50);
        assert_eq!(clamp_limit(Some(0), 50), 1);
        assert_eq!(clamp_limit(Some(5_000), 50), MAX_NOTIFICATION_PAGE);
    }

    #[tokio::test]
    async fn lists_newest_first_and_scopes_mutations_to_recipient() {
        let store = Arc::new(MemoryStore::new());
        let older = store.insert_notification(notification("u1", 10)).await.unwrap();
        let newer = store.insert_notification(notification("u1", 1)).await.unwrap();
        store.insert_notification(notification("u2", 5)).await.unwrap();
        let service = NotificationService::new(store, 50);

        let listed = service.list("u1", None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(service.list("u1", Some(1)).await.unwrap().len(), 1);

        let err = service.mark_read(older.id, "u2").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(service.mark_read(older.id, "u1").await.unwrap());
        assert!(!service.mark_read(older.id, "u1").await.unwrap());
        assert_eq!(service.unread_count("u1").await.unwrap(), 1);

        assert_eq!(service.mark_all_read("u1").await.unwrap(), 1);
        assert_eq!(service.unread_count("u1").await.unwrap(), 0);

        service.delete(newer.id, "u1").await.unwrap();
        assert!(matches!(
            service.delete(newer.id, "u1").await,
            Err(Error::NotFound(_))
        ));
    }
}
