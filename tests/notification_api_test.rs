mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use mockall::mock;
use serde_json::json;
use uuid::Uuid;

use common::*;
use placement_backend::{
    database::{MemoryStore, NotificationStore},
    error::{Error, Result},
    models::{moderation::MutationOutcome, notification::Notification},
};

mock! {
    pub Notifications {}

    #[async_trait]
    impl NotificationStore for Notifications {
        async fn insert_notification(&self, notification: Notification) -> Result<Notification>;
        async fn list_notifications(&self, recipient_uid: &str, limit: i64) -> Result<Vec<Notification>>;
        async fn unread_count(&self, recipient_uid: &str) -> Result<i64>;
        async fn mark_read(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome>;
        async fn mark_all_read(&self, recipient_uid: &str) -> Result<u64>;
        async fn delete_notification(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome>;
    }
}

async fn block(app: &TestApp, drive_id: Uuid) {
    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/admin/manage/job-drive/block/{}", drive_id),
            Some(&admin_token()),
            json!({ "reason": "Spam" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn recipients_read_and_clear_their_inbox() {
    let app = TestApp::new();
    let first = seed_drive(&app.store, &["stu-a"]).await;
    let second = seed_drive(&app.store, &["stu-a"]).await;
    block(&app, first.id).await;
    block(&app, second.id).await;

    let student = student_token("stu-a");

    let (status, listed) = app
        .send(get_request("/notifications/stu-a", Some(&student)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = listed["data"].as_array().expect("data array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "job_drive_blocked");
    assert_eq!(items[0]["priority"], "urgent");
    assert_eq!(items[0]["read"], false);

    let (_, count) = app
        .send(get_request("/notifications/stu-a/unread-count", Some(&student)))
        .await;
    assert_eq!(count["count"], 2);

    let first_id = items[0]["id"].as_str().expect("id").to_string();
    let (status, marked) = app
        .send(json_request(
            "PUT",
            &format!("/notifications/{}/read", first_id),
            Some(&student),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["modifiedCount"], 1);

    let (_, again) = app
        .send(json_request(
            "PUT",
            &format!("/notifications/{}/read", first_id),
            Some(&student),
            json!({}),
        ))
        .await;
    assert_eq!(again["modifiedCount"], 0);

    let (status, all) = app
        .send(json_request(
            "PUT",
            "/notifications/stu-a/read-all",
            Some(&student),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["modifiedCount"], 1);

    let (_, count) = app
        .send(get_request("/notifications/stu-a/unread-count", Some(&student)))
        .await;
    assert_eq!(count["count"], 0);

    let (status, _) = app
        .send(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/notifications/{}", first_id))
                .header("authorization", format!("Bearer {}", student))
                .body(axum::body::Body::empty())
                .expect("build request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.notifications_for("stu-a").await.len(), 1);
}

#[tokio::test]
async fn inboxes_are_private() {
    let app = TestApp::new();
    let drive = seed_drive(&app.store, &["stu-a"]).await;
    block(&app, drive.id).await;
    let notification_id = app.notifications_for("stu-a").await[0].id;
    let intruder = student_token("stu-b");

    let (status, _) = app
        .send(get_request("/notifications/stu-a", Some(&intruder)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(json_request(
            "PUT",
            "/notifications/stu-a/read-all",
            Some(&intruder),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(json_request(
            "PUT",
            &format!("/notifications/{}/read", notification_id),
            Some(&intruder),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(get_request("/notifications/stu-a", Some(&admin_token())))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(!app.notifications_for("stu-a").await[0].read);
}

#[tokio::test]
async fn failed_notification_writes_do_not_undo_the_block() {
    let placements = Arc::new(MemoryStore::new());
    let drive = seed_drive(&placements, &["stu-a", "stu-b"]).await;

    let mut notifications = MockNotifications::new();
    notifications
        .expect_insert_notification()
        .times(3)
        .returning(|notification| {
            if notification.recipient_firebase_uid == "stu-b" {
                Err(Error::Internal("notification store unavailable".to_string()))
            } else {
                Ok(notification)
            }
        });

    let router = app_with(placements.clone(), Arc::new(notifications));
    let app = TestApp {
        store: placements,
        router,
    };

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/admin/manage/job-drive/block/{}", drive.id),
            Some(&admin_token()),
            json!({ "reason": "Spam" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["modifiedCount"], 1);
    assert_eq!(body["notified"], 2);
    assert_eq!(body["warning"]["attempted"], 3);
    assert_eq!(body["warning"]["failed"][0]["recipientUid"], "stu-b");

    assert!(app.drive(drive.id).await.is_blocked());
}
