mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use placement_backend::models::{
    notification::{NotificationType, Priority},
    schedule::{CandidateStatus, ScheduleStatus},
};

fn schedule_body(venue: Option<&str>, meeting_link: Option<&str>) -> serde_json::Value {
    json!({
        "company": "Acme",
        "position": "SDE",
        "date": "2026-11-02",
        "time": "10:30:00",
        "platform": "online",
        "venue": venue,
        "meetingLink": meeting_link,
        "candidates": [
            { "studentId": "stu-a", "studentName": "Student A", "studentEmail": "a@campus.edu" },
            { "studentId": "stu-b", "studentName": "Student B", "studentEmail": "b@campus.edu" }
        ]
    })
}

#[tokio::test]
async fn schedule_needs_a_place_to_meet() {
    let app = TestApp::new();
    let recruiter = recruiter_token();

    let (status, _) = app
        .send(json_request(
            "POST",
            "/recruiter/schedules",
            Some(&recruiter),
            schedule_body(None, None),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .send(json_request(
            "POST",
            "/recruiter/schedules",
            Some(&recruiter),
            schedule_body(None, Some("https://meet.example.com/abc")),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "scheduled");
    assert_eq!(created["recruiterId"], RECRUITER);
    assert_eq!(created["candidates"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn cancelling_a_schedule_notifies_remaining_candidates() {
    let app = TestApp::new();
    let schedule = seed_schedule(&app.store, &["stu-a", "stu-b"]).await;

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/admin/manage/schedule/{}/remove-candidate/stu-b", schedule.id),
            Some(&admin_token()),
            json!({ "reason": "Duplicate booking" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/recruiter/schedules/{}/status", schedule.id),
            Some(&recruiter_token()),
            json!({ "status": "cancelled" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(body["notified"], 1);

    let inbox = app.notifications_for("stu-a").await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationType::InterviewCancelled);
    assert_eq!(inbox[0].priority, Priority::High);

    let removed_inbox = app.notifications_for("stu-b").await;
    assert!(removed_inbox
        .iter()
        .all(|n| n.kind == NotificationType::CandidateRemoved));

    assert_eq!(app.schedule(schedule.id).await.status, ScheduleStatus::Cancelled);
}

#[tokio::test]
async fn candidate_progression_follows_the_interview() {
    let app = TestApp::new();
    let schedule = seed_schedule(&app.store, &["stu-a"]).await;
    let uri = format!(
        "/recruiter/schedules/{}/candidates/stu-a/status",
        schedule.id
    );
    let recruiter = recruiter_token();

    let (status, _) = app
        .send(json_request("POST", &uri, Some(&recruiter), json!({ "status": "passed" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["attended", "passed"] {
        let (status, body) = app
            .send(json_request("POST", &uri, Some(&recruiter), json!({ "status": next })))
            .await;
        assert_eq!(status, StatusCode::OK, "moving to {}", next);
        assert_eq!(body["notified"], 1);
    }

    let stored = app.schedule(schedule.id).await;
    assert_eq!(
        stored.candidate("stu-a").map(|c| c.status),
        Some(CandidateStatus::Passed)
    );
    assert_eq!(app.notifications_for("stu-a").await.len(), 2);
}

#[tokio::test]
async fn blocked_schedule_rejects_recruiter_updates() {
    let app = TestApp::new();
    let schedule = seed_schedule(&app.store, &["stu-a"]).await;

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/admin/manage/schedule/block/{}", schedule.id),
            Some(&admin_token()),
            json!({ "reason": "Venue unsafe" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/recruiter/schedules/{}/status", schedule.id),
            Some(&recruiter_token()),
            json!({ "status": "ongoing" }),
        ))
        .await;
    assert_eq!(status, StatusCode::LOCKED);

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!(
                "/recruiter/schedules/{}/candidates/stu-a/status",
                schedule.id
            ),
            Some(&recruiter_token()),
            json!({ "status": "attended" }),
        ))
        .await;
    assert_eq!(status, StatusCode::LOCKED);

    let (_, listed) = app
        .send(get_request("/recruiter/schedules", Some(&recruiter_token())))
        .await;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(0));

    let (status, restored) = app
        .send(json_request(
            "POST",
            &format!("/admin/manage/schedule/unblock/{}", schedule.id),
            Some(&admin_token()),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["modifiedCount"], 1);
    assert_eq!(
        app.schedule(schedule.id).await.effective_status(),
        ScheduleStatus::Scheduled
    );
}
