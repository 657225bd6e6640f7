#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

use placement_backend::{
    config::Config,
    database::{MemoryStore, NotificationStore, PlacementStore, Writer},
    middleware::auth::{Claims, Role},
    models::{
        application::{Application, ApplicationStatus, StudentIdentity},
        job_drive::{JobDrive, NewJobDrive},
        schedule::{CandidateStatus, InterviewSchedule, NewInterviewSchedule, ScheduleCandidate},
    },
    routes, AppState,
};

pub const SECRET: &str = "test_secret_key";
pub const RECRUITER: &str = "rec-1";
pub const ADMIN: &str = "adm-1";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app_with(store.clone(), store.clone());
        Self { store, router }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, JsonValue) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        (status, read_json_body(response.into_body()).await)
    }

    pub async fn notifications_for(&self, uid: &str) -> Vec<placement_backend::models::notification::Notification> {
        self.store
            .list_notifications(uid, 200)
            .await
            .expect("list notifications")
    }

    pub async fn drive(&self, id: Uuid) -> JobDrive {
        self.store
            .find_drive(id)
            .await
            .expect("find drive")
            .expect("drive exists")
    }

    pub async fn schedule(&self, id: Uuid) -> InterviewSchedule {
        self.store
            .find_schedule(id)
            .await
            .expect("find schedule")
            .expect("schedule exists")
    }
}

pub fn app_with(
    placements: Arc<dyn PlacementStore>,
    notifications: Arc<dyn NotificationStore>,
) -> Router {
    let state = AppState::new(placements, notifications, 50);
    routes::router(state, &Config::for_tests(SECRET))
}

pub fn token(sub: &str, role: Role) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        role,
        name: Some(format!("User {}", sub)),
        email: Some(format!("{}@campus.edu", sub)),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn admin_token() -> String {
    token(ADMIN, Role::Admin)
}

pub fn recruiter_token() -> String {
    token(RECRUITER, Role::Recruiter)
}

pub fn student_token(id: &str) -> String {
    token(id, Role::Student)
}

pub fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

pub async fn read_json_body(body: Body) -> JsonValue {
    let bytes = to_bytes(body, usize::MAX).await.expect("read body");
    if bytes.is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn student(id: &str) -> StudentIdentity {
    StudentIdentity {
        id: id.to_string(),
        name: format!("Student {}", id),
        email: format!("{}@campus.edu", id),
    }
}

/// Drive owned by `RECRUITER` with one `applied` application per student.
pub async fn seed_drive(store: &MemoryStore, students: &[&str]) -> JobDrive {
    seed_drive_with_deadline(store, students, Utc::now() + Duration::days(7)).await
}

pub async fn seed_drive_with_deadline(
    store: &MemoryStore,
    students: &[&str],
    deadline: chrono::DateTime<Utc>,
) -> JobDrive {
    let now = Utc::now();
    let mut drive = NewJobDrive {
        recruiter_id: RECRUITER.to_string(),
        company: "Acme".to_string(),
        position: "SDE".to_string(),
        salary: None,
        location: "Pune".to_string(),
        date: deadline + Duration::days(3),
        application_deadline: deadline,
        eligibility_criteria: Some("CGPA >= 7".to_string()),
    }
    .into_drive(now);

    for id in students {
        drive
            .applications
            .push(Application::new(drive.id, &student(id), now));
    }
    store.insert_drive(drive).await.expect("seed drive")
}

pub async fn set_application(store: &MemoryStore, drive_id: Uuid, student_id: &str, to: ApplicationStatus) {
    let outcome = store
        .set_application_status(drive_id, student_id, &ApplicationStatus::ALL, to, Writer::Moderator)
        .await
        .expect("set application status");
    assert!(outcome.is_effective());
}

/// Schedule owned by `RECRUITER` with every student as a scheduled candidate.
pub async fn seed_schedule(store: &MemoryStore, students: &[&str]) -> InterviewSchedule {
    let schedule = NewInterviewSchedule {
        recruiter_id: RECRUITER.to_string(),
        company: "Acme".to_string(),
        position: "SDE".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
        time: NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
        platform: "online".to_string(),
        venue: None,
        meeting_link: Some("https://meet.example.com/abc".to_string()),
        candidates: students
            .iter()
            .map(|id| ScheduleCandidate {
                student_id: id.to_string(),
                student_name: format!("Student {}", id),
                student_email: format!("{}@campus.edu", id),
                status: CandidateStatus::Scheduled,
            })
            .collect(),
    }
    .into_schedule(Utc::now());
    store.insert_schedule(schedule).await.expect("seed schedule")
}
