pub mod docs;
pub mod drive;
pub mod health;
pub mod moderation;
pub mod notification;
pub mod schedule;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::{
        auth::{require_roles, AuthState, Role},
        rate_limit::{new_rps_state, rps_middleware},
    },
    AppState,
};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Full HTTP surface. Authentication runs before rate limiting so budgets are
/// keyed on the token subject.
pub fn router(state: AppState, config: &Config) -> Router {
    let secret = config.jwt_secret.as_str();
    let public_limiter = new_rps_state(config.public_rps);

    let admin_api = Router::new()
        .route(
            "/admin/manage/job-drive/block/:drive_id",
            post(moderation::block_drive),
        )
        .route(
            "/admin/manage/job-drive/delete/:drive_id",
            post(moderation::delete_drive),
        )
        .route(
            "/admin/manage/job-drive/unblock/:drive_id",
            post(moderation::unblock_drive),
        )
        .route(
            "/admin/manage/job-drive/:drive_id/remove-candidate/:student_id",
            post(moderation::remove_candidate_from_drive),
        )
        .route(
            "/admin/manage/schedule/block/:schedule_id",
            post(moderation::block_schedule),
        )
        .route(
            "/admin/manage/schedule/unblock/:schedule_id",
            post(moderation::unblock_schedule),
        )
        .route(
            "/admin/manage/schedule/:schedule_id/remove-candidate/:student_id",
            post(moderation::remove_candidate_from_schedule),
        )
        .route("/admin/manage/job-drives", get(moderation::list_drives))
        .route("/admin/manage/schedules", get(moderation::list_schedules))
        .route_layer(from_fn_with_state(
            new_rps_state(config.admin_rps),
            rps_middleware,
        ))
        .route_layer(from_fn_with_state(
            AuthState::new(secret, &[Role::Admin]),
            require_roles,
        ));

    let recruiter_api = Router::new()
        .route(
            "/recruiter/drives",
            get(drive::list_recruiter_drives).post(drive::create_drive),
        )
        .route(
            "/recruiter/drives/:drive_id/status",
            post(drive::update_drive_status),
        )
        .route(
            "/recruiter/drives/:drive_id/applications/:student_id/status",
            post(drive::update_application_status),
        )
        .route(
            "/recruiter/schedules",
            get(schedule::list_recruiter_schedules).post(schedule::create_schedule),
        )
        .route(
            "/recruiter/schedules/:schedule_id/status",
            post(schedule::update_schedule_status),
        )
        .route(
            "/recruiter/schedules/:schedule_id/candidates/:student_id/status",
            post(schedule::update_candidate_status),
        )
        .route_layer(from_fn_with_state(public_limiter.clone(), rps_middleware))
        .route_layer(from_fn_with_state(
            AuthState::new(secret, &[Role::Recruiter]),
            require_roles,
        ));

    let student_api = Router::new()
        .route("/drives/:drive_id/apply", post(drive::apply))
        .route("/drives/:drive_id/withdraw", post(drive::withdraw))
        .route("/student/drives", get(drive::list_student_drives))
        .route(
            "/student/applications",
            get(drive::list_student_applications),
        )
        .route("/student/schedules", get(schedule::list_student_schedules))
        .route_layer(from_fn_with_state(public_limiter.clone(), rps_middleware))
        .route_layer(from_fn_with_state(
            AuthState::new(secret, &[Role::Student]),
            require_roles,
        ));

    // Path segments after /notifications are a recipient uid or a notification
    // id depending on the route.
    let notification_api = Router::new()
        .route(
            "/notifications/:id",
            get(notification::list_notifications).delete(notification::delete_notification),
        )
        .route(
            "/notifications/:id/unread-count",
            get(notification::unread_count),
        )
        .route("/notifications/:id/read", put(notification::mark_read))
        .route(
            "/notifications/:id/read-all",
            put(notification::mark_all_read),
        )
        .route_layer(from_fn_with_state(public_limiter, rps_middleware))
        .route_layer(from_fn_with_state(AuthState::new(secret, &[]), require_roles));

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(admin_api)
        .merge(recruiter_api)
        .merge(student_api)
        .merge(notification_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
