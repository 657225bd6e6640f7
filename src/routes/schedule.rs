use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::schedule_dto::{
        CandidateStatusPayload, CreateSchedulePayload, ScheduleChangeResponse,
        ScheduleListResponse, ScheduleResponse, ScheduleStatusPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/recruiter/schedules",
    request_body = CreateSchedulePayload,
    responses(
        (status = 201, description = "Interview schedule created", body = ScheduleResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSchedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let schedule = state
        .schedule_service
        .create(payload.into_new_schedule(claims.sub))
        .await?;
    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(schedule))))
}

#[utoipa::path(
    post,
    path = "/recruiter/schedules/{schedule_id}/status",
    params(("schedule_id" = Uuid, Path, description = "Interview schedule ID")),
    request_body = ScheduleStatusPayload,
    responses(
        (status = 200, description = "Status updated; cancellation notifies candidates", body = ScheduleChangeResponse),
        (status = 409, description = "Transition not allowed"),
        (status = 423, description = "Schedule blocked or finished")
    )
)]
#[axum::debug_handler]
pub async fn update_schedule_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(schedule_id): Path<Uuid>,
    Json(payload): Json<ScheduleStatusPayload>,
) -> Result<impl IntoResponse> {
    let change = state
        .schedule_service
        .set_status(&claims.sub, schedule_id, payload.status)
        .await?;
    Ok(Json(ScheduleChangeResponse::from(change)))
}

#[utoipa::path(
    post,
    path = "/recruiter/schedules/{schedule_id}/candidates/{student_id}/status",
    params(
        ("schedule_id" = Uuid, Path, description = "Interview schedule ID"),
        ("student_id" = String, Path, description = "Student uid")
    ),
    request_body = CandidateStatusPayload,
    responses(
        (status = 200, description = "Candidate status updated", body = ScheduleChangeResponse),
        (status = 409, description = "Transition not allowed"),
        (status = 423, description = "Schedule blocked or cancelled, or candidate removed")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((schedule_id, student_id)): Path<(Uuid, String)>,
    Json(payload): Json<CandidateStatusPayload>,
) -> Result<impl IntoResponse> {
    let change = state
        .schedule_service
        .set_candidate_status(&claims.sub, schedule_id, &student_id, payload.status)
        .await?;
    Ok(Json(ScheduleChangeResponse::from(change)))
}

#[utoipa::path(
    get,
    path = "/recruiter/schedules",
    responses((status = 200, description = "The recruiter's visible schedules", body = ScheduleListResponse))
)]
#[axum::debug_handler]
pub async fn list_recruiter_schedules(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let schedules = state.context_service.recruiter_schedules(&claims.sub).await?;
    Ok(Json(ScheduleListResponse::new(schedules)))
}

#[utoipa::path(
    get,
    path = "/student/schedules",
    responses((status = 200, description = "Visible schedules listing the caller", body = ScheduleListResponse))
)]
#[axum::debug_handler]
pub async fn list_student_schedules(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let schedules = state.context_service.student_schedules(&claims.sub).await?;
    Ok(Json(ScheduleListResponse::new(schedules)))
}
