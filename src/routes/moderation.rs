use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::drive_dto::{AdminListQuery, DriveListResponse},
    dto::moderation_dto::{ModerationPayload, ModerationQuery, ModerationResponse},
    dto::schedule_dto::ScheduleListResponse,
    error::Result,
    middleware::auth::Claims,
    services::moderation_service::{AdminIdentity, ModerationAction, ModerationCommand},
    AppState,
};

async fn moderate(
    state: &AppState,
    claims: &Claims,
    action: ModerationAction,
    target_id: Uuid,
    student_id: Option<String>,
    query: ModerationQuery,
    payload: ModerationPayload,
) -> Result<ModerationResponse> {
    payload.validate()?;
    let command = ModerationCommand {
        action,
        target_id,
        student_id,
        admin: AdminIdentity {
            id: payload.admin_id.unwrap_or_else(|| claims.sub.clone()),
            name: payload.admin_name.unwrap_or_else(|| claims.display_name()),
        },
        reason: payload.reason,
    };

    let report = state.moderation_service.apply(command).await?;
    let report = if query.strict {
        report.require_effective()?
    } else {
        report
    };
    Ok(ModerationResponse::from(report))
}

#[utoipa::path(
    post,
    path = "/admin/manage/job-drive/block/{drive_id}",
    params(("drive_id" = Uuid, Path, description = "Job drive ID"), ModerationQuery),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Blocked, or already blocked when modifiedCount is 0", body = ModerationResponse),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Job drive not found"),
        (status = 409, description = "No-op in strict mode")
    )
)]
#[axum::debug_handler]
pub async fn block_drive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::BlockDrive,
        drive_id,
        None,
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/job-drive/delete/{drive_id}",
    params(("drive_id" = Uuid, Path, description = "Job drive ID"), ModerationQuery),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Deleted, or already deleted when modifiedCount is 0", body = ModerationResponse),
        (status = 404, description = "Job drive not found"),
        (status = 409, description = "No-op in strict mode")
    )
)]
#[axum::debug_handler]
pub async fn delete_drive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::DeleteDrive,
        drive_id,
        None,
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/job-drive/unblock/{drive_id}",
    params(("drive_id" = Uuid, Path, description = "Job drive ID"), ModerationQuery),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Unblocked, or not blocked when modifiedCount is 0", body = ModerationResponse),
        (status = 404, description = "Job drive not found")
    )
)]
#[axum::debug_handler]
pub async fn unblock_drive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::UnblockDrive,
        drive_id,
        None,
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/job-drive/{drive_id}/remove-candidate/{student_id}",
    params(
        ("drive_id" = Uuid, Path, description = "Job drive ID"),
        ("student_id" = String, Path, description = "Student uid"),
        ModerationQuery
    ),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Application marked removed", body = ModerationResponse),
        (status = 404, description = "Drive or application not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_candidate_from_drive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((drive_id, student_id)): Path<(Uuid, String)>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::RemoveCandidateFromDrive,
        drive_id,
        Some(student_id),
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/schedule/block/{schedule_id}",
    params(("schedule_id" = Uuid, Path, description = "Interview schedule ID"), ModerationQuery),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Blocked, or already blocked when modifiedCount is 0", body = ModerationResponse),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Schedule not found")
    )
)]
#[axum::debug_handler]
pub async fn block_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(schedule_id): Path<Uuid>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::BlockSchedule,
        schedule_id,
        None,
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/schedule/unblock/{schedule_id}",
    params(("schedule_id" = Uuid, Path, description = "Interview schedule ID"), ModerationQuery),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Unblocked, or not blocked when modifiedCount is 0", body = ModerationResponse),
        (status = 404, description = "Schedule not found")
    )
)]
#[axum::debug_handler]
pub async fn unblock_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(schedule_id): Path<Uuid>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::UnblockSchedule,
        schedule_id,
        None,
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/admin/manage/schedule/{schedule_id}/remove-candidate/{student_id}",
    params(
        ("schedule_id" = Uuid, Path, description = "Interview schedule ID"),
        ("student_id" = String, Path, description = "Student uid"),
        ModerationQuery
    ),
    request_body = ModerationPayload,
    responses(
        (status = 200, description = "Candidate marked removed", body = ModerationResponse),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Schedule or candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_candidate_from_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((schedule_id, student_id)): Path<(Uuid, String)>,
    Query(query): Query<ModerationQuery>,
    Json(payload): Json<ModerationPayload>,
) -> Result<impl IntoResponse> {
    let response = moderate(
        &state,
        &claims,
        ModerationAction::RemoveCandidateFromSchedule,
        schedule_id,
        Some(student_id),
        query,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/admin/manage/job-drives",
    params(AdminListQuery),
    responses((status = 200, description = "Drives, moderated ones only when includeBlocked is set", body = DriveListResponse))
)]
#[axum::debug_handler]
pub async fn list_drives(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let drives = state
        .context_service
        .admin_drives(query.include_blocked)
        .await?;
    Ok(Json(DriveListResponse::new(drives)))
}

#[utoipa::path(
    get,
    path = "/admin/manage/schedules",
    params(AdminListQuery),
    responses((status = 200, description = "Schedules, blocked or cancelled ones only when includeBlocked is set", body = ScheduleListResponse))
)]
#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let schedules = state
        .context_service
        .admin_schedules(query.include_blocked)
        .await?;
    Ok(Json(ScheduleListResponse::new(schedules)))
}
