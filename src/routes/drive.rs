use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::drive_dto::{
        ApplicationChangeResponse, ApplicationResponse, ApplicationStatusPayload,
        CreateDrivePayload, DriveListResponse, DriveResponse, DriveStatusPayload,
        StudentApplicationResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::application::StudentIdentity,
    AppState,
};

fn student_identity(claims: &Claims) -> StudentIdentity {
    StudentIdentity {
        id: claims.sub.clone(),
        name: claims.display_name(),
        email: claims.email.clone().unwrap_or_default(),
    }
}

#[utoipa::path(
    post,
    path = "/recruiter/drives",
    request_body = CreateDrivePayload,
    responses(
        (status = 201, description = "Job drive created", body = DriveResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_drive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDrivePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let drive = state
        .drive_service
        .create(payload.into_new_drive(claims.sub))
        .await?;
    Ok((StatusCode::CREATED, Json(DriveResponse::from(drive))))
}

#[utoipa::path(
    post,
    path = "/recruiter/drives/{drive_id}/status",
    params(("drive_id" = Uuid, Path, description = "Job drive ID")),
    request_body = DriveStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = DriveResponse),
        (status = 409, description = "Transition not allowed"),
        (status = 423, description = "Drive is moderated")
    )
)]
#[axum::debug_handler]
pub async fn update_drive_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
    Json(payload): Json<DriveStatusPayload>,
) -> Result<impl IntoResponse> {
    let drive = state
        .drive_service
        .set_status(&claims.sub, drive_id, payload.status)
        .await?;
    Ok(Json(DriveResponse::from(drive)))
}

#[utoipa::path(
    post,
    path = "/recruiter/drives/{drive_id}/applications/{student_id}/status",
    params(
        ("drive_id" = Uuid, Path, description = "Job drive ID"),
        ("student_id" = String, Path, description = "Student uid")
    ),
    request_body = ApplicationStatusPayload,
    responses(
        (status = 200, description = "Application moved forward", body = ApplicationChangeResponse),
        (status = 409, description = "Transition not allowed"),
        (status = 423, description = "Drive moderated or application terminal")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((drive_id, student_id)): Path<(Uuid, String)>,
    Json(payload): Json<ApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let change = state
        .application_service
        .advance(&claims.sub, drive_id, &student_id, payload.status)
        .await?;
    Ok(Json(ApplicationChangeResponse::from(change)))
}

#[utoipa::path(
    get,
    path = "/recruiter/drives",
    responses((status = 200, description = "The recruiter's visible drives", body = DriveListResponse))
)]
#[axum::debug_handler]
pub async fn list_recruiter_drives(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let drives = state.context_service.recruiter_drives(&claims.sub).await?;
    Ok(Json(DriveListResponse::new(drives)))
}

#[utoipa::path(
    post,
    path = "/drives/{drive_id}/apply",
    params(("drive_id" = Uuid, Path, description = "Job drive ID")),
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 409, description = "Already applied"),
        (status = 423, description = "Deadline passed, drive moderated or completed")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .apply(drive_id, &student_identity(&claims))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": ApplicationResponse::from(application) })),
    ))
}

#[utoipa::path(
    post,
    path = "/drives/{drive_id}/withdraw",
    params(("drive_id" = Uuid, Path, description = "Job drive ID")),
    responses(
        (status = 200, description = "Application withdrawn", body = ApplicationResponse),
        (status = 404, description = "No active application"),
        (status = 423, description = "Drive moderated or application terminal")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(drive_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .withdraw(drive_id, &claims.sub)
        .await?;
    Ok(Json(
        json!({ "success": true, "data": ApplicationResponse::from(application) }),
    ))
}

#[utoipa::path(
    get,
    path = "/student/drives",
    responses((status = 200, description = "Visible drives with the caller's own application", body = DriveListResponse))
)]
#[axum::debug_handler]
pub async fn list_student_drives(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let drives = state.context_service.student_drives(&claims.sub).await?;
    Ok(Json(DriveListResponse::new(drives)))
}

#[utoipa::path(
    get,
    path = "/student/applications",
    responses((status = 200, description = "The caller's applications on visible drives", body = [StudentApplicationResponse]))
)]
#[axum::debug_handler]
pub async fn list_student_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let items: Vec<StudentApplicationResponse> = state
        .context_service
        .student_applications(&claims.sub)
        .await?
        .into_iter()
        .map(StudentApplicationResponse::from)
        .collect();
    Ok(Json(json!({ "success": true, "data": items })))
}
