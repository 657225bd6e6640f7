use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{
    drive_dto::{
        ApplicationChangeResponse, ApplicationResponse, ApplicationStatusPayload,
        CreateDrivePayload, DriveListResponse, DriveResponse, DriveStatusPayload,
        StudentApplicationResponse,
    },
    moderation_dto::{ModerationPayload, ModerationResponse},
    notification_dto::{NotificationListResponse, NotificationUpdateResponse, UnreadCountResponse},
    schedule_dto::{
        CandidatePayload, CandidateStatusPayload, CreateSchedulePayload, ScheduleChangeResponse,
        ScheduleListResponse, ScheduleResponse, ScheduleStatusPayload,
    },
};
use crate::models::{
    application::ApplicationStatus,
    job_drive::DriveStatus,
    moderation::ModerationAudit,
    notification::{Notification, NotificationType, Priority, SourceKind, SourceRef},
    schedule::{CandidateStatus, ScheduleCandidate, ScheduleStatus},
};
use crate::services::{
    fanout_service::{FailedDelivery, FanOutPartialFailure},
    moderation_service::ModerationAction,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::moderation::block_drive,
        super::moderation::delete_drive,
        super::moderation::unblock_drive,
        super::moderation::remove_candidate_from_drive,
        super::moderation::block_schedule,
        super::moderation::unblock_schedule,
        super::moderation::remove_candidate_from_schedule,
        super::moderation::list_drives,
        super::moderation::list_schedules,
        super::drive::create_drive,
        super::drive::update_drive_status,
        super::drive::update_application_status,
        super::drive::list_recruiter_drives,
        super::drive::apply,
        super::drive::withdraw,
        super::drive::list_student_drives,
        super::drive::list_student_applications,
        super::schedule::create_schedule,
        super::schedule::update_schedule_status,
        super::schedule::update_candidate_status,
        super::schedule::list_recruiter_schedules,
        super::schedule::list_student_schedules,
        super::notification::list_notifications,
        super::notification::unread_count,
        super::notification::mark_read,
        super::notification::mark_all_read,
        super::notification::delete_notification,
    ),
    components(schemas(
        ModerationPayload,
        ModerationResponse,
        ModerationAction,
        ModerationAudit,
        FanOutPartialFailure,
        FailedDelivery,
        CreateDrivePayload,
        DriveStatusPayload,
        ApplicationStatusPayload,
        DriveResponse,
        DriveListResponse,
        DriveStatus,
        ApplicationResponse,
        ApplicationStatus,
        ApplicationChangeResponse,
        StudentApplicationResponse,
        CreateSchedulePayload,
        CandidatePayload,
        ScheduleStatusPayload,
        CandidateStatusPayload,
        ScheduleResponse,
        ScheduleListResponse,
        ScheduleChangeResponse,
        ScheduleCandidate,
        ScheduleStatus,
        CandidateStatus,
        Notification,
        NotificationType,
        Priority,
        SourceKind,
        SourceRef,
        NotificationListResponse,
        UnreadCountResponse,
        NotificationUpdateResponse,
    )),
    tags((name = "placement", description = "Placement lifecycle and moderation"))
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
