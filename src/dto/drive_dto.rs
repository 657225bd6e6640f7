use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::job_drive::{DriveModeration, DriveStatus, JobDrive, NewJobDrive};
use crate::models::moderation::ModerationAudit;
use crate::services::application_service::StatusChange;
use crate::services::context_service::StudentApplication;
use crate::services::fanout_service::FanOutPartialFailure;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrivePayload {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub position: String,
    pub salary: Option<Decimal>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub date: DateTime<Utc>,
    pub application_deadline: DateTime<Utc>,
    pub eligibility_criteria: Option<String>,
}

impl CreateDrivePayload {
    pub fn into_new_drive(self, recruiter_id: String) -> NewJobDrive {
        NewJobDrive {
            recruiter_id,
            company: self.company,
            position: self.position,
            salary: self.salary,
            location: self.location,
            date: self.date,
            application_deadline: self.application_deadline,
            eligibility_criteria: self.eligibility_criteria,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriveStatusPayload {
    pub status: DriveStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationStatusPayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    #[serde(default)]
    pub include_blocked: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub drive_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub application_status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            drive_id: app.drive_id,
            student_id: app.student_id,
            student_name: app.student_name,
            student_email: app.student_email,
            application_status: app.status,
            application_date: app.application_date,
            updated_at: app.updated_at,
        }
    }
}

/// Wire shape of a drive. Moderation is flattened back into the flag pair
/// clients already understand.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriveResponse {
    pub id: Uuid,
    pub recruiter_id: String,
    pub company: String,
    pub position: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub application_deadline: DateTime<Utc>,
    pub eligibility_criteria: Option<String>,
    pub status: DriveStatus,
    pub is_blocked: bool,
    pub is_deleted: bool,
    pub blocked_by: Option<ModerationAudit>,
    pub deleted_by: Option<ModerationAudit>,
    pub applications: Vec<ApplicationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobDrive> for DriveResponse {
    fn from(drive: JobDrive) -> Self {
        let (blocked_by, deleted_by) = match drive.moderation {
            DriveModeration::None => (None, None),
            DriveModeration::Blocked(audit) => (Some(audit), None),
            DriveModeration::Deleted(audit) => (None, Some(audit)),
        };
        Self {
            id: drive.id,
            recruiter_id: drive.recruiter_id,
            company: drive.company,
            position: drive.position,
            salary: drive.salary,
            location: drive.location,
            date: drive.date,
            application_deadline: drive.application_deadline,
            eligibility_criteria: drive.eligibility_criteria,
            status: drive.status,
            is_blocked: blocked_by.is_some(),
            is_deleted: deleted_by.is_some(),
            blocked_by,
            deleted_by,
            applications: drive
                .applications
                .into_iter()
                .map(ApplicationResponse::from)
                .collect(),
            created_at: drive.created_at,
            updated_at: drive.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriveListResponse {
    pub success: bool,
    pub data: Vec<DriveResponse>,
}

impl DriveListResponse {
    pub fn new(drives: Vec<JobDrive>) -> Self {
        Self {
            success: true,
            data: drives.into_iter().map(DriveResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentApplicationResponse {
    pub drive: DriveResponse,
    pub application: ApplicationResponse,
}

impl From<StudentApplication> for StudentApplicationResponse {
    fn from(item: StudentApplication) -> Self {
        Self {
            drive: DriveResponse::from(item.drive),
            application: ApplicationResponse::from(item.application),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationChangeResponse {
    pub success: bool,
    pub data: ApplicationResponse,
    pub notified: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<FanOutPartialFailure>,
}

impl From<StatusChange<Application>> for ApplicationChangeResponse {
    fn from(change: StatusChange<Application>) -> Self {
        Self {
            success: true,
            data: ApplicationResponse::from(change.entity),
            notified: change.notified,
            warning: change.warning,
        }
    }
}
