use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::moderation::ModerationAudit;
use crate::models::schedule::{
    CandidateStatus, InterviewSchedule, NewInterviewSchedule, ScheduleCandidate, ScheduleStatus,
};
use crate::services::application_service::StatusChange;
use crate::services::fanout_service::FanOutPartialFailure;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedulePayload {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub position: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "10:30:00")]
    pub time: NaiveTime,
    #[validate(length(min = 1, max = 64))]
    pub platform: String,
    pub venue: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[validate(length(min = 1))]
    pub candidates: Vec<CandidatePayload>,
}

impl CreateSchedulePayload {
    pub fn into_new_schedule(self, recruiter_id: String) -> NewInterviewSchedule {
        NewInterviewSchedule {
            recruiter_id,
            company: self.company,
            position: self.position,
            date: self.date,
            time: self.time,
            platform: self.platform,
            venue: self.venue,
            meeting_link: self.meeting_link,
            candidates: self
                .candidates
                .into_iter()
                .map(|c| ScheduleCandidate {
                    student_id: c.student_id,
                    student_name: c.student_name,
                    student_email: c.student_email,
                    status: CandidateStatus::Scheduled,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleStatusPayload {
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateStatusPayload {
    pub status: CandidateStatus,
}

/// `status` is the effective status: blocked schedules always read as cancelled.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub recruiter_id: String,
    pub company: String,
    pub position: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub time: NaiveTime,
    pub platform: String,
    pub venue: Option<String>,
    pub meeting_link: Option<String>,
    pub status: ScheduleStatus,
    pub is_blocked: bool,
    pub blocked_by: Option<ModerationAudit>,
    pub candidates: Vec<ScheduleCandidate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InterviewSchedule> for ScheduleResponse {
    fn from(schedule: InterviewSchedule) -> Self {
        let status = schedule.effective_status();
        let blocked_by = schedule.moderation.audit().cloned();
        Self {
            id: schedule.id,
            recruiter_id: schedule.recruiter_id,
            company: schedule.company,
            position: schedule.position,
            date: schedule.date,
            time: schedule.time,
            platform: schedule.platform,
            venue: schedule.venue,
            meeting_link: schedule.meeting_link,
            status,
            is_blocked: blocked_by.is_some(),
            blocked_by,
            candidates: schedule.candidates,
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleListResponse {
    pub success: bool,
    pub data: Vec<ScheduleResponse>,
}

impl ScheduleListResponse {
    pub fn new(schedules: Vec<InterviewSchedule>) -> Self {
        Self {
            success: true,
            data: schedules.into_iter().map(ScheduleResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleChangeResponse {
    pub success: bool,
    pub data: ScheduleResponse,
    pub notified: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<FanOutPartialFailure>,
}

impl From<StatusChange<InterviewSchedule>> for ScheduleChangeResponse {
    fn from(change: StatusChange<InterviewSchedule>) -> Self {
        Self {
            success: true,
            data: ScheduleResponse::from(change.entity),
            notified: change.notified,
            warning: change.warning,
        }
    }
}
