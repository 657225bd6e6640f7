use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    JobDriveBlocked,
    JobDriveDeleted,
    InterviewBlocked,
    InterviewCancelled,
    CandidateRemoved,
    AdminAction,
    Generic,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::JobDriveBlocked,
        NotificationType::JobDriveDeleted,
        NotificationType::InterviewBlocked,
        NotificationType::InterviewCancelled,
        NotificationType::CandidateRemoved,
        NotificationType::AdminAction,
        NotificationType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::JobDriveBlocked => "job_drive_blocked",
            NotificationType::JobDriveDeleted => "job_drive_deleted",
            NotificationType::InterviewBlocked => "interview_blocked",
            NotificationType::InterviewCancelled => "interview_cancelled",
            NotificationType::CandidateRemoved => "candidate_removed",
            NotificationType::AdminAction => "admin_action",
            NotificationType::Generic => "generic",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    pub fn priority(&self) -> Priority {
        match self {
            NotificationType::JobDriveBlocked
            | NotificationType::JobDriveDeleted
            | NotificationType::InterviewBlocked
            | NotificationType::CandidateRemoved => Priority::Urgent,
            NotificationType::InterviewCancelled => Priority::High,
            NotificationType::AdminAction => Priority::Medium,
            NotificationType::Generic => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    JobDrive,
    InterviewSchedule,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::JobDrive => "job_drive",
            SourceKind::InterviewSchedule => "interview_schedule",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "job_drive" => Some(SourceKind::JobDrive),
            "interview_schedule" => Some(SourceKind::InterviewSchedule),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_firebase_uid: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub source: Option<SourceRef>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderation_types_are_urgent() {
        assert_eq!(NotificationType::JobDriveBlocked.priority(), Priority::Urgent);
        assert_eq!(NotificationType::JobDriveDeleted.priority(), Priority::Urgent);
        assert_eq!(NotificationType::InterviewBlocked.priority(), Priority::Urgent);
        assert_eq!(NotificationType::CandidateRemoved.priority(), Priority::Urgent);
        assert_eq!(NotificationType::AdminAction.priority(), Priority::Medium);
    }

    #[test]
    fn serializes_type_field_in_snake_case() {
        let notification = Notification {
            id: Uuid::nil(),
            recipient_firebase_uid: "uid-1".into(),
            kind: NotificationType::JobDriveBlocked,
            title: "t".into(),
            message: "m".into(),
            priority: Priority::Urgent,
            source: None,
            read: false,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "job_drive_blocked");
        assert_eq!(value["priority"], "urgent");
        assert_eq!(value["recipientFirebaseUid"], "uid-1");
    }
}
