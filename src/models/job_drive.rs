use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::application::Application;
use super::moderation::{ModerationAudit, ModerationKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DriveStatus {
    Active,
    Scheduled,
    Completed,
}

impl DriveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveStatus::Active => "active",
            DriveStatus::Scheduled => "scheduled",
            DriveStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(DriveStatus::Active),
            "scheduled" => Some(DriveStatus::Scheduled),
            "completed" => Some(DriveStatus::Completed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: DriveStatus) -> bool {
        matches!(
            (self, next),
            (DriveStatus::Active, DriveStatus::Scheduled)
                | (DriveStatus::Active, DriveStatus::Completed)
                | (DriveStatus::Scheduled, DriveStatus::Completed)
        )
    }
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation state of a drive. A deleted drive cannot also be blocked, and
/// neither can exist without an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "audit", rename_all = "lowercase")]
pub enum DriveModeration {
    None,
    Blocked(ModerationAudit),
    Deleted(ModerationAudit),
}

impl DriveModeration {
    pub fn kind(&self) -> ModerationKind {
        match self {
            DriveModeration::None => ModerationKind::None,
            DriveModeration::Blocked(_) => ModerationKind::Blocked,
            DriveModeration::Deleted(_) => ModerationKind::Deleted,
        }
    }

    pub fn audit(&self) -> Option<&ModerationAudit> {
        match self {
            DriveModeration::None => None,
            DriveModeration::Blocked(audit) | DriveModeration::Deleted(audit) => Some(audit),
        }
    }

    /// Rebuild the variant from stored columns.
    ///
    /// Rows written by older clients may carry `blocked`/`deleted` in the status
    /// column instead of the moderation column; those are treated as moderated.
    pub fn from_columns(
        moderation: &str,
        status: &str,
        audit: Option<ModerationAudit>,
    ) -> Result<Self> {
        let kind = match (ModerationKind::parse(moderation), status) {
            (None, _) => {
                return Err(Error::Internal(format!(
                    "unknown drive moderation value '{}'",
                    moderation
                )))
            }
            (Some(ModerationKind::None), "deleted") => ModerationKind::Deleted,
            (Some(ModerationKind::None), "blocked") => ModerationKind::Blocked,
            (Some(kind), _) => kind,
        };

        let audit = audit.unwrap_or_else(ModerationAudit::unknown);
        Ok(match kind {
            ModerationKind::None => DriveModeration::None,
            ModerationKind::Blocked => DriveModeration::Blocked(audit),
            ModerationKind::Deleted => DriveModeration::Deleted(audit),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDrive {
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
    pub moderation: DriveModeration,
    pub applications: Vec<Application>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobDrive {
    pub fn is_blocked(&self) -> bool {
        matches!(self.moderation, DriveModeration::Blocked(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.moderation, DriveModeration::Deleted(_))
    }

    pub fn is_moderated(&self) -> bool {
        self.moderation != DriveModeration::None
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.application_deadline
    }

    /// The application currently occupying the student's slot on this drive.
    pub fn active_application(&self, student_id: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.student_id == student_id && app.status.occupies_slot())
    }

    /// Most recent application by the student, withdrawn ones included.
    pub fn latest_application(&self, student_id: &str) -> Option<&Application> {
        self.active_application(student_id).or_else(|| {
            self.applications
                .iter()
                .filter(|app| app.student_id == student_id)
                .max_by_key(|app| app.application_date)
        })
    }

    pub fn engaged_students(&self) -> impl Iterator<Item = &Application> {
        self.applications.iter().filter(|app| app.status.is_engaged())
    }

    pub fn label(&self) -> String {
        format!("{} at {}", self.position, self.company)
    }
}

#[derive(Debug, Clone)]
pub struct NewJobDrive {
    pub recruiter_id: String,
    pub company: String,
    pub position: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub application_deadline: DateTime<Utc>,
    pub eligibility_criteria: Option<String>,
}

impl NewJobDrive {
    pub fn into_drive(self, now: DateTime<Utc>) -> JobDrive {
        JobDrive {
            id: Uuid::new_v4(),
            recruiter_id: self.recruiter_id,
            company: self.company,
            position: self.position,
            salary: self.salary,
            location: self.location,
            date: self.date,
            application_deadline: self.application_deadline,
            eligibility_criteria: self.eligibility_criteria,
            status: DriveStatus::Active,
            moderation: DriveModeration::None,
            applications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit() -> ModerationAudit {
        ModerationAudit {
            admin_id: "adm-1".into(),
            admin_name: "Ada".into(),
            reason: Some("spam".into()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn moderation_column_wins_when_present() {
        let moderation = DriveModeration::from_columns("blocked", "active", Some(audit())).unwrap();
        assert_eq!(moderation.kind(), ModerationKind::Blocked);
        assert_eq!(moderation.audit().unwrap().admin_id, "adm-1");
    }

    #[test]
    fn legacy_status_values_are_treated_as_moderated() {
        let deleted = DriveModeration::from_columns("none", "deleted", None).unwrap();
        assert_eq!(deleted.kind(), ModerationKind::Deleted);
        assert_eq!(deleted.audit().unwrap().admin_id, "unknown");

        let blocked = DriveModeration::from_columns("none", "blocked", None).unwrap();
        assert_eq!(blocked.kind(), ModerationKind::Blocked);
    }

    #[test]
    fn unknown_moderation_value_is_an_error() {
        assert!(DriveModeration::from_columns("frozen", "active", None).is_err());
    }

    #[test]
    fn drive_status_only_moves_forward() {
        assert!(DriveStatus::Active.can_transition_to(DriveStatus::Scheduled));
        assert!(DriveStatus::Scheduled.can_transition_to(DriveStatus::Completed));
        assert!(!DriveStatus::Completed.can_transition_to(DriveStatus::Active));
        assert!(!DriveStatus::Scheduled.can_transition_to(DriveStatus::Active));
    }
}
