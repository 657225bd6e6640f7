use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    InterviewScheduled,
    Selected,
    Rejected,
    Withdrawn,
    /// Set only by moderation when an admin removes the candidate from a drive.
    Removed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
        ApplicationStatus::Removed,
    ];

    pub const NON_TERMINAL: [ApplicationStatus; 3] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview-scheduled",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Removed => "removed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected
                | ApplicationStatus::Rejected
                | ApplicationStatus::Withdrawn
                | ApplicationStatus::Removed
        )
    }

    /// Counts towards the one-active-application-per-drive rule.
    pub fn occupies_slot(&self) -> bool {
        *self != ApplicationStatus::Withdrawn
    }

    /// Still engaged with the drive, and therefore a fan-out recipient.
    pub fn is_engaged(&self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Withdrawn | ApplicationStatus::Removed
        )
    }

    /// Successors reachable through recruiter or student actions. `Removed` is
    /// reached only through moderation and never appears here.
    pub fn successors(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Shortlisted, Rejected, Withdrawn],
            Shortlisted => &[InterviewScheduled, Rejected, Withdrawn],
            InterviewScheduled => &[Selected, Rejected],
            Selected | Rejected | Withdrawn | Removed => &[],
        }
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn transition(self, next: ApplicationStatus) -> Result<ApplicationStatus> {
        if self.is_terminal() {
            return Err(Error::LifecycleLocked(format!(
                "application is already {}",
                self
            )));
        }
        if !self.can_transition_to(next) {
            return Err(Error::invalid_transition(self, next));
        }
        Ok(next)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub drive_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StudentIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Application {
    pub fn new(drive_id: Uuid, student: &StudentIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            drive_id,
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            student_email: student.email.clone(),
            status: ApplicationStatus::Applied,
            application_date: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn forward_transitions_follow_the_pipeline() {
        assert_eq!(Applied.transition(Shortlisted).unwrap(), Shortlisted);
        assert_eq!(
            Shortlisted.transition(InterviewScheduled).unwrap(),
            InterviewScheduled
        );
        assert_eq!(InterviewScheduled.transition(Selected).unwrap(), Selected);
        assert_eq!(Applied.transition(Rejected).unwrap(), Rejected);
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        assert!(matches!(
            Applied.transition(Selected),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            Applied.transition(InterviewScheduled),
            Err(Error::InvalidTransition { .. })
        ));
    }

    #[test]
    fn withdraw_is_closed_once_interview_is_scheduled() {
        assert!(Applied.can_transition_to(Withdrawn));
        assert!(Shortlisted.can_transition_to(Withdrawn));
        assert!(!InterviewScheduled.can_transition_to(Withdrawn));
    }

    #[test]
    fn terminal_states_are_locked() {
        for status in [Selected, Rejected, Withdrawn, Removed] {
            assert!(status.is_terminal());
            assert!(matches!(
                status.transition(Applied),
                Err(Error::LifecycleLocked(_))
            ));
        }
    }

    #[test]
    fn removed_is_never_a_regular_successor() {
        for status in ApplicationStatus::ALL {
            assert!(!status.can_transition_to(Removed));
        }
    }

    #[test]
    fn removed_still_occupies_the_slot_but_is_not_engaged() {
        assert!(Removed.occupies_slot());
        assert!(!Removed.is_engaged());
        assert!(!Withdrawn.occupies_slot());
    }

    #[test]
    fn parses_kebab_case_column_values() {
        assert_eq!(
            ApplicationStatus::parse("interview-scheduled"),
            Some(InterviewScheduled)
        );
        assert_eq!(ApplicationStatus::parse("interview_scheduled"), None);
    }
}
