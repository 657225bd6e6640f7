use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::moderation::{ModerationAudit, ModerationKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::Ongoing => "ongoing",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "scheduled" => Some(ScheduleStatus::Scheduled),
            "ongoing" => Some(ScheduleStatus::Ongoing),
            "completed" => Some(ScheduleStatus::Completed),
            "cancelled" => Some(ScheduleStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScheduleStatus::Completed | ScheduleStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, next),
            (Scheduled, Ongoing) | (Ongoing, Completed) | (Scheduled, Cancelled) | (Ongoing, Cancelled)
        )
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one candidate inside a schedule. Independent of the candidate's
/// application status on any drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Scheduled,
    Attended,
    Passed,
    Failed,
    /// Destructive moderation outcome, distinct from `Failed`.
    Removed,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 5] = [
        CandidateStatus::Scheduled,
        CandidateStatus::Attended,
        CandidateStatus::Passed,
        CandidateStatus::Failed,
        CandidateStatus::Removed,
    ];

    pub const REMOVABLE: [CandidateStatus; 4] = [
        CandidateStatus::Scheduled,
        CandidateStatus::Attended,
        CandidateStatus::Passed,
        CandidateStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Scheduled => "scheduled",
            CandidateStatus::Attended => "attended",
            CandidateStatus::Passed => "passed",
            CandidateStatus::Failed => "failed",
            CandidateStatus::Removed => "removed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }

    pub fn can_transition_to(&self, next: CandidateStatus) -> bool {
        use CandidateStatus::*;
        matches!(
            (self, next),
            (Scheduled, Attended) | (Attended, Passed) | (Attended, Failed)
        )
    }

    pub fn transition(self, next: CandidateStatus) -> Result<CandidateStatus> {
        if self == CandidateStatus::Removed {
            return Err(Error::LifecycleLocked(
                "candidate was removed from this schedule".to_string(),
            ));
        }
        if !self.can_transition_to(next) {
            return Err(Error::invalid_transition(self, next));
        }
        Ok(next)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCandidate {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "audit", rename_all = "lowercase")]
pub enum ScheduleModeration {
    None,
    Blocked(ModerationAudit),
}

impl ScheduleModeration {
    pub fn kind(&self) -> ModerationKind {
        match self {
            ScheduleModeration::None => ModerationKind::None,
            ScheduleModeration::Blocked(_) => ModerationKind::Blocked,
        }
    }

    pub fn audit(&self) -> Option<&ModerationAudit> {
        match self {
            ScheduleModeration::None => None,
            ScheduleModeration::Blocked(audit) => Some(audit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub id: Uuid,
    pub recruiter_id: String,
    pub company: String,
    pub position: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub platform: String,
    pub venue: Option<String>,
    pub meeting_link: Option<String>,
    pub status: ScheduleStatus,
    pub moderation: ScheduleModeration,
    pub candidates: Vec<ScheduleCandidate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewSchedule {
    pub fn is_blocked(&self) -> bool {
        matches!(self.moderation, ScheduleModeration::Blocked(_))
    }

    /// Status as every read path must see it: a blocked schedule is cancelled
    /// whatever the stored status says.
    pub fn effective_status(&self) -> ScheduleStatus {
        if self.is_blocked() {
            ScheduleStatus::Cancelled
        } else {
            self.status
        }
    }

    pub fn candidate(&self, student_id: &str) -> Option<&ScheduleCandidate> {
        self.candidates.iter().find(|c| c.student_id == student_id)
    }

    pub fn active_candidates(&self) -> impl Iterator<Item = &ScheduleCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.status != CandidateStatus::Removed)
    }

    pub fn label(&self) -> String {
        format!(
            "{} interview with {} on {} at {}",
            self.position,
            self.company,
            self.date,
            self.time.format("%H:%M")
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewInterviewSchedule {
    pub recruiter_id: String,
    pub company: String,
    pub position: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub platform: String,
    pub venue: Option<String>,
    pub meeting_link: Option<String>,
    pub candidates: Vec<ScheduleCandidate>,
}

impl NewInterviewSchedule {
    pub fn into_schedule(self, now: DateTime<Utc>) -> InterviewSchedule {
        let mut candidates: Vec<ScheduleCandidate> = Vec::with_capacity(self.candidates.len());
        for mut candidate in self.candidates {
            if candidates.iter().any(|c| c.student_id == candidate.student_id) {
                continue;
            }
            candidate.status = CandidateStatus::Scheduled;
            candidates.push(candidate);
        }

        InterviewSchedule {
            id: Uuid::new_v4(),
            recruiter_id: self.recruiter_id,
            company: self.company,
            position: self.position,
            date: self.date,
            time: self.time,
            platform: self.platform,
            venue: self.venue,
            meeting_link: self.meeting_link,
            status: ScheduleStatus::Scheduled,
            moderation: ScheduleModeration::None,
            candidates,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> ScheduleCandidate {
        ScheduleCandidate {
            student_id: id.into(),
            student_name: format!("Student {}", id),
            student_email: format!("{}@campus.edu", id),
            status: CandidateStatus::Passed,
        }
    }

    fn schedule() -> InterviewSchedule {
        NewInterviewSchedule {
            recruiter_id: "rec-1".into(),
            company: "Acme".into(),
            position: "SDE".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
            time: NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
            platform: "online".into(),
            venue: None,
            meeting_link: Some("https://meet.example.com/abc".into()),
            candidates: vec![candidate("a"), candidate("b"), candidate("a")],
        }
        .into_schedule(Utc::now())
    }

    #[test]
    fn new_schedule_resets_and_dedupes_candidates() {
        let schedule = schedule();
        assert_eq!(schedule.candidates.len(), 2);
        assert!(schedule
            .candidates
            .iter()
            .all(|c| c.status == CandidateStatus::Scheduled));
    }

    #[test]
    fn blocked_schedule_reads_as_cancelled() {
        let mut schedule = schedule();
        schedule.status = ScheduleStatus::Ongoing;
        schedule.moderation = ScheduleModeration::Blocked(ModerationAudit::unknown());
        assert_eq!(schedule.effective_status(), ScheduleStatus::Cancelled);
    }

    #[test]
    fn candidate_transitions() {
        use CandidateStatus::*;
        assert_eq!(Scheduled.transition(Attended).unwrap(), Attended);
        assert_eq!(Attended.transition(Failed).unwrap(), Failed);
        assert!(matches!(
            Scheduled.transition(Passed),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            Removed.transition(Attended),
            Err(Error::LifecycleLocked(_))
        ));
        assert!(!Passed.can_transition_to(Failed));
    }

    #[test]
    fn schedule_status_transitions() {
        use ScheduleStatus::*;
        assert!(Scheduled.can_transition_to(Ongoing));
        assert!(Ongoing.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
    }
}
