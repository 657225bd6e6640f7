use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::{PlacementStore, Writer};
use crate::error::{Error, Result};
use crate::models::notification::NotificationType;
use crate::models::schedule::{
    CandidateStatus, InterviewSchedule, NewInterviewSchedule, ScheduleStatus,
};
use crate::services::application_service::StatusChange;
use crate::services::fanout_service::{
    schedule_candidate_recipients, schedule_source, FanOutEvent, FanOutService,
};

#[derive(Clone)]
pub struct ScheduleService {
    placements: Arc<dyn PlacementStore>,
    fanout: FanOutService,
}

impl ScheduleService {
    pub fn new(placements: Arc<dyn PlacementStore>, fanout: FanOutService) -> Self {
        Self { placements, fanout }
    }

    pub async fn create(&self, new_schedule: NewInterviewSchedule) -> Result<InterviewSchedule> {
        if new_schedule.venue.is_none() && new_schedule.meeting_link.is_none() {
            return Err(Error::BadRequest(
                "Either venue or meetingLink is required".to_string(),
            ));
        }
        let schedule = self
            .placements
            .insert_schedule(new_schedule.into_schedule(Utc::now()))
            .await?;
        tracing::info!(
            schedule = %schedule.id,
            candidates = schedule.candidates.len(),
            "interview schedule created"
        );
        Ok(schedule)
    }

    async fn load_owned(&self, recruiter_id: &str, schedule_id: Uuid) -> Result<InterviewSchedule> {
        let schedule = self
            .placements
            .find_schedule(schedule_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Interview schedule {} not found", schedule_id))
            })?;
        if schedule.recruiter_id != recruiter_id {
            return Err(Error::Forbidden(
                "Only the owning recruiter can update this schedule".to_string(),
            ));
        }
        if schedule.is_blocked() {
            return Err(Error::LifecycleLocked(
                "This interview schedule has been blocked".to_string(),
            ));
        }
        Ok(schedule)
    }

    async fn reload(&self, schedule_id: Uuid) -> Result<InterviewSchedule> {
        self.placements
            .find_schedule(schedule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview schedule {} not found", schedule_id)))
    }

    /// Cancelling tells every remaining candidate.
    pub async fn set_status(
        &self,
        recruiter_id: &str,
        schedule_id: Uuid,
        next: ScheduleStatus,
    ) -> Result<StatusChange<InterviewSchedule>> {
        let schedule = self.load_owned(recruiter_id, schedule_id).await?;
        if schedule.status.is_terminal() {
            return Err(Error::LifecycleLocked(format!(
                "Interview schedule is already {}",
                schedule.status
            )));
        }
        if !schedule.status.can_transition_to(next) {
            return Err(Error::invalid_transition(schedule.status, next));
        }

        let outcome = self
            .placements
            .set_schedule_status(schedule_id, &[schedule.status], next)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Interview schedule {} not found",
                schedule_id
            )));
        }
        if !outcome.is_effective() {
            return Err(Error::NoOp(format!(
                "Interview schedule is no longer {}",
                schedule.status
            )));
        }
        tracing::info!(
            schedule = %schedule_id,
            from = %schedule.status,
            to = %next,
            "schedule status changed"
        );

        let mut change = StatusChange {
            entity: self.reload(schedule_id).await?,
            notified: 0,
            warning: None,
        };
        if next == ScheduleStatus::Cancelled {
            let event = FanOutEvent::new(
                NotificationType::InterviewCancelled,
                schedule_source(&schedule),
                "Interview cancelled",
                format!("The {} has been cancelled by the recruiter.", schedule.label()),
            )
            .to(schedule_candidate_recipients(&schedule));
            let fanned = self.fanout.fan_out(event).await;
            change.notified = fanned.notified();
            change.warning = fanned.failure;
        }
        Ok(change)
    }

    pub async fn set_candidate_status(
        &self,
        recruiter_id: &str,
        schedule_id: Uuid,
        student_id: &str,
        next: CandidateStatus,
    ) -> Result<StatusChange<InterviewSchedule>> {
        let schedule = self.load_owned(recruiter_id, schedule_id).await?;
        if schedule.effective_status() == ScheduleStatus::Cancelled {
            return Err(Error::LifecycleLocked(
                "This interview schedule has been cancelled".to_string(),
            ));
        }
        let current = schedule
            .candidate(student_id)
            .map(|c| c.status)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Student {} is not a candidate on schedule {}",
                    student_id, schedule_id
                ))
            })?;
        let next = current.transition(next)?;

        let outcome = self
            .placements
            .set_candidate_status(schedule_id, student_id, &[current], next, Writer::Participant)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Student {} is not a candidate on schedule {}",
                student_id, schedule_id
            )));
        }
        if !outcome.is_effective() {
            return Err(Error::NoOp(format!("Candidate is no longer {}", current)));
        }

        let event = FanOutEvent::new(
            NotificationType::Generic,
            schedule_source(&schedule),
            "Interview update",
            format!("Your status for the {} is now {}.", schedule.label(), next),
        )
        .to(vec![student_id.to_string()]);
        let fanned = self.fanout.fan_out(event).await;

        Ok(StatusChange {
            entity: self.reload(schedule_id).await?,
            notified: fanned.notified(),
            warning: fanned.failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, NotificationStore};
    use crate::models::moderation::{ModerationAudit, ModerationKind};
    use crate::models::schedule::{ScheduleCandidate, ScheduleModeration};
    use chrono::{NaiveDate, NaiveTime};

    fn new_schedule() -> NewInterviewSchedule {
        NewInterviewSchedule {
            recruiter_id: "rec-1".into(),
            company: "Initech".into(),
            position: "QA".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 15).expect("valid date"),
            time: NaiveTime::from_hms_opt(11, 0, 0).expect("valid time"),
            platform: "online".into(),
            venue: None,
            meeting_link: Some("https://meet.example.com/qa".into()),
            candidates: ["s1", "s2"]
                .iter()
                .map(|id| ScheduleCandidate {
                    student_id: id.to_string(),
                    student_name: id.to_string(),
                    student_email: format!("{}@campus.edu", id),
                    status: CandidateStatus::Scheduled,
                })
                .collect(),
        }
    }

    fn service() -> (Arc<MemoryStore>, ScheduleService) {
        let store = Arc::new(MemoryStore::new());
        let service = ScheduleService::new(store.clone(), FanOutService::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn cancelling_notifies_every_candidate() {
        let (store, service) = service();
        let schedule = service.create(new_schedule()).await.unwrap();

        let change = service
            .set_status("rec-1", schedule.id, ScheduleStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(change.entity.status, ScheduleStatus::Cancelled);
        assert_eq!(change.notified, 2);

        let inbox = store.list_notifications("s1", 10).await.unwrap();
        assert_eq!(inbox[0].kind, NotificationType::InterviewCancelled);
        assert_eq!(store.unread_count("rec-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn candidate_progression_follows_the_table() {
        let (_, service) = service();
        let schedule = service.create(new_schedule()).await.unwrap();

        let err = service
            .set_candidate_status("rec-1", schedule.id, "s1", CandidateStatus::Passed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        service
            .set_candidate_status("rec-1", schedule.id, "s1", CandidateStatus::Attended)
            .await
            .unwrap();
        let change = service
            .set_candidate_status("rec-1", schedule.id, "s1", CandidateStatus::Passed)
            .await
            .unwrap();
        assert_eq!(
            change.entity.candidate("s1").unwrap().status,
            CandidateStatus::Passed
        );
    }

    #[tokio::test]
    async fn blocked_schedule_is_locked_for_the_recruiter() {
        let (store, service) = service();
        let schedule = service.create(new_schedule()).await.unwrap();
        store
            .set_schedule_moderation(
                schedule.id,
                &[ModerationKind::None],
                ScheduleModeration::Blocked(ModerationAudit::unknown()),
            )
            .await
            .unwrap();

        let err = service
            .set_candidate_status("rec-1", schedule.id, "s1", CandidateStatus::Attended)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LifecycleLocked(_)));
    }
}
