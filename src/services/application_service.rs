use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::{PlacementStore, Writer};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, StudentIdentity};
use crate::models::job_drive::{DriveStatus, JobDrive};
use crate::models::notification::NotificationType;
use crate::services::fanout_service::{drive_source, FanOutEvent, FanOutPartialFailure, FanOutService};

/// An entity after a state change, plus what happened to its notifications.
#[derive(Debug, Clone)]
pub struct StatusChange<T> {
    pub entity: T,
    pub notified: usize,
    pub warning: Option<FanOutPartialFailure>,
}

#[derive(Clone)]
pub struct ApplicationService {
    placements: Arc<dyn PlacementStore>,
    fanout: FanOutService,
}

impl ApplicationService {
    pub fn new(placements: Arc<dyn PlacementStore>, fanout: FanOutService) -> Self {
        Self { placements, fanout }
    }

    async fn load_drive(&self, drive_id: Uuid) -> Result<JobDrive> {
        self.placements
            .find_drive(drive_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job drive {} not found", drive_id)))
    }

    pub async fn apply(&self, drive_id: Uuid, student: &StudentIdentity) -> Result<Application> {
        let drive = self.load_drive(drive_id).await?;
        let now = Utc::now();

        if drive.is_moderated() {
            return Err(Error::LifecycleLocked(
                "This job drive is no longer accepting applications".to_string(),
            ));
        }
        if drive.status == DriveStatus::Completed {
            return Err(Error::LifecycleLocked(
                "This job drive has been completed".to_string(),
            ));
        }
        if drive.deadline_passed(now) {
            return Err(Error::LifecycleLocked(
                "The application deadline has passed".to_string(),
            ));
        }
        if drive.active_application(&student.id).is_some() {
            return Err(Error::DuplicateApplication {
                student_id: student.id.clone(),
                drive_id,
            });
        }

        let application = self
            .placements
            .insert_application(Application::new(drive_id, student, now))
            .await?;

        tracing::info!(drive = %drive_id, student = %student.id, "application created");
        Ok(application)
    }

    pub async fn withdraw(&self, drive_id: Uuid, student_id: &str) -> Result<Application> {
        let drive = self.load_drive(drive_id).await?;
        if drive.is_moderated() {
            return Err(Error::LifecycleLocked(
                "Applications on a moderated job drive cannot be withdrawn".to_string(),
            ));
        }

        let current = drive
            .active_application(student_id)
            .map(|app| app.status)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No active application on drive {} for student {}",
                    drive_id, student_id
                ))
            })?;
        let next = current.transition(ApplicationStatus::Withdrawn)?;

        self.commit(drive_id, student_id, current, next).await?;
        tracing::info!(drive = %drive_id, student = %student_id, "application withdrawn");
        self.reload(drive_id, student_id).await
    }

    /// Recruiter-driven progression through the pipeline. The student is told
    /// about every change.
    pub async fn advance(
        &self,
        recruiter_id: &str,
        drive_id: Uuid,
        student_id: &str,
        next: ApplicationStatus,
    ) -> Result<StatusChange<Application>> {
        let drive = self.load_drive(drive_id).await?;
        if drive.recruiter_id != recruiter_id {
            return Err(Error::Forbidden(
                "Only the owning recruiter can update applications".to_string(),
            ));
        }
        if drive.is_moderated() {
            return Err(Error::LifecycleLocked(
                "This job drive has been moderated".to_string(),
            ));
        }
        if matches!(next, ApplicationStatus::Withdrawn | ApplicationStatus::Removed) {
            return Err(Error::BadRequest(format!(
                "Recruiters cannot set an application to {}",
                next
            )));
        }

        let current = drive
            .active_application(student_id)
            .map(|app| app.status)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No active application on drive {} for student {}",
                    drive_id, student_id
                ))
            })?;
        let next = current.transition(next)?;
        self.commit(drive_id, student_id, current, next).await?;

        let event = FanOutEvent::new(
            NotificationType::Generic,
            drive_source(&drive),
            "Application update",
            format!(
                "Your application for {} is now {}.",
                drive.label(),
                next
            ),
        )
        .to(vec![student_id.to_string()]);
        let fanned = self.fanout.fan_out(event).await;

        tracing::info!(
            drive = %drive_id,
            student = %student_id,
            from = %current,
            to = %next,
            "application status changed"
        );

        Ok(StatusChange {
            entity: self.reload(drive_id, student_id).await?,
            notified: fanned.notified(),
            warning: fanned.failure,
        })
    }

    async fn commit(
        &self,
        drive_id: Uuid,
        student_id: &str,
        current: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<()> {
        let outcome = self
            .placements
            .set_application_status(drive_id, student_id, &[current], next, Writer::Participant)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "No active application on drive {} for student {}",
                drive_id, student_id
            )));
        }
        if !outcome.is_effective() {
            return Err(Error::NoOp(format!(
                "Application is no longer {}",
                current
            )));
        }
        Ok(())
    }

    async fn reload(&self, drive_id: Uuid, student_id: &str) -> Result<Application> {
        self.load_drive(drive_id)
            .await?
            .latest_application(student_id)
            .cloned()
            .ok_or_else(|| Error::Internal("application vanished after update".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, NotificationStore};
    use crate::models::job_drive::{DriveModeration, NewJobDrive};
    use crate::models::moderation::ModerationAudit;
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ApplicationService,
        drive_id: Uuid,
    }

    async fn fixture(deadline_in: Duration) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = ApplicationService::new(store.clone(), FanOutService::new(store.clone()));
        let now = Utc::now();
        let drive = NewJobDrive {
            recruiter_id: "rec-1".into(),
            company: "Acme".into(),
            position: "Analyst".into(),
            salary: None,
            location: "Chennai".into(),
            date: now + Duration::days(20),
            application_deadline: now + deadline_in,
            eligibility_criteria: None,
        }
        .into_drive(now);
        let drive_id = drive.id;
        store.insert_drive(drive).await.unwrap();
        Fixture {
            store,
            service,
            drive_id,
        }
    }

    fn student(id: &str) -> StudentIdentity {
        StudentIdentity {
            id: id.into(),
            name: format!("Student {}", id),
            email: format!("{}@campus.edu", id),
        }
    }

    #[tokio::test]
    async fn apply_after_deadline_creates_nothing() {
        let fx = fixture(Duration::days(-1)).await;
        let err = fx.service.apply(fx.drive_id, &student("a")).await.unwrap_err();
        assert!(matches!(err, Error::LifecycleLocked(_)));

        let drive = fx.store.find_drive(fx.drive_id).await.unwrap().unwrap();
        assert!(drive.applications.is_empty());
        assert_eq!(fx.store.unread_count("a").await.unwrap(), 0);
        assert_eq!(fx.store.unread_count("rec-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn apply_withdraw_apply_keeps_one_active_application() {
        let fx = fixture(Duration::days(2)).await;
        fx.service.apply(fx.drive_id, &student("a")).await.unwrap();
        let dup = fx.service.apply(fx.drive_id, &student("a")).await.unwrap_err();
        assert!(matches!(dup, Error::DuplicateApplication { .. }));

        let withdrawn = fx.service.withdraw(fx.drive_id, "a").await.unwrap();
        assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);
        fx.service.apply(fx.drive_id, &student("a")).await.unwrap();

        let drive = fx.store.find_drive(fx.drive_id).await.unwrap().unwrap();
        let active = drive
            .applications
            .iter()
            .filter(|app| app.student_id == "a" && app.status != ApplicationStatus::Withdrawn)
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn withdraw_on_blocked_drive_is_locked_and_leaves_status() {
        let fx = fixture(Duration::days(2)).await;
        fx.service.apply(fx.drive_id, &student("a")).await.unwrap();
        fx.store
            .set_drive_moderation(
                fx.drive_id,
                &[crate::models::moderation::ModerationKind::None],
                DriveModeration::Blocked(ModerationAudit::unknown()),
            )
            .await
            .unwrap();

        let err = fx.service.withdraw(fx.drive_id, "a").await.unwrap_err();
        assert!(matches!(err, Error::LifecycleLocked(_)));
        let drive = fx.store.find_drive(fx.drive_id).await.unwrap().unwrap();
        assert_eq!(
            drive.active_application("a").unwrap().status,
            ApplicationStatus::Applied
        );
    }

    #[tokio::test]
    async fn recruiter_advance_notifies_student() {
        let fx = fixture(Duration::days(2)).await;
        fx.service.apply(fx.drive_id, &student("a")).await.unwrap();

        let change = fx
            .service
            .advance("rec-1", fx.drive_id, "a", ApplicationStatus::Shortlisted)
            .await
            .unwrap();
        assert_eq!(change.entity.status, ApplicationStatus::Shortlisted);
        assert_eq!(change.notified, 1);

        let skipped = fx
            .service
            .advance("rec-1", fx.drive_id, "a", ApplicationStatus::Selected)
            .await
            .unwrap_err();
        assert!(matches!(skipped, Error::InvalidTransition { .. }));

        let stranger = fx
            .service
            .advance("rec-9", fx.drive_id, "a", ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(stranger, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn withdraw_after_interview_is_scheduled_is_refused() {
        let fx = fixture(Duration::days(2)).await;
        fx.service.apply(fx.drive_id, &student("a")).await.unwrap();
        for next in [
            ApplicationStatus::Shortlisted,
            ApplicationStatus::InterviewScheduled,
        ] {
            fx.service
                .advance("rec-1", fx.drive_id, "a", next)
                .await
                .unwrap();
        }
        let err = fx.service.withdraw(fx.drive_id, "a").await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }
}
