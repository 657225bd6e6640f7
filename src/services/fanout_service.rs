use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::NotificationStore;
use crate::models::job_drive::JobDrive;
use crate::models::notification::{Notification, NotificationType, SourceKind, SourceRef};
use crate::models::schedule::InterviewSchedule;

/// One event to deliver to a set of principals.
#[derive(Debug, Clone)]
pub struct FanOutEvent {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub source: SourceRef,
    pub recipients: Vec<String>,
}

impl FanOutEvent {
    pub fn new(
        kind: NotificationType,
        source: SourceRef,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            source,
            recipients: Vec::new(),
        }
    }

    pub fn to(mut self, recipients: Vec<String>) -> Self {
        self.recipients = dedupe(recipients);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedDelivery {
    pub recipient_uid: String,
    pub error: String,
}

/// The entity change stands; some recipients did not get their notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{} of {attempted} notifications could not be written", .failed.len())]
pub struct FanOutPartialFailure {
    pub attempted: usize,
    pub failed: Vec<FailedDelivery>,
}

#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    pub created: Vec<Notification>,
    pub failure: Option<FanOutPartialFailure>,
}

impl FanOutReport {
    pub fn notified(&self) -> usize {
        self.created.len()
    }
}

#[derive(Clone)]
pub struct FanOutService {
    notifications: Arc<dyn NotificationStore>,
}

impl FanOutService {
    pub fn new(notifications: Arc<dyn NotificationStore>) -> Self {
        Self { notifications }
    }

    /// Writes one notification per recipient. Individual failures are logged and
    /// collected; they are never retried and never abort the remaining writes.
    pub async fn fan_out(&self, event: FanOutEvent) -> FanOutReport {
        let mut report = FanOutReport::default();
        let mut failed = Vec::new();
        let attempted = event.recipients.len();

        for recipient in &event.recipients {
            let notification = Notification {
                id: Uuid::new_v4(),
                recipient_firebase_uid: recipient.clone(),
                kind: event.kind,
                title: event.title.clone(),
                message: event.message.clone(),
                priority: event.kind.priority(),
                source: Some(event.source),
                read: false,
                created_at: Utc::now(),
            };

            match self.notifications.insert_notification(notification).await {
                Ok(created) => report.created.push(created),
                Err(err) => {
                    tracing::warn!(
                        recipient = %recipient,
                        kind = event.kind.as_str(),
                        source_id = %event.source.id,
                        error = %err,
                        "notification write failed"
                    );
                    failed.push(FailedDelivery {
                        recipient_uid: recipient.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            report.failure = Some(FanOutPartialFailure { attempted, failed });
        }
        report
    }
}

fn dedupe(recipients: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(recipients.len());
    for uid in recipients {
        if !uid.is_empty() && !unique.contains(&uid) {
            unique.push(uid);
        }
    }
    unique
}

pub fn drive_source(drive: &JobDrive) -> SourceRef {
    SourceRef {
        kind: SourceKind::JobDrive,
        id: drive.id,
    }
}

pub fn schedule_source(schedule: &InterviewSchedule) -> SourceRef {
    SourceRef {
        kind: SourceKind::InterviewSchedule,
        id: schedule.id,
    }
}

/// Every student still engaged with the drive, then the owning recruiter.
/// Must be called on the snapshot taken before the mutation.
pub fn drive_moderation_recipients(drive: &JobDrive) -> Vec<String> {
    let mut recipients: Vec<String> = drive
        .engaged_students()
        .map(|app| app.student_id.clone())
        .collect();
    recipients.push(drive.recruiter_id.clone());
    dedupe(recipients)
}

/// Every candidate not already removed, then the owning recruiter.
pub fn schedule_moderation_recipients(schedule: &InterviewSchedule) -> Vec<String> {
    let mut recipients = schedule_candidate_recipients(schedule);
    recipients.push(schedule.recruiter_id.clone());
    dedupe(recipients)
}

pub fn schedule_candidate_recipients(schedule: &InterviewSchedule) -> Vec<String> {
    dedupe(
        schedule
            .active_candidates()
            .map(|c| c.student_id.clone())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{Application, ApplicationStatus, StudentIdentity};
    use crate::models::job_drive::NewJobDrive;
    use crate::models::schedule::{CandidateStatus, NewInterviewSchedule, ScheduleCandidate};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn drive_with(statuses: &[(&str, ApplicationStatus)]) -> JobDrive {
        let now = Utc::now();
        let mut drive = NewJobDrive {
            recruiter_id: "rec-1".into(),
            company: "Acme".into(),
            position: "Analyst".into(),
            salary: None,
            location: "Pune".into(),
            date: now + Duration::days(10),
            application_deadline: now + Duration::days(5),
            eligibility_criteria: None,
        }
        .into_drive(now);
        for (student, status) in statuses {
            let identity = StudentIdentity {
                id: student.to_string(),
                name: student.to_uppercase(),
                email: format!("{}@campus.edu", student),
            };
            let mut app = Application::new(drive.id, &identity, now);
            app.status = *status;
            drive.applications.push(app);
        }
        drive
    }

    #[test]
    fn drive_recipients_skip_withdrawn_and_removed() {
        let drive = drive_with(&[
            ("a", ApplicationStatus::Applied),
            ("b", ApplicationStatus::Shortlisted),
            ("c", ApplicationStatus::Withdrawn),
            ("d", ApplicationStatus::Removed),
            ("e", ApplicationStatus::Rejected),
        ]);
        assert_eq!(
            drive_moderation_recipients(&drive),
            vec!["a", "b", "e", "rec-1"]
        );
    }

    #[test]
    fn recruiter_is_notified_once_even_when_also_an_applicant() {
        let drive = drive_with(&[("rec-1", ApplicationStatus::Applied)]);
        assert_eq!(drive_moderation_recipients(&drive), vec!["rec-1"]);
    }

    #[test]
    fn schedule_recipients_skip_removed_candidates() {
        let mut schedule = NewInterviewSchedule {
            recruiter_id: "rec-2".into(),
            company: "Acme".into(),
            position: "SDE".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 20).expect("valid date"),
            time: NaiveTime::from_hms_opt(14, 0, 0).expect("valid time"),
            platform: "online".into(),
            venue: None,
            meeting_link: None,
            candidates: ["x", "y"]
                .iter()
                .map(|id| ScheduleCandidate {
                    student_id: id.to_string(),
                    student_name: id.to_string(),
                    student_email: format!("{}@campus.edu", id),
                    status: CandidateStatus::Scheduled,
                })
                .collect(),
        }
        .into_schedule(Utc::now());
        schedule.candidates[1].status = CandidateStatus::Removed;

        assert_eq!(schedule_moderation_recipients(&schedule), vec!["x", "rec-2"]);
        assert_eq!(schedule_candidate_recipients(&schedule), vec!["x"]);
    }

    #[test]
    fn partial_failure_message_counts_failures() {
        let failure = FanOutPartialFailure {
            attempted: 3,
            failed: vec![FailedDelivery {
                recipient_uid: "a".into(),
                error: "boom".into(),
            }],
        };
        assert_eq!(
            failure.to_string(),
            "1 of 3 notifications could not be written"
        );
    }
}
