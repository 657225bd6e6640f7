//! Storage seams for the placement engine.
//!
//! Every mutating method is a single-document conditional update: it applies
//! the change only when the target's current state is in the `from` set, and
//! reports how many documents matched the id and how many actually changed.
//! This is the only mutual-exclusion primitive the engine relies on.
//!
//! Writes on an application or a schedule candidate also check the parent's
//! moderation state inside the same atomic step, so a block that lands after a
//! caller loaded its snapshot still freezes the child.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job_drive::{DriveModeration, DriveStatus, JobDrive};
use crate::models::moderation::{ModerationKind, MutationOutcome};
use crate::models::notification::Notification;
use crate::models::schedule::{
    CandidateStatus, InterviewSchedule, ScheduleModeration, ScheduleStatus,
};

/// Who is writing to a child of a drive or schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    /// Students and recruiters. The parent must not be moderated, otherwise the
    /// write fails with `Error::LifecycleLocked`.
    Participant,
    /// Admin moderation, which may touch children of a frozen parent.
    Moderator,
}

#[async_trait]
pub trait PlacementStore: Send + Sync {
    async fn insert_drive(&self, drive: JobDrive) -> Result<JobDrive>;

    /// Drive with its embedded applications, moderated or not.
    async fn find_drive(&self, id: Uuid) -> Result<Option<JobDrive>>;

    /// Raw listing. Callers run the visibility filter on the result.
    async fn list_drives(&self) -> Result<Vec<JobDrive>>;

    async fn set_drive_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: DriveModeration,
    ) -> Result<MutationOutcome>;

    async fn set_drive_status(
        &self,
        id: Uuid,
        from: &[DriveStatus],
        to: DriveStatus,
    ) -> Result<MutationOutcome>;

    /// Fails with `Error::DuplicateApplication` when the student already holds a
    /// non-withdrawn application on the drive, and with `Error::LifecycleLocked`
    /// when the drive is moderated, completed or past its deadline at write time.
    async fn insert_application(&self, application: Application) -> Result<Application>;

    /// Updates the student's slot-occupying application on the drive.
    async fn set_application_status(
        &self,
        drive_id: Uuid,
        student_id: &str,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        writer: Writer,
    ) -> Result<MutationOutcome>;

    async fn insert_schedule(&self, schedule: InterviewSchedule) -> Result<InterviewSchedule>;

    async fn find_schedule(&self, id: Uuid) -> Result<Option<InterviewSchedule>>;

    async fn list_schedules(&self) -> Result<Vec<InterviewSchedule>>;

    async fn set_schedule_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: ScheduleModeration,
    ) -> Result<MutationOutcome>;

    /// Recruiter-only; fails with `Error::LifecycleLocked` on a blocked schedule.
    async fn set_schedule_status(
        &self,
        id: Uuid,
        from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> Result<MutationOutcome>;

    async fn set_candidate_status(
        &self,
        schedule_id: Uuid,
        student_id: &str,
        from: &[CandidateStatus],
        to: CandidateStatus,
        writer: Writer,
    ) -> Result<MutationOutcome>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> Result<Notification>;

    /// Newest first.
    async fn list_notifications(&self, recipient_uid: &str, limit: i64)
        -> Result<Vec<Notification>>;

    async fn unread_count(&self, recipient_uid: &str) -> Result<i64>;

    async fn mark_read(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome>;

    /// Returns the number of notifications flipped to read.
    async fn mark_all_read(&self, recipient_uid: &str) -> Result<u64>;

    async fn delete_notification(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome>;
}
