//! In-memory implementation of the placement stores.
//!
//! Each collection sits behind its own `RwLock`, and every conditional update
//! runs under a single write guard, which gives the same per-document
//! atomicity the Postgres store gets from single-statement updates. State is
//! lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{NotificationStore, PlacementStore, Writer};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job_drive::{DriveModeration, DriveStatus, JobDrive};
use crate::models::moderation::{ModerationKind, MutationOutcome};
use crate::models::notification::Notification;
use crate::models::schedule::{
    CandidateStatus, InterviewSchedule, ScheduleModeration, ScheduleStatus,
};

#[derive(Default)]
pub struct MemoryStore {
    drives: RwLock<HashMap<Uuid, JobDrive>>,
    schedules: RwLock<HashMap<Uuid, InterviewSchedule>>,
    notifications: RwLock<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conditional<T: PartialEq + Copy>(current: T, from: &[T]) -> bool {
    from.contains(&current)
}

fn locked(what: &str, id: Uuid) -> Error {
    Error::LifecycleLocked(format!("{} {} has been moderated", what, id))
}

#[async_trait]
impl PlacementStore for MemoryStore {
    async fn insert_drive(&self, drive: JobDrive) -> Result<JobDrive> {
        let mut drives = self.drives.write().await;
        if drives.contains_key(&drive.id) {
            return Err(Error::Internal(format!("drive {} already exists", drive.id)));
        }
        drives.insert(drive.id, drive.clone());
        Ok(drive)
    }

    async fn find_drive(&self, id: Uuid) -> Result<Option<JobDrive>> {
        Ok(self.drives.read().await.get(&id).cloned())
    }

    async fn list_drives(&self) -> Result<Vec<JobDrive>> {
        let drives = self.drives.read().await;
        let mut items: Vec<JobDrive> = drives.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn set_drive_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: DriveModeration,
    ) -> Result<MutationOutcome> {
        let mut drives = self.drives.write().await;
        let Some(drive) = drives.get_mut(&id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if !conditional(drive.moderation.kind(), from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        drive.moderation = to;
        drive.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }

    async fn set_drive_status(
        &self,
        id: Uuid,
        from: &[DriveStatus],
        to: DriveStatus,
    ) -> Result<MutationOutcome> {
        let mut drives = self.drives.write().await;
        let Some(drive) = drives.get_mut(&id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if !conditional(drive.status, from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        drive.status = to;
        drive.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }

    async fn insert_application(&self, application: Application) -> Result<Application> {
        let mut drives = self.drives.write().await;
        let drive = drives
            .get_mut(&application.drive_id)
            .ok_or_else(|| Error::NotFound(format!("Job drive {}", application.drive_id)))?;
        if drive.is_moderated() {
            return Err(locked("Job drive", drive.id));
        }
        if drive.status == DriveStatus::Completed || drive.deadline_passed(Utc::now()) {
            return Err(Error::LifecycleLocked(format!(
                "Job drive {} is closed for applications",
                drive.id
            )));
        }
        if drive.active_application(&application.student_id).is_some() {
            return Err(Error::DuplicateApplication {
                student_id: application.student_id,
                drive_id: application.drive_id,
            });
        }
        drive.applications.push(application.clone());
        Ok(application)
    }

    async fn set_application_status(
        &self,
        drive_id: Uuid,
        student_id: &str,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        writer: Writer,
    ) -> Result<MutationOutcome> {
        let mut drives = self.drives.write().await;
        let Some(drive) = drives.get_mut(&drive_id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if writer == Writer::Participant && drive.is_moderated() {
            return Err(locked("Job drive", drive_id));
        }
        let Some(application) = drive
            .applications
            .iter_mut()
            .find(|app| app.student_id == student_id && app.status.occupies_slot())
        else {
            return Ok(MutationOutcome::MISSING);
        };
        if !conditional(application.status, from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        application.status = to;
        application.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }

    async fn insert_schedule(&self, schedule: InterviewSchedule) -> Result<InterviewSchedule> {
        let mut schedules = self.schedules.write().await;
        if schedules.contains_key(&schedule.id) {
            return Err(Error::Internal(format!(
                "schedule {} already exists",
                schedule.id
            )));
        }
        schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn find_schedule(&self, id: Uuid) -> Result<Option<InterviewSchedule>> {
        Ok(self.schedules.read().await.get(&id).cloned())
    }

    async fn list_schedules(&self) -> Result<Vec<InterviewSchedule>> {
        let schedules = self.schedules.read().await;
        let mut items: Vec<InterviewSchedule> = schedules.values().cloned().collect();
        items.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(items)
    }

    async fn set_schedule_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: ScheduleModeration,
    ) -> Result<MutationOutcome> {
        let mut schedules = self.schedules.write().await;
        let Some(schedule) = schedules.get_mut(&id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if !conditional(schedule.moderation.kind(), from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        schedule.moderation = to;
        schedule.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }

    async fn set_schedule_status(
        &self,
        id: Uuid,
        from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> Result<MutationOutcome> {
        let mut schedules = self.schedules.write().await;
        let Some(schedule) = schedules.get_mut(&id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if schedule.is_blocked() {
            return Err(locked("Interview schedule", id));
        }
        if !conditional(schedule.status, from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        schedule.status = to;
        schedule.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }

    async fn set_candidate_status(
        &self,
        schedule_id: Uuid,
        student_id: &str,
        from: &[CandidateStatus],
        to: CandidateStatus,
        writer: Writer,
    ) -> Result<MutationOutcome> {
        let mut schedules = self.schedules.write().await;
        let Some(schedule) = schedules.get_mut(&schedule_id) else {
            return Ok(MutationOutcome::MISSING);
        };
        if writer == Writer::Participant && schedule.is_blocked() {
            return Err(locked("Interview schedule", schedule_id));
        }
        let Some(candidate) = schedule
            .candidates
            .iter_mut()
            .find(|c| c.student_id == student_id)
        else {
            return Ok(MutationOutcome::MISSING);
        };
        if !conditional(candidate.status, from) {
            return Ok(MutationOutcome::UNCHANGED);
        }
        candidate.status = to;
        schedule.updated_at = Utc::now();
        Ok(MutationOutcome::APPLIED)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> Result<Notification> {
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        recipient_uid: &str,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut items: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.recipient_firebase_uid == recipient_uid)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn unread_count(&self, recipient_uid: &str) -> Result<i64> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient_firebase_uid == recipient_uid && !n.read)
            .count() as i64)
    }

    async fn mark_read(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome> {
        let mut notifications = self.notifications.write().await;
        let Some(notification) = notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_firebase_uid == recipient_uid)
        else {
            return Ok(MutationOutcome::MISSING);
        };
        if notification.read {
            return Ok(MutationOutcome::UNCHANGED);
        }
        notification.read = true;
        Ok(MutationOutcome::APPLIED)
    }

    async fn mark_all_read(&self, recipient_uid: &str) -> Result<u64> {
        let mut notifications = self.notifications.write().await;
        let mut flipped = 0;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.recipient_firebase_uid == recipient_uid && !n.read)
        {
            notification.read = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn delete_notification(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|n| !(n.id == id && n.recipient_firebase_uid == recipient_uid));
        if notifications.len() == before {
            Ok(MutationOutcome::MISSING)
        } else {
            Ok(MutationOutcome::APPLIED)
        }
    }
}
