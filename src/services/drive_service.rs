use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::PlacementStore;
use crate::error::{Error, Result};
use crate::models::job_drive::{DriveStatus, JobDrive, NewJobDrive};

#[derive(Clone)]
pub struct DriveService {
    placements: Arc<dyn PlacementStore>,
}

impl DriveService {
    pub fn new(placements: Arc<dyn PlacementStore>) -> Self {
        Self { placements }
    }

    pub async fn create(&self, new_drive: NewJobDrive) -> Result<JobDrive> {
        if new_drive.application_deadline > new_drive.date {
            return Err(Error::BadRequest(
                "applicationDeadline must not be after the drive date".to_string(),
            ));
        }
        let drive = self
            .placements
            .insert_drive(new_drive.into_drive(Utc::now()))
            .await?;
        tracing::info!(drive = %drive.id, recruiter = %drive.recruiter_id, "job drive created");
        Ok(drive)
    }

    pub async fn set_status(
        &self,
        recruiter_id: &str,
        drive_id: Uuid,
        next: DriveStatus,
    ) -> Result<JobDrive> {
        let drive = self
            .placements
            .find_drive(drive_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job drive {} not found", drive_id)))?;
        if drive.recruiter_id != recruiter_id {
            return Err(Error::Forbidden(
                "Only the owning recruiter can update this drive".to_string(),
            ));
        }
        if drive.is_moderated() {
            return Err(Error::LifecycleLocked(
                "This job drive has been moderated".to_string(),
            ));
        }
        if !drive.status.can_transition_to(next) {
            return Err(Error::invalid_transition(drive.status, next));
        }

        let outcome = self
            .placements
            .set_drive_status(drive_id, &[drive.status], next)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!("Job drive {} not found", drive_id)));
        }
        if !outcome.is_effective() {
            return Err(Error::NoOp(format!("Job drive is no longer {}", drive.status)));
        }

        tracing::info!(drive = %drive_id, from = %drive.status, to = %next, "drive status changed");
        self.placements
            .find_drive(drive_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job drive {} not found", drive_id)))
    }
}
