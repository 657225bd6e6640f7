//! Role-specific read models. Each one starts from a fresh raw listing and
//! runs the visibility filter before anything else.

use std::sync::Arc;

use crate::database::PlacementStore;
use crate::error::Result;
use crate::models::application::Application;
use crate::models::job_drive::JobDrive;
use crate::models::schedule::{CandidateStatus, InterviewSchedule};
use crate::services::visibility::{visible_drives, visible_schedules, Viewer};

#[derive(Debug, Clone)]
pub struct StudentApplication {
    /// The drive without other students' applications.
    pub drive: JobDrive,
    pub application: Application,
}

#[derive(Clone)]
pub struct ContextService {
    placements: Arc<dyn PlacementStore>,
}

impl ContextService {
    pub fn new(placements: Arc<dyn PlacementStore>) -> Self {
        Self { placements }
    }

    /// Visible drives, each carrying only the student's own applications.
    pub async fn student_drives(&self, student_id: &str) -> Result<Vec<JobDrive>> {
        let drives = visible_drives(self.placements.list_drives().await?, Viewer::Student);
        Ok(drives
            .into_iter()
            .map(|mut drive| {
                drive.applications.retain(|app| app.student_id == student_id);
                drive
            })
            .collect())
    }

    /// The student's latest application on every visible drive they applied to.
    pub async fn student_applications(&self, student_id: &str) -> Result<Vec<StudentApplication>> {
        let drives = self.student_drives(student_id).await?;
        Ok(drives
            .into_iter()
            .filter_map(|mut drive| {
                let application = drive.latest_application(student_id).cloned()?;
                drive.applications.clear();
                Some(StudentApplication { drive, application })
            })
            .collect())
    }

    /// Visible schedules that still list the student, reduced to their own entry.
    pub async fn student_schedules(&self, student_id: &str) -> Result<Vec<InterviewSchedule>> {
        let schedules =
            visible_schedules(self.placements.list_schedules().await?, Viewer::Student);
        Ok(schedules
            .into_iter()
            .filter_map(|mut schedule| {
                schedule.candidates.retain(|c| {
                    c.student_id == student_id && c.status != CandidateStatus::Removed
                });
                (!schedule.candidates.is_empty()).then_some(schedule)
            })
            .collect())
    }

    pub async fn recruiter_drives(&self, recruiter_id: &str) -> Result<Vec<JobDrive>> {
        let drives = visible_drives(self.placements.list_drives().await?, Viewer::Recruiter);
        Ok(drives
            .into_iter()
            .filter(|drive| drive.recruiter_id == recruiter_id)
            .collect())
    }

    pub async fn recruiter_schedules(&self, recruiter_id: &str) -> Result<Vec<InterviewSchedule>> {
        let schedules =
            visible_schedules(self.placements.list_schedules().await?, Viewer::Recruiter);
        Ok(schedules
            .into_iter()
            .filter(|schedule| schedule.recruiter_id == recruiter_id)
            .collect())
    }

    pub async fn admin_drives(&self, include_blocked: bool) -> Result<Vec<JobDrive>> {
        Ok(visible_drives(
            self.placements.list_drives().await?,
            Viewer::Admin { include_blocked },
        ))
    }

    pub async fn admin_schedules(&self, include_blocked: bool) -> Result<Vec<InterviewSchedule>> {
        Ok(visible_schedules(
            self.placements.list_schedules().await?,
            Viewer::Admin { include_blocked },
        ))
    }
}
