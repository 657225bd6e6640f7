//! Read-boundary filtering of moderated drives and schedules.
//!
//! Raw listings may legally contain rows moderated moments ago, so every
//! response is rebuilt from the current flags rather than trusted from an
//! earlier read.

use crate::models::job_drive::JobDrive;
use crate::models::schedule::{InterviewSchedule, ScheduleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Student,
    Recruiter,
    Admin { include_blocked: bool },
}

impl Viewer {
    fn sees_moderated(&self) -> bool {
        matches!(
            self,
            Viewer::Admin {
                include_blocked: true
            }
        )
    }
}

pub fn drive_visible(drive: &JobDrive, viewer: Viewer) -> bool {
    viewer.sees_moderated() || !drive.is_moderated()
}

pub fn schedule_visible(schedule: &InterviewSchedule, viewer: Viewer) -> bool {
    viewer.sees_moderated() || schedule.effective_status() != ScheduleStatus::Cancelled
}

pub fn visible_drives(drives: Vec<JobDrive>, viewer: Viewer) -> Vec<JobDrive> {
    drives
        .into_iter()
        .filter(|drive| drive_visible(drive, viewer))
        .collect()
}

pub fn visible_schedules(schedules: Vec<InterviewSchedule>, viewer: Viewer) -> Vec<InterviewSchedule> {
    schedules
        .into_iter()
        .filter(|schedule| schedule_visible(schedule, viewer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_drive::{DriveModeration, NewJobDrive};
    use crate::models::moderation::ModerationAudit;
    use crate::models::schedule::{NewInterviewSchedule, ScheduleModeration};
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};

    const NON_ADMIN: [Viewer; 3] = [
        Viewer::Student,
        Viewer::Recruiter,
        Viewer::Admin {
            include_blocked: false,
        },
    ];

    fn drive(moderation: DriveModeration) -> JobDrive {
        let now = Utc::now();
        let mut drive = NewJobDrive {
            recruiter_id: "rec-1".into(),
            company: "Acme".into(),
            position: "Analyst".into(),
            salary: None,
            location: "Remote".into(),
            date: now + Duration::days(3),
            application_deadline: now + Duration::days(1),
            eligibility_criteria: Some("CGPA >= 7".into()),
        }
        .into_drive(now);
        drive.moderation = moderation;
        drive
    }

    fn schedule(status: ScheduleStatus, moderation: ScheduleModeration) -> InterviewSchedule {
        let mut schedule = NewInterviewSchedule {
            recruiter_id: "rec-1".into(),
            company: "Acme".into(),
            position: "Analyst".into(),
            date: NaiveDate::from_ymd_opt(2026, 12, 1).expect("valid date"),
            time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            platform: "onsite".into(),
            venue: Some("Block C".into()),
            meeting_link: None,
            candidates: Vec::new(),
        }
        .into_schedule(Utc::now());
        schedule.status = status;
        schedule.moderation = moderation;
        schedule
    }

    #[test]
    fn moderated_drives_are_hidden_from_default_views() {
        let drives = vec![
            drive(DriveModeration::None),
            drive(DriveModeration::Blocked(ModerationAudit::unknown())),
            drive(DriveModeration::Deleted(ModerationAudit::unknown())),
        ];
        for viewer in NON_ADMIN {
            let visible = visible_drives(drives.clone(), viewer);
            assert_eq!(visible.len(), 1, "{:?}", viewer);
            assert!(!visible[0].is_moderated());
        }
    }

    #[test]
    fn admin_can_opt_into_moderated_drives() {
        let drives = vec![
            drive(DriveModeration::None),
            drive(DriveModeration::Blocked(ModerationAudit::unknown())),
            drive(DriveModeration::Deleted(ModerationAudit::unknown())),
        ];
        let visible = visible_drives(
            drives,
            Viewer::Admin {
                include_blocked: true,
            },
        );
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn blocked_or_cancelled_schedules_are_hidden() {
        let schedules = vec![
            schedule(ScheduleStatus::Scheduled, ScheduleModeration::None),
            schedule(ScheduleStatus::Cancelled, ScheduleModeration::None),
            schedule(
                ScheduleStatus::Ongoing,
                ScheduleModeration::Blocked(ModerationAudit::unknown()),
            ),
        ];
        for viewer in NON_ADMIN {
            let visible = visible_schedules(schedules.clone(), viewer);
            assert_eq!(visible.len(), 1, "{:?}", viewer);
            assert_eq!(visible[0].status, ScheduleStatus::Scheduled);
        }
    }

    #[test]
    fn completed_schedules_stay_visible() {
        let completed = schedule(ScheduleStatus::Completed, ScheduleModeration::None);
        assert!(schedule_visible(&completed, Viewer::Student));
    }
}
