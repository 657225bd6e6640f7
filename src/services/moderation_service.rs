use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::{PlacementStore, Writer};
use crate::error::{Error, Result};
use crate::models::application::ApplicationStatus;
use crate::models::job_drive::{DriveModeration, JobDrive};
use crate::models::moderation::{ModerationAudit, ModerationKind, MutationOutcome};
use crate::models::notification::NotificationType;
use crate::models::schedule::{CandidateStatus, InterviewSchedule, ScheduleModeration};
use crate::services::fanout_service::{
    drive_moderation_recipients, drive_source, schedule_moderation_recipients, schedule_source,
    FanOutEvent, FanOutPartialFailure, FanOutService,
};

/// Applications an admin can still remove from a drive.
const REMOVABLE_APPLICATIONS: [ApplicationStatus; 5] = [
    ApplicationStatus::Applied,
    ApplicationStatus::Shortlisted,
    ApplicationStatus::InterviewScheduled,
    ApplicationStatus::Selected,
    ApplicationStatus::Rejected,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ModerationAction {
    BlockDrive,
    DeleteDrive,
    UnblockDrive,
    RemoveCandidateFromDrive,
    BlockSchedule,
    UnblockSchedule,
    RemoveCandidateFromSchedule,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::BlockDrive => "blockDrive",
            ModerationAction::DeleteDrive => "deleteDrive",
            ModerationAction::UnblockDrive => "unblockDrive",
            ModerationAction::RemoveCandidateFromDrive => "removeCandidateFromDrive",
            ModerationAction::BlockSchedule => "blockSchedule",
            ModerationAction::UnblockSchedule => "unblockSchedule",
            ModerationAction::RemoveCandidateFromSchedule => "removeCandidateFromSchedule",
        }
    }

    pub fn requires_reason(&self) -> bool {
        matches!(
            self,
            ModerationAction::BlockDrive
                | ModerationAction::BlockSchedule
                | ModerationAction::RemoveCandidateFromSchedule
        )
    }

    pub fn targets_candidate(&self) -> bool {
        matches!(
            self,
            ModerationAction::RemoveCandidateFromDrive
                | ModerationAction::RemoveCandidateFromSchedule
        )
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ModerationCommand {
    pub action: ModerationAction,
    pub target_id: Uuid,
    /// Set for the remove-candidate actions only.
    pub student_id: Option<String>,
    pub admin: AdminIdentity,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModerationReport {
    pub action: ModerationAction,
    pub target_id: Uuid,
    pub student_id: Option<String>,
    pub outcome: MutationOutcome,
    pub notified: usize,
    pub warning: Option<FanOutPartialFailure>,
}

impl ModerationReport {
    pub fn is_effective(&self) -> bool {
        self.outcome.is_effective()
    }

    /// Turns an idempotent no-op into `Error::NoOp` for callers that want failure semantics.
    pub fn require_effective(self) -> Result<Self> {
        if self.is_effective() {
            Ok(self)
        } else {
            Err(Error::NoOp(format!(
                "{} on {} changed nothing",
                self.action, self.target_id
            )))
        }
    }
}

#[derive(Clone)]
pub struct ModerationService {
    placements: Arc<dyn PlacementStore>,
    fanout: FanOutService,
}

impl ModerationService {
    pub fn new(placements: Arc<dyn PlacementStore>, fanout: FanOutService) -> Self {
        Self { placements, fanout }
    }

    pub async fn apply(&self, command: ModerationCommand) -> Result<ModerationReport> {
        let audit = validate(&command)?;

        let report = match command.action {
            ModerationAction::BlockDrive => {
                self.moderate_drive(&command, &[ModerationKind::None], DriveModeration::Blocked(audit))
                    .await?
            }
            ModerationAction::DeleteDrive => {
                self.moderate_drive(
                    &command,
                    &[ModerationKind::None, ModerationKind::Blocked],
                    DriveModeration::Deleted(audit),
                )
                .await?
            }
            ModerationAction::UnblockDrive => {
                self.moderate_drive(&command, &[ModerationKind::Blocked], DriveModeration::None)
                    .await?
            }
            ModerationAction::RemoveCandidateFromDrive => {
                self.remove_from_drive(&command, &audit).await?
            }
            ModerationAction::BlockSchedule => {
                self.moderate_schedule(
                    &command,
                    &[ModerationKind::None],
                    ScheduleModeration::Blocked(audit),
                )
                .await?
            }
            ModerationAction::UnblockSchedule => {
                self.moderate_schedule(&command, &[ModerationKind::Blocked], ScheduleModeration::None)
                    .await?
            }
            ModerationAction::RemoveCandidateFromSchedule => {
                self.remove_from_schedule(&command, &audit).await?
            }
        };

        tracing::info!(
            action = report.action.as_str(),
            target = %report.target_id,
            student = report.student_id.as_deref().unwrap_or("-"),
            admin = %command.admin.id,
            matched = report.outcome.matched,
            modified = report.outcome.modified,
            notified = report.notified,
            partial_failure = report.warning.is_some(),
            "moderation action processed"
        );

        Ok(report)
    }

    /// Fan out to the affected parties and record the delivery on the report.
    async fn notify(&self, mut report: ModerationReport, event: FanOutEvent) -> ModerationReport {
        let fanned = self.fanout.fan_out(event).await;
        report.notified = fanned.notified();
        report.warning = fanned.failure;
        report
    }

    async fn load_drive(&self, id: Uuid) -> Result<JobDrive> {
        self.placements
            .find_drive(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job drive {} not found", id)))
    }

    async fn load_schedule(&self, id: Uuid) -> Result<InterviewSchedule> {
        self.placements
            .find_schedule(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview schedule {} not found", id)))
    }

    async fn moderate_drive(
        &self,
        command: &ModerationCommand,
        from: &[ModerationKind],
        to: DriveModeration,
    ) -> Result<ModerationReport> {
        let snapshot = self.load_drive(command.target_id).await?;
        let outcome = self
            .placements
            .set_drive_moderation(command.target_id, from, to)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Job drive {} not found",
                command.target_id
            )));
        }

        let report = new_report(command, outcome);
        if !outcome.is_effective() {
            return Ok(report);
        }

        let event = drive_event(command, &snapshot);
        Ok(self.notify(report, event).await)
    }

    async fn moderate_schedule(
        &self,
        command: &ModerationCommand,
        from: &[ModerationKind],
        to: ScheduleModeration,
    ) -> Result<ModerationReport> {
        let snapshot = self.load_schedule(command.target_id).await?;
        let outcome = self
            .placements
            .set_schedule_moderation(command.target_id, from, to)
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Interview schedule {} not found",
                command.target_id
            )));
        }

        let report = new_report(command, outcome);
        if !outcome.is_effective() {
            return Ok(report);
        }

        let event = schedule_event(command, &snapshot);
        Ok(self.notify(report, event).await)
    }

    async fn remove_from_drive(
        &self,
        command: &ModerationCommand,
        audit: &ModerationAudit,
    ) -> Result<ModerationReport> {
        let student_id = candidate_id(command)?;
        let snapshot = self.load_drive(command.target_id).await?;
        let Some(application) = snapshot.latest_application(student_id) else {
            return Err(Error::NotFound(format!(
                "Student {} has no application on drive {}",
                student_id, command.target_id
            )));
        };
        // A withdrawn application has already left the drive.
        if !application.status.occupies_slot() {
            return Ok(new_report(command, MutationOutcome::UNCHANGED));
        }

        let outcome = self
            .placements
            .set_application_status(
                command.target_id,
                student_id,
                &REMOVABLE_APPLICATIONS,
                ApplicationStatus::Removed,
                Writer::Moderator,
            )
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Student {} has no active application on drive {}",
                student_id, command.target_id
            )));
        }

        let report = new_report(command, outcome);
        if !outcome.is_effective() {
            return Ok(report);
        }

        let event = FanOutEvent::new(
            NotificationType::CandidateRemoved,
            drive_source(&snapshot),
            "Application removed",
            with_reason(
                format!(
                    "Your application for {} was removed by an administrator.",
                    snapshot.label()
                ),
                audit,
            ),
        )
        .to(vec![student_id.to_string()]);
        Ok(self.notify(report, event).await)
    }

    async fn remove_from_schedule(
        &self,
        command: &ModerationCommand,
        audit: &ModerationAudit,
    ) -> Result<ModerationReport> {
        let student_id = candidate_id(command)?;
        let snapshot = self.load_schedule(command.target_id).await?;
        if snapshot.candidate(student_id).is_none() {
            return Err(Error::NotFound(format!(
                "Student {} is not a candidate on schedule {}",
                student_id, command.target_id
            )));
        }

        let outcome = self
            .placements
            .set_candidate_status(
                command.target_id,
                student_id,
                &CandidateStatus::REMOVABLE,
                CandidateStatus::Removed,
                Writer::Moderator,
            )
            .await?;
        if outcome.is_missing() {
            return Err(Error::NotFound(format!(
                "Student {} is not a candidate on schedule {}",
                student_id, command.target_id
            )));
        }

        let report = new_report(command, outcome);
        if !outcome.is_effective() {
            return Ok(report);
        }

        let event = FanOutEvent::new(
            NotificationType::CandidateRemoved,
            schedule_source(&snapshot),
            "Removed from interview",
            with_reason(
                format!(
                    "You were removed from the {} by an administrator.",
                    snapshot.label()
                ),
                audit,
            ),
        )
        .to(vec![student_id.to_string()]);
        Ok(self.notify(report, event).await)
    }
}

fn validate(command: &ModerationCommand) -> Result<ModerationAudit> {
    if command.admin.id.trim().is_empty() || command.admin.name.trim().is_empty() {
        return Err(Error::BadRequest(
            "adminId and adminName are required".to_string(),
        ));
    }

    let reason = command
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    if reason.is_none() && command.action.requires_reason() {
        return Err(Error::BadRequest(format!(
            "A reason is required for {}",
            command.action
        )));
    }

    if command.action.targets_candidate() {
        candidate_id(command)?;
    }

    Ok(ModerationAudit {
        admin_id: command.admin.id.clone(),
        admin_name: command.admin.name.clone(),
        reason,
        timestamp: Utc::now(),
    })
}

fn candidate_id(command: &ModerationCommand) -> Result<&str> {
    command
        .student_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::BadRequest(format!("{} needs a student id", command.action)))
}

fn new_report(command: &ModerationCommand, outcome: MutationOutcome) -> ModerationReport {
    ModerationReport {
        action: command.action,
        target_id: command.target_id,
        student_id: command.student_id.clone(),
        outcome,
        notified: 0,
        warning: None,
    }
}

fn with_reason(message: String, audit: &ModerationAudit) -> String {
    match &audit.reason {
        Some(reason) => format!("{} Reason: {}", message, reason),
        None => message,
    }
}

fn reason_suffix(command: &ModerationCommand) -> String {
    command
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!(" Reason: {}", r))
        .unwrap_or_default()
}

fn drive_event(command: &ModerationCommand, snapshot: &JobDrive) -> FanOutEvent {
    let source = drive_source(snapshot);
    let label = snapshot.label();
    let suffix = reason_suffix(command);

    match command.action {
        ModerationAction::DeleteDrive => FanOutEvent::new(
            NotificationType::JobDriveDeleted,
            source,
            "Job drive removed",
            format!("{} has been removed by an administrator.{}", label, suffix),
        )
        .to(drive_moderation_recipients(snapshot)),
        ModerationAction::UnblockDrive => FanOutEvent::new(
            NotificationType::AdminAction,
            source,
            "Job drive restored",
            format!("{} has been unblocked and is visible again.", label),
        )
        .to(vec![snapshot.recruiter_id.clone()]),
        _ => FanOutEvent::new(
            NotificationType::JobDriveBlocked,
            source,
            "Job drive blocked",
            format!("{} has been blocked by an administrator.{}", label, suffix),
        )
        .to(drive_moderation_recipients(snapshot)),
    }
}

fn schedule_event(command: &ModerationCommand, snapshot: &InterviewSchedule) -> FanOutEvent {
    let source = schedule_source(snapshot);
    let label = snapshot.label();

    match command.action {
        ModerationAction::UnblockSchedule => FanOutEvent::new(
            NotificationType::AdminAction,
            source,
            "Interview restored",
            format!("The {} has been unblocked.", label),
        )
        .to(vec![snapshot.recruiter_id.clone()]),
        _ => FanOutEvent::new(
            NotificationType::InterviewBlocked,
            source,
            "Interview blocked",
            format!(
                "The {} has been blocked by an administrator and will not take place.{}",
                label,
                reason_suffix(command)
            ),
        )
        .to(schedule_moderation_recipients(snapshot)),
    }
}
