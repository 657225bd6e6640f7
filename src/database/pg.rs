use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::store::{NotificationStore, PlacementStore, Writer};
use crate::error::{is_active_application_conflict, Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job_drive::{DriveModeration, DriveStatus, JobDrive};
use crate::models::moderation::{ModerationAudit, ModerationKind, MutationOutcome};
use crate::models::notification::{Notification, NotificationType, Priority, SourceKind, SourceRef};
use crate::models::schedule::{
    CandidateStatus, InterviewSchedule, ScheduleCandidate, ScheduleModeration, ScheduleStatus,
};

const DRIVE_COLUMNS: &str = "id, recruiter_id, company, position, salary, location, drive_date, \
    application_deadline, eligibility_criteria, status, moderation, moderation_audit, created_at, updated_at";

const APPLICATION_COLUMNS: &str =
    "id, drive_id, student_id, student_name, student_email, status, application_date, updated_at";

const SCHEDULE_COLUMNS: &str = "id, recruiter_id, company, position, interview_date, interview_time, \
    platform, venue, meeting_link, status, moderation, moderation_audit, created_at, updated_at";

/// Moderation as readers see it. Rows written before the moderation column
/// existed carry `blocked`/`deleted` in `status` instead.
const EFFECTIVE_MODERATION: &str =
    "CASE WHEN moderation = 'none' AND status IN ('blocked', 'deleted') THEN status ELSE moderation END";

const NOTIFICATION_COLUMNS: &str =
    "id, recipient_uid, kind, title, message, priority, source_kind, source_id, read, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    relay_target: Option<String>,
}

impl PgStore {
    pub fn new(pool: PgPool, relay_target: Option<String>) -> Self {
        Self { pool, relay_target }
    }

    async fn applications_for(&self, drive_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Application>>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM drive_applications WHERE drive_id = ANY($1) ORDER BY application_date ASC",
            APPLICATION_COLUMNS
        ))
        .bind(drive_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Application>> = HashMap::new();
        for row in rows {
            let application = row.into_application()?;
            grouped.entry(application.drive_id).or_default().push(application);
        }
        Ok(grouped)
    }

    async fn schedule_frozen(&self, id: Uuid) -> Result<bool> {
        let frozen: Option<(bool,)> =
            sqlx::query_as("SELECT moderation <> 'none' FROM interview_schedules WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(frozen.map(|(f,)| f).unwrap_or(false))
    }

    async fn candidates_for(
        &self,
        schedule_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ScheduleCandidate>>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT schedule_id, student_id, student_name, student_email, status
            FROM schedule_candidates
            WHERE schedule_id = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(schedule_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ScheduleCandidate>> = HashMap::new();
        for row in rows {
            let schedule_id = row.schedule_id;
            grouped
                .entry(schedule_id)
                .or_default()
                .push(row.into_candidate()?);
        }
        Ok(grouped)
    }
}

fn kinds(from: &[ModerationKind]) -> Vec<String> {
    from.iter().map(|k| k.as_str().to_string()).collect()
}

fn to_outcome((matched, modified): (i64, i64)) -> MutationOutcome {
    MutationOutcome {
        matched: matched.max(0) as u64,
        modified: modified.max(0) as u64,
    }
}

/// Outcome of a child write whose parent row was share-locked and checked.
fn guarded_outcome(
    (matched, modified, frozen): (i64, i64, bool),
    writer: Writer,
    what: &str,
    id: Uuid,
) -> Result<MutationOutcome> {
    if frozen && writer == Writer::Participant {
        return Err(Error::LifecycleLocked(format!("{} {} has been moderated", what, id)));
    }
    Ok(to_outcome((matched, modified)))
}

#[async_trait]
impl PlacementStore for PgStore {
    async fn insert_drive(&self, drive: JobDrive) -> Result<JobDrive> {
        sqlx::query(
            r#"
            INSERT INTO job_drives (
                id, recruiter_id, company, position, salary, location, drive_date,
                application_deadline, eligibility_criteria, status, moderation,
                moderation_audit, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
            "#,
        )
        .bind(drive.id)
        .bind(&drive.recruiter_id)
        .bind(&drive.company)
        .bind(&drive.position)
        .bind(drive.salary)
        .bind(&drive.location)
        .bind(drive.date)
        .bind(drive.application_deadline)
        .bind(&drive.eligibility_criteria)
        .bind(drive.status.as_str())
        .bind(drive.moderation.kind().as_str())
        .bind(drive.moderation.audit().cloned().map(Json))
        .bind(drive.created_at)
        .bind(drive.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(drive)
    }

    async fn find_drive(&self, id: Uuid) -> Result<Option<JobDrive>> {
        let row = sqlx::query_as::<_, DriveRow>(&format!(
            "SELECT {} FROM job_drives WHERE id = $1",
            DRIVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let mut applications = self.applications_for(&[id]).await?;
        Ok(Some(row.into_drive(applications.remove(&id).unwrap_or_default())?))
    }

    async fn list_drives(&self) -> Result<Vec<JobDrive>> {
        let rows = sqlx::query_as::<_, DriveRow>(&format!(
            "SELECT {} FROM job_drives ORDER BY created_at DESC",
            DRIVE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut applications = self.applications_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let apps = applications.remove(&row.id).unwrap_or_default();
                row.into_drive(apps)
            })
            .collect()
    }

    async fn set_drive_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: DriveModeration,
    ) -> Result<MutationOutcome> {
        // Legacy status values are folded into the moderation column on write.
        let sql = format!(
            r#"
            WITH target AS (SELECT id FROM job_drives WHERE id = $1),
            changed AS (
                UPDATE job_drives
                SET moderation = $2, moderation_audit = $3, updated_at = NOW(),
                    status = CASE WHEN status IN ('blocked', 'deleted') THEN 'active' ELSE status END
                WHERE id = $1 AND ({}) = ANY($4)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed)
            "#,
            EFFECTIVE_MODERATION
        );
        let query = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(id)
            .bind(to.kind().as_str())
            .bind(to.audit().cloned().map(Json))
            .bind(kinds(from));
        Ok(to_outcome(query.fetch_one(&self.pool).await?))
    }

    async fn set_drive_status(
        &self,
        id: Uuid,
        from: &[DriveStatus],
        to: DriveStatus,
    ) -> Result<MutationOutcome> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let query = sqlx::query_as::<_, (i64, i64)>(
            r#"
            WITH target AS (SELECT id FROM job_drives WHERE id = $1),
            changed AS (
                UPDATE job_drives SET status = $2, updated_at = NOW()
                WHERE id = $1 AND status = ANY($3)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed)
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(from);
        Ok(to_outcome(query.fetch_one(&self.pool).await?))
    }

    async fn insert_application(&self, application: Application) -> Result<Application> {
        let sql = format!(
            r#"
            WITH open_drive AS (
                SELECT id FROM job_drives
                WHERE id = $2 AND ({}) = 'none' AND status <> 'completed'
                  AND application_deadline >= NOW()
                FOR SHARE
            )
            INSERT INTO drive_applications (
                id, drive_id, student_id, student_name, student_email, status,
                application_date, updated_at
            )
            SELECT $1, open_drive.id, $3, $4, $5, $6, $7, $8 FROM open_drive
            "#,
            EFFECTIVE_MODERATION
        );
        let res = sqlx::query(&sql)
        .bind(application.id)
        .bind(application.drive_id)
        .bind(&application.student_id)
        .bind(&application.student_name)
        .bind(&application.student_email)
        .bind(application.status.as_str())
        .bind(application.application_date)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) if done.rows_affected() == 0 => {
                let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM job_drives WHERE id = $1")
                    .bind(application.drive_id)
                    .fetch_optional(&self.pool)
                    .await?;
                Err(match exists {
                    Some(_) => Error::LifecycleLocked(format!(
                        "Job drive {} is closed for applications",
                        application.drive_id
                    )),
                    None => Error::NotFound(format!("Job drive {}", application.drive_id)),
                })
            }
            Ok(_) => Ok(application),
            Err(err) if is_active_application_conflict(&err) => Err(Error::DuplicateApplication {
                student_id: application.student_id,
                drive_id: application.drive_id,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_application_status(
        &self,
        drive_id: Uuid,
        student_id: &str,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        writer: Writer,
    ) -> Result<MutationOutcome> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        // The share lock on the drive row orders this write against a concurrent
        // moderation update of the same drive.
        let sql = format!(
            r#"
            WITH drive AS (
                SELECT id, ({}) <> 'none' AS frozen FROM job_drives WHERE id = $1 FOR SHARE
            ),
            target AS (
                SELECT id FROM drive_applications
                WHERE drive_id = $1 AND student_id = $2 AND status <> 'withdrawn'
            ),
            changed AS (
                UPDATE drive_applications SET status = $3, updated_at = NOW()
                WHERE id IN (SELECT id FROM target) AND status = ANY($4)
                  AND EXISTS (SELECT 1 FROM drive WHERE $5 OR NOT frozen)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed),
                   COALESCE((SELECT frozen FROM drive), FALSE)
            "#,
            EFFECTIVE_MODERATION
        );
        let row = sqlx::query_as::<_, (i64, i64, bool)>(&sql)
            .bind(drive_id)
            .bind(student_id)
            .bind(to.as_str())
            .bind(from)
            .bind(writer == Writer::Moderator)
            .fetch_one(&self.pool)
            .await?;
        guarded_outcome(row, writer, "Job drive", drive_id)
    }

    async fn insert_schedule(&self, schedule: InterviewSchedule) -> Result<InterviewSchedule> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO interview_schedules (
                id, recruiter_id, company, position, interview_date, interview_time,
                platform, venue, meeting_link, status, moderation, moderation_audit,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
            "#,
        )
        .bind(schedule.id)
        .bind(&schedule.recruiter_id)
        .bind(&schedule.company)
        .bind(&schedule.position)
        .bind(schedule.date)
        .bind(schedule.time)
        .bind(&schedule.platform)
        .bind(&schedule.venue)
        .bind(&schedule.meeting_link)
        .bind(schedule.status.as_str())
        .bind(schedule.moderation.kind().as_str())
        .bind(schedule.moderation.audit().cloned().map(Json))
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&mut *tx)
        .await?;

        for (seq, candidate) in schedule.candidates.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO schedule_candidates (
                    schedule_id, student_id, student_name, student_email, status, seq
                ) VALUES ($1,$2,$3,$4,$5,$6)
                "#,
            )
            .bind(schedule.id)
            .bind(&candidate.student_id)
            .bind(&candidate.student_name)
            .bind(&candidate.student_email)
            .bind(candidate.status.as_str())
            .bind(seq as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(schedule)
    }

    async fn find_schedule(&self, id: Uuid) -> Result<Option<InterviewSchedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {} FROM interview_schedules WHERE id = $1",
            SCHEDULE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let mut candidates = self.candidates_for(&[id]).await?;
        Ok(Some(row.into_schedule(candidates.remove(&id).unwrap_or_default())?))
    }

    async fn list_schedules(&self) -> Result<Vec<InterviewSchedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {} FROM interview_schedules ORDER BY interview_date ASC, interview_time ASC",
            SCHEDULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut candidates = self.candidates_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let list = candidates.remove(&row.id).unwrap_or_default();
                row.into_schedule(list)
            })
            .collect()
    }

    async fn set_schedule_moderation(
        &self,
        id: Uuid,
        from: &[ModerationKind],
        to: ScheduleModeration,
    ) -> Result<MutationOutcome> {
        let query = sqlx::query_as::<_, (i64, i64)>(
            r#"
            WITH target AS (SELECT id FROM interview_schedules WHERE id = $1),
            changed AS (
                UPDATE interview_schedules
                SET moderation = $2, moderation_audit = $3, updated_at = NOW()
                WHERE id = $1 AND moderation = ANY($4)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed)
            "#,
        )
        .bind(id)
        .bind(to.kind().as_str())
        .bind(to.audit().cloned().map(Json))
        .bind(kinds(from));
        Ok(to_outcome(query.fetch_one(&self.pool).await?))
    }

    async fn set_schedule_status(
        &self,
        id: Uuid,
        from: &[ScheduleStatus],
        to: ScheduleStatus,
    ) -> Result<MutationOutcome> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let row = sqlx::query_as::<_, (i64, i64, bool)>(
            r#"
            WITH target AS (
                SELECT id, moderation <> 'none' AS frozen FROM interview_schedules WHERE id = $1
            ),
            changed AS (
                UPDATE interview_schedules SET status = $2, updated_at = NOW()
                WHERE id = $1 AND status = ANY($3) AND moderation = 'none'
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed),
                   COALESCE((SELECT frozen FROM target), FALSE)
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(from)
        .fetch_one(&self.pool)
        .await?;
        let (matched, modified, frozen) = row;
        // A block that commits first makes the update match nothing.
        if frozen || (matched > 0 && modified == 0 && self.schedule_frozen(id).await?) {
            return Err(Error::LifecycleLocked(format!(
                "Interview schedule {} has been moderated",
                id
            )));
        }
        Ok(to_outcome((matched, modified)))
    }

    async fn set_candidate_status(
        &self,
        schedule_id: Uuid,
        student_id: &str,
        from: &[CandidateStatus],
        to: CandidateStatus,
        writer: Writer,
    ) -> Result<MutationOutcome> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let row = sqlx::query_as::<_, (i64, i64, bool)>(
            r#"
            WITH schedule AS (
                SELECT id, moderation <> 'none' AS frozen
                FROM interview_schedules WHERE id = $1 FOR SHARE
            ),
            target AS (
                SELECT schedule_id FROM schedule_candidates
                WHERE schedule_id = $1 AND student_id = $2
            ),
            changed AS (
                UPDATE schedule_candidates SET status = $3
                WHERE schedule_id = $1 AND student_id = $2 AND status = ANY($4)
                  AND EXISTS (SELECT 1 FROM schedule WHERE $5 OR NOT frozen)
                RETURNING schedule_id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed),
                   COALESCE((SELECT frozen FROM schedule), FALSE)
            "#,
        )
        .bind(schedule_id)
        .bind(student_id)
        .bind(to.as_str())
        .bind(from)
        .bind(writer == Writer::Moderator)
        .fetch_one(&self.pool)
        .await?;
        guarded_outcome(row, writer, "Interview schedule", schedule_id)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(&self, notification: Notification) -> Result<Notification> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_uid, kind, title, message, priority, source_kind, source_id,
                read, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            "#,
        )
        .bind(notification.id)
        .bind(&notification.recipient_firebase_uid)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.priority.as_str())
        .bind(notification.source.map(|s| s.kind.as_str()))
        .bind(notification.source.map(|s| s.id))
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&mut *tx)
        .await?;

        if let Some(target_url) = &self.relay_target {
            sqlx::query(
                r#"
                INSERT INTO webhook_logs (id, event_type, payload, target_url, status)
                VALUES ($1, 'notification.created', $2, $3, 'pending')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(json!({ "notification": &notification }))
            .bind(target_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        recipient_uid: &str,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE recipient_uid = $1 ORDER BY created_at DESC LIMIT $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(recipient_uid)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(NotificationRow::into_notification).collect()
    }

    async fn unread_count(&self, recipient_uid: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_uid = $1 AND read = FALSE",
        )
        .bind(recipient_uid)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn mark_read(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome> {
        let query = sqlx::query_as::<_, (i64, i64)>(
            r#"
            WITH target AS (
                SELECT id FROM notifications WHERE id = $1 AND recipient_uid = $2
            ),
            changed AS (
                UPDATE notifications SET read = TRUE
                WHERE id = $1 AND recipient_uid = $2 AND read = FALSE
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM changed)
            "#,
        )
        .bind(id)
        .bind(recipient_uid);
        Ok(to_outcome(query.fetch_one(&self.pool).await?))
    }

    async fn mark_all_read(&self, recipient_uid: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_uid = $1 AND read = FALSE",
        )
        .bind(recipient_uid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: Uuid, recipient_uid: &str) -> Result<MutationOutcome> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_uid = $2")
            .bind(id)
            .bind(recipient_uid)
            .execute(&self.pool)
            .await?;
        Ok(match result.rows_affected() {
            0 => MutationOutcome::MISSING,
            _ => MutationOutcome::APPLIED,
        })
    }
}

#[derive(Debug, FromRow)]
struct DriveRow {
    id: Uuid,
    recruiter_id: String,
    company: String,
    position: String,
    salary: Option<Decimal>,
    location: String,
    drive_date: DateTime<Utc>,
    application_deadline: DateTime<Utc>,
    eligibility_criteria: Option<String>,
    status: String,
    moderation: String,
    moderation_audit: Option<Json<ModerationAudit>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DriveRow {
    fn into_drive(self, applications: Vec<Application>) -> Result<JobDrive> {
        let moderation = DriveModeration::from_columns(
            &self.moderation,
            &self.status,
            self.moderation_audit.map(|j| j.0),
        )?;
        let status = match DriveStatus::parse(&self.status) {
            Some(status) => status,
            None if moderation != DriveModeration::None => DriveStatus::Active,
            None => return Err(corrupt("drive status", &self.status)),
        };

        Ok(JobDrive {
            id: self.id,
            recruiter_id: self.recruiter_id,
            company: self.company,
            position: self.position,
            salary: self.salary,
            location: self.location,
            date: self.drive_date,
            application_deadline: self.application_deadline,
            eligibility_criteria: self.eligibility_criteria,
            status,
            moderation,
            applications,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    drive_id: Uuid,
    student_id: String,
    student_name: String,
    student_email: String,
    status: String,
    application_date: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    fn into_application(self) -> Result<Application> {
        let status = ApplicationStatus::parse(&self.status)
            .ok_or_else(|| corrupt("application status", &self.status))?;
        Ok(Application {
            id: self.id,
            drive_id: self.drive_id,
            student_id: self.student_id,
            student_name: self.student_name,
            student_email: self.student_email,
            status,
            application_date: self.application_date,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    id: Uuid,
    recruiter_id: String,
    company: String,
    position: String,
    interview_date: NaiveDate,
    interview_time: NaiveTime,
    platform: String,
    venue: Option<String>,
    meeting_link: Option<String>,
    status: String,
    moderation: String,
    moderation_audit: Option<Json<ModerationAudit>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ScheduleRow {
    fn into_schedule(self, candidates: Vec<ScheduleCandidate>) -> Result<InterviewSchedule> {
        let status = ScheduleStatus::parse(&self.status)
            .ok_or_else(|| corrupt("schedule status", &self.status))?;
        let moderation = match ModerationKind::parse(&self.moderation) {
            Some(ModerationKind::None) => ScheduleModeration::None,
            Some(ModerationKind::Blocked) => ScheduleModeration::Blocked(
                self.moderation_audit
                    .map(|j| j.0)
                    .unwrap_or_else(ModerationAudit::unknown),
            ),
            _ => return Err(corrupt("schedule moderation", &self.moderation)),
        };

        Ok(InterviewSchedule {
            id: self.id,
            recruiter_id: self.recruiter_id,
            company: self.company,
            position: self.position,
            date: self.interview_date,
            time: self.interview_time,
            platform: self.platform,
            venue: self.venue,
            meeting_link: self.meeting_link,
            status,
            moderation,
            candidates,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    schedule_id: Uuid,
    student_id: String,
    student_name: String,
    student_email: String,
    status: String,
}

impl CandidateRow {
    fn into_candidate(self) -> Result<ScheduleCandidate> {
        let status = CandidateStatus::parse(&self.status)
            .ok_or_else(|| corrupt("candidate status", &self.status))?;
        Ok(ScheduleCandidate {
            student_id: self.student_id,
            student_name: self.student_name,
            student_email: self.student_email,
            status,
        })
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_uid: String,
    kind: String,
    title: String,
    message: String,
    priority: String,
    source_kind: Option<String>,
    source_id: Option<Uuid>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification> {
        let kind = NotificationType::parse(&self.kind)
            .ok_or_else(|| corrupt("notification type", &self.kind))?;
        let priority = Priority::parse(&self.priority)
            .ok_or_else(|| corrupt("notification priority", &self.priority))?;
        let source = match (self.source_kind.as_deref().and_then(SourceKind::parse), self.source_id) {
            (Some(kind), Some(id)) => Some(SourceRef { kind, id }),
            _ => None,
        };

        Ok(Notification {
            id: self.id,
            recipient_firebase_uid: self.recipient_uid,
            kind,
            title: self.title,
            message: self.message,
            priority,
            source,
            read: self.read,
            created_at: self.created_at,
        })
    }
}

fn corrupt(field: &str, value: &str) -> Error {
    Error::Internal(format!("unexpected {} value '{}' in database", field, value))
}
