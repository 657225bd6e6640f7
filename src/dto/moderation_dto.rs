use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::services::fanout_service::FanOutPartialFailure;
use crate::services::moderation_service::{ModerationAction, ModerationReport};

/// Admin identity may come from the body; the token fills in what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationPayload {
    #[validate(length(min = 1, max = 128))]
    pub admin_id: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub admin_name: Option<String>,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModerationQuery {
    /// Report an idempotent no-op as 409 instead of `modifiedCount: 0`.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponse {
    pub success: bool,
    pub action: ModerationAction,
    pub target_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub matched_count: u64,
    pub modified_count: u64,
    pub notified: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<FanOutPartialFailure>,
}

impl From<ModerationReport> for ModerationResponse {
    fn from(report: ModerationReport) -> Self {
        Self {
            success: true,
            action: report.action,
            target_id: report.target_id,
            student_id: report.student_id,
            matched_count: report.outcome.matched,
            modified_count: report.outcome.modified,
            notified: report.notified,
            warning: report.warning,
        }
    }
}
