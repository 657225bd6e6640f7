use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::notification::Notification;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationListQuery {
    /// Page size, clamped to 1..=200.
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub success: bool,
    pub data: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub success: bool,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpdateResponse {
    pub success: bool,
    pub modified_count: u64,
}
