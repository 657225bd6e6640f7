use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::notification_dto::{
        NotificationListQuery, NotificationListResponse, NotificationUpdateResponse,
        UnreadCountResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

fn ensure_reader(claims: &Claims, uid: &str) -> Result<()> {
    if claims.sub == uid || claims.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Notifications can only be read by their recipient".to_string(),
        ))
    }
}

#[utoipa::path(
    get,
    path = "/notifications/{uid}",
    params(("uid" = String, Path, description = "Recipient uid"), NotificationListQuery),
    responses(
        (status = 200, description = "Newest first", body = NotificationListResponse),
        (status = 403, description = "Not the recipient")
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<String>,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse> {
    ensure_reader(&claims, &uid)?;
    let data = state.notification_service.list(&uid, query.limit).await?;
    Ok(Json(NotificationListResponse {
        success: true,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/notifications/{uid}/unread-count",
    params(("uid" = String, Path, description = "Recipient uid")),
    responses((status = 200, description = "Unread notifications", body = UnreadCountResponse))
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse> {
    ensure_reader(&claims, &uid)?;
    let count = state.notification_service.unread_count(&uid).await?;
    Ok(Json(UnreadCountResponse {
        success: true,
        count,
    }))
}

#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = NotificationUpdateResponse),
        (status = 404, description = "Not found for this recipient")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let changed = state.notification_service.mark_read(id, &claims.sub).await?;
    Ok(Json(NotificationUpdateResponse {
        success: true,
        modified_count: u64::from(changed),
    }))
}

#[utoipa::path(
    put,
    path = "/notifications/{uid}/read-all",
    params(("uid" = String, Path, description = "Recipient uid")),
    responses(
        (status = 200, description = "All marked read", body = NotificationUpdateResponse),
        (status = 403, description = "Not the recipient")
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse> {
    if claims.sub != uid {
        return Err(Error::Forbidden(
            "Notifications can only be updated by their recipient".to_string(),
        ));
    }
    let modified_count = state.notification_service.mark_all_read(&uid).await?;
    Ok(Json(NotificationUpdateResponse {
        success: true,
        modified_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Deleted", body = NotificationUpdateResponse),
        (status = 404, description = "Not found for this recipient")
    )
)]
#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.notification_service.delete(id, &claims.sub).await?;
    Ok(Json(NotificationUpdateResponse {
        success: true,
        modified_count: 1,
    }))
}
