pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::database::{NotificationStore, PlacementStore};
use crate::services::{
    application_service::ApplicationService, context_service::ContextService,
    drive_service::DriveService, fanout_service::FanOutService,
    moderation_service::ModerationService, notification_service::NotificationService,
    schedule_service::ScheduleService,
};

#[derive(Clone)]
pub struct AppState {
    pub placements: Arc<dyn PlacementStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub moderation_service: ModerationService,
    pub application_service: ApplicationService,
    pub drive_service: DriveService,
    pub schedule_service: ScheduleService,
    pub notification_service: NotificationService,
    pub context_service: ContextService,
}

impl AppState {
    pub fn new(
        placements: Arc<dyn PlacementStore>,
        notifications: Arc<dyn NotificationStore>,
        notification_page_limit: i64,
    ) -> Self {
        let fanout = FanOutService::new(notifications.clone());

        let moderation_service = ModerationService::new(placements.clone(), fanout.clone());
        let application_service = ApplicationService::new(placements.clone(), fanout.clone());
        let drive_service = DriveService::new(placements.clone());
        let schedule_service = ScheduleService::new(placements.clone(), fanout);
        let notification_service =
            NotificationService::new(notifications.clone(), notification_page_limit);
        let context_service = ContextService::new(placements.clone());

        Self {
            placements,
            notifications,
            moderation_service,
            application_service,
            drive_service,
            schedule_service,
            notification_service,
            context_service,
        }
    }
}
