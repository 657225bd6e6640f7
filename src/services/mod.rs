pub mod application_service;
pub mod context_service;
pub mod drive_service;
pub mod fanout_service;
pub mod moderation_service;
pub mod notification_service;
pub mod relay_service;
pub mod schedule_service;
pub mod visibility;
