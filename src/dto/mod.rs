pub mod drive_dto;
pub mod moderation_dto;
pub mod notification_dto;
pub mod schedule_dto;
