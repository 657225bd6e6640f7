pub mod application;
pub mod job_drive;
pub mod moderation;
pub mod notification;
pub mod schedule;
pub mod webhook_log;
