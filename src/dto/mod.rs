pub mod console_dto;
pub mod realtime_dto;
pub mod webhook_dto;
