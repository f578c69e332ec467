pub mod application;
pub mod job_mapping;
pub mod webhook_log;
