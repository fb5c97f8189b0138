//! Event dispatch pipeline: block logs are interpreted into token, role, deploy, delegation and
//! status findings, and rendered for the logs and events indices.

mod interpreters;
mod logs_data;
mod processor;
pub mod schemas;
mod status_info;

pub use processor::LogsAndEventsProcessor;
