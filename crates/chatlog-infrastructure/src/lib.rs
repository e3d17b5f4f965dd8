pub mod config_service;
pub mod json_log_repository;
pub mod logging;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_log_repository::JsonLogRepository;
pub use crate::paths::ChatlogPaths;
