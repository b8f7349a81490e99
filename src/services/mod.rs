pub mod analytics_service;
pub mod history_service;
pub mod metrics_service;
pub mod quiz_session;
pub mod timer;
