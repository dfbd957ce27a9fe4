pub mod admin_service;
pub mod analytics;
pub mod auth_service;
pub mod dashboard_service;
pub mod lead_service;
pub mod mailer;
pub mod pipeline;
