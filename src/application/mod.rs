pub mod access_policy;
pub mod app_error;
pub mod email_templates;
pub mod jwt;
pub mod password;
pub mod use_cases;
pub mod validators;
