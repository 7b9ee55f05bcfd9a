pub mod applicant;
pub mod auth;
pub mod recruitment;
