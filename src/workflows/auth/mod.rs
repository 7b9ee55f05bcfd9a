//! Actor identities and the login workflow.
//!
//! Administrators and applicants are created lazily on first login, behind
//! store-level uniqueness. Token mechanics live outside the core: this
//! module only consumes `(subject, role)` claims from a [`TokenProvider`].

pub mod domain;
pub mod repository;
pub mod service;
pub mod token;


pub use domain::{
    Administrator, AdministratorId, Applicant, ApplicantId, AuthenticatedActor, Role,
};
pub use repository::{
    AdministratorRepository, ApplicantRepository, InMemoryAdministrators, InMemoryApplicants,
};
pub use service::{AdminSession, ApplicantSession, AuthError, AuthService};
pub use token::{TokenClaims, TokenError, TokenPair, TokenProvider};
