//! Application intake, outcome scoring, and the announcement fan-out.
//!
//! The announcer flips the recruitment to `Announced` at most once and
//! stages one notification batch per successful call; the dispatcher drains
//! staged batches after the store write has committed and delivers one email
//! per application, each recipient independent of the others.

pub mod announce;
pub mod dispatch;
pub mod domain;
pub mod outbox;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use announce::{AnnounceError, AnnouncementSummary, OutcomeAnnouncer};
pub use dispatch::{
    DispatchReport, EmailError, EmailGateway, LoggingEmailGateway, NotificationDispatcher,
};
pub use domain::{Answer, Application, ApplicationId, Outcome};
pub use outbox::{InMemoryOutbox, NotificationBatch, NotificationOutbox, OutboxError};
pub use repository::{ApplicationRepository, InMemoryApplications};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError, ApplicationSubmission};
