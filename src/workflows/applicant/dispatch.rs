use std::sync::Arc;

use tracing::{info, warn};

use super::domain::Application;
use super::outbox::{NotificationBatch, NotificationOutbox};

/// Contract with the external email collaborator. Fire-and-forget from the
/// core's point of view.
pub trait EmailGateway: Send + Sync {
    fn send(&self, application: &Application, recruitment_title: &str) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email gateway rejected message to {recipient}: {reason}")]
    Rejected { recipient: String, reason: String },
    #[error("email transport unavailable: {0}")]
    Transport(String),
}

/// Delivery counts for one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn absorb(&mut self, other: DispatchReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Fans committed notification batches out to the email gateway, one message
/// per application. Recipients are independent: a failed delivery is logged
/// and skipped, never retried, and never unwinds the announced state.
pub struct NotificationDispatcher<G, O> {
    gateway: Arc<G>,
    outbox: Arc<O>,
}

impl<G, O> NotificationDispatcher<G, O>
where
    G: EmailGateway + 'static,
    O: NotificationOutbox + 'static,
{
    pub fn new(gateway: Arc<G>, outbox: Arc<O>) -> Self {
        Self { gateway, outbox }
    }

    /// Drains every staged batch and delivers it.
    pub fn dispatch_pending(&self) -> DispatchReport {
        let mut report = DispatchReport::default();
        for batch in self.outbox.drain() {
            report.absorb(self.dispatch(&batch));
        }
        report
    }

    pub fn dispatch(&self, batch: &NotificationBatch) -> DispatchReport {
        let mut report = DispatchReport::default();
        for application in &batch.applications {
            match self.gateway.send(application, &batch.recruitment_title) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(
                        application = %application.id,
                        recruitment = %batch.recruitment_id,
                        error = %err,
                        "outcome email delivery failed"
                    );
                    report.failed += 1;
                }
            }
        }
        info!(
            recruitment = %batch.recruitment_id,
            delivered = report.delivered,
            failed = report.failed,
            "notification batch dispatched"
        );
        report
    }
}

/// Gateway used by the demo server: logs each message instead of sending it.
#[derive(Default)]
pub struct LoggingEmailGateway;

impl EmailGateway for LoggingEmailGateway {
    fn send(&self, application: &Application, recruitment_title: &str) -> Result<(), EmailError> {
        info!(
            recipient = %application.applicant_email,
            outcome = %application.outcome,
            recruitment = %recruitment_title,
            "outcome email"
        );
        Ok(())
    }
}
