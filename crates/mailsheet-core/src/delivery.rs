//! Hand-off of prepared messages to a delivery sink.

use tracing::{info, warn};

use mailsheet_model::{FailurePolicy, PreparedMessage};

use crate::error::{BoxError, CoreError, Result};

/// Transport that delivers one message at a time.
pub trait DeliverySink {
    /// Sends `message`.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn send(&mut self, message: &PreparedMessage) -> std::result::Result<(), BoxError>;
}

/// A message the sink rejected under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct FailedDelivery {
    pub row: usize,
    pub recipients: Vec<String>,
    pub error: BoxError,
}

/// Outcome of a dispatch run.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub sent: usize,
    /// Rows whose message had no recipient and was not handed to the sink.
    pub without_recipients: Vec<usize>,
    pub failed: Vec<FailedDelivery>,
}

/// Sends `messages` in order through `sink`.
///
/// `on_progress` is called after each message, whatever its outcome.
///
/// # Errors
///
/// Under [`FailurePolicy::FailFast`], returns [`CoreError::Delivery`] for the
/// first rejected message.
pub fn dispatch<S, F>(
    messages: &[PreparedMessage],
    sink: &mut S,
    policy: FailurePolicy,
    mut on_progress: F,
) -> Result<DeliveryReport>
where
    S: DeliverySink + ?Sized,
    F: FnMut(&PreparedMessage),
{
    let mut report = DeliveryReport::default();
    for message in messages {
        if !message.has_recipients() {
            warn!(row = message.row, "message has no recipients, not sent");
            report.without_recipients.push(message.row);
            on_progress(message);
            continue;
        }
        match sink.send(message) {
            Ok(()) => report.sent += 1,
            Err(error) => {
                let recipients: Vec<String> =
                    message.recipients().map(str::to_string).collect();
                if policy == FailurePolicy::FailFast {
                    return Err(CoreError::Delivery {
                        row: message.row,
                        recipients: recipients.join(", "),
                        sent: report.sent,
                        source: error,
                    });
                }
                warn!(row = message.row, %error, "delivery failed");
                report.failed.push(FailedDelivery {
                    row: message.row,
                    recipients,
                    error,
                });
            }
        }
        on_progress(message);
    }
    info!(
        sent = report.sent,
        failed = report.failed.len(),
        without_recipients = report.without_recipients.len(),
        "dispatch complete"
    );
    Ok(report)
}
