//! Delivery of one-time codes to account owners.

mod log;
mod smtp;

pub use self::log::LogOtpNotifier;
pub use smtp::SmtpOtpNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use tessera_core::{Interface, Otp, TesseraResult};
use tracing::{debug, warn};

/// Sends a one-time code to the address it was issued for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpNotifier: Interface + Send + Sync {
    async fn send_otp(&self, otp: &Otp) -> TesseraResult<()>;
}

/// Sends `otp` on a background task without waiting for delivery.
///
/// Failures are logged and dropped; a crash before delivery loses the
/// message and the user has to request a new code.
pub fn dispatch_otp(notifier: Arc<dyn OtpNotifier>, otp: Otp) {
    tokio::spawn(async move {
        match notifier.send_otp(&otp).await {
            Ok(()) => debug!("OTP delivered to {}", otp.email),
            Err(e) => warn!(email = %otp.email, error = %e, "Failed to deliver OTP"),
        }
    });
}
