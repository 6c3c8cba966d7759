//! Notifier that writes codes to the log instead of mailing them.

use super::OtpNotifier;
use async_trait::async_trait;
use shaku::Component;
use tessera_core::{Otp, TesseraResult};
use tracing::info;

/// Logs each code. Used when SMTP is disabled.
#[derive(Component, Debug, Default, Clone)]
#[shaku(interface = OtpNotifier)]
pub struct LogOtpNotifier;

impl LogOtpNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OtpNotifier for LogOtpNotifier {
    async fn send_otp(&self, otp: &Otp) -> TesseraResult<()> {
        info!(email = %otp.email, code = %otp.code, "[MOCK EMAIL] Verification code issued");
        Ok(())
    }
}
