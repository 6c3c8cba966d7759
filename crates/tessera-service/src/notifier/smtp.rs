//! SMTP delivery of verification codes.

use super::OtpNotifier;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tessera_config::{SmtpConfig, SmtpEncryption};
use tessera_core::{Otp, TesseraError, TesseraResult};

const SERVICE: &str = "smtp";

fn smtp_error(message: impl Into<String>) -> TesseraError {
    TesseraError::ExternalService {
        service: SERVICE.to_string(),
        message: message.into(),
    }
}

/// Mails codes through an SMTP relay.
pub struct SmtpOtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpOtpNotifier {
    /// Builds the transport from the SMTP section.
    pub fn from_config(config: &SmtpConfig) -> TesseraResult<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = match config.encryption {
            SmtpEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| TesseraError::Configuration(format!("SMTP relay error: {e}")))?
                .port(config.port)
                .credentials(credentials)
                .build(),
            SmtpEncryption::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| {
                        TesseraError::Configuration(format!("SMTP starttls error: {e}"))
                    })?
                    .port(config.port)
                    .credentials(credentials)
                    .build()
            }
            SmtpEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                    .port(config.port)
                    .credentials(credentials)
                    .build()
            }
        };

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| TesseraError::Configuration(format!("Invalid from address: {e}")))?;

        Ok(Self { mailer, from })
    }

    fn build_message(&self, otp: &Otp) -> TesseraResult<Message> {
        let to: Mailbox = otp
            .email
            .as_str()
            .parse()
            .map_err(|e| smtp_error(format!("Invalid to address: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your verification code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your verification code is {}.\n\n\
                 Enter it to activate your account.\n\
                 If you did not sign up, you can ignore this message.\n",
                otp.code
            ))
            .map_err(|e| smtp_error(e.to_string()))
    }
}

#[async_trait]
impl OtpNotifier for SmtpOtpNotifier {
    async fn send_otp(&self, otp: &Otp) -> TesseraResult<()> {
        let message = self.build_message(otp)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| smtp_error(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for SmtpOtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpOtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Email;

    fn config() -> SmtpConfig {
        SmtpConfig {
            enabled: true,
            host: "localhost".to_string(),
            port: 2525,
            from_email: "noreply@example.com".to_string(),
            from_name: "Tessera".to_string(),
            encryption: SmtpEncryption::None,
            ..SmtpConfig::default()
        }
    }

    #[test]
    fn test_message_carries_code() {
        let notifier = SmtpOtpNotifier::from_config(&config()).unwrap();
        let otp = Otp::new(Email::new("a@x.com").unwrap(), "123456");

        let message = notifier.build_message(&otp).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("123456"));
        assert!(raw.contains("a@x.com"));
    }

    #[test]
    fn test_invalid_sender_rejected() {
        let mut config = config();
        config.from_email = "not an address".to_string();
        assert!(SmtpOtpNotifier::from_config(&config).is_err());
    }
}
