//! Storage of outstanding one-time codes, keyed by email.

use crate::cache::{cache_keys, CacheInterface};
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{Email, Interface, Otp, TesseraResult};

/// Transient email → code mapping.
///
/// Unlike the user cache, this is the only copy of the code: errors here
/// are never absorbed.
#[async_trait]
pub trait OtpStore: Interface + Send + Sync {
    /// Returns the outstanding code for `email`, if any.
    async fn get(&self, email: &Email) -> TesseraResult<Option<Otp>>;

    /// Stores `otp`, replacing any outstanding code for the same email.
    async fn set(&self, otp: &Otp) -> TesseraResult<()>;

    /// Removes the outstanding code. Returns `false` if there was none.
    async fn delete(&self, email: &Email) -> TesseraResult<bool>;
}

/// OTP store on top of a cache backend (Redis in production).
#[derive(Component)]
#[shaku(interface = OtpStore)]
pub struct CacheOtpStore {
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    /// Lifetime of an issued code; `None` keeps it until consumed.
    #[shaku(default)]
    ttl: Option<Duration>,
}

impl CacheOtpStore {
    /// Codes expire after `ttl`; `None` keeps them until consumed.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheInterface>, ttl: Option<Duration>) -> Self {
        Self { cache, ttl }
    }
}

#[async_trait]
impl OtpStore for CacheOtpStore {
    async fn get(&self, email: &Email) -> TesseraResult<Option<Otp>> {
        let code = self.cache.get_raw(&cache_keys::otp(email)).await?;
        Ok(code.map(|code| Otp::new(email.clone(), code)))
    }

    async fn set(&self, otp: &Otp) -> TesseraResult<()> {
        self.cache
            .set_raw(&cache_keys::otp(&otp.email), &otp.code, self.ttl)
            .await
    }

    async fn delete(&self, email: &Email) -> TesseraResult<bool> {
        self.cache.delete(&cache_keys::otp(email)).await
    }
}
