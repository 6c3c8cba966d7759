//! Dependency injection modules using Shaku.
//!
//! - `AccountModule`: MySQL store, Redis cache and OTP store, log or SMTP
//!   delivery
//! - `LocalAccountModule`: in-process store and cache for local runs and tests
//!
//! Every process-wide client is a component built once per module and
//! injected into the components that need it.

use crate::cache::{
    create_redis_pool, CacheInterface, InMemoryCache, RedisCacheService,
    RedisCacheServiceParameters,
};
use crate::cached_user_repository::{CachedUserRepository, CachedUserRepositoryParameters};
use crate::notifier::{LogOtpNotifier, OtpNotifier, SmtpOtpNotifier};
use crate::otp::{
    CacheOtpStore, CacheOtpStoreParameters, RandomOtpGenerator, RandomOtpGeneratorParameters,
};
use crate::r#impl::AccountServiceImpl;
use shaku::module;
use std::sync::Arc;
use tessera_config::AppConfig;
use tessera_core::TesseraResult;
use tessera_repository::{
    create_pool, DatabasePool, DatabasePoolInterface, DatabasePoolParameters, InMemoryUserStore,
    MySqlUserStore,
};
use tessera_security::{PasswordHasher, PasswordHasherParameters};
use tracing::info;

// ============================================================================
// Shaku Module Definitions
// ============================================================================

// Production deployment: MySQL store, Redis for cached users and codes.
// The Redis cache is swapped for an in-process one when Redis is disabled,
// and the log notifier for SMTP when mail is enabled.
module! {
    pub AccountModule {
        components = [
            DatabasePool,
            MySqlUserStore,
            RedisCacheService,
            CacheOtpStore,
            LogOtpNotifier,
            PasswordHasher,
            RandomOtpGenerator,
            CachedUserRepository,
            AccountServiceImpl,
        ],
        providers = [],
    }
}

// Everything in process memory. Codes are logged, never mailed.
module! {
    pub LocalAccountModule {
        components = [
            InMemoryUserStore,
            InMemoryCache,
            CacheOtpStore,
            LogOtpNotifier,
            PasswordHasher,
            RandomOtpGenerator,
            CachedUserRepository,
            AccountServiceImpl,
        ],
        providers = [],
    }
}

// ============================================================================
// Module Builders
// ============================================================================

/// Builds the production module from configuration.
///
/// Connects to MySQL (running migrations when configured) and, if enabled,
/// to Redis and the SMTP relay before any component is built.
pub async fn build_account_module(config: &AppConfig) -> TesseraResult<Arc<AccountModule>> {
    let db_pool = create_pool(&config.database).await?;
    let password_hasher = PasswordHasher::from_config(&config.security);

    let mut builder = AccountModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.inner().clone(),
        })
        .with_component_parameters::<PasswordHasher>(PasswordHasherParameters {
            argon2: password_hasher.argon2_arc(),
        })
        .with_component_parameters::<CacheOtpStore>(CacheOtpStoreParameters {
            ttl: config.otp.ttl(),
        })
        .with_component_parameters::<RandomOtpGenerator>(RandomOtpGeneratorParameters {
            length: config.otp.length,
        })
        .with_component_parameters::<CachedUserRepository>(CachedUserRepositoryParameters {
            user_ttl: config.cache.user_ttl(),
        });

    builder = if config.redis.enabled {
        let pool = create_redis_pool(&config.redis).await?;
        builder.with_component_parameters::<RedisCacheService>(RedisCacheServiceParameters {
            pool: Some(pool),
        })
    } else {
        info!("Redis disabled, using in-process cache");
        builder.with_component_override::<dyn CacheInterface>(Box::new(InMemoryCache::new()))
    };

    if config.smtp.enabled {
        let notifier = SmtpOtpNotifier::from_config(&config.smtp)?;
        builder = builder.with_component_override::<dyn OtpNotifier>(Box::new(notifier));
    } else {
        info!("SMTP disabled, OTP codes will be logged");
    }

    Ok(Arc::new(builder.build()))
}

/// Builds the in-process module with the code, cache and hashing policy
/// of `config`.
#[must_use]
pub fn build_local_account_module(config: &AppConfig) -> Arc<LocalAccountModule> {
    let password_hasher = PasswordHasher::from_config(&config.security);

    let module = LocalAccountModule::builder()
        .with_component_parameters::<PasswordHasher>(PasswordHasherParameters {
            argon2: password_hasher.argon2_arc(),
        })
        .with_component_parameters::<CacheOtpStore>(CacheOtpStoreParameters {
            ttl: config.otp.ttl(),
        })
        .with_component_parameters::<RandomOtpGenerator>(RandomOtpGeneratorParameters {
            length: config.otp.length,
        })
        .with_component_parameters::<CachedUserRepository>(CachedUserRepositoryParameters {
            user_ttl: config.cache.user_ttl(),
        })
        .build();

    Arc::new(module)
}
