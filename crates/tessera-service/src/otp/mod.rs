//! One-time code storage and generation.

mod generator;
mod otp_store;

pub use generator::{
    OtpGenerator, RandomOtpGenerator, RandomOtpGeneratorParameters, DEFAULT_OTP_LENGTH,
};
pub use otp_store::{CacheOtpStore, CacheOtpStoreParameters, OtpStore};
