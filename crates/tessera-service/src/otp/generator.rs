//! One-time code generation.

use rand::Rng;
use shaku::Component;
use tessera_core::Interface;

/// Digits in a code when nothing else is configured.
pub const DEFAULT_OTP_LENGTH: usize = 6;

/// Produces fresh verification codes.
pub trait OtpGenerator: Interface + Send + Sync {
    fn generate(&self) -> String;
}

/// Uniformly random, zero-padded numeric codes.
#[derive(Component, Debug, Clone)]
#[shaku(interface = OtpGenerator)]
pub struct RandomOtpGenerator {
    #[shaku(default = DEFAULT_OTP_LENGTH)]
    length: usize,
}

impl RandomOtpGenerator {
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomOtpGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OTP_LENGTH)
    }
}

impl OtpGenerator for RandomOtpGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
