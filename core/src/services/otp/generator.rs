//! Random numeric passcode generation

use rand::{rngs::OsRng, Rng};

use otp_shared::config::otp::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

use crate::errors::{DomainError, DomainResult};

/// Produces fixed-length decimal passcodes from the operating system CSPRNG
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    pub fn new(length: usize) -> DomainResult<Self> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(DomainError::Configuration {
                message: format!(
                    "code length must be between {} and {}, got {}",
                    MIN_CODE_LENGTH, MAX_CODE_LENGTH, length
                ),
            });
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Uniform over `0..10^length`, zero-padded, so leading zeros occur
    pub fn generate(&self) -> String {
        let upper = 10u32.pow(self.length as u32);
        let value = OsRng.gen_range(0..upper);
        format!("{:0width$}", value, width = self.length)
    }
}
