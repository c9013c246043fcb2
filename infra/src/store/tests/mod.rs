//! Tests for OTP record stores


#[cfg(test)]
mod memory_tests;
