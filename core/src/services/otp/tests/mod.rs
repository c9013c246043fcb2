//! Tests for the OTP services

#[cfg(test)]
mod issuance_tests;
