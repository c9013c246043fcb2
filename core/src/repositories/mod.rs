pub mod otp;

pub use otp::{AttemptRegistration, OtpStore};

#[cfg(test)]
pub use otp::MockOtpStore;
