//! Authentication facade over the OTP and session services

mod service;

pub use service::OtpAuthService;
