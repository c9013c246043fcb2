pub mod otp;

pub use otp::{SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse};
