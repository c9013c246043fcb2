pub mod store;

pub use store::{AttemptRegistration, OtpStore};

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockOtpStore;
