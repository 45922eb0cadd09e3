/// Authentication flows
///
/// Password hashing plus the orchestration of login, register, refresh,
/// logout, validate, and password change over the credential and
/// revocation stores.
pub mod flow;
mod password;

pub use password::hash_password;
pub use password::verify_password;
