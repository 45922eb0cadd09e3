mod auth;
mod health_check;

pub use auth::{change_password, login, logout, refresh_token, register, validate_token};
pub use health_check::health_check;
