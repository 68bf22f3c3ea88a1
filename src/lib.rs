//! User authentication backend: registration and login over Postgres,
//! argon2 password digests, signed access and refresh tokens.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use error::AuthError;
pub use state::AppState;
