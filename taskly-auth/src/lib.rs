mod client;
mod error;

pub use client::{connect, AuthService, FileStorage, Settings};
pub use error::AuthError;
