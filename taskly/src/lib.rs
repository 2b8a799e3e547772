pub mod app_core;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod state;
pub mod validators;

pub use app_core::AppCore;
pub use error::AppError;
pub use preferences::Preferences;
pub use state::AppState;

// Always expose testing module (integration tests need it)
pub mod testing;
