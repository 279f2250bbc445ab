pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod services;

pub use app::App;
pub use config::AppConfig;
pub use error::{CoreError, Result, ValidationErrors};
