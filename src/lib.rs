//! Client front-end for the content discovery service: session handling, favorites,
//! recommendation carousels and catalog browsing, served to a local page over HTTP.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::{create_router, AppState};
