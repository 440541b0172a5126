//! Placeholder HTTP server for the Flutter Cocktail Timeline app.
//!
//! Serves the `public/` directory as static assets and answers `GET /`
//! with a plain-text notice pointing visitors at the Flutter toolchain.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
