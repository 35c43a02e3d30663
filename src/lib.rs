// Everything except terminal setup and drawing, so tests can drive a
// typing test without a tty.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod view;
pub mod vocabulary;
pub mod word_source;

pub use error::{Error, Result};
