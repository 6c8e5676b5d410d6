pub mod config;
pub mod credentials;
pub mod error;
pub mod io;
pub mod names;
pub mod parse;
pub mod paths;
pub mod prompt;
pub mod quiz;
pub mod session;
pub mod store;
pub mod task;
pub mod types;
pub mod validate;

pub use error::{CoachError, Result};
