pub mod badges;
pub mod calendar;
pub mod challenges;
pub mod config;
pub mod error;
pub mod points;
pub mod rank;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
