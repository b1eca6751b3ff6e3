pub mod cli;
pub mod error;
pub mod storage;
pub mod surface;
pub mod terminal;
pub mod testing;
pub mod tracker;
pub mod types;
pub mod utils;
pub mod workout;

pub use error::{Result, TrackerError};
pub use tracker::Tracker;
