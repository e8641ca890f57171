//! Domain types for build-keeper
//!
//! - BuildRecord: one finished build with its number, timestamp, outcome and retention flag
//! - BuildOutcome: ordered terminal outcome of a build

pub mod build_record;
pub mod outcome;

pub use build_record::{BuildNumber, BuildRecord};
pub use outcome::BuildOutcome;
