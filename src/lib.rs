//! build-keeper - decides which CI builds are kept forever
//!
//! After every finished build a [`BuildKeeper`] applies one configured
//! [`RetentionPolicy`] to the build and the chain of builds before it, marking
//! at most one build as exempt from log and artifact rotation.

pub mod condition;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod keeper;
pub mod policy;

pub use error::{KeeperError, Result};
pub use keeper::BuildKeeper;
pub use policy::{Decision, RetentionPolicy};
