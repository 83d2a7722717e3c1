//! User data model
//!
//! The records the service hands out: the `User` identity record and the
//! `Config` aggregate returned at client startup.

pub mod types;

pub use types::*;
