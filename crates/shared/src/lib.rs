//! Domain model and error taxonomy shared by the storage, controller, and
//! desktop GUI crates.

pub mod domain;
pub mod error;
