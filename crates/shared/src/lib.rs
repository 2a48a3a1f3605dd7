//! Domain model, wire protocol and pure helpers shared by the glass quote client crates.

pub mod dimensions;
pub mod domain;
pub mod error;
pub mod format;
pub mod protocol;
