//! Subscribers that ship with the crate.
//!
//! Only [`EventLogger`] lives here today; it exists so demos and quick
//! experiments have an observer without writing one.

mod log;

pub use log::EventLogger;
