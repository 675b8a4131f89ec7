//! Service layer
//!
//! Keeps file and codec handling out of the removal strategies so they can be
//! exercised on in-memory buffers.

pub mod io;

pub use io::ImageIOService;
