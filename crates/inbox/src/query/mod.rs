//! Query API for UI consumption
//!
//! Pure functions over the session's thread list.

mod threads;

pub use threads::filter_threads;
