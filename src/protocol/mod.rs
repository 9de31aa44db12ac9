//! Chat wire format
//!
//! Line trimming, length bounds, the exit token, and the formatting of
//! relayed messages and join/leave announcements.

pub mod message;

pub use message::*;
