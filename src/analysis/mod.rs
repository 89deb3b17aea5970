//! Static analyses over a module.

pub mod call_counts;

pub use call_counts::{count_direct_calls, CallCounts};
