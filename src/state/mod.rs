//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: every known URL and whether it has been crawled
//! - `Batch`: the wave of fetches currently in progress and its retry count

mod batch;
mod frontier;

// Re-export main types
pub use batch::{Batch, BatchMember, MemberState};
pub use frontier::{Frontier, FrontierEntry};
