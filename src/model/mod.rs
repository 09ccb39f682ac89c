//! # Graph Model
//!
//! Plain data shared by every layer: node identity, topics, paths.
//!
//! Design rule: no caches, no graph access, no logging here.
//! This module is pure data.

pub mod node;
pub mod path;
pub mod topic;

pub use node::NodeId;
pub use path::{Path, PathLength};
pub use topic::Topic;
