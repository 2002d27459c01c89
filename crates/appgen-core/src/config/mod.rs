//! App config loading and types
//!
//! This module provides:
//! - The declarative app config types (prompts, structure, repository, grunt,
//!   bower, npm)
//! - The tree node union, classified once at load time

pub mod model;

pub use model::{AppConfig, GruntSection, TreeNode, REMOTE_MARKER};
