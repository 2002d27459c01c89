//! Tree materialization: realizing the declarative structure on disk
//!
//! This is the core of the generator. The walker flattens the tree into leaf
//! jobs, writes inline leaves directly, runs every remote leaf as its own
//! fetch task, and only reports the tree complete once the number of finished
//! leaf writes equals the up-front leaf count.

pub mod materializer;

pub use materializer::{extension_of, is_binary_extension, staging_name, Materializer};
