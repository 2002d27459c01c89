//! CLI prompts and the end-to-end generate workflow using cliclack
//!
//! This module is optional and only available when the `tui` feature is
//! enabled.

mod prompts;

pub use prompts::{run, GenerateArgs};
