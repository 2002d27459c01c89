//! AppGen Core - Shared library for config-driven project generation
//!
//! This library turns a declarative YAML app config (prompts, a file/directory
//! tree, package lists, and grunt task configuration) into a concrete project
//! on disk. It is designed to be used by a thin CLI binary that owns argument
//! parsing and terminal setup.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Config parsing, template rendering, remote
//!   file fetching, tree materialization, Gruntfile emission, package install
//! - **Layer 2: CLI/TUI Interface** - Optional cliclack-based prompts and the
//!   end-to-end `run` workflow (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompt module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use appgen_core::{config::AppConfig, templates::FileFetcher, tree::Materializer};
//!
//! let config = AppConfig::load(Path::new("app.yaml"))?;
//! let fetcher = FileFetcher::new(config.repository.clone(), appgen_core::USER_AGENT);
//! let materializer = Materializer::new(fetcher, staging_dir);
//! materializer.materialize(&config.structure, &dest, &answers).await?;
//! ```

pub mod config;
pub mod grunt;
pub mod install;
pub mod prompts;
pub mod templates;
pub mod tree;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{AppConfig, GruntSection, TreeNode};
pub use grunt::GruntfileBuilder;
pub use install::Installer;
pub use prompts::{Answer, Answers, Question, QuestionKind};
pub use templates::{FileFetcher, TemplateError};
pub use tree::Materializer;

#[cfg(feature = "tui")]
pub use tui::{run, GenerateArgs};

/// User agent string for remote template file requests
pub const USER_AGENT: &str = "appgen";
