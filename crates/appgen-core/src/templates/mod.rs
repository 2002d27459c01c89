//! Template rendering and remote file fetching
//!
//! This module provides:
//! - A small placeholder renderer for remote text files (`{{name}}` syntax
//!   plus the `slugify` helper)
//! - The HTTP fetcher that resolves `repo://` paths against the configured
//!   repository base URL

pub mod fetcher;
pub mod render;

pub use fetcher::FileFetcher;
pub use render::{render, slugify, TemplateError};
