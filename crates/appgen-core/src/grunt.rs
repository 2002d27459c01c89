//! Grunt task configuration emission
//!
//! Translates the config's `grunt` section into Gruntfile registrations and
//! derives the grunt plugin package list for the npm install phase.

use crate::config::GruntSection;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// The task runner's own package, always appended last to the derived list
pub const GRUNT_BASE_PACKAGE: &str = "grunt";

/// Task categories whose plugin package does not follow the
/// `grunt-contrib-<category>` convention
const GRUNT_PACKAGE_MAPPING: &[(&str, &str)] = &[
    ("shell", "grunt-shell"),
    ("concurrent", "grunt-concurrent"),
    ("bowermap", "grunt-bowermap"),
    ("nodemon", "grunt-nodemon"),
];

/// Plugin package name for a task category; total over all category names
pub fn plugin_package(category: &str) -> String {
    GRUNT_PACKAGE_MAPPING
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, package)| package.to_string())
        .unwrap_or_else(|| format!("grunt-contrib-{}", category))
}

/// Accumulates Gruntfile registrations and renders them as `Gruntfile.js`
///
/// This is the boundary to the task-runner file format: the emitter only
/// supplies category -> JSON config pairs and task -> job-list pairs.
#[derive(Debug, Default)]
pub struct GruntfileBuilder {
    npm_tasks: Vec<String>,
    configs: Vec<(String, String)>,
    tasks: Vec<(String, Vec<String>)>,
}

impl GruntfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record plugin packages to load via `grunt.loadNpmTasks`
    pub fn load_npm_tasks(&mut self, packages: &[String]) {
        self.npm_tasks.extend(packages.iter().cloned());
    }

    /// Record one config category with its JSON-serialized value
    pub fn insert_config(&mut self, name: &str, json: &str) {
        self.configs.push((name.to_string(), json.to_string()));
    }

    /// Record one task bound to its ordered job list
    pub fn register_task(&mut self, name: &str, jobs: Vec<String>) {
        self.tasks.push((name.to_string(), jobs));
    }

    /// Render the accumulated registrations as Gruntfile source
    pub fn render(&self) -> String {
        let mut out = String::from("module.exports = function (grunt) {\n");

        out.push_str("  grunt.initConfig({\n");
        for (name, json) in &self.configs {
            out.push_str(&format!("    {}: {},\n", name, json));
        }
        out.push_str("  });\n");

        for package in &self.npm_tasks {
            out.push_str(&format!("\n  grunt.loadNpmTasks('{}');", package));
        }
        if !self.npm_tasks.is_empty() {
            out.push('\n');
        }

        for (name, jobs) in &self.tasks {
            let list = jobs
                .iter()
                .map(|job| format!("'{}'", job))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "\n  grunt.registerTask('{}', [{}]);\n",
                name, list
            ));
        }

        out.push_str("};\n");
        out
    }

    /// Write the rendered Gruntfile to disk
    pub async fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Register the grunt section with the builder and return the full plugin
/// package list, base package last
pub fn emit(grunt: &GruntSection, builder: &mut GruntfileBuilder) -> Result<Vec<String>> {
    let mut packages = Vec::with_capacity(grunt.config.len() + 1);

    for (key, value) in &grunt.config {
        let name = key
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Grunt config keys must be strings, got {:?}", key))?;
        packages.push(plugin_package(name));

        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize grunt config '{}'", name))?;
        builder.insert_config(name, &json);
    }

    builder.load_npm_tasks(&packages);

    for (key, value) in &grunt.tasks {
        let name = key
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Grunt task names must be strings, got {:?}", key))?;
        let jobs: Vec<String> = serde_yaml::from_value(value.clone())
            .with_context(|| format!("Grunt task '{}' must be a list of job names", name))?;
        builder.register_task(name, jobs);
    }

    packages.push(GRUNT_BASE_PACKAGE.to_string());
    Ok(packages)
}
