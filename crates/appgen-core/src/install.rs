//! Package install phase: answer-filtered bower packages and the npm set

use crate::prompts::Answers;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for one installer invocation (5 minutes)
const INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Answer-key prefix that makes a bower package optional
pub const BOWER_ANSWER_PREFIX: &str = "pkg-";

/// Filter bower packages by collected answers: a package is excluded only
/// when its `pkg-<name>` answer is present and falsy; an unanswered optional
/// package is installed by default
pub fn filter_bower_packages(packages: &[String], answers: &Answers) -> Vec<String> {
    packages
        .iter()
        .filter(|package| {
            answers
                .get(&format!("{}{}", BOWER_ANSWER_PREFIX, package))
                .map_or(true, |answer| answer.is_truthy())
        })
        .cloned()
        .collect()
}

/// Final npm install set: declared npm packages plus the derived grunt
/// plugin packages
pub fn npm_install_set(npm: &[String], grunt_packages: &[String]) -> Vec<String> {
    npm.iter().chain(grunt_packages.iter()).cloned().collect()
}

/// Runs package installers in the generated project directory
pub struct Installer {
    project_dir: PathBuf,
}

impl Installer {
    pub fn new(project_dir: PathBuf) -> Self {
        Self { project_dir }
    }

    /// Run `<tool> install <packages> --save`, streaming output
    ///
    /// A non-zero exit fails the run; nothing already written is rolled back.
    /// An empty package list skips the invocation.
    pub async fn install(&self, tool: &str, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            println!("{} no {} packages to install", "Skipping:".dimmed(), tool);
            return Ok(());
        }

        println!();
        println!(
            "{} {} install {} --save",
            "Running:".dimmed(),
            tool,
            packages.join(" ").yellow()
        );
        println!();

        let mut child = TokioCommand::new(tool)
            .arg("install")
            .args(packages)
            .arg("--save")
            .current_dir(&self.project_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to launch {}", tool))?;

        let stdout = child.stdout.take().expect("Failed to capture stdout");
        let stderr = child.stderr.take().expect("Failed to capture stderr");

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        let output_task = async {
            loop {
                tokio::select! {
                    line = stdout_reader.next_line() => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line),
                            Ok(None) => break,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                break;
                            }
                        }
                    }
                    line = stderr_reader.next_line() => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => {}
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                            }
                        }
                    }
                }
            }
        };

        match timeout(INSTALL_TIMEOUT, output_task).await {
            Ok(_) => {}
            Err(_) => {
                let _ = child.kill().await;
                println!();
                anyhow::bail!(
                    "{} install timed out after {} seconds",
                    tool,
                    INSTALL_TIMEOUT.as_secs()
                );
            }
        }

        match timeout(Duration::from_secs(5), child.wait()).await {
            Ok(Ok(status)) => {
                println!();
                if status.success() {
                    Ok(())
                } else {
                    anyhow::bail!(
                        "{} install failed with exit code: {}",
                        tool,
                        status.code().unwrap_or(-1)
                    );
                }
            }
            Ok(Err(e)) => {
                anyhow::bail!("Failed to wait for {} install: {}", tool, e);
            }
            Err(_) => {
                let _ = child.kill().await;
                anyhow::bail!("{} install process hung", tool);
            }
        }
    }
}
