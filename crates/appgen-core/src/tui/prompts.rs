//! Charm-style CLI prompts and workflow orchestration using cliclack

use crate::config::AppConfig;
use crate::grunt::{self, GruntfileBuilder};
use crate::install::{self, Installer};
use crate::prompts::{Answer, Answers, Question, QuestionKind, DEFAULT_INPUT};
use crate::templates::FileFetcher;
use crate::tree::Materializer;
use anyhow::Result;
use std::path::PathBuf;

/// Arguments for the generate workflow
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the YAML app config
    pub config: PathBuf,

    /// Project directory to generate into (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Answer every prompt with its default (non-interactive mode)
    pub yes: bool,

    /// Skip the bower/npm install phase
    pub skip_install: bool,
}

/// Run the full generate workflow with interactive prompts
pub async fn run(args: GenerateArgs) -> Result<()> {
    cliclack::intro("appgen")?;

    // Step 1: Load the app config (once; immutable for the rest of the run)
    let config = AppConfig::load(&args.config)?;
    cliclack::log::info(format!("Loaded app config {}", args.config.display()))?;

    // Step 2: Collect answers; a prompt failure aborts with no partial answers
    let answers = collect_answers(&config.prompts, args.yes)?;

    // Step 3: Select the project directory
    let project_dir = resolve_directory(&args)?;

    // Step 4: Materialize the file tree; later phases must not observe a
    // partially written tree
    let fetcher = FileFetcher::new(config.repository.clone(), crate::USER_AGENT);
    let staging_dir = std::env::temp_dir().join(format!("appgen-staging-{}", std::process::id()));
    let materializer = Materializer::new(fetcher, staging_dir);

    let spinner = cliclack::spinner();
    spinner.start("Writing project files...");
    match materializer
        .materialize(&config.structure, &project_dir, &answers)
        .await
    {
        Ok(count) => spinner.stop(format!(
            "Wrote {} files to {}",
            count,
            project_dir.display()
        )),
        Err(e) => {
            spinner.stop("Failed to write project files");
            return Err(e);
        }
    }

    // Step 5: Emit the Gruntfile and derive the grunt plugin packages
    let mut builder = GruntfileBuilder::new();
    let grunt_packages = grunt::emit(&config.grunt, &mut builder)?;
    builder.write(&project_dir.join("Gruntfile.js")).await?;
    cliclack::log::success("Registered Gruntfile tasks")?;

    // Step 6: Install dependencies
    let bower = install::filter_bower_packages(&config.bower, &answers);
    let npm = install::npm_install_set(&config.npm, &grunt_packages);

    if args.skip_install {
        cliclack::log::info(format!(
            "Skipping install (bower: {}; npm: {})",
            bower.join(", "),
            npm.join(", ")
        ))?;
    } else {
        let installer = Installer::new(project_dir.clone());
        cliclack::log::info(format!("Installing: {}", bower.join(", ")))?;
        installer.install("bower", &bower).await?;
        cliclack::log::info(format!("Installing: {}", npm.join(", ")))?;
        installer.install("npm", &npm).await?;
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

/// Collect one answer per prompt spec; `--yes` takes every default without
/// prompting
fn collect_answers(prompts: &[String], yes: bool) -> Result<Answers> {
    let mut answers = Answers::new();

    for spec in prompts {
        let question = Question::from_spec(spec);
        let answer = if yes {
            question.default.clone()
        } else {
            match question.kind {
                QuestionKind::Confirm => Answer::Flag(
                    cliclack::confirm(&question.message)
                        .initial_value(true)
                        .interact()?,
                ),
                QuestionKind::Input => Answer::Text(
                    cliclack::input(&question.message)
                        .placeholder(DEFAULT_INPUT)
                        .default_input(DEFAULT_INPUT)
                        .interact()?,
                ),
            }
        };
        answers.insert(question.name, answer);
    }

    Ok(answers)
}

fn resolve_directory(args: &GenerateArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    // Warn if the directory exists and has files
    if path.exists() && path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&path) {
            let count = entries.count();
            if count > 0 {
                cliclack::log::warning(format!("Directory has {} existing items", count))?;

                let confirm = if args.yes {
                    true
                } else {
                    cliclack::confirm("Continue anyway?")
                        .initial_value(true)
                        .interact()?
                };

                if !confirm {
                    anyhow::bail!("Generation cancelled.");
                }
            }
        }
    }

    Ok(path)
}
