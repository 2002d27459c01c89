//! The tree walker and its counted-completion write phase

use crate::config::TreeNode;
use crate::prompts::{template_vars, Answers};
use crate::templates::{render, FileFetcher};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;

/// Extensions copied verbatim; everything else fetched remotely is rendered
/// as a template against the collected answers
const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// One file leaf flattened out of the tree
#[derive(Debug, Clone)]
struct LeafJob {
    /// Destination path relative to the project root, `/`-separated
    destination: String,
    spec: LeafSpec,
}

#[derive(Debug, Clone)]
enum LeafSpec {
    Inline(String),
    Remote(String),
}

/// Flatten the tree into leaf jobs, preserving per-branch declaration order
fn collect_leaves(node: &TreeNode, prefix: &str, out: &mut Vec<LeafJob>) {
    match node {
        TreeNode::Directory(entries) => {
            for (name, child) in entries {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                collect_leaves(child, &path, out);
            }
        }
        TreeNode::Inline(text) => out.push(LeafJob {
            destination: prefix.to_string(),
            spec: LeafSpec::Inline(text.clone()),
        }),
        TreeNode::Remote(relative) => out.push(LeafJob {
            destination: prefix.to_string(),
            spec: LeafSpec::Remote(relative.clone()),
        }),
    }
}

/// Staging filename for a fetched file: the destination path with separators
/// flattened, so every fetch gets a unique single-level name that stays
/// traceable back to its destination
pub fn staging_name(destination: &str) -> String {
    destination.replace('/', "_")
}

/// Trailing `.ext` of a file spec; a spec with no usable extension counts as
/// its own extension (and therefore never matches the binary set)
pub fn extension_of(spec: &str) -> &str {
    match spec.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => spec,
    }
}

/// Whether fetched content with this extension must be copied as raw bytes
pub fn is_binary_extension(extension: &str) -> bool {
    BINARY_EXTENSIONS.contains(&extension)
}

/// Realizes a declarative tree as files under a destination root
pub struct Materializer {
    fetcher: FileFetcher,
    staging_dir: PathBuf,
}

impl Materializer {
    pub fn new(fetcher: FileFetcher, staging_dir: PathBuf) -> Self {
        Self {
            fetcher,
            staging_dir,
        }
    }

    /// Materialize the tree under `destination_root`, substituting `answers`
    /// into remote text files. Returns the number of files written.
    ///
    /// Completion is counted: the up-front leaf count is computed before any
    /// write, every finished leaf write increments the count, and the phase
    /// only returns once the count matches. Remote leaves run as independent
    /// tasks and may finish in any order; the first failed fetch, render, or
    /// write fails the whole phase.
    pub async fn materialize(
        &self,
        structure: &TreeNode,
        destination_root: &Path,
        answers: &Answers,
    ) -> Result<usize> {
        if !matches!(structure, TreeNode::Directory(_)) {
            anyhow::bail!("App config structure must be a mapping of names to entries");
        }

        let total = structure.leaf_count();
        let mut jobs = Vec::with_capacity(total);
        collect_leaves(structure, "", &mut jobs);

        // Staging must exist before any fetch; creation is idempotent
        fs::create_dir_all(&self.staging_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create staging directory {}",
                    self.staging_dir.display()
                )
            })?;
        fs::create_dir_all(destination_root)
            .await
            .with_context(|| {
                format!(
                    "Failed to create project directory {}",
                    destination_root.display()
                )
            })?;

        let vars = Arc::new(template_vars(answers));
        let mut completed = 0usize;
        let mut fetches = JoinSet::new();

        for job in jobs {
            match job.spec {
                LeafSpec::Inline(text) => {
                    let dest = destination_root.join(&job.destination);
                    write_file(&dest, text.as_bytes()).await?;
                    completed += 1;
                }
                LeafSpec::Remote(relative) => {
                    let fetcher = self.fetcher.clone();
                    let staged = self.staging_dir.join(staging_name(&job.destination));
                    let dest = destination_root.join(&job.destination);
                    let vars = Arc::clone(&vars);
                    fetches.spawn(async move {
                        realize_remote(fetcher, relative, staged, dest, vars).await
                    });
                }
            }
        }

        while let Some(joined) = fetches.join_next().await {
            joined.context("Remote file task failed")??;
            completed += 1;
        }

        if completed != total {
            anyhow::bail!("Materialized {} of {} declared files", completed, total);
        }

        Ok(total)
    }
}

/// Write bytes to a file, creating parent directories as needed
async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Fetch one remote leaf into staging, then copy or render it to its
/// destination depending on the extension
async fn realize_remote(
    fetcher: FileFetcher,
    relative: String,
    staged: PathBuf,
    destination: PathBuf,
    vars: Arc<HashMap<String, String>>,
) -> Result<()> {
    let bytes = fetcher.fetch_bytes(&relative).await?;
    write_file(&staged, &bytes).await?;

    if is_binary_extension(extension_of(&relative)) {
        // Raw bytes, no substitution
        write_file(&destination, &bytes).await?;
    } else {
        let text = String::from_utf8(bytes)
            .with_context(|| format!("Fetched file '{}' is not valid UTF-8", relative))?;
        let rendered = render(&text, &vars)
            .with_context(|| format!("Failed to render template '{}'", relative))?;
        write_file(&destination, rendered.as_bytes()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::Answer;
    use url::Url;

    fn materializer(base_url: &str, staging: &Path) -> Materializer {
        let fetcher = FileFetcher::new(Url::parse(base_url).unwrap(), "appgen-test");
        Materializer::new(fetcher, staging.to_path_buf())
    }

    fn answers(pairs: &[(&str, Answer)]) -> Answers {
        pairs
            .iter()
            .map(|(name, answer)| (name.to_string(), answer.clone()))
            .collect()
    }

    fn parse_tree(yaml: &str) -> TreeNode {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_staging_name_flattens_separators() {
        assert_eq!(staging_name("assets/img/logo.png"), "assets_img_logo.png");
        assert_eq!(staging_name("README.md"), "README.md");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("img/logo.png"), "png");
        assert_eq!(extension_of("js/app.min.js"), "js");
        // No dot: the whole spec counts as the extension
        assert_eq!(extension_of("LICENSE"), "LICENSE");
    }

    #[test]
    fn test_binary_extension_set() {
        assert!(is_binary_extension("png"));
        assert!(is_binary_extension("jpg"));
        assert!(is_binary_extension("jpeg"));
        assert!(!is_binary_extension("md"));
        assert!(!is_binary_extension("js"));
    }

    #[tokio::test]
    async fn test_inline_files_written_verbatim() {
        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree(
            r#"
README.md: "Hello {{name}}"
src:
  index.js: "console.log('hi');"
"#,
        );

        let m = materializer("https://example.com/", staging.path());
        let count = m
            .materialize(
                &tree,
                dest.path(),
                &answers(&[("name", Answer::Text("World".to_string()))]),
            )
            .await
            .unwrap();

        assert_eq!(count, 2);
        // Inline files are never templated, even with placeholder-like content
        assert_eq!(
            std::fs::read_to_string(dest.path().join("README.md")).unwrap(),
            "Hello {{name}}"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("src/index.js")).unwrap(),
            "console.log('hi');"
        );
    }

    #[tokio::test]
    async fn test_remote_text_files_are_rendered() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tpl/index.html")
            .with_status(200)
            .with_body("<title>{{projectName}}</title>")
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree("index.html: \"repo://tpl/index.html\"\n");

        let m = materializer(&format!("{}/", server.url()), staging.path());
        m.materialize(
            &tree,
            dest.path(),
            &answers(&[("projectName", Answer::Text("My App".to_string()))]),
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.path().join("index.html")).unwrap(),
            "<title>My App</title>"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_binary_files_copied_byte_identical() {
        // Deliberately not valid UTF-8
        let png_bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xFF, 0x00];

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/img/logo.png")
            .with_status(200)
            .with_body(png_bytes.clone())
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree(
            r#"
assets:
  logo.png: "repo://img/logo.png"
"#,
        );

        let m = materializer(&format!("{}/", server.url()), staging.path());
        m.materialize(&tree, dest.path(), &Answers::new())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(dest.path().join("assets/logo.png")).unwrap(),
            png_bytes
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_end_to_end_two_entry_tree() {
        let png_bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/img/logo.png")
            .with_status(200)
            .with_body(png_bytes.clone())
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree(
            r#"
README.md: "Hello {{name}}"
assets:
  logo.png: "repo://img/logo.png"
"#,
        );

        let m = materializer(&format!("{}/", server.url()), staging.path());
        let count = m
            .materialize(
                &tree,
                dest.path(),
                &answers(&[("name", Answer::Text("World".to_string()))]),
            )
            .await
            .unwrap();

        assert_eq!(count, tree.leaf_count());
        assert_eq!(
            std::fs::read_to_string(dest.path().join("README.md")).unwrap(),
            "Hello {{name}}"
        );
        assert_eq!(
            std::fs::read(dest.path().join("assets/logo.png")).unwrap(),
            png_bytes
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_fails_the_phase() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.txt")
            .with_status(404)
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree("gone.txt: \"repo://gone.txt\"\n");

        let m = materializer(&format!("{}/", server.url()), staging.path());
        let err = m
            .materialize(&tree, dest.path(), &Answers::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 404"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_sibling_fetches_all_complete() {
        let mut server = mockito::Server::new_async().await;
        let mut mocks = Vec::new();
        for i in 0..5 {
            mocks.push(
                server
                    .mock("GET", format!("/file{}.txt", i).as_str())
                    .with_status(200)
                    .with_body(format!("content {}", i))
                    .create_async()
                    .await,
            );
        }

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let yaml: String = (0..5)
            .map(|i| format!("f{}.txt: \"repo://file{}.txt\"\n", i, i))
            .collect();
        let tree = parse_tree(&yaml);

        let m = materializer(&format!("{}/", server.url()), staging.path());
        let count = m
            .materialize(&tree, dest.path(), &Answers::new())
            .await
            .unwrap();

        assert_eq!(count, 5);
        for i in 0..5 {
            assert_eq!(
                std::fs::read_to_string(dest.path().join(format!("f{}.txt", i))).unwrap(),
                format!("content {}", i)
            );
        }
    }

    #[tokio::test]
    async fn test_fetched_files_staged_under_flattened_name() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tpl/page.html")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = parse_tree(
            r#"
site:
  page.html: "repo://tpl/page.html"
"#,
        );

        let m = materializer(&format!("{}/", server.url()), staging.path());
        m.materialize(&tree, dest.path(), &Answers::new())
            .await
            .unwrap();

        assert!(staging.path().join("site_page.html").exists());
    }

    #[tokio::test]
    async fn test_leaf_structure_is_rejected() {
        let dest = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let tree = TreeNode::Inline("not a mapping".to_string());

        let m = materializer("https://example.com/", staging.path());
        let err = m
            .materialize(&tree, dest.path(), &Answers::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }
}
