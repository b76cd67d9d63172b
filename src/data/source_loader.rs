use std::{path::PathBuf, sync::Arc};

use async_walkdir::{Filtering, WalkDir};
use futures::StreamExt;
use globset::{Glob, GlobSetBuilder};
use miette::{miette, IntoDiagnostic, Result};

use crate::{config::normalize, context::Context, routing::SourceFormat};

/// finds the renderable sources of the input directory
pub struct SourceLoader {
    ctx: Arc<Context>,
}

impl SourceLoader {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Asynchronously walks the input directory and returns every template source.
    /// Includes, data, output and passthrough paths are skipped together with
    /// everything whose name starts with `_` or `.`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn find_sources(&self) -> Result<Vec<PathBuf>> {
        let input_dir = &self.ctx.dirs.input_dir;

        if !input_dir.is_dir() {
            return Err(miette!(
                "input directory {} does not exist",
                input_dir.display()
            ));
        }
        let ignore_set = build_glob_set(&self.ctx.config.ignore)
            .build()
            .into_diagnostic()?;
        let excluded = Arc::new(self.excluded_paths());

        let mut entries = WalkDir::new(input_dir).filter(move |entry| {
            let excluded = excluded.clone();
            async move {
                let path = entry.path();
                let hidden = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .map(|n| n.starts_with('_') || n.starts_with('.'))
                    .unwrap_or(false);

                if hidden || excluded.iter().any(|e| normalize(&path).starts_with(e)) {
                    Filtering::IgnoreDir
                } else {
                    Filtering::Continue
                }
            }
        });
        let mut sources = Vec::new();

        while let Some(res) = entries.next().await {
            let entry_path = res.into_diagnostic()?.path();

            if !entry_path.is_file() || SourceFormat::from_path(&entry_path).is_none() {
                continue;
            }
            let rel_path = entry_path.strip_prefix(input_dir).into_diagnostic()?;

            if ignore_set.is_match(rel_path) {
                tracing::debug!("ignoring {rel_path:?}");
                continue;
            }
            sources.push(entry_path);
        }
        sources.sort();
        tracing::debug!("found {} sources", sources.len());

        Ok(sources)
    }

    fn excluded_paths(&self) -> Vec<PathBuf> {
        let dirs = &self.ctx.dirs;

        [
            dirs.includes_dir.clone(),
            dirs.data_dir.clone(),
            dirs.output_dir.clone(),
        ]
        .into_iter()
        .chain(self.ctx.passthrough_dirs())
        .map(|p| normalize(&p))
        .collect()
    }
}

#[tracing::instrument(level = "trace")]
fn build_glob_set(globs: &[Glob]) -> GlobSetBuilder {
    let mut builder = GlobSetBuilder::new();
    globs.iter().fold(&mut builder, |b, g| b.add(g.clone()));

    builder
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use super::*;
    use crate::config::BuildConfig;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    #[tokio::test]
    async fn skips_non_page_directories() {
        let root = tempfile::tempdir().unwrap();
        for rel in [
            "src/index.njk",
            "src/about.md",
            "src/services/index.html",
            "src/_includes/base.njk",
            "src/_data/site.json",
            "src/assets/demo.html",
            "src/.hidden/page.md",
            "src/README.md",
            "src/robots.txt",
        ] {
            touch(root.path(), rel);
        }
        let config = BuildConfig::builder()
            .add_passthrough_copy("src/assets")
            .ignore(Glob::new("README.md").unwrap())
            .build();
        let ctx = Arc::new(Context::new(root.path(), config));

        let sources = SourceLoader::new(ctx).find_sources().await.unwrap();
        let rel: Vec<_> = sources
            .iter()
            .map(|p| p.strip_prefix(root.path().join("src")).unwrap().to_owned())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("about.md"),
                PathBuf::from("index.njk"),
                PathBuf::from("services/index.html"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_input_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        let ctx = Arc::new(Context::new(root.path(), BuildConfig::builder().build()));

        assert!(SourceLoader::new(ctx).find_sources().await.is_err());
    }
}
