use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use miette::{Context as _, IntoDiagnostic, Result};
use tokio::fs;

use crate::{
    config::{normalize, paths_overlap, BuildConfig, ConfigError},
    context::{Context, ResolvedDirs},
    data::{load_global_data, SourceLoader},
    passthrough::CopyPassthrough,
    pipeline::{ProcessingStep, ProcessingStepParallel},
    rendering::SiteRenderer,
};

/// Builds the site described by a [BuildConfig]
pub struct Engine {
    ctx: Arc<Context>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub pages_written: usize,
    pub files_copied: usize,
    pub duration: Duration,
}

impl Engine {
    /// Fails if the config is missing directories, if output and input overlap
    /// once resolved against the project root or if the output contains the root
    pub fn new(root: &Path, config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let root = std::fs::canonicalize(root)
            .into_diagnostic()
            .with_context(|| format!("resolving project directory {}", root.display()))?;
        let ctx = Context::new(&root, config);
        check_resolved_dirs(&ctx.dirs)?;

        Ok(Self { ctx: Arc::new(ctx) })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.ctx.config
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn build(&self) -> Result<BuildReport> {
        let start = Instant::now();
        let output_dir = &self.ctx.dirs.output_dir;

        if output_dir.exists() {
            fs::remove_dir_all(output_dir).await.into_diagnostic()?;
        }
        let global = load_global_data(&self.ctx.dirs.data_dir).await?;
        let sources = SourceLoader::new(self.ctx.clone()).find_sources().await?;
        let pages_written = SiteRenderer::new(self.ctx.clone())
            .render_all(sources, global)
            .await?;

        let rules = self.ctx.config.passthrough.iter().cloned().collect();
        let files_copied = CopyPassthrough::new(self.ctx.clone())
            .parallel()
            .process(rules)
            .await?
            .into_iter()
            .sum();

        let report = BuildReport {
            pages_written,
            files_copied,
            duration: start.elapsed(),
        };
        tracing::info!(
            "wrote {} pages and copied {} files to {:?} in {:?}",
            report.pages_written,
            report.files_copied,
            output_dir,
            report.duration
        );

        Ok(report)
    }
}

fn check_resolved_dirs(dirs: &ResolvedDirs) -> Result<(), ConfigError> {
    let input = normalize(&dirs.input_dir);
    let output = normalize(&dirs.output_dir);

    if normalize(&dirs.root_dir).starts_with(&output) {
        return Err(ConfigError::OutputContainsRoot { output });
    }
    if paths_overlap(&input, &output) {
        return Err(ConfigError::OverlappingDirs { input, output });
    }

    Ok(())
}
