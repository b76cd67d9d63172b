use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use async_walkdir::WalkDir;
use futures::StreamExt;
use miette::{Context as _, IntoDiagnostic, Result};
use tokio::fs;

use crate::{config::PassthroughRule, context::Context, pipeline::ProcessingStep};

/// Copies a passthrough path into the output directory.
/// Outputs the number of copied files, missing sources copy nothing.
pub struct CopyPassthrough {
    ctx: Arc<Context>,
}

impl CopyPassthrough {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ProcessingStep for CopyPassthrough {
    type Input = PassthroughRule;
    type Output = usize;

    #[tracing::instrument(name = "copy passthrough", level = "trace", skip(self))]
    async fn process(&self, rule: Self::Input) -> Result<Self::Output> {
        let source = self.ctx.dirs.root_dir.join(rule.source());

        if !source.exists() {
            tracing::debug!("skipping missing passthrough path {source:?}");
            return Ok(0);
        }
        let target = self
            .ctx
            .dirs
            .output_dir
            .join(rule.output_path(&self.ctx.config.dirs.input)?);

        if source.is_file() {
            copy_file(&source, &target).await?;
            return Ok(1);
        }
        let mut entries = WalkDir::new(&source);
        let mut copied = 0;

        while let Some(res) = entries.next().await {
            let entry_path = res.into_diagnostic()?.path();

            if entry_path.is_file() {
                let rel_path = entry_path.strip_prefix(&source).into_diagnostic()?;
                copy_file(&entry_path, &target.join(rel_path)).await?;
                copied += 1;
            }
        }
        tracing::debug!("copied {copied} files from {source:?}");

        Ok(copied)
    }
}

async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await.into_diagnostic()?;
        }
    }
    fs::copy(from, to)
        .await
        .into_diagnostic()
        .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs as std_fs;

    use super::*;
    use crate::{config::BuildConfig, pipeline::ProcessingStepParallel};

    #[tokio::test]
    async fn copies_files_and_directories_verbatim() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        std_fs::create_dir_all(src.join("assets/css")).unwrap();
        std_fs::write(src.join("assets/css/site.css"), "body{}").unwrap();
        std_fs::write(src.join("assets/logo.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();
        std_fs::write(src.join("CNAME"), "next3labs.com\n").unwrap();

        let config = BuildConfig::builder()
            .add_passthrough_copy("src/assets")
            .add_passthrough_copy("src/CNAME")
            .add_passthrough_copy("src/robots.txt")
            .build();
        let rules = config.passthrough.iter().cloned().collect();
        let ctx = Arc::new(Context::new(root.path(), config));

        let copied: Vec<usize> = CopyPassthrough::new(ctx)
            .parallel()
            .process(rules)
            .await
            .unwrap();

        let out = root.path().join("_site");
        assert_eq!(copied.iter().sum::<usize>(), 3);
        assert_eq!(
            std_fs::read(out.join("assets/logo.png")).unwrap(),
            vec![0x89, 0x50, 0x4e, 0x47]
        );
        assert_eq!(
            std_fs::read_to_string(out.join("assets/css/site.css")).unwrap(),
            "body{}"
        );
        assert_eq!(
            std_fs::read_to_string(out.join("CNAME")).unwrap(),
            "next3labs.com\n"
        );
        assert!(!out.join("robots.txt").exists());
    }

    #[tokio::test]
    async fn external_sources_are_refused_untouched() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("proj");
        std_fs::create_dir_all(root.join("src")).unwrap();
        std_fs::create_dir_all(outer.path().join("shared")).unwrap();
        let external = outer.path().join("fonts.css");
        std_fs::write(&external, "@font-face {}").unwrap();
        std_fs::write(outer.path().join("shared/logo.svg"), "<svg/>").unwrap();

        for rule in [
            PassthroughRule::new(&external),
            PassthroughRule::new("../shared/logo.svg"),
        ] {
            let config = BuildConfig::builder().build();
            let ctx = Arc::new(Context::new(&root, config));

            assert!(CopyPassthrough::new(ctx).process(rule).await.is_err());
        }
        assert_eq!(std_fs::read_to_string(&external).unwrap(), "@font-face {}");
        assert!(!root.join("shared").exists());
        assert!(!root.join("_site").exists());
    }
}
