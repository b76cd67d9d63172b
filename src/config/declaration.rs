use std::path::PathBuf;

use globset::Glob;
use serde::{Deserialize, Serialize};

use super::{BuildConfig, Dirs, TemplateEngine};

/// Static site declarations as they appear in `site.toml`.
/// Every field is optional, missing ones fall back to the built-in declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteDeclaration {
    /// engine used for html and markdown sources
    pub template_engine: TemplateEngine,

    /// files and directories copied verbatim
    pub passthrough: Vec<PathBuf>,

    /// paths watched for changes in addition to the input directory
    pub watch: Vec<PathBuf>,

    /// sources that are never rendered
    pub ignore: Vec<Glob>,

    pub dirs: Dirs,
}

/// The declarations a config was built from, in the form `site.toml` accepts
impl From<&BuildConfig> for SiteDeclaration {
    fn from(config: &BuildConfig) -> Self {
        Self {
            template_engine: config.template_engine,
            passthrough: config
                .passthrough
                .iter()
                .map(|p| p.source().to_owned())
                .collect(),
            watch: config.watch_targets.iter().cloned().collect(),
            ignore: config.ignore.clone(),
            dirs: config.dirs.clone(),
        }
    }
}

impl Default for SiteDeclaration {
    fn default() -> Self {
        Self {
            dirs: Dirs::default(),
            template_engine: TemplateEngine::Nunjucks,
            passthrough: vec![
                "src/assets".into(),
                "src/CNAME".into(),
                "src/robots.txt".into(),
                "src/sitemap.xml".into(),
            ],
            watch: vec!["src/assets/css/".into()],
            ignore: Vec::new(),
        }
    }
}
