use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
};

use globset::Glob;
use serde::{Deserialize, Serialize};

mod declaration;
mod error;
mod loader;

pub use declaration::*;
pub use error::*;
pub use loader::*;

/// The immutable configuration handed to the build engine.
///
/// Paths in `dirs.input` and `dirs.output` are relative to the project root,
/// `dirs.includes` and `dirs.data` are relative to `dirs.input`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// markup syntax used for both html and markdown sources
    pub template_engine: TemplateEngine,

    /// paths copied into the output without being rendered
    pub passthrough: BTreeSet<PassthroughRule>,

    /// paths that trigger a rebuild in watch mode
    pub watch_targets: BTreeSet<PathBuf>,

    /// source files matching these globs are never rendered
    pub ignore: Vec<Glob>,

    pub dirs: Dirs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dirs {
    pub input: PathBuf,
    pub includes: PathBuf,
    pub data: PathBuf,
    pub output: PathBuf,
}

impl Default for Dirs {
    fn default() -> Self {
        Self {
            input: "src".into(),
            includes: "_includes".into(),
            data: "_data".into(),
            output: "_site".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateEngine {
    /// jinja-family templating
    #[default]
    #[serde(rename = "njk")]
    Nunjucks,

    /// plain html without template preprocessing
    #[serde(rename = "html")]
    Html,
}

/// A source path that's copied byte-for-byte into the output tree
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassthroughRule(PathBuf);

impl PassthroughRule {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    pub fn source(&self) -> &Path {
        &self.0
    }

    /// Location of the copied path relative to the output directory.
    /// The input directory prefix is dropped, anything else keeps its full path.
    /// Sources that would land outside the output directory are rejected.
    pub fn output_path(&self, input_dir: &Path) -> Result<PathBuf, ConfigError> {
        let source = normalize(&self.0);
        let input = normalize(input_dir);

        let rel = match source.strip_prefix(&input) {
            Ok(rel) if !input.as_os_str().is_empty() => rel.to_owned(),
            _ => source.clone(),
        };
        if rel.as_os_str().is_empty()
            || !rel.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ConfigError::PassthroughOutsideOutput {
                path: self.0.clone(),
            });
        }

        Ok(rel)
    }
}

impl BuildConfig {
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::default()
    }

    pub fn html_template_engine(&self) -> TemplateEngine {
        self.template_engine
    }

    pub fn markdown_template_engine(&self) -> TemplateEngine {
        self.template_engine
    }

    /// Checks that the directories are declared and that output and input don't overlap
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = [
            ("input", &self.dirs.input),
            ("includes", &self.dirs.includes),
            ("data", &self.dirs.data),
            ("output", &self.dirs.output),
        ];
        for (name, dir) in dirs {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::MissingDir { name });
            }
        }
        if paths_overlap(&self.dirs.input, &self.dirs.output) {
            return Err(ConfigError::OverlappingDirs {
                input: self.dirs.input.clone(),
                output: self.dirs.output.clone(),
            });
        }
        for rule in &self.passthrough {
            rule.output_path(&self.dirs.input)?;
        }

        Ok(())
    }
}

/// One-shot registration of the site's build rules.
/// Nothing is registered anywhere until [BuildConfigBuilder::build] hands out the value.
#[derive(Clone, Debug, Default)]
pub struct BuildConfigBuilder {
    dirs: Dirs,
    template_engine: TemplateEngine,
    passthrough: BTreeSet<PassthroughRule>,
    watch_targets: BTreeSet<PathBuf>,
    ignore: Vec<Glob>,
}

impl BuildConfigBuilder {
    pub fn dirs(mut self, dirs: Dirs) -> Self {
        self.dirs = dirs;
        self
    }

    pub fn template_engine(mut self, engine: TemplateEngine) -> Self {
        self.template_engine = engine;
        self
    }

    pub fn add_passthrough_copy<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.passthrough.insert(PassthroughRule::new(path));
        self
    }

    pub fn add_watch_target<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.watch_targets.insert(path.into());
        self
    }

    pub fn ignore(mut self, glob: Glob) -> Self {
        if !self.ignore.contains(&glob) {
            self.ignore.push(glob);
        }
        self
    }

    pub fn build(self) -> BuildConfig {
        BuildConfig {
            template_engine: self.template_engine,
            passthrough: self.passthrough,
            watch_targets: self.watch_targets,
            ignore: self.ignore,
            dirs: self.dirs,
        }
    }
}

/// Builds the configuration from the built-in site declarations
pub fn configure() -> BuildConfig {
    configure_with(&SiteDeclaration::default())
}

pub fn configure_with(declaration: &SiteDeclaration) -> BuildConfig {
    let builder = BuildConfig::builder()
        .dirs(declaration.dirs.clone())
        .template_engine(declaration.template_engine);
    let builder = declaration
        .passthrough
        .iter()
        .fold(builder, |b, p| b.add_passthrough_copy(p));
    let builder = declaration
        .watch
        .iter()
        .fold(builder, |b, w| b.add_watch_target(w));

    declaration
        .ignore
        .iter()
        .fold(builder, |b, g| b.ignore(g.clone()))
        .build()
}

/// Lexically normalizes a path, dropping `.` components and resolving `..` where possible
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }

    normalized
}

pub(crate) fn paths_overlap(a: &Path, b: &Path) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    a.starts_with(&b) || b.starts_with(&a)
}
