use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use async_walkdir::WalkDir;
use futures::StreamExt;
use miette::{miette, Context as _, IntoDiagnostic, Result};
use tera::Tera;
use tokio::fs;

use crate::{
    common::SaveFile,
    context::Context,
    data::{load_page, template_name, GlobalData, Page},
    pipeline::{ProcessingStep, ProcessingStepChain, ProcessingStepParallel},
    routing::parser_for,
};

use self::render_page::RenderPage;

mod permalink;
mod render_page;

pub use permalink::*;

const AUTOESCAPE_SUFFIXES: [&str; 5] = [".html", ".htm", ".xml", ".njk", ".md"];

// renders every page source into the output directory
pub struct SiteRenderer {
    ctx: Arc<Context>,
}

pub struct LoadPage {
    input_dir: PathBuf,
}

#[async_trait]
impl ProcessingStep for LoadPage {
    type Input = PathBuf;
    type Output = Page;

    #[tracing::instrument(name = "load page", level = "trace", skip_all)]
    async fn process(&self, path: Self::Input) -> Result<Self::Output> {
        load_page(&self.input_dir, &path).await
    }
}

impl SiteRenderer {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Renders all sources and returns the number of written pages
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn render_all(&self, sources: Vec<PathBuf>, global: GlobalData) -> Result<usize> {
        let pages = LoadPage {
            input_dir: self.ctx.dirs.input_dir.to_owned(),
        }
        .parallel()
        .process(sources)
        .await?;
        let pages = assign_permalinks(pages)?;
        let tera = self.build_tera(pages.iter().map(|(p, _)| p)).await?;

        let written = RenderPage {
            tera,
            ctx: self.ctx.clone(),
            global: Arc::new(global),
        }
        .chain(SaveFile)
        .parallel()
        .process(pages)
        .await?;

        Ok(written.len())
    }

    /// Registers the includes and every page that needs templating
    async fn build_tera<'a, I: Iterator<Item = &'a Page>>(&self, pages: I) -> Result<Tera> {
        let mut tera = Tera::default();
        tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());
        crate::processors::register_all(&mut tera);

        let includes = load_includes(&self.ctx.dirs.includes_dir).await?;
        tracing::debug!("loaded {} includes", includes.len());

        let engine = self.ctx.config.template_engine;
        let page_templates = pages
            .filter(|p| parser_for(p.format, engine).needs_template())
            .map(|p| (p.template_name(), p.body.clone()));

        tera.add_raw_templates(includes.into_iter().chain(page_templates))
            .into_diagnostic()
            .context("parsing templates")?;

        Ok(tera)
    }
}

/// Pairs pages with their permalinks, two pages may not write the same file
fn assign_permalinks(pages: Vec<Page>) -> Result<Vec<(Page, Permalink)>> {
    let mut seen: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut assigned = Vec::with_capacity(pages.len());

    for page in pages {
        let permalink = Permalink::for_page(&page)
            .with_context(|| format!("resolving permalink of {}", page.rel_path.display()))?;

        if let Some(other) = seen.insert(permalink.output_path.clone(), page.rel_path.clone()) {
            return Err(miette!(
                "{} and {} both write to {}",
                other.display(),
                page.rel_path.display(),
                permalink.output_path.display()
            ));
        }
        assigned.push((page, permalink));
    }

    Ok(assigned)
}

/// Loads all templates of the includes dir, named by their path relative to it
#[tracing::instrument(level = "trace")]
async fn load_includes(includes_dir: &Path) -> Result<Vec<(String, String)>> {
    let mut includes = Vec::new();

    if !includes_dir.exists() {
        return Ok(includes);
    }
    let mut entries = WalkDir::new(includes_dir);

    while let Some(res) = entries.next().await {
        let entry_path = res.into_diagnostic()?.path();

        if entry_path.is_file() {
            let rel_path = entry_path.strip_prefix(includes_dir).into_diagnostic()?;
            let content = fs::read_to_string(&entry_path)
                .await
                .into_diagnostic()
                .with_context(|| format!("reading include {}", entry_path.display()))?;
            includes.push((template_name(rel_path), content));
        }
    }

    Ok(includes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::FrontMatter, routing::SourceFormat};

    fn page(rel_path: &str, permalink: Option<&str>) -> Page {
        Page {
            rel_path: rel_path.into(),
            format: SourceFormat::Markdown,
            front_matter: FrontMatter {
                permalink: permalink.map(str::to_owned),
                ..Default::default()
            },
            body: String::new(),
        }
    }

    #[test]
    fn detects_conflicting_permalinks() {
        let pages = vec![page("about.md", None), page("about/index.md", None)];
        assert!(assign_permalinks(pages).is_err());

        let pages = vec![page("about.md", None), page("team.md", Some("/about/"))];
        assert!(assign_permalinks(pages).is_err());
    }

    #[test]
    fn assigns_permalinks_in_order() {
        let pages = vec![page("index.md", None), page("contact.md", None)];
        let assigned = assign_permalinks(pages).unwrap();

        let urls: Vec<_> = assigned.iter().map(|(_, p)| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/", "/contact/"]);
    }

    #[tokio::test]
    async fn loads_nested_includes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("partials")).unwrap();
        std::fs::write(dir.path().join("base.njk"), "{{ content }}").unwrap();
        std::fs::write(dir.path().join("partials/nav.njk"), "<nav></nav>").unwrap();

        let mut includes = load_includes(dir.path()).await.unwrap();
        includes.sort();

        let names: Vec<_> = includes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["base.njk", "partials/nav.njk"]);
    }
}
