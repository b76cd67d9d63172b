use std::{collections::HashSet, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use miette::{miette, Context as _, IntoDiagnostic, Result};
use serde::Serialize;
use tera::{Context as TeraContext, Tera};

use crate::{
    common::SaveFileParams,
    context::Context,
    data::{GlobalData, Page, PAGE_TEMPLATE_PREFIX},
    pipeline::ProcessingStep,
    processors::markdown_to_html,
    routing::{parser_for, Parser},
};

use super::permalink::Permalink;

const LAYOUT_EXTENSIONS: [&str; 2] = ["njk", "html"];

pub struct RenderPage {
    pub tera: Tera,
    pub ctx: Arc<Context>,
    pub global: Arc<GlobalData>,
}

/// Information about the page being rendered, available as `page` in templates
#[derive(Serialize)]
struct PageInfo {
    url: String,
    input_path: PathBuf,
    output_path: PathBuf,
}

#[async_trait]
impl ProcessingStep for RenderPage {
    type Input = (Page, Permalink);
    type Output = SaveFileParams;

    #[tracing::instrument(name = "render page", level = "trace", skip_all)]
    async fn process(&self, (page, permalink): Self::Input) -> Result<Self::Output> {
        let parser = parser_for(page.format, self.ctx.config.template_engine);
        let mut context = TeraContext::from_serialize(&*self.global).into_diagnostic()?;

        for (key, value) in &page.front_matter.data {
            context.insert(key.as_str(), value);
        }
        context.insert(
            "page",
            &PageInfo {
                url: permalink.url.clone(),
                input_path: self.ctx.config.dirs.input.join(&page.rel_path),
                output_path: self.ctx.config.dirs.output.join(&permalink.output_path),
            },
        );
        tracing::debug!("rendering {:?} with {parser:?}", page.rel_path);

        let html = match parser {
            Parser::Template => self.render_template(&page.template_name(), &context)?,
            Parser::TemplateThenMarkdown => {
                markdown_to_html(&self.render_template(&page.template_name(), &context)?)
            }
            Parser::Markdown => markdown_to_html(&page.body),
            Parser::Raw => page.body,
        };
        let html = match &page.front_matter.layout {
            Some(layout) => {
                let layout = self.resolve_layout(layout)?;
                context.insert("content", &html);
                self.render_template(&layout, &context)?
            }
            None => html,
        };

        Ok(SaveFileParams {
            path: self.ctx.dirs.output_dir.join(&permalink.output_path),
            contents: html.into_bytes(),
        })
    }
}

impl RenderPage {
    fn render_template(&self, name: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(name, context)
            .into_diagnostic()
            .with_context(|| format!("rendering template {name}"))
    }

    /// Finds the layout in the includes dir, the extension may be omitted
    fn resolve_layout(&self, layout: &str) -> Result<String> {
        let names: HashSet<&str> = self
            .tera
            .get_template_names()
            .filter(|name| !name.starts_with(PAGE_TEMPLATE_PREFIX))
            .collect();

        std::iter::once(layout.to_owned())
            .chain(LAYOUT_EXTENSIONS.iter().map(|ext| format!("{layout}.{ext}")))
            .find(|candidate| names.contains(candidate.as_str()))
            .ok_or_else(|| miette!("layout {layout:?} not found in the includes directory"))
    }
}
