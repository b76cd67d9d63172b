use std::path::Path;

use crate::config::TemplateEngine;

/// Format of a renderable source file, derived from its extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Html,
    Markdown,
    Nunjucks,
}

/// How a source file is turned into html
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parser {
    /// rendered as a template
    Template,
    /// rendered as a template, the result converted from markdown
    TemplateThenMarkdown,
    /// converted from markdown only
    Markdown,
    /// written as is
    Raw,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [Self::Html, Self::Markdown, Self::Nunjucks];

    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();

        match extension.as_str() {
            "html" | "htm" => Some(Self::Html),
            "md" | "markdown" => Some(Self::Markdown),
            "njk" => Some(Self::Nunjucks),
            _ => None,
        }
    }
}

impl Parser {
    pub fn needs_template(&self) -> bool {
        matches!(self, Self::Template | Self::TemplateThenMarkdown)
    }
}

/// Picks the parser for a source format.
/// Html and markdown follow the configured engine, `.njk` files are always templates.
pub fn parser_for(format: SourceFormat, engine: TemplateEngine) -> Parser {
    match (format, engine) {
        (SourceFormat::Nunjucks, _) => Parser::Template,
        (SourceFormat::Html, TemplateEngine::Nunjucks) => Parser::Template,
        (SourceFormat::Html, TemplateEngine::Html) => Parser::Raw,
        (SourceFormat::Markdown, TemplateEngine::Nunjucks) => Parser::TemplateThenMarkdown,
        (SourceFormat::Markdown, TemplateEngine::Html) => Parser::Markdown,
    }
}
