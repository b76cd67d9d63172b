mod filters;
mod markdown;

pub use filters::register_all;
pub use markdown::markdown_to_html;
