mod global;
mod page;
mod page_loader;
mod source_loader;

pub use global::*;
pub use page::*;
pub use page_loader::*;
pub use source_loader::*;
