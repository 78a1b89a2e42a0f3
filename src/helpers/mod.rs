//! Helper functions shared by content shaping and templates

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
