//! Reply generators for the chat view.
//!
//! There is no model behind these: replies are picked from canned tables by
//! keyword. The style is chosen in `config.toml`.

pub mod keyword_reply;

use std::sync::Arc;

use querycraft_core::config::ReplyStyle;
use querycraft_core::reply::ReplyGenerator;

pub use keyword_reply::{KeywordReplyGenerator, KeywordRule};

/// Builds the reply generator for the configured style.
pub fn reply_generator_for(style: ReplyStyle) -> Arc<dyn ReplyGenerator> {
    match style {
        ReplyStyle::General => Arc::new(KeywordReplyGenerator::general()),
        ReplyStyle::Genomics => Arc::new(KeywordReplyGenerator::genomics()),
    }
}
