//! News/blog content: article and affiliate records and the stores behind them

mod types;
mod store;

pub use types::{Affiliate, AffiliateDraft, Article, ArticleDraft, ArticleUpdate};
pub use store::{BlobStore, DocumentStore, MemoryStore, AFFILIATES, ARTICLES};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("{0} is required")]
    Validation(&'static str),

    #[error("no {collection} record with id {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
