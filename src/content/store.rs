//! Document and blob store collaborators, with an in-memory implementation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use log::debug;

use super::types::{Affiliate, AffiliateDraft, Article, ArticleDraft, ArticleUpdate};
use super::ContentError;

pub const ARTICLES: &str = "articles";
pub const AFFILIATES: &str = "affiliates";

/// CRUD over article and affiliate records keyed by generated identifiers
pub trait DocumentStore: Send + Sync {
    fn create_article(&self, draft: ArticleDraft) -> Result<Article, ContentError>;
    fn get_article(&self, id: &str) -> Result<Article, ContentError>;
    /// Newest first
    fn list_articles(&self) -> Result<Vec<Article>, ContentError>;
    fn update_article(&self, id: &str, update: ArticleUpdate) -> Result<Article, ContentError>;
    fn delete_article(&self, id: &str) -> Result<(), ContentError>;

    fn create_affiliate(&self, draft: AffiliateDraft) -> Result<Affiliate, ContentError>;
    /// Newest first
    fn list_affiliates(&self) -> Result<Vec<Affiliate>, ContentError>;
    fn delete_affiliate(&self, id: &str) -> Result<(), ContentError>;
}

/// Accepts a file and returns a URL it can be fetched from
pub trait BlobStore: Send + Sync {
    fn upload(&self, folder: &str, name: &str, bytes: &[u8]) -> Result<String, ContentError>;
}

/// Process-local store for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: RwLock<BTreeMap<String, Article>>,
    affiliates: RwLock<BTreeMap<String, Affiliate>>,
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id(&self) -> String {
        format!("{:016x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Bytes previously uploaded under `url`
    pub fn blob(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.read().ok()?.get(url).cloned()
    }
}

fn poisoned<T>(_: T) -> ContentError {
    ContentError::Unavailable("store lock poisoned".into())
}

fn not_found(collection: &'static str, id: &str) -> ContentError {
    ContentError::NotFound {
        collection,
        id: id.to_string(),
    }
}

impl DocumentStore for MemoryStore {
    fn create_article(&self, draft: ArticleDraft) -> Result<Article, ContentError> {
        draft.validate()?;

        let article = Article {
            id: self.generate_id(),
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            thumbnail: draft.thumbnail,
            video: draft.video,
            content: draft.content,
            created_at: Utc::now(),
        };

        self.articles.write().map_err(poisoned)?.insert(article.id.clone(), article.clone());
        debug!("Created article {}", article.id);
        Ok(article)
    }

    fn get_article(&self, id: &str) -> Result<Article, ContentError> {
        self.articles
            .read()
            .map_err(poisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(ARTICLES, id))
    }

    fn list_articles(&self) -> Result<Vec<Article>, ContentError> {
        let mut articles: Vec<Article> = self.articles.read().map_err(poisoned)?.values().cloned().collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(articles)
    }

    fn update_article(&self, id: &str, update: ArticleUpdate) -> Result<Article, ContentError> {
        update.validate()?;

        let mut articles = self.articles.write().map_err(poisoned)?;
        let article = articles.get_mut(id).ok_or_else(|| not_found(ARTICLES, id))?;

        article.title = update.title;
        article.description = update.description;
        if !update.thumbnail.trim().is_empty() {
            article.thumbnail = update.thumbnail;
        }
        article.video = update.video;
        article.content = update.content;

        debug!("Updated article {}", id);
        Ok(article.clone())
    }

    fn delete_article(&self, id: &str) -> Result<(), ContentError> {
        self.articles
            .write()
            .map_err(poisoned)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(ARTICLES, id))
    }

    fn create_affiliate(&self, draft: AffiliateDraft) -> Result<Affiliate, ContentError> {
        draft.validate()?;

        let affiliate = Affiliate {
            id: self.generate_id(),
            link: draft.link,
            thumbnail: draft.thumbnail,
            created_at: Utc::now(),
        };

        self.affiliates.write().map_err(poisoned)?.insert(affiliate.id.clone(), affiliate.clone());
        Ok(affiliate)
    }

    fn list_affiliates(&self) -> Result<Vec<Affiliate>, ContentError> {
        let mut affiliates: Vec<Affiliate> = self.affiliates.read().map_err(poisoned)?.values().cloned().collect();
        affiliates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(affiliates)
    }

    fn delete_affiliate(&self, id: &str) -> Result<(), ContentError> {
        self.affiliates
            .write()
            .map_err(poisoned)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(AFFILIATES, id))
    }
}

impl BlobStore for MemoryStore {
    fn upload(&self, folder: &str, name: &str, bytes: &[u8]) -> Result<String, ContentError> {
        if name.trim().is_empty() {
            return Err(ContentError::Validation("file name"));
        }

        let url = format!("memory://{}/{}-{}", folder, self.generate_id(), name);
        self.blobs.write().map_err(poisoned)?.insert(url.clone(), bytes.to_vec());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> ArticleDraft {
        ArticleDraft {
            user_id: "u1".into(),
            title: title.into(),
            description: "desc".into(),
            thumbnail: "memory://image/t.png".into(),
            video: None,
            content: "<p>body</p>".into(),
        }
    }

    #[test]
    fn test_article_crud() {
        let store = MemoryStore::new();

        let created = store.create_article(draft("First")).unwrap();
        assert_eq!(store.get_article(&created.id).unwrap(), created);

        let updated = store
            .update_article(
                &created.id,
                ArticleUpdate {
                    title: "Renamed".into(),
                    description: "desc".into(),
                    thumbnail: String::new(),
                    video: Some("memory://video/v.mp4".into()),
                    content: "<p>new</p>".into(),
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.thumbnail, created.thumbnail);
        assert_eq!(updated.created_at, created.created_at);

        store.delete_article(&created.id).unwrap();
        assert!(matches!(
            store.get_article(&created.id),
            Err(ContentError::NotFound { collection: ARTICLES, .. })
        ));
        assert!(store.delete_article(&created.id).is_err());
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryStore::new();
        let a = store.create_article(draft("a")).unwrap();
        let b = store.create_article(draft("b")).unwrap();

        let ids: Vec<String> = store.list_articles().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_invalid_draft_not_stored() {
        let store = MemoryStore::new();
        assert!(store.create_article(draft("")).is_err());
        assert!(store.list_articles().unwrap().is_empty());
    }

    #[test]
    fn test_affiliates() {
        let store = MemoryStore::new();
        let url = store.upload("affiliate", "banner.png", b"png").unwrap();
        let created = store
            .create_affiliate(AffiliateDraft {
                link: "https://example.com/ref".into(),
                thumbnail: url.clone(),
            })
            .unwrap();

        assert_eq!(store.list_affiliates().unwrap(), vec![created.clone()]);
        assert_eq!(store.blob(&url), Some(b"png".to_vec()));

        store.delete_affiliate(&created.id).unwrap();
        assert!(store.list_affiliates().unwrap().is_empty());
    }

    #[test]
    fn test_upload_urls_are_unique() {
        let store = MemoryStore::new();
        let a = store.upload("image", "x.png", b"1").unwrap();
        let b = store.upload("image", "x.png", b"2").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("memory://image/"));
    }
}
