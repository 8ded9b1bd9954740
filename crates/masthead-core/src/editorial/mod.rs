//! Editorial content and its lifecycle
//!
//! Owns the article collection. Every mutating operation runs its
//! validation and permission checks to completion before touching state,
//! then writes the whole collection through to the durable store; a
//! refused operation leaves the collection unchanged.

pub mod article;
pub mod markup;

pub use article::{Article, ArticleFields, ArticleStatus};

use chrono::Utc;
use tracing::info;

use crate::identity::Account;
use crate::policy::{self, Capability};
use crate::store::{Aggregate, Store};
use crate::{Error, Result};

/// Outcome of reviewing a pending article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    /// Status the article moves to under this decision
    pub fn target_status(&self) -> ArticleStatus {
        match self {
            ReviewDecision::Approve => ArticleStatus::Approved,
            ReviewDecision::Reject => ArticleStatus::Rejected,
        }
    }
}

/// The article collection and its lifecycle operations
#[derive(Debug)]
pub struct Desk {
    store: Store,
    articles: Vec<Article>,
}

impl Desk {
    /// Load the article collection; absent storage defaults to empty
    pub async fn load(store: Store) -> Result<Self> {
        let articles = store.read(Aggregate::Articles).await?.unwrap_or_default();
        Ok(Self { store, articles })
    }

    /// All articles
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Find an article by id
    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Articles waiting for review
    pub fn pending(&self) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.status == ArticleStatus::Pending)
            .collect()
    }

    /// Snapshot of the approved pool, cloned for the publication side
    pub fn approved(&self) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|a| a.status == ArticleStatus::Approved)
            .cloned()
            .collect()
    }

    /// Articles the actor sees in listings: reporters see only their own
    pub fn visible_to(&self, actor: &Account) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| {
                policy::has_capability(actor, Capability::ReviewArticles)
                    || a.author_id == actor.id
            })
            .collect()
    }

    /// Create a new article, saved as draft or submitted straight to review
    ///
    /// Any account may author articles. The target status must be draft or
    /// pending; review states are never a save target.
    pub async fn create(
        &mut self,
        author: &Account,
        fields: ArticleFields,
        target: ArticleStatus,
        categories: &[String],
    ) -> Result<Article> {
        validate_fields(&fields, target, categories)?;

        let mut created = Article::new(author, fields);
        created.status = target;

        info!(id = %created.id, status = %target, "article created");
        self.articles.push(created.clone());
        self.store.save(Aggregate::Articles, &self.articles).await;
        Ok(created)
    }

    /// Edit an article's content, choosing draft or pending as the saved status
    ///
    /// Guarded by the edit rule: author only, and approved articles are
    /// frozen. The supplied category is validated against the current
    /// taxonomy just like on create. Editing a rejected article and saving
    /// it as pending is how it re-enters review.
    pub async fn update(
        &mut self,
        actor: &Account,
        id: &str,
        fields: ArticleFields,
        target: ArticleStatus,
        categories: &[String],
    ) -> Result<Article> {
        let index = self
            .articles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound(id.to_string()))?;

        if !policy::can_edit_article(actor, &self.articles[index]) {
            return Err(Error::PermissionDenied(
                "articles may be edited only by their author, and approved articles are frozen"
                    .to_string(),
            ));
        }
        validate_fields(&fields, target, categories)?;

        let article = &mut self.articles[index];
        article.title = fields.title;
        article.body = fields.body;
        article.category = fields.category;
        article.cover_image = fields.cover_image;
        article.status = target;
        article.updated_at = Some(Utc::now());
        let updated = article.clone();

        info!(id = %updated.id, status = %target, "article updated");
        self.store.save(Aggregate::Articles, &self.articles).await;
        Ok(updated)
    }

    /// Submit a draft for review without editing it
    pub async fn submit_for_review(&mut self, actor: &Account, id: &str) -> Result<Article> {
        let index = self
            .articles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound(id.to_string()))?;

        let article = &self.articles[index];
        if article.author_id != actor.id {
            return Err(Error::PermissionDenied(
                "only the author may submit an article for review".to_string(),
            ));
        }
        if article.status != ArticleStatus::Draft {
            return Err(Error::Validation(format!(
                "only draft articles can be submitted for review, this one is {}",
                article.status
            )));
        }
        if article.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        if !markup::has_content(&article.body) {
            return Err(Error::Validation("article body is empty".to_string()));
        }

        let article = &mut self.articles[index];
        article.status = ArticleStatus::Pending;
        let submitted = article.clone();

        info!(id = %submitted.id, "article submitted for review");
        self.store.save(Aggregate::Articles, &self.articles).await;
        Ok(submitted)
    }

    /// Approve or reject a pending article
    ///
    /// Requires the review capability. Decisions are one-way: only pending
    /// articles can be reviewed, and a decided article is never re-reviewed.
    pub async fn review(
        &mut self,
        actor: &Account,
        id: &str,
        decision: ReviewDecision,
    ) -> Result<Article> {
        if !policy::has_capability(actor, Capability::ReviewArticles) {
            return Err(Error::PermissionDenied(format!(
                "{} may not review articles",
                actor.role
            )));
        }

        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound(id.to_string()))?;

        if article.status != ArticleStatus::Pending {
            return Err(Error::Validation(format!(
                "only pending articles can be reviewed, this one is {}",
                article.status
            )));
        }

        article.status = decision.target_status();
        let decided = article.clone();

        info!(id = %decided.id, status = %decided.status, "article reviewed");
        self.store.save(Aggregate::Articles, &self.articles).await;
        Ok(decided)
    }

    /// Delete an article
    ///
    /// Hard delete, with no cleanup of published issues that reference the
    /// id; rendering resolves dangling references by skipping them.
    pub async fn delete(&mut self, actor: &Account, id: &str) -> Result<Article> {
        let index = self
            .articles
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound(id.to_string()))?;

        if !policy::can_delete_article(actor, &self.articles[index]) {
            return Err(Error::PermissionDenied(
                "articles may be deleted by their author, an admin, or a chief editor".to_string(),
            ));
        }

        let removed = self.articles.remove(index);
        info!(id = %removed.id, "article deleted");
        self.store.save(Aggregate::Articles, &self.articles).await;
        Ok(removed)
    }
}

/// Save-time validation shared by create and edit
fn validate_fields(
    fields: &ArticleFields,
    target: ArticleStatus,
    categories: &[String],
) -> Result<()> {
    validate_content_fields(fields, target)?;
    if !categories.contains(&fields.category) {
        return Err(Error::Validation(format!(
            "'{}' is not one of the organization's categories",
            fields.category
        )));
    }
    Ok(())
}

/// Title and body checks for a save
///
/// Draft saves require raw non-empty title and body; submitting to review
/// additionally requires that the body has content once markup is stripped.
fn validate_content_fields(fields: &ArticleFields, target: ArticleStatus) -> Result<()> {
    if !matches!(target, ArticleStatus::Draft | ArticleStatus::Pending) {
        return Err(Error::Validation(format!(
            "articles are saved as draft or pending, not {target}"
        )));
    }
    if fields.title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    if fields.body.is_empty() {
        return Err(Error::Validation("article body is required".to_string()));
    }
    if target == ArticleStatus::Pending && !markup::has_content(&fields.body) {
        return Err(Error::Validation("article body is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Role;

    fn categories() -> Vec<String> {
        vec!["General News".to_string(), "Opinion".to_string()]
    }

    fn fields(title: &str, body: &str) -> ArticleFields {
        ArticleFields {
            title: title.to_string(),
            body: body.to_string(),
            category: "General News".to_string(),
            cover_image: None,
        }
    }

    fn reporter() -> Account {
        Account::new("Jo Writer", "jo@example.com")
    }

    fn editor() -> Account {
        Account::new("Eddie Editor", "eddie@example.com").with_role(Role::Editor)
    }

    async fn empty_desk() -> Desk {
        let store = Store::in_memory().await.expect("Failed to create store");
        Desk::load(store).await.expect("Failed to load desk")
    }

    #[tokio::test]
    async fn test_create_draft_and_persist() {
        let store = Store::in_memory().await.expect("Failed to create store");
        let mut desk = Desk::load(store.clone()).await.expect("Failed to load desk");

        let article = desk
            .create(&reporter(), fields("T", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");
        assert_eq!(article.status, ArticleStatus::Draft);

        let persisted: Vec<Article> = store
            .read(Aggregate::Articles)
            .await
            .expect("Read should succeed")
            .expect("Articles should be persisted");
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, article.id);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let err = desk
            .create(&author, fields("   ", "<p>x</p>"), ArticleStatus::Pending, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = desk
            .create(&author, fields("T", ""), ArticleStatus::Draft, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // Markup-only bodies cannot be submitted for review
        let err = desk
            .create(&author, fields("T", "<p>  </p>"), ArticleStatus::Pending, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // ...but may be kept as a draft while writing continues
        desk.create(&author, fields("T", "<p>  </p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Draft save of markup-only body is allowed");

        let err = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Approved, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut unknown_category = fields("T", "<p>x</p>");
        unknown_category.category = "Sports".to_string();
        let err = desk
            .create(&author, unknown_category, ArticleStatus::Draft, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(desk.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_for_review() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let draft = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");

        // Only the author may submit
        let err = desk.submit_for_review(&editor(), &draft.id).await.unwrap_err();
        assert!(err.is_permission_denied());

        let submitted = desk
            .submit_for_review(&author, &draft.id)
            .await
            .expect("Submit failed");
        assert_eq!(submitted.status, ArticleStatus::Pending);

        // Pending articles cannot be submitted again
        let err = desk.submit_for_review(&author, &draft.id).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_submit_with_empty_body_stays_draft() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let draft = desk
            .create(&author, fields("T", "<p>  </p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");

        let err = desk.submit_for_review(&author, &draft.id).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(desk.get(&draft.id).unwrap().status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn test_review_requires_capability_and_pending_status() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Pending, &categories())
            .await
            .expect("Create failed");

        let err = desk
            .review(&author, &article.id, ReviewDecision::Approve)
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());

        let approved = desk
            .review(&editor(), &article.id, ReviewDecision::Approve)
            .await
            .expect("Review failed");
        assert_eq!(approved.status, ArticleStatus::Approved);

        // Decided articles are never re-reviewed
        let err = desk
            .review(&editor(), &article.id, ReviewDecision::Reject)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(desk.get(&article.id).unwrap().status, ArticleStatus::Approved);
    }

    #[tokio::test]
    async fn test_rejected_article_can_be_edited_back_to_pending() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Pending, &categories())
            .await
            .expect("Create failed");
        desk.review(&editor(), &article.id, ReviewDecision::Reject)
            .await
            .expect("Review failed");

        let revised = desk
            .update(&author, &article.id, fields("T2", "<p>y</p>"), ArticleStatus::Pending, &categories())
            .await
            .expect("Rejected articles stay editable by their author");
        assert_eq!(revised.status, ArticleStatus::Pending);
        assert_eq!(revised.title, "T2");
        assert!(revised.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_approved_article_is_frozen() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Pending, &categories())
            .await
            .expect("Create failed");
        desk.review(&editor(), &article.id, ReviewDecision::Approve)
            .await
            .expect("Review failed");

        let err = desk
            .update(&author, &article.id, fields("T2", "<p>y</p>"), ArticleStatus::Draft, &categories())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(desk.get(&article.id).unwrap().title, "T");
    }

    #[tokio::test]
    async fn test_update_validates_category_like_create() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");

        let mut unknown_category = fields("T2", "<p>y</p>");
        unknown_category.category = "Sports".to_string();
        let err = desk
            .update(&author, &article.id, unknown_category, ArticleStatus::Draft, &categories())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(desk.get(&article.id).unwrap().category, "General News");
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_denied() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");

        let err = desk
            .update(&editor(), &article.id, fields("T2", "<p>y</p>"), ArticleStatus::Draft, &categories())
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let mut desk = empty_desk().await;
        let author = reporter();

        let article = desk
            .create(&author, fields("T", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");

        // Editors may not delete other people's articles
        let err = desk.delete(&editor(), &article.id).await.unwrap_err();
        assert!(err.is_permission_denied());

        let chief = Account::new("Casey Chief", "casey@example.com").with_role(Role::ChiefEditor);
        desk.delete(&chief, &article.id)
            .await
            .expect("Chief editors may delete any article");
        assert!(desk.get(&article.id).is_none());

        let err = desk.delete(&author, &article.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_listings() {
        let mut desk = empty_desk().await;
        let author = reporter();
        let other = Account::new("Sam Scribe", "sam@example.com");

        desk.create(&author, fields("Mine", "<p>x</p>"), ArticleStatus::Draft, &categories())
            .await
            .expect("Create failed");
        let pending = desk
            .create(&other, fields("Theirs", "<p>y</p>"), ArticleStatus::Pending, &categories())
            .await
            .expect("Create failed");

        assert_eq!(desk.pending().len(), 1);
        assert!(desk.approved().is_empty());

        // Reporters see only their own work; reviewers see everything
        assert_eq!(desk.visible_to(&author).len(), 1);
        assert_eq!(desk.visible_to(&editor()).len(), 2);

        desk.review(&editor(), &pending.id, ReviewDecision::Approve)
            .await
            .expect("Review failed");
        assert_eq!(desk.approved().len(), 1);
    }
}
