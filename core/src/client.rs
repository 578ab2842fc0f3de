//! Async CMS admin client.
//!
//! # Design
//! `CmsClient` pairs each `api::*::build_*` function with the pipeline.
//! Methods resolve with the full `ResponseEnvelope`; callers unwrap `data`
//! with `ResponseEnvelope::into_data`. Nothing is cached: two identical
//! calls are two requests.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{article, attach, auth, category, comment, tag};
use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::pipeline::{Hooks, Pipeline};
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::types::{
    ArticleInput, ArticleQuery, CategoryInput, CommentQuery, CommentStatus, Id, LoginData,
    NameQuery, TagInput, UploadFile,
};

pub struct CmsClient {
    pipeline: Pipeline,
}

impl CmsClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        hooks: Hooks,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(config, transport, session, hooks),
        }
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn session(&self) -> &SessionStore {
        self.pipeline.session()
    }

    // --- auth ---

    pub async fn login(&self, account: &str, password: &str) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(auth::build_login(account, password)?).await
    }

    /// Log in and persist the returned token for subsequent requests.
    pub async fn sign_in(&self, account: &str, password: &str) -> Result<LoginData, ApiError> {
        let data: LoginData = self.login(account, password).await?.into_data()?;
        self.session()
            .store_token(&data.token)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        info!(account = %data.user.account, "signed in");
        Ok(data)
    }

    /// Log out on the server. The local token is erased once the call
    /// settles, whether or not the server accepted it.
    pub async fn logout(&self) -> Result<ResponseEnvelope, ApiError> {
        let result = self.pipeline.send(auth::build_logout()).await;
        if let Err(e) = self.session().clear() {
            warn!(error = %e, "failed to erase session token on logout");
        }
        result
    }

    pub async fn profile(&self) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(auth::build_profile()).await
    }

    // --- articles ---

    pub async fn list_articles(&self, query: &ArticleQuery) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(article::build_list_articles(query)?).await
    }

    pub async fn get_article(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(article::build_get_article(id)).await
    }

    pub async fn create_article(&self, input: &ArticleInput) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(article::build_create_article(input)?).await
    }

    pub async fn update_article(
        &self,
        id: Id,
        input: &ArticleInput,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(article::build_update_article(id, input)?).await
    }

    pub async fn delete_article(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(article::build_delete_article(id)).await
    }

    // --- categories ---

    pub async fn list_categories(&self, query: &NameQuery) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_list_categories(query)?).await
    }

    pub async fn all_categories(&self) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_all_categories()).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_create_category(input)?).await
    }

    pub async fn update_category(
        &self,
        id: Id,
        input: &CategoryInput,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_update_category(id, input)?).await
    }

    pub async fn delete_category(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_delete_category(id)).await
    }

    pub async fn get_category(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(category::build_get_category(id)).await
    }

    // --- tags ---

    pub async fn list_tags(&self, query: &NameQuery) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_list_tags(query)?).await
    }

    pub async fn all_tags(&self) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_all_tags()).await
    }

    pub async fn create_tag(&self, input: &TagInput) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_create_tag(input)?).await
    }

    pub async fn update_tag(&self, id: Id, input: &TagInput) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_update_tag(id, input)?).await
    }

    pub async fn delete_tag(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_delete_tag(id)).await
    }

    pub async fn get_tag(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(tag::build_get_tag(id)).await
    }

    // --- comments ---

    pub async fn list_comments(&self, query: &CommentQuery) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(comment::build_list_comments(query)?).await
    }

    pub async fn update_comment_status(
        &self,
        id: Id,
        status: CommentStatus,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(comment::build_update_comment_status(id, status)?).await
    }

    pub async fn delete_comment(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(comment::build_delete_comment(id)).await
    }

    pub async fn batch_review_comments(
        &self,
        ids: &[Id],
        status: CommentStatus,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(comment::build_batch_review_comments(ids, status)?).await
    }

    pub async fn get_comment(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(comment::build_get_comment(id)).await
    }

    // --- attachments ---

    pub async fn list_attachments(&self, query: &NameQuery) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(attach::build_list_attachments(query)?).await
    }

    pub async fn upload_attachment(&self, file: &UploadFile) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(attach::build_upload_attachment(file)).await
    }

    pub async fn delete_attachment(&self, id: Id) -> Result<ResponseEnvelope, ApiError> {
        self.pipeline.send(attach::build_delete_attachment(id)).await
    }
}

impl std::fmt::Debug for CmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsClient").field("pipeline", &self.pipeline).finish()
    }
}
