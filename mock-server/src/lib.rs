//! In-memory stand-in for the CMS backend.
//!
//! Every reply is the `{ code, message, data }` envelope. Business failures
//! (validation, missing records) are HTTP 200 with a non-200 code; a missing
//! or unknown bearer token is HTTP 401 with code 401.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const ADMIN_ACCOUNT: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
/// Seeded article that accepts comments.
pub const SEED_ARTICLE_ID: u64 = 1;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: i8,
    pub is_top: i8,
    pub is_comment: i8,
    pub view_count: u64,
    pub category_ids: Vec<u64>,
    pub tag_ids: Vec<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: i8,
    pub is_top: i8,
    pub is_comment: i8,
    pub category_ids: Vec<u64>,
    pub tag_ids: Vec<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub pid: i64,
    pub slug: String,
    pub desc: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: String,
    #[serde(rename = "pId")]
    pub parent_id: i64,
    pub slug: String,
    pub desc: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub article_id: u64,
    #[serde(rename = "pId")]
    pub parent_id: i64,
    pub username: String,
    pub email: String,
    pub website: String,
    pub content: String,
    /// 0 approved, 1 pending.
    pub status: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub mine_type: String,
    pub size: usize,
}

/// Rows keyed by a per-table id sequence starting at 1.
#[derive(Debug)]
pub struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self { next_id: 1, rows: BTreeMap::new() }
    }

    fn insert(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug)]
pub struct Store {
    pub tokens: HashSet<String>,
    pub articles: Table<Article>,
    pub categories: Table<Category>,
    pub tags: Table<Tag>,
    pub comments: Table<Comment>,
    pub attachments: Table<Attachment>,
}

impl Store {
    /// A store with one category, one open article and one pending comment.
    pub fn seeded() -> Self {
        let mut store = Self {
            tokens: HashSet::new(),
            articles: Table::new(),
            categories: Table::new(),
            tags: Table::new(),
            comments: Table::new(),
            attachments: Table::new(),
        };
        store.categories.insert(|id| Category {
            id,
            name: "General".into(),
            pid: -1,
            slug: "general".into(),
            desc: String::new(),
        });
        store.articles.insert(|id| Article {
            id,
            title: "Hello world".into(),
            slug: "hello-world".into(),
            summary: String::new(),
            content: "First post".into(),
            thumbnail: String::new(),
            kind: "article".into(),
            status: 1,
            is_top: 0,
            is_comment: 1,
            view_count: 0,
            category_ids: vec![1],
            tag_ids: Vec::new(),
        });
        store.comments.insert(|id| Comment {
            id,
            article_id: SEED_ARTICLE_ID,
            parent_id: -1,
            username: "visitor".into(),
            email: "visitor@example.com".into(),
            website: String::new(),
            content: "Nice post".into(),
            status: 1,
        });
        store
    }
}

pub type Db = Arc<RwLock<Store>>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Store::seeded())))
}

/// The router over a caller-owned store, so tests can inspect it.
pub fn app_with(db: Db) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/articles/page", get(list_articles))
        .route("/articles", post(create_article))
        .route("/articles/{id}", get(get_article).put(update_article).delete(delete_article))
        .route("/categories/page", get(list_categories))
        .route("/categories", get(all_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/tags/page", get(list_tags))
        .route("/tags", get(all_tags))
        .route("/tags/create", post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
        .route("/comments/page", get(list_comments))
        .route("/comments/batch-review", post(batch_review))
        .route("/comments/{id}", get(get_comment).delete(delete_comment))
        .route("/comments/{id}/status", put(update_comment_status))
        .route("/attach/page", get(list_attachments))
        .route("/attach/upload", post(upload_attachment))
        .route("/attach/{id}", axum::routing::delete(delete_attachment))
        .route_layer(middleware::from_fn_with_state(db.clone(), require_token));

    let api = Router::new().route("/login", post(login)).merge(protected);

    Router::new()
        .nest("/api", api)
        .route("/comment/submit", post(submit_comment))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Envelope helpers
// ---------------------------------------------------------------------------

fn ok(data: impl Serialize) -> Response {
    Json(json!({ "code": 200, "message": "success", "data": data })).into_response()
}

fn fail(code: i64, message: &str) -> Response {
    Json(json!({ "code": code, "message": message })).into_response()
}

fn not_found(what: &str) -> Response {
    fail(404, &format!("{what} not found"))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn require_token(State(db): State<Db>, request: Request, next: Next) -> Response {
    let valid = match bearer(request.headers()) {
        Some(token) => db.read().await.tokens.contains(&token),
        None => false,
    };
    if !valid {
        warn!(path = %request.uri().path(), "rejected request without a valid token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "message": "unauthorized" })),
        )
            .into_response();
    }
    next.run(request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub title: Option<String>,
    pub name: Option<String>,
    pub status: Option<i32>,
    pub category_id: Option<u64>,
    pub article_id: Option<u64>,
    pub keyword: Option<String>,
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

fn paginate<T: Serialize>(items: Vec<T>, query: &PageQuery) -> Response {
    let page = query.page.max(1);
    let size = query.page_size.max(1);
    let total = items.len();
    let offset = (page as usize - 1).saturating_mul(size as usize);
    let list: Vec<T> = items.into_iter().skip(offset).take(size as usize).collect();
    ok(json!({ "list": list, "total": total, "page": page, "pageSize": size }))
}

fn contains(haystack: &str, needle: Option<&String>) -> bool {
    needle.map_or(true, |n| haystack.contains(n.as_str()))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

fn admin_profile() -> Value {
    json!({
        "id": 1,
        "username": "Administrator",
        "account": ADMIN_ACCOUNT,
        "email": "admin@example.com",
        "avatar": ""
    })
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Response {
    if input.account != ADMIN_ACCOUNT || input.password != ADMIN_PASSWORD {
        warn!(account = %input.account, "login rejected");
        return fail(400, "invalid account or password");
    }
    let token = Uuid::new_v4().simple().to_string();
    db.write().await.tokens.insert(token.clone());
    info!(account = %input.account, "login accepted");
    Json(json!({
        "code": 200,
        "message": "login successful",
        "data": { "token": token, "user": admin_profile() }
    }))
    .into_response()
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer(&headers) {
        db.write().await.tokens.remove(&token);
    }
    ok(Value::Null)
}

async fn profile() -> Response {
    ok(admin_profile())
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

async fn list_articles(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let items: Vec<Article> = store
        .articles
        .rows
        .values()
        .filter(|a| contains(&a.title, query.title.as_ref()))
        .filter(|a| query.status.map_or(true, |s| i32::from(a.status) == s))
        .filter(|a| query.category_id.map_or(true, |c| a.category_ids.contains(&c)))
        .cloned()
        .collect();
    paginate(items, &query)
}

async fn get_article(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.articles.get(id) {
        Some(article) => ok(article),
        None => not_found("article"),
    }
}

fn apply_article(article: &mut Article, input: ArticleInput) {
    article.title = input.title;
    article.slug = input.slug;
    article.summary = input.summary;
    article.content = input.content;
    article.thumbnail = input.thumbnail;
    article.kind = input.kind;
    article.status = input.status;
    article.is_top = input.is_top;
    article.is_comment = input.is_comment;
    article.category_ids = input.category_ids;
    article.tag_ids = input.tag_ids;
}

async fn create_article(State(db): State<Db>, Json(input): Json<ArticleInput>) -> Response {
    if input.title.trim().is_empty() {
        return fail(400, "title is required");
    }
    let article = db.write().await.articles.insert(|id| {
        let mut article = Article {
            id,
            title: String::new(),
            slug: String::new(),
            summary: String::new(),
            content: String::new(),
            thumbnail: String::new(),
            kind: String::new(),
            status: 0,
            is_top: 0,
            is_comment: 0,
            view_count: 0,
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
        };
        apply_article(&mut article, input);
        article
    });
    info!(id = article.id, "article created");
    ok(json!({ "id": article.id }))
}

async fn update_article(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ArticleInput>,
) -> Response {
    let mut store = db.write().await;
    match store.articles.rows.get_mut(&id) {
        Some(article) => {
            apply_article(article, input);
            ok(article.clone())
        }
        None => not_found("article"),
    }
}

async fn delete_article(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    if store.articles.rows.remove(&id).is_none() {
        return not_found("article");
    }
    store.comments.rows.retain(|_, c| c.article_id != id);
    ok(Value::Null)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

async fn list_categories(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let items: Vec<Category> = store
        .categories
        .rows
        .values()
        .filter(|c| contains(&c.name, query.name.as_ref()))
        .cloned()
        .collect();
    paginate(items, &query)
}

async fn all_categories(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok(store.categories.rows.values().collect::<Vec<_>>())
}

async fn get_category(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.categories.get(id) {
        Some(category) => ok(category),
        None => not_found("category"),
    }
}

async fn create_category(State(db): State<Db>, Json(input): Json<CategoryInput>) -> Response {
    if input.name.trim().is_empty() {
        return fail(400, "name is required");
    }
    let category = db.write().await.categories.insert(|id| Category {
        id,
        name: input.name,
        pid: input.parent_id,
        slug: input.slug,
        desc: input.desc,
    });
    ok(json!({ "id": category.id }))
}

async fn update_category(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<CategoryInput>,
) -> Response {
    let mut store = db.write().await;
    match store.categories.rows.get_mut(&id) {
        Some(category) => {
            category.name = input.name;
            category.pid = input.parent_id;
            category.slug = input.slug;
            category.desc = input.desc;
            ok(category.clone())
        }
        None => not_found("category"),
    }
}

async fn delete_category(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    if store.articles.rows.values().any(|a| a.category_ids.contains(&id)) {
        return fail(400, "category is still in use");
    }
    match store.categories.rows.remove(&id) {
        Some(_) => ok(Value::Null),
        None => not_found("category"),
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn list_tags(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let items: Vec<Tag> = store
        .tags
        .rows
        .values()
        .filter(|t| contains(&t.name, query.name.as_ref()))
        .cloned()
        .collect();
    paginate(items, &query)
}

async fn all_tags(State(db): State<Db>) -> Response {
    let store = db.read().await;
    ok(store.tags.rows.values().collect::<Vec<_>>())
}

async fn get_tag(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.tags.get(id) {
        Some(tag) => ok(tag),
        None => not_found("tag"),
    }
}

async fn create_tag(State(db): State<Db>, Json(input): Json<Tag>) -> Response {
    if input.name.trim().is_empty() {
        return fail(400, "name is required");
    }
    let tag = db.write().await.tags.insert(|id| Tag { id, ..input });
    ok(json!({ "id": tag.id }))
}

async fn update_tag(State(db): State<Db>, Path(id): Path<u64>, Json(input): Json<Tag>) -> Response {
    let mut store = db.write().await;
    match store.tags.rows.get_mut(&id) {
        Some(tag) => {
            *tag = Tag { id, ..input };
            ok(tag.clone())
        }
        None => not_found("tag"),
    }
}

async fn delete_tag(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.write().await.tags.rows.remove(&id) {
        Some(_) => ok(Value::Null),
        None => not_found("tag"),
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

async fn list_comments(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let items: Vec<Comment> = store
        .comments
        .rows
        .values()
        .filter(|c| query.status.map_or(true, |s| c.status == s))
        .filter(|c| query.article_id.map_or(true, |a| c.article_id == a))
        .filter(|c| contains(&c.content, query.keyword.as_ref()))
        .cloned()
        .collect();
    paginate(items, &query)
}

async fn get_comment(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.comments.get(id) {
        Some(comment) => ok(comment),
        None => not_found("comment"),
    }
}

async fn delete_comment(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.write().await.comments.rows.remove(&id) {
        Some(_) => ok(Value::Null),
        None => not_found("comment"),
    }
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: i32,
}

fn valid_status(status: i32) -> bool {
    matches!(status, 0 | 1)
}

async fn update_comment_status(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<StatusUpdate>,
) -> Response {
    if !valid_status(input.status) {
        return fail(400, "invalid status");
    }
    let mut store = db.write().await;
    match store.comments.rows.get_mut(&id) {
        Some(comment) => {
            comment.status = input.status;
            ok(comment.clone())
        }
        None => not_found("comment"),
    }
}

#[derive(Deserialize)]
pub struct BatchReview {
    pub ids: Vec<u64>,
    pub status: i32,
}

async fn batch_review(State(db): State<Db>, Json(input): Json<BatchReview>) -> Response {
    if input.ids.is_empty() {
        return fail(400, "no comments selected");
    }
    if !valid_status(input.status) {
        return fail(400, "invalid status");
    }
    let mut store = db.write().await;
    let mut updated = 0;
    for id in &input.ids {
        if let Some(comment) = store.comments.rows.get_mut(id) {
            comment.status = input.status;
            updated += 1;
        }
    }
    ok(json!({ "updated": updated }))
}

/// Public comment form. Replies use `msg`, as the site's page script expects.
async fn submit_comment(State(db): State<Db>, mut form: Multipart) -> Response {
    let mut fields = HashMap::new();
    loop {
        match form.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                match field.text().await {
                    Ok(value) => {
                        fields.insert(name, value);
                    }
                    Err(e) => return public_reply(StatusCode::BAD_REQUEST, 400, &e.to_string()),
                }
            }
            Ok(None) => break,
            Err(e) => return public_reply(StatusCode::BAD_REQUEST, 400, &e.to_string()),
        }
    }

    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let Ok(article_id) = field("articleId").parse::<u64>() else {
        return public_reply(StatusCode::BAD_REQUEST, 400, "invalid articleId");
    };
    let content = field("content");
    if content.trim().is_empty() || field("userName").trim().is_empty() {
        return public_reply(StatusCode::BAD_REQUEST, 400, "name and content are required");
    }

    let mut store = db.write().await;
    let open = store
        .articles
        .get(article_id)
        .is_some_and(|a| a.status == 1 && a.is_comment == 1);
    if !open {
        return public_reply(StatusCode::BAD_REQUEST, 400, "article not found or comments closed");
    }
    let comment = store.comments.insert(|id| Comment {
        id,
        article_id,
        parent_id: field("pId").parse().unwrap_or(-1),
        username: field("userName"),
        email: field("email"),
        website: field("website"),
        content,
        status: 1,
    });
    info!(id = comment.id, article_id, "comment received");
    public_reply(StatusCode::OK, 200, "comment submitted")
}

fn public_reply(status: StatusCode, code: i64, msg: &str) -> Response {
    (status, Json(json!({ "code": code, "msg": msg }))).into_response()
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

async fn list_attachments(State(db): State<Db>, Query(query): Query<PageQuery>) -> Response {
    let store = db.read().await;
    let items: Vec<Attachment> = store
        .attachments
        .rows
        .values()
        .filter(|a| contains(&a.name, query.name.as_ref()))
        .cloned()
        .collect();
    paginate(items, &query)
}

async fn upload_attachment(State(db): State<Db>, mut form: Multipart) -> Response {
    loop {
        let field = match form.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return fail(400, "no file uploaded"),
            Err(e) => return fail(400, &e.to_string()),
        };
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return fail(400, &e.to_string()),
        };
        let attachment = db.write().await.attachments.insert(|id| Attachment {
            id,
            url: format!("/uploads/{id}-{name}"),
            name,
            mine_type: mime,
            size: data.len(),
        });
        info!(id = attachment.id, size = attachment.size, "attachment stored");
        return ok(attachment);
    }
}

async fn delete_attachment(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.write().await.attachments.rows.remove(&id) {
        Some(_) => ok(Value::Null),
        None => not_found("attachment"),
    }
}
