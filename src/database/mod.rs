use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{DocumentUserDirectory, MenuItemPatch, Role, UserDirectory, UserRecord};
pub use postgres::PgDocumentStore;

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// A stored JSON object, including its `_id`.
pub type Document = Map<String, Value>;

/// Errors from document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Menu,
    Reviews,
    Carts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Menu => "menu",
            Collection::Reviews => "reviews",
            Collection::Carts => "carts",
        }
    }
}

/// Document selector understood by every backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(Uuid),
    /// Top-level field equals value
    Eq(String, Value),
}

impl Filter {
    pub fn id(raw: &str) -> Result<Self, StoreError> {
        parse_id(raw).map(Filter::Id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => doc.get(ID_FIELD).and_then(Value::as_str) == Some(id.to_string().as_str()),
            Filter::Eq(field, value) => doc.get(field) == Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Minimal document-store contract consumed by the handlers and the role lookup.
///
/// `update_one` has `$set` semantics: listed fields are overwritten, others kept,
/// and `_id` is never changed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertResult, StoreError>;

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, StoreError>;
}

pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Apply `$set` fields to a document, returning whether anything changed.
pub(crate) fn apply_set(doc: &mut Document, set: &Document) -> bool {
    let mut changed = false;
    for (field, value) in set {
        if field == ID_FIELD {
            continue;
        }
        if doc.get(field) != Some(value) {
            doc.insert(field.clone(), value.clone());
            changed = true;
        }
    }
    changed
}
