use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::database::{Collection, Document, DocumentStore, Filter, StoreError, ID_FIELD};

/// Coarse permission label on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    /// Only the exact string `"admin"` grants the admin role.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("admin") => Role::Admin,
            _ => Role::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

/// The slice of a stored user the gates care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Option<Uuid>,
    pub email: String,
    pub role: Role,
}

impl UserRecord {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let email = doc.get("email")?.as_str()?.to_string();
        let id = doc
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok());

        Some(Self {
            id,
            email,
            role: Role::from_value(doc.get("role")),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Read-only user lookup used by the role checks.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// `UserDirectory` backed by the `users` collection of a document store.
#[derive(Clone)]
pub struct DocumentUserDirectory {
    store: Arc<dyn DocumentStore>,
}

impl DocumentUserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserDirectory for DocumentUserDirectory {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let doc = self
            .store
            .find_one(Collection::Users, &Filter::eq("email", email))
            .await?;

        Ok(doc.as_ref().and_then(UserRecord::from_document))
    }
}

/// Make sure `email` exists and holds the admin role.
pub async fn ensure_admin(store: &dyn DocumentStore, email: &str) -> Result<(), StoreError> {
    let filter = Filter::eq("email", email);
    let mut set = Document::new();
    set.insert("role".to_string(), Value::from(Role::Admin.as_str()));

    let result = store.update_one(Collection::Users, &filter, set.clone()).await?;
    if result.matched_count == 0 {
        set.insert("email".to_string(), Value::from(email));
        store.insert_one(Collection::Users, set).await?;
        tracing::info!("Bootstrapped admin user {}", email);
    } else if result.modified_count > 0 {
        tracing::info!("Promoted existing user {} to admin", email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_role_parsing_is_exact() {
        assert_eq!(Role::from_value(Some(&json!("admin"))), Role::Admin);
        assert_eq!(Role::from_value(Some(&json!("Admin"))), Role::Member);
        assert_eq!(Role::from_value(Some(&json!(true))), Role::Member);
        assert_eq!(Role::from_value(None), Role::Member);
    }

    #[test]
    fn test_record_from_document() {
        let doc = json!({ "email": "a@x.com", "name": "A" }).as_object().cloned().unwrap();
        let record = UserRecord::from_document(&doc).unwrap();
        assert_eq!(record.role, Role::Member);
        assert!(!record.is_admin());

        let no_email = json!({ "name": "A" }).as_object().cloned().unwrap();
        assert!(UserRecord::from_document(&no_email).is_none());
    }

    #[tokio::test]
    async fn test_directory_lookup_and_bootstrap() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let directory = DocumentUserDirectory::new(store.clone());

        assert!(directory.find_user_by_email("chef@bistro.test").await.unwrap().is_none());

        ensure_admin(store.as_ref(), "chef@bistro.test").await.unwrap();
        ensure_admin(store.as_ref(), "chef@bistro.test").await.unwrap();

        let found = directory.find_user_by_email("chef@bistro.test").await.unwrap().unwrap();
        assert!(found.is_admin());
        assert!(found.id.is_some());
        assert_eq!(store.find(Collection::Users, &Filter::All).await.unwrap().len(), 1);
    }
}
