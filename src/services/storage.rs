// src/services/storage.rs

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

/// Guarda bytes e devolve a URL pública do objeto.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError>;
}

/// Grava no disco, servido depois em `/uploads`.
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    // Nome único; da original só aproveita uma extensão curta e alfanumérica
    fn object_name(original_name: &str) -> String {
        let extension = original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        match extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let name = Self::object_name(original_name);
        tokio::fs::write(self.root.join(&name), bytes).await?;

        tracing::info!(file = %name, size = bytes.len(), "📦 Arquivo armazenado");
        Ok(format!("{}/uploads/{}", self.public_base_url.trim_end_matches('/'), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_safe_extensions() {
        assert!(LocalFileStore::object_name("rumah.JPG").ends_with(".jpg"));
        assert!(!LocalFileStore::object_name("sem_extensao").contains('.'));
        assert!(!LocalFileStore::object_name("../../etc/passwd").contains('/'));
        assert!(!LocalFileStore::object_name("x.p/h").contains('/'));
    }

    #[tokio::test]
    async fn stores_bytes_and_returns_public_url() {
        let root = std::env::temp_dir().join(format!("komisi-crm-test-{}", Uuid::new_v4()));
        let store = LocalFileStore::new(&root, "http://localhost:3000/");

        let url = store.put("denah.png", b"fake-png").await.unwrap();

        assert!(url.starts_with("http://localhost:3000/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.rsplit('/').next().unwrap();
        let stored = tokio::fs::read(root.join(name)).await.unwrap();
        assert_eq!(stored, b"fake-png");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
