use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use nt_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

/// Which persistence backend holds the curated articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite(PathBuf),
}

impl StorageKind {
    pub fn with_path(self, path: Option<PathBuf>) -> Self {
        match self {
            #[cfg(feature = "sqlite")]
            StorageKind::Sqlite(default) => StorageKind::Sqlite(path.unwrap_or(default)),
            other => {
                let _ = path;
                other
            }
        }
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageKind::Sqlite(PathBuf::from("articles.db"))),
            other => Err(Error::Persistence(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            #[cfg(feature = "sqlite")]
            StorageKind::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
        }
    }
}

pub async fn create_storage(kind: &StorageKind) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite(path) => Ok(Arc::new(SQLiteStorage::new_with_path(path).await?)),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("Memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("qdrant".parse::<StorageKind>().is_err());
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage(&StorageKind::Memory).await.unwrap();
        assert!(storage.list_curated().await.unwrap().is_empty());
    }
}
