use crate::core::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

/// 本機檔案系統；相對路徑以 base_path 為根，絕對路徑原樣使用
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tracing::debug!("Reading {}", full_path.display());
        Ok(tokio::fs::read(full_path).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::DocGenError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directories_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested/output"));

        storage.write_file("a/report.html", b"<p>hi</p>").await.unwrap();

        assert!(dir.path().join("nested/output/a/report.html").exists());
        assert_eq!(
            storage.read_file("a/report.html").await.unwrap(),
            b"<p>hi</p>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_base() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("response.txt");
        std::fs::write(&input, "Attendees:\n* Alice").unwrap();

        let storage = LocalStorage::new("does-not-matter");
        let data = storage.read_file(input.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"Attendees:\n* Alice".to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage.read_file("missing.txt").await;
        assert!(matches!(result, Err(DocGenError::IoError(_))));
    }
}
