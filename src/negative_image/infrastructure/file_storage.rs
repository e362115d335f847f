use super::error::InfrastructureError;
use crate::domain::upload;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: u32 = 1000;

pub struct LocalFileStorage {
    upload_dir: PathBuf,
    result_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, result_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            result_dir: result_dir.into(),
        }
    }

    pub async fn ensure_dirs(&self) -> Result<(), InfrastructureError> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.result_dir).await?;
        Ok(())
    }

    pub async fn save_upload(&self, name: &str, data: &[u8]) -> Result<(String, PathBuf), InfrastructureError> {
        save_new(&self.upload_dir, name, data).await
    }

    // 反転結果の保存先。既存ファイルと衝突しない名前を選ぶ (書き込みは invert_file 側)
    pub async fn next_result_path(&self, name: &str) -> Result<(String, PathBuf), InfrastructureError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                name.to_string()
            } else {
                upload::with_suffix(name, attempt)
            };
            let path = self.result_dir.join(&candidate);
            if !fs::try_exists(&path).await? {
                return Ok((candidate, path));
            }
        }

        Err(InfrastructureError::FileStorageError(format!(
            "no free file name for {} in {} after {} attempts",
            name,
            self.result_dir.display(),
            MAX_NAME_ATTEMPTS
        )))
    }
}

// name, name_1, name_2, ... の順に create_new で開けた最初の名前に書き込む
async fn save_new(dir: &Path, name: &str, data: &[u8]) -> Result<(String, PathBuf), InfrastructureError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            name.to_string()
        } else {
            upload::with_suffix(name, attempt)
        };
        let path = dir.join(&candidate);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(InfrastructureError::IoError(e)),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(InfrastructureError::IoError(e));
        }

        return Ok((candidate, path));
    }

    Err(InfrastructureError::FileStorageError(format!(
        "no free file name for {} in {} after {} attempts",
        name,
        dir.display(),
        MAX_NAME_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_dirs_creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(root.path().join("static/uploads"), root.path().join("static/results"));

        storage.ensure_dirs().await.unwrap();
        storage.ensure_dirs().await.unwrap();

        assert!(root.path().join("static/uploads").is_dir());
        assert!(root.path().join("static/results").is_dir());
    }

    #[tokio::test]
    async fn test_save_upload_writes_bytes() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(root.path().join("u"), root.path().join("r"));
        storage.ensure_dirs().await.unwrap();

        let (name, path) = storage.save_upload("photo.png", &[1, 2, 3]).await.unwrap();

        assert_eq!(name, "photo.png");
        assert_eq!(path, root.path().join("u").join("photo.png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_save_upload_never_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(root.path().join("u"), root.path().join("r"));
        storage.ensure_dirs().await.unwrap();

        let (first, _) = storage.save_upload("a.png", &[1]).await.unwrap();
        let (second, _) = storage.save_upload("a.png", &[2]).await.unwrap();
        let (third, third_path) = storage.save_upload("a.png", &[3]).await.unwrap();

        assert_eq!(first, "a.png");
        assert_eq!(second, "a_1.png");
        assert_eq!(third, "a_2.png");
        assert_eq!(tokio::fs::read(root.path().join("u/a.png")).await.unwrap(), vec![1]);
        assert_eq!(tokio::fs::read(third_path).await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_next_result_path_skips_existing_files() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(root.path().join("u"), root.path().join("r"));
        storage.ensure_dirs().await.unwrap();

        let (name, path) = storage.next_result_path("inverted_a.png").await.unwrap();
        assert_eq!(name, "inverted_a.png");
        assert_eq!(path, root.path().join("r/inverted_a.png"));
        assert!(!path.exists());

        std::fs::write(&path, [0]).unwrap();
        std::fs::write(root.path().join("r/inverted_a_1.png"), [0]).unwrap();
        let (name, path) = storage.next_result_path("inverted_a.png").await.unwrap();
        assert_eq!(name, "inverted_a_2.png");
        assert_eq!(path, root.path().join("r/inverted_a_2.png"));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(root.path().join("missing"), root.path().join("r"));

        let result = storage.save_upload("photo.png", &[1]).await;

        assert!(matches!(result, Err(InfrastructureError::IoError(_))));
    }
}
