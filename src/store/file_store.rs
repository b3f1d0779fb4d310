use crate::store::{join_url, Store, StoreError};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub(crate) enum FileError {
    #[error("Failed to read or write file")]
    Io(#[from] std::io::Error),

    #[error("Tried to save over existing file")]
    FileExists,
}

/// Local directory holding thumbnails, served back under `/assets`
#[derive(Clone)]
pub(crate) struct FileStore {
    root_dir: PathBuf,
    base_url: Url,
}

#[async_trait::async_trait(?Send)]
impl Store for FileStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        tokio::fs::metadata(&self.root_dir)
            .await
            .map_err(FileError::from)?;

        Ok(())
    }

    #[tracing::instrument(skip(self, reader))]
    async fn save_async_read<Reader>(
        &self,
        mut reader: Reader,
        key: &str,
        _content_type: &'static str,
    ) -> Result<(), StoreError>
    where
        Reader: AsyncRead + Unpin + 'static,
    {
        let path = self.root_dir.join(key);

        if let Err(e) = self.safe_save_reader(&path, &mut reader).await {
            if !matches!(e, FileError::FileExists) {
                self.safe_remove_file(&path).await?;
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<Url, StoreError> {
        join_url(&self.base_url, key)
    }
}

impl FileStore {
    /// Assets are served back from `<public_url>/assets/<key>`
    #[tracing::instrument]
    pub(crate) async fn build(root_dir: PathBuf, public_url: &Url) -> color_eyre::Result<Self> {
        tokio::fs::create_dir_all(&root_dir).await?;

        let base_url = join_url(public_url, "assets")?;

        Ok(FileStore { root_dir, base_url })
    }

    /// Open a stored asset for streaming back to a client
    #[tracing::instrument(skip(self))]
    pub(crate) async fn to_stream(
        &self,
        key: &str,
    ) -> Result<(u64, ReaderStream<tokio::fs::File>), StoreError> {
        let file = tokio::fs::File::open(self.root_dir.join(key))
            .await
            .map_err(FileError::from)?;

        let len = file.metadata().await.map_err(FileError::from)?.len();

        Ok((len, ReaderStream::new(file)))
    }

    async fn safe_remove_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FileError> {
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn safe_save_reader<P: AsRef<Path>>(
        &self,
        to: P,
        input: &mut (impl AsyncRead + Unpin + ?Sized),
    ) -> Result<(), FileError> {
        safe_create_parent(&to).await?;

        if let Err(e) = tokio::fs::metadata(&to).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        } else {
            return Err(FileError::FileExists);
        }

        let mut file = tokio::fs::File::create(to).await?;

        tokio::io::copy(input, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;

        Ok(())
    }
}

async fn safe_create_parent<P: AsRef<Path>>(path: P) -> Result<(), FileError> {
    if let Some(path) = path.as_ref().parent() {
        tokio::fs::create_dir_all(path).await?;
    }

    Ok(())
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("root_dir", &self.root_dir)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::store::{Store, StoreError};

    async fn store(root: &std::path::Path) -> FileStore {
        FileStore::build(
            root.join("assets"),
            &"http://localhost:8091".parse().expect("Valid url"),
        )
        .await
        .expect("Built store")
    }

    #[actix_web::test]
    async fn saves_and_serves() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let store = store(root.path()).await;

        store.health_check().await.expect("Healthy");

        store
            .save_async_read(&b"not really a png"[..], "abc.png", "image/png")
            .await
            .expect("Saved");

        let bytes = tokio::fs::read(root.path().join("assets/abc.png"))
            .await
            .expect("Read back");
        assert_eq!(bytes, b"not really a png");

        let (len, _) = store.to_stream("abc.png").await.expect("Opened");
        assert_eq!(len, 16);

        assert_eq!(
            store.public_url("abc.png").expect("Url").as_str(),
            "http://localhost:8091/assets/abc.png"
        );
    }

    #[actix_web::test]
    async fn refuses_to_overwrite() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let store = store(root.path()).await;

        store
            .save_async_read(&b"first"[..], "abc.jpg", "image/jpeg")
            .await
            .expect("Saved");

        let res = store
            .save_async_read(&b"second"[..], "abc.jpg", "image/jpeg")
            .await;
        assert!(matches!(res, Err(StoreError::FileStore(_))));

        let bytes = tokio::fs::read(root.path().join("assets/abc.jpg"))
            .await
            .expect("Read back");
        assert_eq!(bytes, b"first");
    }

    #[actix_web::test]
    async fn missing_assets_are_not_found() {
        let root = tempfile::tempdir().expect("Created tempdir");
        let store = store(root.path()).await;

        let err = store.to_stream("nope.jpg").await.expect_err("Missing");
        assert!(err.is_not_found());
        assert_eq!(err.error_code().as_str(), "asset-not-found");
    }
}
