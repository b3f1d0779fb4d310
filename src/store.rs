use std::fmt::Debug;
use tokio::io::AsyncRead;
use url::Url;

use crate::error_code::ErrorCode;

pub(crate) mod file_store;
pub(crate) mod object_store;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("Error in file store")]
    FileStore(#[source] crate::store::file_store::FileError),

    #[error("Error in object store")]
    ObjectStore(#[source] crate::store::object_store::ObjectError),

    #[error("Requested file is not found")]
    FileNotFound(#[source] std::io::Error),

    #[error("Couldn't build public url for {0}")]
    PublicUrl(String, #[source] url::ParseError),
}

impl StoreError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        match self {
            Self::FileNotFound(_) => ErrorCode::ASSET_NOT_FOUND,
            Self::FileStore(_) | Self::ObjectStore(_) | Self::PublicUrl(_, _) => {
                ErrorCode::STORE_UNAVAILABLE
            }
        }
    }

    pub(crate) const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }
}

impl From<crate::store::file_store::FileError> for StoreError {
    fn from(value: crate::store::file_store::FileError) -> Self {
        match value {
            crate::store::file_store::FileError::Io(e)
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::FileNotFound(e)
            }
            e => Self::FileStore(e),
        }
    }
}

impl From<crate::store::object_store::ObjectError> for StoreError {
    fn from(value: crate::store::object_store::ObjectError) -> Self {
        Self::ObjectStore(value)
    }
}

/// Durable home for finished assets
#[async_trait::async_trait(?Send)]
pub(crate) trait Store: Clone + Debug {
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Commit everything `reader` yields under `key`
    ///
    /// The asset must not be treated as durable until this returns `Ok`
    async fn save_async_read<Reader>(
        &self,
        reader: Reader,
        key: &str,
        content_type: &'static str,
    ) -> Result<(), StoreError>
    where
        Reader: AsyncRead + Unpin + 'static;

    // TODO: hand out time-limited signed urls once buckets are private
    fn public_url(&self, key: &str) -> Result<Url, StoreError>;
}

fn join_url(base: &Url, key: &str) -> Result<Url, StoreError> {
    let base = base.as_str().trim_end_matches('/');

    format!("{base}/{key}")
        .parse()
        .map_err(|e| StoreError::PublicUrl(key.to_string(), e))
}
