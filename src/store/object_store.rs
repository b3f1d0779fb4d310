use crate::store::{join_url, Store, StoreError};
use object_store::{
    aws::AmazonS3Builder, buffered::BufWriter, path::Path, Attribute, Attributes,
};
use std::{sync::Arc, time::Instant};
use tokio::io::{AsyncRead, AsyncWriteExt};
use url::Url;

const HEALTH_KEY: &str = ".tubely-health";

/// Bytes held in memory before an upload becomes multipart
const PART_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ObjectError {
    #[error("Failed to stream upload")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key")]
    Path(#[from] object_store::path::Error),

    #[error("Error communicating with bucket")]
    Bucket(#[from] object_store::Error),
}

/// S3-compatible bucket holding processed videos
///
/// Objects are read back by clients through `distribution_url`, never through this service.
#[derive(Clone)]
pub(crate) struct ObjectStore {
    inner: Arc<dyn object_store::ObjectStore>,
    bucket_name: String,
    distribution_url: Url,
    part_size: usize,
}

#[async_trait::async_trait(?Send)]
impl Store for ObjectStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        match self.inner.head(&Path::from(HEALTH_KEY)).await {
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(ObjectError::from(e).into()),
        }
    }

    #[tracing::instrument(skip(self, reader))]
    async fn save_async_read<Reader>(
        &self,
        mut reader: Reader,
        key: &str,
        content_type: &'static str,
    ) -> Result<(), StoreError>
    where
        Reader: AsyncRead + Unpin + 'static,
    {
        let location = Path::parse(key).map_err(ObjectError::from)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.into());

        // Buffers up to one part, then switches to a multipart upload
        let mut writer = BufWriter::with_capacity(self.inner.clone(), location, self.part_size)
            .with_attributes(attributes);

        let start = Instant::now();

        let size = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(e) = writer.abort().await {
                    tracing::warn!("Failed to abort multipart upload: {e}");
                }

                return Err(self.upload_failed(key, start, e));
            }
        };

        if let Err(e) = writer.shutdown().await {
            return Err(self.upload_failed(key, start, e));
        }

        tracing::debug!(
            bucket = %self.bucket_name,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload complete"
        );

        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<Url, StoreError> {
        join_url(&self.distribution_url, key)
    }
}

impl ObjectStore {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        endpoint: Option<Url>,
        bucket_name: String,
        region: String,
        use_path_style: bool,
        access_key: Option<String>,
        secret_key: Option<String>,
        session_token: Option<String>,
        distribution_url: Url,
    ) -> Result<Self, ObjectError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket_name.clone())
            .with_region(region)
            .with_virtual_hosted_style_request(!use_path_style);

        if let Some(endpoint) = endpoint {
            builder = builder
                .with_allow_http(endpoint.scheme() == "http")
                .with_endpoint(endpoint.as_str().trim_end_matches('/'));
        }

        if let Some(access_key) = access_key {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = secret_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(session_token) = session_token {
            builder = builder.with_token(session_token);
        }

        Ok(Self::new(
            Arc::new(builder.build()?),
            bucket_name,
            distribution_url,
        ))
    }

    pub(crate) fn new(
        inner: Arc<dyn object_store::ObjectStore>,
        bucket_name: String,
        distribution_url: Url,
    ) -> Self {
        ObjectStore {
            inner,
            bucket_name,
            distribution_url,
            part_size: PART_SIZE,
        }
    }

    fn upload_failed(&self, key: &str, start: Instant, error: std::io::Error) -> StoreError {
        tracing::warn!(
            bucket = %self.bucket_name,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload failed"
        );

        ObjectError::from(error).into()
    }

    #[cfg(test)]
    pub(crate) fn with_part_size(self, part_size: usize) -> Self {
        ObjectStore { part_size, ..self }
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("bucket_name", &self.bucket_name)
            .field("distribution_url", &self.distribution_url.as_str())
            .finish()
    }
}
