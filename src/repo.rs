use std::{fmt::Debug, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error_code::ErrorCode;

pub(crate) mod sled;

pub(crate) type ArcRepo = Arc<dyn VideoRepo>;

/// A video as clients see it
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub(crate) struct Video {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) video_url: Option<String>,
}

impl Video {
    pub(crate) fn new(user_id: Uuid, title: String, description: String) -> Self {
        let now = OffsetDateTime::now_utc();

        Video {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
        }
    }

    pub(crate) fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RepoError {
    #[error("Error in sled")]
    SledError(#[from] crate::repo::sled::SledError),

    #[error("A video with this id already exists")]
    AlreadyExists,

    #[error("Panic in blocking operation")]
    Canceled,
}

impl RepoError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        match self {
            Self::SledError(_) | Self::AlreadyExists => ErrorCode::REPO_ERROR,
            Self::Canceled => ErrorCode::PANIC,
        }
    }
}

#[async_trait::async_trait(?Send)]
pub(crate) trait VideoRepo: Debug + Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;

    async fn create_video(&self, video: &Video) -> Result<(), RepoError>;

    async fn video(&self, id: Uuid) -> Result<Option<Video>, RepoError>;

    /// Overwrite the stored record, last write wins
    async fn update_video(&self, video: &Video) -> Result<(), RepoError>;
}

