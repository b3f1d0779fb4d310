use crate::repo::{RepoError, Video, VideoRepo};
use sled::{Db, Tree};
use std::path::PathBuf;
use uuid::Uuid;

macro_rules! b {
    ($self:ident.$ident:ident, $expr:expr) => {{
        let $ident = $self.$ident.clone();

        crate::sync::spawn_blocking(move || $expr)
            .await
            .map_err(|_| RepoError::Canceled)??
    }};
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SledError {
    #[error("Error in database")]
    Sled(#[from] sled::Error),

    #[error("Invalid video json")]
    Video(#[from] serde_json::Error),
}

#[derive(Clone)]
pub(crate) struct SledRepo {
    videos: Tree,
}

impl SledRepo {
    #[tracing::instrument]
    pub(crate) fn build(path: PathBuf, cache_capacity: u64) -> color_eyre::Result<Self> {
        let db = sled::Config::new()
            .path(path)
            .cache_capacity(cache_capacity)
            .open()?;

        Ok(Self::new(db)?)
    }

    pub(crate) fn new(db: Db) -> Result<Self, SledError> {
        Ok(SledRepo {
            videos: db.open_tree("tubely-videos-tree")?,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl VideoRepo for SledRepo {
    async fn health_check(&self) -> Result<(), RepoError> {
        b!(self.videos, videos.first().map(|_| ()).map_err(SledError::from));

        Ok(())
    }

    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<(), RepoError> {
        let key = video.id.as_bytes().to_vec();
        let value = serde_json::to_vec(video).map_err(SledError::from)?;

        let res = b!(self.videos, {
            videos
                .compare_and_swap(key, None as Option<&[u8]>, Some(value))
                .map_err(SledError::from)
        });

        if res.is_err() {
            return Err(RepoError::AlreadyExists);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn video(&self, id: Uuid) -> Result<Option<Video>, RepoError> {
        let opt = b!(self.videos, videos.get(id.as_bytes()).map_err(SledError::from));

        opt.map(|ivec| serde_json::from_slice(&ivec).map_err(SledError::from))
            .transpose()
            .map_err(RepoError::from)
    }

    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<(), RepoError> {
        let key = video.id.as_bytes().to_vec();
        let value = serde_json::to_vec(video).map_err(SledError::from)?;

        b!(self.videos, videos.insert(key, value).map_err(SledError::from));

        Ok(())
    }
}

impl std::fmt::Debug for SledRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledRepo").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SledRepo;
    use crate::repo::{RepoError, Video, VideoRepo};

    fn repo() -> SledRepo {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .expect("Opened temporary db");

        SledRepo::new(db).expect("Opened trees")
    }

    #[actix_web::test]
    async fn create_then_fetch() {
        let repo = repo();
        repo.health_check().await.expect("Healthy");

        let video = Video::new(
            uuid::Uuid::new_v4(),
            String::from("Boots"),
            String::from("A pair of boots"),
        );

        repo.create_video(&video).await.expect("Created");

        let fetched = repo.video(video.id).await.expect("Fetched");
        assert_eq!(fetched, Some(video.clone()));

        assert!(repo
            .video(uuid::Uuid::new_v4())
            .await
            .expect("Fetched")
            .is_none());

        let res = repo.create_video(&video).await;
        assert!(matches!(res, Err(RepoError::AlreadyExists)));
    }

    #[actix_web::test]
    async fn last_write_wins() {
        let repo = repo();

        let mut video = Video::new(uuid::Uuid::new_v4(), String::new(), String::new());
        repo.create_video(&video).await.expect("Created");

        let mut first = video.clone();
        first.video_url = Some(String::from("https://cdn.example/landscape/a.mp4"));
        video.video_url = Some(String::from("https://cdn.example/portrait/b.mp4"));

        repo.update_video(&first).await.expect("Updated");
        repo.update_video(&video).await.expect("Updated");

        let stored = repo.video(video.id).await.expect("Fetched").expect("Exists");
        assert_eq!(
            stored.video_url.as_deref(),
            Some("https://cdn.example/portrait/b.mp4")
        );
    }
}
