
use actix_web::web::Bytes;
use futures_core::Stream;
use uuid::Uuid;

use crate::{
    error::{Error, UploadError},
    formats::AssetKind,
    ingest::{self, Staged},
    key,
    repo::{ArcRepo, Video},
    state::State,
    store::Store,
    tmp_file::{TmpDir, TmpFile},
};

#[derive(Clone, Copy, Debug)]
enum Step {
    Validating,
    Staging,
    Inspecting,
    Normalizing,
    KeyDerivation,
    Uploading,
    RecordUpdate,
    Done,
}

impl Step {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Staging => "staging",
            Self::Inspecting => "inspecting",
            Self::Normalizing => "normalizing",
            Self::KeyDerivation => "key-derivation",
            Self::Uploading => "uploading",
            Self::RecordUpdate => "record-update",
            Self::Done => "done",
        }
    }

    fn enter(self) {
        tracing::debug!(step = self.as_str(), "Entering upload step");
    }
}

/// Resolve `video_id` and confirm `user_id` owns it
///
/// Only reads from the repo
#[tracing::instrument(skip(repo))]
pub(crate) async fn validate_owner(
    repo: &ArcRepo,
    video_id: &str,
    user_id: Uuid,
) -> Result<Video, Error> {
    let video_id = Uuid::parse_str(video_id)?;

    let video = repo
        .video(video_id)
        .await?
        .ok_or(UploadError::VideoNotFound)?;

    if !video.is_owned_by(user_id) {
        tracing::warn!("User {user_id} does not own video {video_id}");
        return Err(UploadError::Forbidden.into());
    }

    Ok(video)
}

/// Check the declared type and copy the upload to scratch space
#[tracing::instrument(skip(tmp_dir, stream))]
pub(crate) async fn stage_upload<S, E>(
    tmp_dir: &TmpDir,
    kind: AssetKind,
    content_type: Option<&mime::Mime>,
    stream: S,
) -> Result<Staged, Error>
where
    S: Stream<Item = Result<Bytes, E>>,
    UploadError: From<E>,
{
    Step::Validating.enter();
    let format = kind.validate_declared(content_type)?;

    Step::Staging.enter();
    ingest::stage(tmp_dir, format, stream).await
}

#[tracing::instrument(name = "Upload thumbnail", skip_all, fields(video_id = %video.id))]
pub(crate) async fn upload_thumbnail<S: Store>(
    state: &State<S>,
    video: Video,
    staged: Staged,
) -> Result<Video, Error> {
    let res = do_upload_thumbnail(state, video, staged).await;

    record_outcome(AssetKind::Thumbnail, &res);

    res
}

async fn do_upload_thumbnail<S: Store>(
    state: &State<S>,
    mut video: Video,
    staged: Staged,
) -> Result<Video, Error> {
    let Staged {
        file,
        reader,
        format,
        len,
    } = staged;

    Step::KeyDerivation.enter();
    let key = key::generate(None, format)?;

    Step::Uploading.enter();
    state
        .assets
        .save_async_read(reader, &key, format.media_type())
        .await?;
    let url = state.assets.public_url(&key)?;
    tracing::debug!("Saved {len} byte thumbnail as {key}");

    discard(file).await;

    Step::RecordUpdate.enter();
    video.thumbnail_url = Some(url.to_string());
    persist(&state.repo, &mut video).await?;

    Step::Done.enter();
    Ok(video)
}

#[tracing::instrument(name = "Upload video", skip_all, fields(video_id = %video.id))]
pub(crate) async fn upload_video<S: Store>(
    state: &State<S>,
    video: Video,
    staged: Staged,
) -> Result<Video, Error> {
    let res = do_upload_video(state, video, staged).await;

    record_outcome(AssetKind::Video, &res);

    res
}

async fn do_upload_video<S: Store>(
    state: &State<S>,
    mut video: Video,
    staged: Staged,
) -> Result<Video, Error> {
    let Staged {
        file,
        reader,
        format,
        len,
    } = staged;
    drop(reader);

    Step::Inspecting.enter();
    let dimensions = state.inspector.inspect(&file).await?;
    let orientation = dimensions.orientation();
    tracing::debug!(
        "Video is {}x{}, {orientation:?}",
        dimensions.width,
        dimensions.height
    );

    Step::Normalizing.enter();
    let processed = state.normalizer.normalize(&file).await?;
    discard(file).await;

    Step::KeyDerivation.enter();
    let key = key::generate(Some(orientation), format)?;

    Step::Uploading.enter();
    let reader = tokio::fs::File::open(&processed).await?;
    state
        .store
        .save_async_read(reader, &key, format.media_type())
        .await?;
    let url = state.store.public_url(&key)?;
    tracing::debug!("Uploaded {len} byte video as {key}");

    discard(processed).await;

    Step::RecordUpdate.enter();
    video.video_url = Some(url.to_string());
    persist(&state.repo, &mut video).await?;

    Step::Done.enter();
    Ok(video)
}

async fn persist(repo: &ArcRepo, video: &mut Video) -> Result<(), Error> {
    video.touch();

    repo.update_video(video)
        .await
        .map_err(UploadError::Persist)?;

    Ok(())
}

async fn discard(file: TmpFile) {
    if let Err(e) = file.cleanup().await {
        tracing::warn!("Failed to remove scratch file: {e}");
    }
}

fn record_outcome(kind: AssetKind, res: &Result<Video, Error>) {
    let outcome = match res {
        Ok(_) => "success",
        Err(e) => {
            tracing::warn!(code = e.error_code().as_str(), "Upload failed: {e}");
            "failure"
        }
    };

    metrics::counter!(
        crate::init_metrics::UPLOADS,
        "kind" => kind.field_name(),
        "outcome" => outcome
    )
    .increment(1);
}
