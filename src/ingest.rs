use std::io::SeekFrom;

use actix_web::web::Bytes;
use futures_core::Stream;
use streem::IntoStreamer;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::{
    error::{Error, UploadError},
    formats::AcceptedFormat,
    tmp_file::{TmpDir, TmpFile},
};

/// An upload copied to local scratch space
///
/// `reader` is positioned at the start of `file`
#[derive(Debug)]
pub(crate) struct Staged {
    pub(crate) file: TmpFile,
    pub(crate) reader: tokio::fs::File,
    pub(crate) format: AcceptedFormat,
    pub(crate) len: u64,
}

#[tracing::instrument(name = "Stage upload", skip(tmp_dir, stream))]
pub(crate) async fn stage<S, E>(
    tmp_dir: &TmpDir,
    format: AcceptedFormat,
    stream: S,
) -> Result<Staged, Error>
where
    S: Stream<Item = Result<Bytes, E>>,
    UploadError: From<E>,
{
    let tmp_file = tmp_dir.tmp_file(Some(format.extension()));

    let mut file = tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&tmp_file)
        .await?;

    let stream = std::pin::pin!(stream);
    let mut stream = stream.into_streamer();

    let mut len = 0;
    while let Some(bytes) = stream.try_next().await? {
        tracing::trace!("stage: looping");

        file.write_all(&bytes).await?;
        len += bytes.len() as u64;
    }

    file.flush().await?;
    file.seek(SeekFrom::Start(0)).await?;

    tracing::debug!("Staged {len} bytes");

    Ok(Staged {
        file: tmp_file,
        reader: file,
        format,
        len,
    })
}
