
use std::path::Path;

use crate::{
    error_code::ErrorCode,
    process::{Process, ProcessError},
    tmp_file::TmpFile,
};

const TOLERANCE: f64 = 0.1;

const ORIENTATIONS: &[(f64, Orientation)] = &[
    (16.0 / 9.0, Orientation::Landscape),
    (9.0 / 16.0, Orientation::Portrait),
    (1.0, Orientation::Square),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Orientation {
    Landscape,
    Portrait,
    Square,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Dimensions {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

#[derive(Debug, serde::Deserialize)]
struct FfProbeOutput {
    #[serde(default)]
    streams: Vec<FfProbeStream>,
}

#[derive(Debug, serde::Deserialize)]
struct FfProbeStream {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FfMpegError {
    #[error("Error in ffprobe process")]
    Probe(#[source] ProcessError),

    #[error("Invalid ffprobe output")]
    Json(#[source] serde_json::Error),

    #[error("No video streams in uploaded media")]
    NoStreams,

    #[error("Invalid video dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Error in ffmpeg process")]
    Remux(#[source] ProcessError),

    #[error("Invalid file path")]
    Path,
}

impl FfMpegError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Probe(_) | Self::Json(_) | Self::Path => ErrorCode::PROBE_FAILED,
            Self::NoStreams => ErrorCode::NO_STREAMS,
            Self::InvalidDimensions { .. } => ErrorCode::INVALID_DIMENSIONS,
            Self::Remux(_) => ErrorCode::REMUX_FAILED,
        }
    }

    /// The diagnostics ffmpeg printed before failing, if it got that far
    pub(crate) fn remux_diagnostics(&self) -> Option<&str> {
        match self {
            Self::Remux(ProcessError::Status { stderr, .. }) => Some(stderr),
            _ => None,
        }
    }
}

impl Orientation {
    pub(crate) const fn prefix(self) -> &'static str {
        match self {
            Self::Landscape => "landscape/",
            Self::Portrait => "portrait/",
            Self::Square => "square/",
            Self::Other => "other/",
        }
    }
}

impl Dimensions {
    pub(crate) fn orientation(self) -> Orientation {
        let ratio = f64::from(self.width) / f64::from(self.height);

        ORIENTATIONS
            .iter()
            .find(|(target, _)| (ratio - target).abs() < TOLERANCE)
            .map(|(_, orientation)| *orientation)
            .unwrap_or(Orientation::Other)
    }
}

/// Reads the geometry of a staged video
#[async_trait::async_trait(?Send)]
pub(crate) trait Inspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> Result<Dimensions, FfMpegError>;
}

/// Rewrites a staged video so playback can begin before the download finishes
///
/// The input is left alone. The returned file sits next to it and is removed when dropped.
#[async_trait::async_trait(?Send)]
pub(crate) trait Normalizer: Send + Sync {
    async fn normalize(&self, input: &TmpFile) -> Result<TmpFile, FfMpegError>;
}

/// The real tools, found on `$PATH`
#[derive(Clone, Debug)]
pub(crate) struct FfMpeg {
    ffprobe: &'static str,
    ffmpeg: &'static str,
    timeout: u64,
}

impl FfMpeg {
    pub(crate) fn new(timeout: u64) -> Self {
        FfMpeg {
            ffprobe: "ffprobe",
            ffmpeg: "ffmpeg",
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_programs(
        ffprobe: &'static str,
        ffmpeg: &'static str,
        timeout: u64,
    ) -> Self {
        FfMpeg {
            ffprobe,
            ffmpeg,
            timeout,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Inspector for FfMpeg {
    #[tracing::instrument(skip(self))]
    async fn inspect(&self, path: &Path) -> Result<Dimensions, FfMpegError> {
        let path = path.to_str().ok_or(FfMpegError::Path)?;

        let output = Process::run(
            self.ffprobe,
            &[
                "-v",
                "error",
                "-select_streams",
                "v",
                "-print_format",
                "json",
                "-show_streams",
                path,
            ],
            self.timeout,
        )
        .map_err(FfMpegError::Probe)?
        .output()
        .await
        .map_err(FfMpegError::Probe)?;

        parse_probe_output(&output.stdout)
    }
}

#[async_trait::async_trait(?Send)]
impl Normalizer for FfMpeg {
    #[tracing::instrument(skip(self))]
    async fn normalize(&self, input: &TmpFile) -> Result<TmpFile, FfMpegError> {
        let output_file = input.sibling(".processing");

        let input_str = input.to_str().ok_or(FfMpegError::Path)?;
        let output_str = output_file.to_str().ok_or(FfMpegError::Path)?;

        Process::run(
            self.ffmpeg,
            &[
                "-i",
                input_str,
                "-c",
                "copy",
                "-movflags",
                "faststart",
                "-f",
                "mp4",
                output_str,
            ],
            self.timeout,
        )
        .map_err(FfMpegError::Remux)?
        .output()
        .await
        .map_err(FfMpegError::Remux)?;

        Ok(output_file)
    }
}

fn parse_probe_output(bytes: &[u8]) -> Result<Dimensions, FfMpegError> {
    let output: FfProbeOutput = serde_json::from_slice(bytes).map_err(FfMpegError::Json)?;

    let Some(FfProbeStream { width, height }) = output.streams.into_iter().next() else {
        return Err(FfMpegError::NoStreams);
    };

    if width == 0 || height == 0 {
        return Err(FfMpegError::InvalidDimensions { width, height });
    }

    Ok(Dimensions { width, height })
}
