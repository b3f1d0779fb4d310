use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use color_eyre::Report;

use crate::error_code::ErrorCode;

pub(crate) struct Error {
    inner: color_eyre::Report,
}

impl Error {
    fn kind(&self) -> Option<&UploadError> {
        self.inner.downcast_ref()
    }

    pub(crate) fn error_code(&self) -> ErrorCode {
        self.kind()
            .map(|e| e.error_code())
            .unwrap_or(ErrorCode::UNKNOWN_ERROR)
    }

    /// What the client is told, never internal detail beyond ffmpeg's own diagnostics
    fn public_message(&self) -> String {
        match self.kind() {
            Some(UploadError::Ffmpeg(e)) => match e.remux_diagnostics() {
                Some(diagnostics) => format!("{e}: {}", diagnostics.trim()),
                None => e.to_string(),
            },
            Some(kind) => kind.to_string(),
            None => String::from("Request failed"),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl<T> From<T> for Error
where
    UploadError: From<T>,
{
    fn from(error: T) -> Self {
        Error {
            inner: Report::from(UploadError::from(error)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("Couldn't upload file")]
    Upload(#[from] actix_form_data::Error),

    #[error("Invalid video id")]
    InvalidId(#[from] uuid::Error),

    #[error("No files present in upload")]
    NoFiles,

    #[error("Couldn't validate credentials")]
    Auth(#[from] crate::auth::AuthError),

    #[error("Not the owner of this video")]
    Forbidden,

    #[error("Couldn't find video")]
    VideoNotFound,

    #[error("Couldn't find asset")]
    InvalidAssetName,

    #[error("Error in DB")]
    Repo(#[from] crate::repo::RepoError),

    #[error("Couldn't update video")]
    Persist(#[source] crate::repo::RepoError),

    #[error("Error validating upload")]
    Validation(#[from] crate::formats::ValidationError),

    #[error("Error interacting with filesystem")]
    Io(#[from] std::io::Error),

    #[error("Couldn't process video")]
    Ffmpeg(#[from] crate::ffmpeg::FfMpegError),

    #[error("Couldn't generate storage key")]
    Key(#[from] crate::key::KeyError),

    #[error("Error in store")]
    Store(#[from] crate::store::StoreError),
}

impl UploadError {
    const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Upload(_) => ErrorCode::FILE_UPLOAD_ERROR,
            Self::InvalidId(_) => ErrorCode::INVALID_VIDEO_ID,
            Self::NoFiles => ErrorCode::VALIDATE_NO_FILES,
            Self::Auth(e) => e.error_code(),
            Self::Forbidden => ErrorCode::FORBIDDEN,
            Self::VideoNotFound => ErrorCode::VIDEO_NOT_FOUND,
            Self::InvalidAssetName => ErrorCode::INVALID_ASSET_NAME,
            Self::Repo(e) => e.error_code(),
            Self::Persist(_) => ErrorCode::PERSIST_FAILED,
            Self::Validation(e) => e.error_code(),
            Self::Io(_) => ErrorCode::IO_ERROR,
            Self::Ffmpeg(e) => e.error_code(),
            Self::Key(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            Some(
                UploadError::Upload(_)
                | UploadError::InvalidId(_)
                | UploadError::NoFiles
                | UploadError::Validation(_),
            ) => StatusCode::BAD_REQUEST,
            Some(UploadError::Auth(_)) => StatusCode::UNAUTHORIZED,
            Some(UploadError::Forbidden) => StatusCode::FORBIDDEN,
            Some(UploadError::InvalidAssetName) => StatusCode::NOT_FOUND,
            Some(UploadError::Store(e)) if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("application/json")
            .body(
                serde_json::to_string(&serde_json::json!({
                    "msg": self.public_message(),
                    "code": self.error_code()
                }))
                .unwrap_or_else(|_| {
                    r#"{"msg":"Request failed","code":"unknown-error"}"#.to_string()
                }),
            )
    }
}
