#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub(crate) struct ErrorCode {
    code: &'static str,
}

impl ErrorCode {
    pub(crate) const fn as_str(&self) -> &'static str {
        self.code
    }

    pub(crate) const UNAUTHENTICATED: ErrorCode = ErrorCode {
        code: "unauthenticated",
    };
    pub(crate) const FORBIDDEN: ErrorCode = ErrorCode { code: "forbidden" };
    pub(crate) const VIDEO_NOT_FOUND: ErrorCode = ErrorCode {
        code: "video-not-found",
    };
    pub(crate) const ASSET_NOT_FOUND: ErrorCode = ErrorCode {
        code: "asset-not-found",
    };
    pub(crate) const INVALID_VIDEO_ID: ErrorCode = ErrorCode {
        code: "invalid-video-id",
    };
    pub(crate) const INVALID_ASSET_NAME: ErrorCode = ErrorCode {
        code: "invalid-asset-name",
    };
    pub(crate) const FILE_UPLOAD_ERROR: ErrorCode = ErrorCode {
        code: "file-upload-error",
    };
    pub(crate) const VALIDATE_NO_FILES: ErrorCode = ErrorCode {
        code: "validate-no-files",
    };
    pub(crate) const UNSUPPORTED_MEDIA_TYPE: ErrorCode = ErrorCode {
        code: "unsupported-media-type",
    };
    pub(crate) const IO_ERROR: ErrorCode = ErrorCode { code: "io-error" };
    pub(crate) const PROBE_FAILED: ErrorCode = ErrorCode {
        code: "probe-failed",
    };
    pub(crate) const NO_STREAMS: ErrorCode = ErrorCode { code: "no-streams" };
    pub(crate) const INVALID_DIMENSIONS: ErrorCode = ErrorCode {
        code: "invalid-dimensions",
    };
    pub(crate) const REMUX_FAILED: ErrorCode = ErrorCode {
        code: "remux-failed",
    };
    pub(crate) const ENTROPY_UNAVAILABLE: ErrorCode = ErrorCode {
        code: "entropy-unavailable",
    };
    pub(crate) const STORE_UNAVAILABLE: ErrorCode = ErrorCode {
        code: "store-unavailable",
    };
    pub(crate) const REPO_ERROR: ErrorCode = ErrorCode { code: "repo-error" };
    pub(crate) const PERSIST_FAILED: ErrorCode = ErrorCode {
        code: "persist-failed",
    };
    pub(crate) const PANIC: ErrorCode = ErrorCode { code: "panic" };
    pub(crate) const UNKNOWN_ERROR: ErrorCode = ErrorCode {
        code: "unknown-error",
    };
}
