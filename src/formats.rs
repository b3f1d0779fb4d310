use crate::error_code::ErrorCode;

/// Which endpoint an upload arrived on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AssetKind {
    Thumbnail,
    Video,
}

/// A content type this service is willing to store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AcceptedFormat {
    Jpeg,
    Png,
    Mp4,
}

const THUMBNAIL_FORMATS: &[(&str, AcceptedFormat)] = &[
    ("image/jpeg", AcceptedFormat::Jpeg),
    ("image/png", AcceptedFormat::Png),
];

const VIDEO_FORMATS: &[(&str, AcceptedFormat)] = &[("video/mp4", AcceptedFormat::Mp4)];

#[derive(Debug, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error("Unsupported file type {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid Content-Type header")]
    InvalidContentType(#[source] mime::FromStrError),
}

impl ValidationError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        ErrorCode::UNSUPPORTED_MEDIA_TYPE
    }
}

impl AssetKind {
    pub(crate) const fn field_name(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Video => "video",
        }
    }

    const fn allowed(self) -> &'static [(&'static str, AcceptedFormat)] {
        match self {
            Self::Thumbnail => THUMBNAIL_FORMATS,
            Self::Video => VIDEO_FORMATS,
        }
    }

    /// Match a declared Content-Type against this kind's allow-list
    ///
    /// Parameters such as `charset` are ignored. The upload's bytes are never inspected.
    pub(crate) fn validate(self, content_type: &str) -> Result<AcceptedFormat, ValidationError> {
        let mime: mime::Mime = content_type
            .trim()
            .parse()
            .map_err(ValidationError::InvalidContentType)?;

        let essence = mime.essence_str();

        self.allowed()
            .iter()
            .find(|(name, _)| *name == essence)
            .map(|(_, format)| *format)
            .ok_or_else(|| ValidationError::UnsupportedMediaType(essence.to_string()))
    }

    /// Validate the Content-Type a multipart part declared, if any
    pub(crate) fn validate_declared(
        self,
        content_type: Option<&mime::Mime>,
    ) -> Result<AcceptedFormat, ValidationError> {
        match content_type {
            Some(content_type) => self.validate(content_type.as_ref()),
            None => Err(ValidationError::UnsupportedMediaType(String::from(
                "(none declared)",
            ))),
        }
    }
}

impl AcceptedFormat {
    pub(crate) const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Mp4 => ".mp4",
        }
    }

    pub(crate) const fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Mp4 => "video/mp4",
        }
    }

    pub(crate) fn from_extension(name: &str) -> Option<Self> {
        [Self::Jpeg, Self::Png, Self::Mp4]
            .into_iter()
            .find(|format| name.ends_with(format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptedFormat, AssetKind, ValidationError};

    #[test]
    fn accepts_listed_video_types() {
        for content_type in ["video/mp4", " video/mp4", "video/mp4; codecs=\"avc1.42E01E\""] {
            assert_eq!(
                AssetKind::Video.validate(content_type).expect("Accepted"),
                AcceptedFormat::Mp4,
                "{content_type}"
            );
        }
    }

    #[test]
    fn rejects_everything_else_for_video() {
        for content_type in [
            "video/webm",
            "video/quicktime",
            "image/jpeg",
            "application/octet-stream",
            "text/plain; charset=utf-8",
            "",
            "mp4",
        ] {
            let res = AssetKind::Video.validate(content_type);

            assert!(res.is_err(), "{content_type} should be rejected");
            assert_eq!(
                res.unwrap_err().error_code().as_str(),
                "unsupported-media-type"
            );
        }
    }

    #[test]
    fn thumbnail_types() {
        assert_eq!(
            AssetKind::Thumbnail.validate("image/jpeg").expect("Accepted"),
            AcceptedFormat::Jpeg
        );
        assert_eq!(
            AssetKind::Thumbnail.validate("image/png").expect("Accepted"),
            AcceptedFormat::Png
        );

        assert!(matches!(
            AssetKind::Thumbnail.validate("image/gif"),
            Err(ValidationError::UnsupportedMediaType(ref name)) if name == "image/gif"
        ));
        assert!(matches!(
            AssetKind::Thumbnail.validate("video/mp4"),
            Err(ValidationError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn extensions() {
        assert_eq!(AcceptedFormat::Jpeg.extension(), ".jpg");
        assert_eq!(AcceptedFormat::Png.extension(), ".png");
        assert_eq!(AcceptedFormat::Mp4.extension(), ".mp4");

        assert_eq!(
            AcceptedFormat::from_extension("abc.png"),
            Some(AcceptedFormat::Png)
        );
        assert_eq!(AcceptedFormat::from_extension("abc.gif"), None);
        assert_eq!(AcceptedFormat::Mp4.media_type(), "video/mp4");
    }

    #[test]
    fn media_types_pass_their_own_validation() {
        for (kind, format) in [
            (AssetKind::Thumbnail, AcceptedFormat::Jpeg),
            (AssetKind::Thumbnail, AcceptedFormat::Png),
            (AssetKind::Video, AcceptedFormat::Mp4),
        ] {
            let media_type: mime::Mime = format.media_type().parse().expect("Valid mime");

            assert_eq!(kind.validate_declared(Some(&media_type)).expect("Accepted"), format);
        }
    }

    #[test]
    fn undeclared_types_are_unsupported() {
        for kind in [AssetKind::Thumbnail, AssetKind::Video] {
            let err = kind.validate_declared(None).expect_err("Rejected");

            assert!(matches!(err, ValidationError::UnsupportedMediaType(_)));
            assert_eq!(err.error_code().as_str(), "unsupported-media-type");
        }
    }
}
