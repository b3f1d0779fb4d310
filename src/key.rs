use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::{error_code::ErrorCode, ffmpeg::Orientation, formats::AcceptedFormat};

const KEY_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub(crate) enum KeyError {
    #[error("Couldn't generate random bytes")]
    EntropyUnavailable(#[source] rand::Error),
}

impl KeyError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        ErrorCode::ENTROPY_UNAVAILABLE
    }
}

/// Build a fresh storage key like `landscape/<43 base64 chars>.mp4`
pub(crate) fn generate(
    orientation: Option<Orientation>,
    format: AcceptedFormat,
) -> Result<String, KeyError> {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(KeyError::EntropyUnavailable)?;

    let name = URL_SAFE_NO_PAD.encode(bytes);

    Ok(match orientation {
        Some(orientation) => format!("{}{name}{}", orientation.prefix(), format.extension()),
        None => format!("{name}{}", format.extension()),
    })
}

/// Whether a requested asset name could have come from [`generate`] without a prefix
pub(crate) fn is_asset_name(name: &str) -> bool {
    let Some(format) = AcceptedFormat::from_extension(name) else {
        return false;
    };

    let stem = &name[..name.len() - format.extension().len()];

    !stem.is_empty()
        && stem
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
