//! `data:` URI codec for task screenshots.
//!
//! Images are stored inline on the task as base64 data URIs, the same form a
//! browser `FileReader` produces, so snapshots stay self-contained.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CoreError;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type, e.g. `image/png`. Empty when the URI omitted it.
    pub mime: String,
    pub data: Vec<u8>,
}

/// Encode raw bytes as a base64 `data:` URI.
///
/// # Examples
///
/// ```
/// use testmaster_core::data_uri::encode;
/// assert_eq!(encode("text/plain", b"hi"), "data:text/plain;base64,aGk=");
/// ```
pub fn encode(mime: &str, data: &[u8]) -> String {
    format!("{SCHEME}{mime}{BASE64_MARKER},{}", BASE64.encode(data))
}

/// Parse a `data:` URI.
///
/// Base64 payloads are decoded; plain payloads are returned byte-for-byte.
pub fn parse(uri: &str) -> Result<DataUri, CoreError> {
    let rest = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| CoreError::Validation("Not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::Validation("Data URI has no payload separator".to_string()))?;

    let (mime, is_base64) = match header.strip_suffix(BASE64_MARKER) {
        Some(mime) => (mime, true),
        None => (header, false),
    };

    let data = if is_base64 {
        BASE64
            .decode(payload.trim())
            .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(DataUri {
        mime: mime.to_string(),
        data,
    })
}

/// Detect the image media type of `data` from its magic bytes.
pub fn sniff_image_mime(data: &[u8]) -> Result<&'static str, CoreError> {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .map_err(|_| CoreError::Unsupported("Unrecognised image format".to_string()))
}

/// Encode image bytes as a data URI, detecting the media type.
pub fn image_data_uri(data: &[u8]) -> Result<String, CoreError> {
    let mime = sniff_image_mime(data)?;
    Ok(encode(mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn encode_then_parse_base64() {
        let uri = encode("image/png", &[1, 2, 3, 250]);
        let parsed = parse(&uri).unwrap();
        assert_eq!(parsed.mime, "image/png");
        assert_eq!(parsed.data, vec![1, 2, 3, 250]);
    }

    #[test]
    fn parse_plain_payload() {
        let parsed = parse("data:text/plain,hello").unwrap();
        assert_eq!(parsed.mime, "text/plain");
        assert_eq!(parsed.data, b"hello");
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert_matches!(
            parse("blob:http://localhost/1234"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert_matches!(parse("data:image/png;base64"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_bad_base64() {
        assert_matches!(
            parse("data:image/png;base64,@@@"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn sniffs_png() {
        assert_eq!(sniff_image_mime(PNG_MAGIC).unwrap(), "image/png");
        assert!(image_data_uri(PNG_MAGIC)
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn sniffs_jpeg() {
        assert_eq!(
            sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        assert_matches!(
            sniff_image_mime(b"plain text, not an image"),
            Err(CoreError::Unsupported(_))
        );
    }
}
