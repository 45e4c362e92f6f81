use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A single file kept inline as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    pub data_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingPrefix,

    #[error("data URL is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

impl Attachment {
    pub fn from_bytes(name: &str, mime_type: &str, bytes: &[u8]) -> Self {
        let media_type = if mime_type.is_empty() {
            FALLBACK_MIME
        } else {
            mime_type
        };

        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data_url: format!("data:{};base64,{}", media_type, STANDARD.encode(bytes)),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image")
    }

    /// Splits the data URL back into its media type and raw bytes.
    pub fn decode(&self) -> Result<(String, Vec<u8>), DataUrlError> {
        let rest = self
            .data_url
            .strip_prefix("data:")
            .ok_or(DataUrlError::MissingPrefix)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPrefix)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;

        let media_type = if media_type.is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            media_type.to_string()
        };

        Ok((media_type, STANDARD.decode(payload)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_as_base64_data_url() {
        let att = Attachment::from_bytes("hello.txt", "text/plain", b"hello");
        assert_eq!(att.data_url, "data:text/plain;base64,aGVsbG8=");
        assert!(!att.is_image());

        let (mime, bytes) = att.decode().unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_missing_mime_type_falls_back() {
        let att = Attachment::from_bytes("blob", "", &[0, 1, 2]);
        assert!(att.data_url.starts_with("data:application/octet-stream;base64,"));
        assert_eq!(att.decode().unwrap().0, "application/octet-stream");
    }

    #[test]
    fn test_image_detection_uses_mime_prefix() {
        let att = Attachment::from_bytes("cat.jpg", "image/jpeg", &[0xff, 0xd8]);
        assert!(att.is_image());
    }

    #[test]
    fn test_rejects_malformed_data_urls() {
        let mut att = Attachment::from_bytes("x", "text/plain", b"x");

        att.data_url = "https://example.com/x".to_string();
        assert_eq!(att.decode(), Err(DataUrlError::MissingPrefix));

        att.data_url = "data:text/plain,hello".to_string();
        assert_eq!(att.decode(), Err(DataUrlError::NotBase64));

        att.data_url = "data:text/plain;base64,@@@".to_string();
        assert!(matches!(att.decode(), Err(DataUrlError::Payload(_))));
    }
}
