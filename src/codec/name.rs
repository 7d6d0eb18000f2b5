//! Prefixed base64url encoding of file names

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use crate::error::MediaError;
use crate::settings::MediaSettings;

pub const DEFAULT_NAME_PREFIX: &str = "b64";
pub const DEFAULT_NAME_SEPARATOR: &str = "~";

/// Encodes file names as `prefix + separator + base64url(name)`.
///
/// Directory names are never passed through the codec so they stay
/// navigable; only file names travel as encoded tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCodec {
    marker: String,
}

impl NameCodec {
    pub fn new(prefix: &str, separator: &str) -> Self {
        Self {
            marker: format!("{}{}", prefix, separator),
        }
    }

    /// Codec configured from the current settings snapshot
    pub fn from_settings(settings: &MediaSettings) -> Self {
        Self::new(
            &settings.base_64_name_prefix,
            &settings.base_64_name_separator,
        )
    }

    pub fn encode(&self, name: &str) -> String {
        format!("{}{}", self.marker, URL_SAFE.encode(name.as_bytes()))
    }

    /// Reverses [`NameCodec::encode`].
    ///
    /// Fails when the token lacks the marker, is not valid base64url or does
    /// not decode to UTF-8.
    pub fn decode(&self, token: &str) -> Result<String, MediaError> {
        let encoded = token
            .strip_prefix(&self.marker)
            .ok_or_else(|| MediaError::Decode(format!("missing name prefix in \"{}\"", token)))?;

        let bytes = URL_SAFE
            .decode(encoded)
            .map_err(|e| MediaError::Decode(format!("\"{}\": {}", token, e)))?;

        String::from_utf8(bytes).map_err(|e| MediaError::Decode(format!("\"{}\": {}", token, e)))
    }

    pub fn has_prefix(&self, token: &str) -> bool {
        token.starts_with(&self.marker)
    }
}

impl Default for NameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIX, DEFAULT_NAME_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_awkward_names() {
        let codec = NameCodec::default();
        let names = [
            "",
            "plain.txt",
            "with space & ampersand.mp4",
            "slash/inside",
            "../../etc/passwd",
            "100% legit?.pdf",
            "película año.mkv",
            "写真 📷.jpg",
        ];

        for name in names {
            let token = codec.encode(name);
            assert!(codec.has_prefix(&token));
            assert_eq!(codec.decode(&token).unwrap(), name);
        }
    }

    #[test]
    fn test_encoded_token_is_url_safe() {
        let codec = NameCodec::new("enc", "_");
        let token = codec.encode("??>>~~.bin");
        assert!(token.starts_with("enc_"));
        assert!(!token.contains('/'));
        assert!(!token.contains('+'));
    }

    #[test]
    fn test_has_prefix_is_pure_prefix_test() {
        let codec = NameCodec::new("b64", "~");
        assert!(codec.has_prefix("b64~anything"));
        assert!(!codec.has_prefix("b64anything"));
        assert!(!codec.has_prefix("photos"));
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let codec = NameCodec::default();
        let err = codec.decode("b64~not*base64!").unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_decode_rejects_missing_prefix() {
        let codec = NameCodec::default();
        assert!(codec.decode("aGVsbG8=").is_err());
    }

    #[test]
    fn test_decode_rejects_non_utf8_payload() {
        let codec = NameCodec::default();
        let token = format!("b64~{}", URL_SAFE.encode([0xff, 0xfe, 0xfd]));
        assert!(codec.decode(&token).is_err());
    }
}
