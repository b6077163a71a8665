//! Common payload types used across the platform

use base64::Engine;

/// An image payload decoded from an upload request
///
/// Upload clients send either a full `data:<mime>;base64,<data>` URI or the
/// bare base64 body; the bare form is treated as JPEG, matching what older
/// clients sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub base64_data: String,
}

impl ImagePayload {
    /// Parse and validate an uploaded image payload.
    pub fn from_data_uri(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("empty image data".to_string());
        }

        let (mime_type, data) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| "data URI has no payload".to_string())?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| "only base64 data URIs are supported".to_string())?;
                let mime = if mime.is_empty() { "image/jpeg" } else { mime };
                (mime.to_string(), data)
            }
            None => ("image/jpeg".to_string(), input),
        };

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| format!("invalid base64 image data: {}", e))?;

        Ok(Self {
            mime_type,
            base64_data: data.to_string(),
        })
    }

    /// Rebuild the data URI form used by vision chat APIs.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" in standard base64
    const SAMPLE: &str = "aGVsbG8=";

    #[test]
    fn test_parse_full_data_uri() {
        let payload =
            ImagePayload::from_data_uri(&format!("data:image/png;base64,{}", SAMPLE)).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.base64_data, SAMPLE);
    }

    #[test]
    fn test_bare_base64_defaults_to_jpeg() {
        let payload = ImagePayload::from_data_uri(SAMPLE).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_round_trip_to_data_uri() {
        let uri = format!("data:image/png;base64,{}", SAMPLE);
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.to_data_uri(), uri);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ImagePayload::from_data_uri("").is_err());
        assert!(ImagePayload::from_data_uri("data:image/png;base64").is_err());
        assert!(ImagePayload::from_data_uri("data:image/png,rawdata").is_err());
        assert!(ImagePayload::from_data_uri("not base64 at all!!!").is_err());
    }
}
