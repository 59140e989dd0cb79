//! Gmail message payload decoding

use crate::html::html_to_text;
use crate::SourceError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Deserialize;

/// Gmail emits URL-safe base64 both with and without padding
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One node of a `format=full` message payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

pub(crate) fn decode_base64url(data: &str) -> Result<String, SourceError> {
    let bytes = BASE64URL
        .decode(data.trim())
        .map_err(|e| SourceError::Decode(format!("base64url: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn collect(part: &MessagePart, mime_type: &str, out: &mut Vec<String>) -> Result<(), SourceError> {
    if part.mime_type.eq_ignore_ascii_case(mime_type) {
        if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
            out.push(decode_base64url(data)?);
        }
    }
    for child in &part.parts {
        collect(child, mime_type, out)?;
    }
    Ok(())
}

/// Plain-text body of a message
///
/// Concatenates every `text/plain` part; messages without one fall back to
/// their `text/html` parts converted to text. Returns an empty string when
/// neither exists.
pub(crate) fn extract_body(payload: &MessagePart) -> Result<String, SourceError> {
    let mut plain = Vec::new();
    collect(payload, "text/plain", &mut plain)?;
    if !plain.is_empty() {
        return Ok(plain.join("\n"));
    }

    let mut html = Vec::new();
    collect(payload, "text/html", &mut html)?;
    Ok(html.iter().map(|h| html_to_text(h)).collect::<Vec<_>>().join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(text)
    }

    fn part(mime_type: &str, data: Option<&str>, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: mime_type.to_string(),
            body: Some(PartBody {
                data: data.map(encode),
            }),
            parts,
        }
    }

    #[test]
    fn test_decode_padded_and_unpadded() {
        assert_eq!(decode_base64url("aGk").unwrap(), "hi");
        assert_eq!(decode_base64url("aGk=").unwrap(), "hi");
        assert!(decode_base64url("***").is_err());
    }

    #[test]
    fn test_prefers_plain_text() {
        let payload = part(
            "multipart/alternative",
            None,
            vec![
                part("text/plain", Some("Flight SEA to JFK"), vec![]),
                part("text/html", Some("<p>ignored</p>"), vec![]),
            ],
        );
        assert_eq!(extract_body(&payload).unwrap(), "Flight SEA to JFK");
    }

    #[test]
    fn test_falls_back_to_html() {
        let payload = part(
            "multipart/mixed",
            None,
            vec![part(
                "multipart/alternative",
                None,
                vec![part("text/html", Some("<b>SEA</b> &amp; JFK"), vec![])],
            )],
        );
        assert_eq!(extract_body(&payload).unwrap(), "SEA & JFK");
    }

    #[test]
    fn test_single_part_message() {
        let payload = part("text/plain", Some("hello"), vec![]);
        assert_eq!(extract_body(&payload).unwrap(), "hello");
    }

    #[test]
    fn test_no_text_parts() {
        let payload = part("image/png", Some("png"), vec![]);
        assert_eq!(extract_body(&payload).unwrap(), "");
    }

    #[test]
    fn test_payload_deserialization() {
        let json = format!(
            r#"{{"mimeType":"multipart/alternative","body":{{"size":0}},"parts":[{{"mimeType":"text/plain","body":{{"size":5,"data":"{}"}}}}]}}"#,
            encode("hello")
        );
        let payload: MessagePart = serde_json::from_str(&json).unwrap();
        assert_eq!(extract_body(&payload).unwrap(), "hello");
    }
}
