//! Inbound message decoding
//!
//! Inbound webhooks arrive in one of two shapes: the Messages API format,
//! identified by a non-empty `message_uuid`, and the older SMS API format,
//! identified by a non-empty `msisdn`. Each shape has a [`FormatDetector`];
//! the decoder asks them in order and takes the first match.
//!
//! A payload that parses as JSON but lacks the identifying field is "not
//! this format" rather than an error, so the next detector gets its turn.
//! Only when every detector declines does decoding fail, and it fails with
//! [`MessagesError::UnrecognizedFormat`] alone.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::types::{
    Channel, InboundMessage, LegacySms, MediaKind, MediaRef, MessageStatus, MessageType, WireFormat,
};
use crate::{MessagesError, Result};

/// `message-timestamp` layout of legacy SMS webhooks, always UTC
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of offering a payload to one detector
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Matched(InboundMessage),
    NotThisFormat,
}

/// Recognizes and normalizes one inbound wire format
pub trait FormatDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, payload: &[u8]) -> Detection;
}

/// Messages API webhook
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesApiFormat;

#[derive(Deserialize)]
struct MessagesApiPayload {
    #[serde(default)]
    message_uuid: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    message_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<MediaPayload>,
    #[serde(default)]
    audio: Option<MediaPayload>,
    #[serde(default)]
    video: Option<MediaPayload>,
    #[serde(default)]
    file: Option<MediaPayload>,
}

#[derive(Deserialize)]
struct MediaPayload {
    url: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn first_media(candidates: [(MediaKind, Option<MediaPayload>); 4]) -> Option<MediaRef> {
    candidates.into_iter().find_map(|(kind, media)| {
        media.map(|m| MediaRef {
            kind,
            url: m.url,
            caption: m.caption.filter(|c| !c.is_empty()),
            name: m.name.filter(|n| !n.is_empty()),
        })
    })
}

impl FormatDetector for MessagesApiFormat {
    fn name(&self) -> &'static str {
        "messages"
    }

    fn detect(&self, payload: &[u8]) -> Detection {
        let parsed = match serde_json::from_slice::<MessagesApiPayload>(payload) {
            Ok(parsed) if !parsed.message_uuid.is_empty() => parsed,
            _ => return Detection::NotThisFormat,
        };

        let media = first_media([
            (MediaKind::Image, parsed.image),
            (MediaKind::Audio, parsed.audio),
            (MediaKind::Video, parsed.video),
            (MediaKind::File, parsed.file),
        ]);
        let declared_type = parsed.message_type.filter(|t| !t.is_empty());
        let text = parsed.text;

        let content_type = match (declared_type, &media, &text) {
            (Some(declared), _, _) => MessageType::from(declared),
            (None, Some(media), _) => media.kind.message_type(),
            (None, None, Some(_)) => MessageType::Text,
            (None, None, None) => MessageType::Other(String::new()),
        };

        Detection::Matched(InboundMessage {
            message_id: parsed.message_uuid,
            from: parsed.from,
            to: parsed.to,
            timestamp: parsed.timestamp,
            channel: Channel::from(parsed.channel.unwrap_or_default()),
            content_type,
            text,
            media,
            format: WireFormat::Messages,
        })
    }
}

/// Older SMS API webhook
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySmsFormat;

impl FormatDetector for LegacySmsFormat {
    fn name(&self) -> &'static str {
        "legacy_sms"
    }

    fn detect(&self, payload: &[u8]) -> Detection {
        match serde_json::from_slice::<LegacySms>(payload) {
            Ok(sms) if !sms.msisdn.is_empty() => Detection::Matched(sms.into_inbound()),
            _ => Detection::NotThisFormat,
        }
    }
}

impl LegacySms {
    /// Canonical form: sender is `msisdn`, channel SMS, content text
    pub fn into_inbound(self) -> InboundMessage {
        let timestamp = self.message_timestamp.as_deref().and_then(parse_legacy_timestamp);
        InboundMessage {
            message_id: self.message_id,
            from: self.msisdn,
            to: self.to,
            timestamp,
            channel: Channel::Sms,
            content_type: MessageType::Text,
            text: self.text,
            media: None,
            format: WireFormat::LegacySms,
        }
    }
}

/// `None` unless the value matches [`LEGACY_TIMESTAMP_FORMAT`]
pub fn parse_legacy_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), LEGACY_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Ordered set of format detectors
pub struct InboundMessageDecoder {
    detectors: Vec<Box<dyn FormatDetector>>,
}

impl Default for InboundMessageDecoder {
    /// Messages API first, then legacy SMS
    fn default() -> Self {
        Self {
            detectors: vec![Box::new(MessagesApiFormat), Box::new(LegacySmsFormat)],
        }
    }
}

impl InboundMessageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detector tried after all existing ones
    pub fn with_detector(mut self, detector: impl FormatDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn decode(&self, payload: &[u8]) -> Result<InboundMessage> {
        for detector in &self.detectors {
            match detector.detect(payload) {
                Detection::Matched(message) => {
                    debug!(
                        format = detector.name(),
                        message_id = %message.message_id,
                        channel = %message.channel,
                        "Decoded inbound message"
                    );
                    return Ok(message);
                }
                Detection::NotThisFormat => {
                    trace!(format = detector.name(), "Payload not in this format");
                }
            }
        }
        Err(MessagesError::UnrecognizedFormat)
    }
}

impl std::fmt::Debug for InboundMessageDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundMessageDecoder")
            .field("detectors", &self.detector_names())
            .finish()
    }
}

/// Decode with the default detectors
pub fn decode_inbound(payload: &[u8]) -> Result<InboundMessage> {
    InboundMessageDecoder::default().decode(payload)
}

/// Decode a status webhook payload
pub fn decode_status(payload: &[u8]) -> Result<MessageStatus> {
    serde_json::from_slice(payload).map_err(|e| MessagesError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_legacy_payload() {
        let message = decode_inbound(
            br#"{"msisdn":"819012345678","to":"815012345678","messageId":"m1","text":"hi"}"#,
        )
        .unwrap();

        assert_eq!(message.message_id, "m1");
        assert_eq!(message.from, "819012345678");
        assert_eq!(message.to, "815012345678");
        assert_eq!(message.channel, Channel::Sms);
        assert_eq!(message.content_type, MessageType::Text);
        assert_eq!(message.text.as_deref(), Some("hi"));
        assert_eq!(message.media, None);
        assert_eq!(message.timestamp, None);
        assert_eq!(message.format, WireFormat::LegacySms);
    }

    #[test]
    fn test_modern_payload() {
        let message = decode_inbound(
            br#"{"message_uuid":"u1","from":"819012345678","to":"815012345678","channel":"sms","message_type":"text","text":"hi"}"#,
        )
        .unwrap();

        assert_eq!(message.message_id, "u1");
        assert_eq!(message.from, "819012345678");
        assert_eq!(message.channel, Channel::Sms);
        assert_eq!(message.text.as_deref(), Some("hi"));
        assert_eq!(message.format, WireFormat::Messages);
    }

    #[test]
    fn test_neither_format() {
        let err = decode_inbound(br#"{"foo":"bar"}"#).unwrap_err();
        assert!(matches!(err, MessagesError::UnrecognizedFormat));
    }

    #[test]
    fn test_not_json_is_unrecognized() {
        assert!(matches!(
            decode_inbound(b"msisdn=819012345678&text=hi").unwrap_err(),
            MessagesError::UnrecognizedFormat
        ));
        assert!(matches!(decode_inbound(b"").unwrap_err(), MessagesError::UnrecognizedFormat));
    }

    #[test]
    fn test_empty_identifiers_do_not_match() {
        let err = decode_inbound(br#"{"message_uuid":"","msisdn":""}"#).unwrap_err();
        assert!(matches!(err, MessagesError::UnrecognizedFormat));
    }

    #[test]
    fn test_modern_wins_when_both_identifiers_present() {
        let message = decode_inbound(br#"{"message_uuid":"u2","msisdn":"81900","from":"81901"}"#).unwrap();
        assert_eq!(message.message_id, "u2");
        assert_eq!(message.from, "81901");
        assert_eq!(message.format, WireFormat::Messages);
    }

    #[test]
    fn test_modern_media() {
        let message = decode_inbound(
            br#"{"message_uuid":"u3","from":"a","to":"b","channel":"whatsapp","message_type":"image",
                "timestamp":"2024-03-01T10:00:00Z",
                "image":{"url":"https://example.com/p.jpg","caption":"receipt"}}"#,
        )
        .unwrap();

        assert_eq!(message.channel, Channel::Whatsapp);
        assert_eq!(message.content_type, MessageType::Image);
        assert_eq!(
            message.media,
            Some(MediaRef {
                kind: MediaKind::Image,
                url: "https://example.com/p.jpg".to_string(),
                caption: Some("receipt".to_string()),
                name: None,
            })
        );
        assert_eq!(message.timestamp, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn test_content_type_inferred_when_missing() {
        let message = decode_inbound(br#"{"message_uuid":"u4","file":{"url":"https://example.com/f.pdf","name":"f.pdf"}}"#).unwrap();
        assert_eq!(message.content_type, MessageType::File);
        assert_eq!(message.media.unwrap().name.as_deref(), Some("f.pdf"));
    }

    #[test]
    fn test_legacy_timestamp() {
        let message = decode_inbound(
            br#"{"msisdn":"81900","to":"81500","messageId":"m2","text":"x","message-timestamp":"2024-03-01 10:00:05"}"#,
        )
        .unwrap();
        assert_eq!(message.timestamp, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 5).unwrap()));

        assert_eq!(parse_legacy_timestamp("yesterday"), None);
    }

    struct ViberFormat;

    impl FormatDetector for ViberFormat {
        fn name(&self) -> &'static str {
            "viber"
        }

        fn detect(&self, payload: &[u8]) -> Detection {
            let value: serde_json::Value = match serde_json::from_slice(payload) {
                Ok(v) => v,
                Err(_) => return Detection::NotThisFormat,
            };
            match value["viber_id"].as_str() {
                Some(id) => Detection::Matched(InboundMessage {
                    message_id: id.to_string(),
                    from: String::new(),
                    to: String::new(),
                    timestamp: None,
                    channel: Channel::Viber,
                    content_type: MessageType::Text,
                    text: None,
                    media: None,
                    format: WireFormat::Messages,
                }),
                None => Detection::NotThisFormat,
            }
        }
    }

    #[test]
    fn test_extra_detector_runs_last() {
        let decoder = InboundMessageDecoder::new().with_detector(ViberFormat);
        assert_eq!(decoder.detector_names(), ["messages", "legacy_sms", "viber"]);

        let message = decoder.decode(br#"{"viber_id":"v1"}"#).unwrap();
        assert_eq!(message.channel, Channel::Viber);

        let message = decoder.decode(br#"{"viber_id":"v1","msisdn":"81900"}"#).unwrap();
        assert_eq!(message.format, WireFormat::LegacySms);
    }

    #[test]
    fn test_decode_status() {
        let status = decode_status(br#"{"message_uuid":"u1","to":"a","from":"b","status":"delivered","channel":"sms"}"#).unwrap();
        assert!(status.status.is_delivered());

        assert!(matches!(decode_status(b"{}").unwrap_err(), MessagesError::Decode(_)));
    }
}
