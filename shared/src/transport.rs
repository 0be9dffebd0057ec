//! Alert and incident-report submission.
//!
//! One POST per call, never retried here: a failed emergency alert has to
//! reach the user immediately so they can switch to a voice channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::capabilities::{
    settle, ApiUrl, ContentType, Http, HttpError, HttpOutcome, HttpReply,
};
use crate::INCIDENTS_PATH;

pub const SOS_DESCRIPTION: &str =
    "URGENT: Automated SOS Triggered by User. Immediate assistance required.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    #[default]
    Flood,
    Fire,
    Earthquake,
    Medical,
    Sos,
    Other,
}

impl IncidentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Fire => "fire",
            Self::Earthquake => "earthquake",
            Self::Medical => "medical",
            Self::Sos => "sos",
            Self::Other => "other",
        }
    }

    /// The service stores free text; anything unrecognised is `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "flood" => Self::Flood,
            "fire" => Self::Fire,
            "earthquake" => Self::Earthquake,
            "medical" => Self::Medical,
            "sos" => Self::Sos,
            _ => Self::Other,
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Flood => "fa-water",
            Self::Fire => "fa-fire",
            Self::Earthquake => "fa-house-damage",
            Self::Medical => "fa-medkit",
            Self::Sos => "fa-broadcast-tower",
            Self::Other => "fa-exclamation-triangle",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

// Keep raw bytes out of logs.
impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub media: Option<MediaAttachment>,
}

impl AlertPayload {
    pub fn sos(location: impl Into<String>) -> Self {
        Self {
            kind: IncidentKind::Sos,
            severity: Severity::Critical,
            location: location.into(),
            description: SOS_DESCRIPTION.to_string(),
            media: None,
        }
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("type", self.kind.as_str()),
            ("severity", self.severity.as_str()),
            ("location", &self.location),
            ("description", &self.description),
        ]
    }

    /// Multipart when media is attached, form-encoded fields otherwise.
    pub fn encode(&self) -> (ContentType, Vec<u8>) {
        match &self.media {
            None => {
                let mut form = url::form_urlencoded::Serializer::new(String::new());
                for (name, value) in self.fields() {
                    form.append_pair(name, value);
                }
                (ContentType::FormUrlEncoded, form.finish().into_bytes())
            }
            Some(media) => {
                let boundary = format!("----relief{}", Uuid::new_v4().simple());
                let mut body = Vec::with_capacity(media.bytes.len() + 1024);

                for (name, value) in self.fields() {
                    body.extend_from_slice(
                        format!(
                            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                        )
                        .as_bytes(),
                    );
                }

                let mime = if media.mime_type.is_empty() {
                    "application/octet-stream"
                } else {
                    media.mime_type.as_str()
                };
                body.extend_from_slice(
                    format!(
                        "--{boundary}\r\nContent-Disposition: form-data; name=\"media\"; filename=\"{}\"\r\nContent-Type: {mime}\r\n\r\n",
                        escape_filename(&media.file_name)
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&media.bytes);
                body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

                (ContentType::Multipart { boundary }, body)
            }
        }
    }
}

fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The service's acknowledgment of a created incident.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    #[error("network failure: {message}")]
    Network { message: String },

    #[error("service rejected the submission ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("request could not be built: {reason}")]
    InvalidRequest { reason: String },
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl TransportError {
    pub fn from_reply(reply: &HttpReply) -> Self {
        let status = reply.status;
        let message = serde_json::from_slice::<ServiceErrorBody>(&reply.body)
            .ok()
            .and_then(|body| body.error.or(body.message))
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        TransportError::Rejected { status, message }
    }
}

impl From<HttpError> for TransportError {
    fn from(e: HttpError) -> Self {
        if e.is_network() {
            TransportError::Network {
                message: e.to_string(),
            }
        } else {
            TransportError::InvalidRequest {
                reason: e.to_string(),
            }
        }
    }
}

pub type SubmitResult = Result<Ack, TransportError>;

/// A submission ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingAlert {
    pub url: ApiUrl,
    pub content_type: ContentType,
    pub body: Vec<u8>,
}

pub struct AlertTransport;

impl AlertTransport {
    pub fn build_request(
        api_base: &str,
        payload: &AlertPayload,
    ) -> Result<OutgoingAlert, TransportError> {
        let url = ApiUrl::join(api_base, INCIDENTS_PATH)?;
        let (content_type, body) = payload.encode();
        Ok(OutgoingAlert {
            url,
            content_type,
            body,
        })
    }

    /// Any 2xx is an acknowledgment, even with an unreadable body.
    pub fn interpret(outcome: HttpOutcome) -> SubmitResult {
        match outcome {
            Ok(reply) if reply.is_success() => Ok(reply.json::<Ack>().unwrap_or_default()),
            Ok(reply) => Err(TransportError::from_reply(&reply)),
            Err(e) => Err(e.into()),
        }
    }

    /// Issues exactly one POST. A request that cannot be built is returned
    /// to the caller instead of being sent.
    pub fn submit<Ev, F>(
        http: &Http<Ev>,
        api_base: &str,
        payload: &AlertPayload,
        make_event: F,
    ) -> Result<(), TransportError>
    where
        Ev: Send + 'static,
        F: FnOnce(SubmitResult) -> Ev + Send + 'static,
    {
        let request = Self::build_request(api_base, payload).map_err(|e| {
            error!(error = %e, kind = payload.kind.as_str(), "submission request rejected before send");
            e
        })?;

        info!(
            kind = payload.kind.as_str(),
            severity = payload.severity.as_str(),
            has_media = payload.media.is_some(),
            "submitting incident"
        );

        let content_type = request.content_type.header_value();
        http.post(request.url.as_str())
            .header("Accept", "application/json")
            .header("Content-Type", content_type.as_str())
            .body(request.body)
            .send(move |result| make_event(Self::interpret(settle(result))));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_media() -> AlertPayload {
        AlertPayload {
            kind: IncidentKind::Fire,
            severity: Severity::High,
            location: "Civic Center".into(),
            description: "Smoke on 3rd floor".into(),
            media: Some(MediaAttachment {
                file_name: "smoke \"1\".jpg".into(),
                mime_type: "image/jpeg".into(),
                bytes: vec![0xFF, 0xD8, 0xFF],
            }),
        }
    }

    #[test]
    fn sos_payload_is_critical() {
        let payload = AlertPayload::sos("SOS GPS: 34.0500, -118.2400");
        assert_eq!(payload.kind, IncidentKind::Sos);
        assert_eq!(payload.severity, Severity::Critical);
        assert_eq!(payload.description, SOS_DESCRIPTION);
        assert!(payload.media.is_none());
    }

    #[test]
    fn fields_only_payload_is_form_encoded() {
        let (content_type, body) = AlertPayload::sos("SOS GPS: 1.0000, 2.0000").encode();
        assert_eq!(content_type, ContentType::FormUrlEncoded);
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&body)
            .into_owned()
            .collect();
        assert_eq!(pairs[0], ("type".into(), "sos".into()));
        assert_eq!(pairs[1], ("severity".into(), "critical".into()));
        assert_eq!(pairs[2], ("location".into(), "SOS GPS: 1.0000, 2.0000".into()));
        assert_eq!(pairs[3].0, "description");
    }

    #[test]
    fn media_payload_is_multipart() {
        let (content_type, body) = report_with_media().encode();
        let ContentType::Multipart { boundary } = content_type else {
            panic!("expected multipart, got {content_type:?}");
        };
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("name=\"type\"\r\n\r\nfire\r\n"));
        assert!(text.contains("name=\"severity\"\r\n\r\nhigh\r\n"));
        assert!(text.contains("filename=\"smoke %221%22.jpg\""));
        assert!(text.contains("Content-Type: image/jpeg"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert!(body.windows(3).any(|w| w == [0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn request_targets_incidents() {
        let request =
            AlertTransport::build_request("http://localhost:5000/", &AlertPayload::sos("x")).unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:5000/api/incidents");
        assert_eq!(request.content_type, ContentType::FormUrlEncoded);
    }

    #[test]
    fn bad_base_is_rejected_before_send() {
        let result = AlertTransport::build_request("ftp://relief", &AlertPayload::sos("x"));
        assert!(matches!(result, Err(TransportError::InvalidRequest { .. })));
    }

    #[test]
    fn created_response_is_an_ack() {
        let reply = HttpReply::new(
            201,
            br#"{"message":"Incident reported successfully","id":42}"#.to_vec(),
        );
        let ack = AlertTransport::interpret(Ok(reply)).unwrap();
        assert_eq!(ack.id, Some(42));
    }

    #[test]
    fn success_with_unreadable_body_is_still_an_ack() {
        let ack = AlertTransport::interpret(Ok(HttpReply::ok("<html>"))).unwrap();
        assert_eq!(ack, Ack::default());
    }

    #[test]
    fn server_error_is_surfaced() {
        let reply = HttpReply::new(500, br#"{"error":"database is locked"}"#.to_vec());
        assert_eq!(
            AlertTransport::interpret(Ok(reply)),
            Err(TransportError::Rejected {
                status: 500,
                message: "database is locked".into()
            })
        );
    }

    #[test]
    fn connection_failure_is_network_error() {
        let result = AlertTransport::interpret(Err(HttpError::ConnectionError {
            message: "offline".into(),
        }));
        assert!(matches!(result, Err(TransportError::Network { .. })));
    }

    #[test]
    fn kind_parsing_is_lenient() {
        assert_eq!(IncidentKind::parse("Fire"), IncidentKind::Fire);
        assert_eq!(IncidentKind::parse("tornado"), IncidentKind::Other);
        assert_eq!(IncidentKind::parse("sos").icon(), "fa-broadcast-tower");
        assert_eq!(Severity::parse("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::parse("meh"), None);
    }
}
