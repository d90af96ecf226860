//! Scratch domain types.
//!
//! A scratch is a generic persisted blob keyed by `(scratch_type, id)`.
//! Preview URL overrides are stored as scratches keyed by workspace id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of scratch record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScratchType {
    PreviewUrlOverride,
}

impl ScratchType {
    /// Convert to the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreviewUrlOverride => "PREVIEW_URL_OVERRIDE",
        }
    }

    /// Parse a stored scratch type.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PREVIEW_URL_OVERRIDE" => Some(Self::PreviewUrlOverride),
            _ => None,
        }
    }
}

/// Data carried by a preview URL override scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewUrlOverrideData {
    pub url: String,
}

/// Typed scratch payload.
///
/// Serialized as `{"type": "PREVIEW_URL_OVERRIDE", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScratchPayload {
    PreviewUrlOverride(PreviewUrlOverrideData),
}

impl ScratchPayload {
    /// Build a preview URL override payload.
    pub fn preview_url_override(url: impl Into<String>) -> Self {
        Self::PreviewUrlOverride(PreviewUrlOverrideData { url: url.into() })
    }

    /// The scratch type this payload belongs to.
    #[must_use]
    pub const fn scratch_type(&self) -> ScratchType {
        match self {
            Self::PreviewUrlOverride(_) => ScratchType::PreviewUrlOverride,
        }
    }
}

/// A persisted scratch record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scratch {
    /// Owner key (workspace id for preview overrides)
    pub id: String,
    pub payload: ScratchPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scratch {
    /// The override URL carried by this scratch, if it is a preview override.
    #[must_use]
    pub fn override_url(&self) -> Option<&str> {
        match &self.payload {
            ScratchPayload::PreviewUrlOverride(data) => Some(data.url.as_str()),
        }
    }
}

/// A workspace's override as seen by the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub workspace_id: String,
    pub url: Option<String>,
}

impl OverrideRecord {
    /// Build a record, normalizing empty or whitespace-only URLs to `None`.
    pub fn new(workspace_id: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            url: url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let payload = ScratchPayload::preview_url_override("http://localhost:3000");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "PREVIEW_URL_OVERRIDE");
        assert_eq!(json["data"]["url"], "http://localhost:3000");

        let parsed: ScratchPayload = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.scratch_type(), ScratchType::PreviewUrlOverride);
    }

    #[test]
    fn test_scratch_type_round_trip() {
        let t = ScratchType::PreviewUrlOverride;
        assert_eq!(ScratchType::parse(t.as_str()), Some(t));
        assert_eq!(ScratchType::parse("DRAFT_TASK"), None);
    }

    #[test]
    fn test_override_record_blank_url_is_none() {
        assert_eq!(OverrideRecord::new("ws", Some("  ")).url, None);
        assert_eq!(OverrideRecord::new("ws", None).url, None);
        assert_eq!(
            OverrideRecord::new("ws", Some(" http://a.test ")).url.as_deref(),
            Some("http://a.test")
        );
    }
}
