use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::types::Usage;

/// Field that may be absent, explicitly `null`, or set.
///
/// `None` is absent and `Some(None)` is a present `null`; both survive a
/// serialize round trip.
pub type Nullable<T> = Option<Option<T>>;

fn present<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One decoded event of a streamed chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    pub id: String,
    pub object: String,
    /// Unix seconds; some upstreams send it as a float
    pub created: Number,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Nullable<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub usage: Nullable<Usage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: Delta,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Kept as sent; upstreams use roles beyond the request-side `Role`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub role: Nullable<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Nullable<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Nullable<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tool_calls: Nullable<Vec<ToolCallDelta>>,
}

impl Delta {
    pub fn role(&self) -> Option<&str> {
        self.role.as_ref()?.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_ref()?.as_deref()
    }

    pub fn reasoning_content(&self) -> Option<&str> {
        self.reasoning_content.as_ref()?.as_deref()
    }

    pub fn tool_calls(&self) -> Option<&[ToolCallDelta]> {
        self.tool_calls.as_ref()?.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl CompletionChunk {
    /// Delta of the first choice, where callbacks look for content
    pub fn delta(&self) -> Option<&Delta> {
        self.choices.first().map(|c| &c.delta)
    }

    pub fn content(&self) -> Option<&str> {
        self.delta().and_then(Delta::content)
    }

    pub fn reasoning_content(&self) -> Option<&str> {
        self.delta().and_then(Delta::reasoning_content)
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_ref()?.as_deref()
    }

    pub fn system_fingerprint(&self) -> Option<&str> {
        self.system_fingerprint.as_ref()?.as_deref()
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()?.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finish_reason().is_some()
    }

    /// `created` as a timestamp; `None` if out of range
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs = match self.created.as_i64() {
            Some(secs) => secs,
            None => {
                let secs = self.created.as_f64()?;
                if !secs.is_finite() {
                    return None;
                }
                secs.trunc() as i64
            }
        };
        DateTime::from_timestamp(secs, 0)
    }
}
