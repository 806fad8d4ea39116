// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event kinds and the payloads handed to hook handlers.
//!
//! Payloads are serialized as flat JSON objects with a `hookEventName`
//! discriminator at the top level, e.g.
//! ```json
//! {"hookEventName": "PreOperation", "operationName": "Bash", "parameters": {"command": "ls"}}
//! ```
//! The same shape is accepted back from a handler's stdout as a replacement
//! payload.

use crate::error::PayloadError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Name of the discriminator field in wire payloads.
pub const EVENT_NAME_FIELD: &str = "hookEventName";

/// Lifecycle moments that can trigger hook evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Before an operation executes
    PreOperation,
    /// After an operation completes
    PostOperation,
    /// The session is stopping
    SessionStop,
    /// A sub-agent is stopping
    SubAgentStop,
    /// A prompt was submitted
    PromptSubmit,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub fn all() -> &'static [EventKind] {
        &[
            Self::PreOperation,
            Self::PostOperation,
            Self::SessionStop,
            Self::SubAgentStop,
            Self::PromptSubmit,
        ]
    }

    /// Wire-format event name.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::PreOperation => "PreOperation",
            Self::PostOperation => "PostOperation",
            Self::SessionStop => "SessionStop",
            Self::SubAgentStop => "SubAgentStop",
            Self::PromptSubmit => "PromptSubmit",
        }
    }

    /// Whether the triggering action is held until the chain resolves.
    ///
    /// Post-operation and stop events fire after the fact, so they can never
    /// suppress or abort anything.
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::PreOperation | Self::PromptSubmit)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    /// Accepts wire names, kebab/snake spellings, and the host agent's
    /// names (`PreToolUse`, `Stop`, `UserPromptSubmit`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "preoperation" | "pretooluse" => Ok(Self::PreOperation),
            "postoperation" | "posttooluse" => Ok(Self::PostOperation),
            "sessionstop" | "stop" => Ok(Self::SessionStop),
            "subagentstop" => Ok(Self::SubAgentStop),
            "promptsubmit" | "userpromptsubmit" => Ok(Self::PromptSubmit),
            _ => Err(format!("unknown event kind: {s}")),
        }
    }
}

/// Fields describing an operation about to run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationPayload {
    pub operation_name: String,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Fields describing an operation that already ran.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResultPayload {
    #[serde(flatten)]
    pub operation: OperationPayload,
    #[serde(default)]
    pub result: Value,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Session termination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStopPayload {
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Sub-agent termination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAgentStopPayload {
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Raw prompt text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPayload {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One concrete event occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hookEventName")]
pub enum EventPayload {
    PreOperation(OperationPayload),
    PostOperation(OperationResultPayload),
    SessionStop(SessionStopPayload),
    SubAgentStop(SubAgentStopPayload),
    PromptSubmit(PromptPayload),
}

impl EventPayload {
    /// Create a pre-operation event
    pub fn pre_operation(operation_name: impl Into<String>, parameters: Value) -> Self {
        Self::PreOperation(OperationPayload {
            operation_name: operation_name.into(),
            parameters,
            ..Default::default()
        })
    }

    /// Create a post-operation event
    pub fn post_operation(
        operation_name: impl Into<String>,
        parameters: Value,
        result: Value,
        succeeded: bool,
    ) -> Self {
        Self::PostOperation(OperationResultPayload {
            operation: OperationPayload {
                operation_name: operation_name.into(),
                parameters,
                ..Default::default()
            },
            result,
            succeeded,
            ..Default::default()
        })
    }

    /// Create a session stop event
    pub fn session_stop(reason: impl Into<String>) -> Self {
        Self::SessionStop(SessionStopPayload {
            reason: reason.into(),
            ..Default::default()
        })
    }

    /// Create a sub-agent stop event
    pub fn subagent_stop(agent_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SubAgentStop(SubAgentStopPayload {
            agent_type: agent_type.into(),
            reason: reason.into(),
            ..Default::default()
        })
    }

    /// Create a prompt submit event
    pub fn prompt_submit(prompt: impl Into<String>) -> Self {
        Self::PromptSubmit(PromptPayload {
            prompt: prompt.into(),
            ..Default::default()
        })
    }

    /// Placeholder payload for exercising a handler by hand.
    pub fn synthetic(kind: EventKind, subject: Option<&str>) -> Self {
        let subject = subject.unwrap_or("Bash");
        let payload = match kind {
            EventKind::PreOperation => Self::pre_operation(subject, Value::Object(Default::default())),
            EventKind::PostOperation => Self::post_operation(
                subject,
                Value::Object(Default::default()),
                Value::Null,
                true,
            ),
            EventKind::SessionStop => Self::session_stop("completed"),
            EventKind::SubAgentStop => Self::subagent_stop(subject, "completed"),
            EventKind::PromptSubmit => Self::prompt_submit(""),
        };
        payload
            .with_session_id("synthetic")
            .with_timestamp(Utc::now())
    }

    /// Set the session id carried by every variant.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        let id = Some(session_id.into());
        match &mut self {
            Self::PreOperation(p) => p.session_id = id,
            Self::PostOperation(p) => p.operation.session_id = id,
            Self::SessionStop(p) => p.session_id = id,
            Self::SubAgentStop(p) => p.session_id = id,
            Self::PromptSubmit(p) => p.session_id = id,
        }
        self
    }

    /// Set the timestamp carried by every variant.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        let ts = Some(timestamp);
        match &mut self {
            Self::PreOperation(p) => p.timestamp = ts,
            Self::PostOperation(p) => p.operation.timestamp = ts,
            Self::SessionStop(p) => p.timestamp = ts,
            Self::SubAgentStop(p) => p.timestamp = ts,
            Self::PromptSubmit(p) => p.timestamp = ts,
        }
        self
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::PreOperation(_) => EventKind::PreOperation,
            Self::PostOperation(_) => EventKind::PostOperation,
            Self::SessionStop(_) => EventKind::SessionStop,
            Self::SubAgentStop(_) => EventKind::SubAgentStop,
            Self::PromptSubmit(_) => EventKind::PromptSubmit,
        }
    }

    /// Operation name, for the operation events.
    pub fn operation_name(&self) -> Option<&str> {
        match self {
            Self::PreOperation(p) => Some(&p.operation_name),
            Self::PostOperation(p) => Some(&p.operation.operation_name),
            _ => None,
        }
    }

    /// The name matchers are tested against.
    ///
    /// Operation events match on the operation name and sub-agent stops on
    /// the agent type. Session stops and prompts have no subject, so every
    /// enabled hook registered for them runs.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::SubAgentStop(p) => Some(&p.agent_type),
            _ => self.operation_name(),
        }
    }

    /// Serialize to the wire JSON string written to a handler's stdin.
    pub fn to_wire_string(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(|e| PayloadError::Serialize(e.to_string()))
    }

    /// Parse a payload of the given kind from handler output or CLI input.
    ///
    /// `hookEventName` may be omitted; if present it must name `kind`.
    pub fn from_json(kind: EventKind, text: &str) -> Result<Self, PayloadError> {
        let mut value: Value =
            serde_json::from_str(text.trim()).map_err(|e| PayloadError::NotJson(e.to_string()))?;
        let obj = value.as_object_mut().ok_or(PayloadError::NotAnObject)?;

        match obj.get(EVENT_NAME_FIELD) {
            None => {
                obj.insert(
                    EVENT_NAME_FIELD.to_string(),
                    Value::String(kind.wire_name().to_string()),
                );
            }
            Some(Value::String(name)) if name == kind.wire_name() => {}
            Some(other) => {
                return Err(PayloadError::KindMismatch {
                    expected: kind,
                    found: other.to_string(),
                });
            }
        }

        serde_json::from_value(value).map_err(|e| PayloadError::Schema(e.to_string()))
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
