//! Shared value types passed between the generator, actors and sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Template family used to synthesize prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Strategy {
    Historical,
    Mathematical,
    Geographical,
    Hypothetical,
    Technical,
    #[default]
    Mixed,
}

impl Strategy {
    /// Every concrete (non-mixed) strategy, in a fixed order.
    pub const CONCRETE: [Strategy; 5] = [
        Strategy::Historical,
        Strategy::Mathematical,
        Strategy::Geographical,
        Strategy::Hypothetical,
        Strategy::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Historical => "historical",
            Strategy::Mathematical => "mathematical",
            Strategy::Geographical => "geographical",
            Strategy::Hypothetical => "hypothetical",
            Strategy::Technical => "technical",
            Strategy::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown names map to [`Strategy::Mixed`], never an error.
impl FromStr for Strategy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "historical" => Strategy::Historical,
            "mathematical" => Strategy::Mathematical,
            "geographical" => Strategy::Geographical,
            "hypothetical" => Strategy::Hypothetical,
            "technical" => Strategy::Technical,
            _ => Strategy::Mixed,
        })
    }
}

impl From<String> for Strategy {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(strategy) => strategy,
            Err(never) => match never {},
        }
    }
}

/// A provisioned simulated user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub identity_id: String,
    pub name: String,
    pub credential: String,
    pub group_id: String,
    pub group_name: String,
}

impl Identity {
    pub fn new(
        identity_id: impl Into<String>,
        name: impl Into<String>,
        credential: impl Into<String>,
        group_id: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            identity_id: identity_id.into(),
            name: name.into(),
            credential: credential.into(),
            group_id: group_id.into(),
            group_name: group_name.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("identity_id", &self.identity_id)
            .field("name", &self.name)
            .field("credential", &"<redacted>")
            .field("group_id", &self.group_id)
            .field("group_name", &self.group_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Failure classification used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    HttpStatus,
    Timeout,
    Decode,
    Canceled,
    DeadlineExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Decode => "decode",
            ErrorKind::Canceled => "canceled",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
        }
    }

    /// Whether this failure ends the actor rather than just the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Canceled | ErrorKind::DeadlineExceeded)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single request, as observed by the actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub latency: Duration,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub tokens_consumed: u64,
    pub time_to_first_token: Option<Duration>,
    pub tokens_per_second: Option<f64>,
}

impl Outcome {
    pub fn success(latency: Duration, tokens_consumed: u64) -> Self {
        Self {
            latency,
            success: true,
            error_kind: None,
            tokens_consumed,
            time_to_first_token: None,
            tokens_per_second: None,
        }
    }

    pub fn failure(latency: Duration, kind: ErrorKind) -> Self {
        Self {
            latency,
            success: false,
            error_kind: Some(kind),
            tokens_consumed: 0,
            time_to_first_token: None,
            tokens_per_second: None,
        }
    }

    pub fn with_timing(mut self, ttft: Duration, tokens_per_second: f64) -> Self {
        self.time_to_first_token = Some(ttft);
        self.tokens_per_second = Some(tokens_per_second);
        self
    }
}
