use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Keyword Source
// ════════════════════════════════════════════════════════════════

/// Which side of a message a keyword search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordFrom {
    /// Match against the message key.
    Key,
    /// Match against the message value.
    Value,
}

impl KeywordFrom {
    /// Map the wire string to a keyword source.
    ///
    /// `"value"` selects the message value; anything else (including
    /// the empty string) falls back to the message key.
    pub fn from_wire(s: &str) -> Self {
        if s == "value" {
            KeywordFrom::Value
        } else {
            KeywordFrom::Key
        }
    }
}

impl std::fmt::Display for KeywordFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordFrom::Key => f.write_str("key"),
            KeywordFrom::Value => f.write_str("value"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Broker Error
// ════════════════════════════════════════════════════════════════

/// Category of a broker failure. Lets the caller distinguish transient
/// transport trouble from a broker that answered with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure (connect, read, write) — transient.
    Io,
    /// Reply arrived but could not be decoded.
    Protocol,
    /// Broker answered the call with an explicit error.
    Remote,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Protocol => f.write_str("protocol"),
            ErrorKind::Remote => f.write_str("remote"),
        }
    }
}

/// Unified error type for all `MessageBroker` methods.
///
/// Carries an `ErrorKind` for categorization and a human-readable
/// message. The original cause is flattened into the message; bindings
/// are expected to include everything a diagnosis needs.
#[derive(Clone)]
pub struct BrokerError {
    kind: ErrorKind,
    message: String,
}

impl BrokerError {
    /// Transport failure — transient, caller may retry.
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    /// Undecodable reply.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Protocol, message: msg.into() }
    }

    /// Broker-reported failure.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Remote, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for BrokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for BrokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BrokerError {}

impl From<std::io::Error> for BrokerError {
    fn from(e: std::io::Error) -> Self {
        Self { kind: ErrorKind::Io, message: e.to_string() }
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(e: serde_json::Error) -> Self {
        Self { kind: ErrorKind::Protocol, message: e.to_string() }
    }
}

// ════════════════════════════════════════════════════════════════
//  MessageBroker Capability
// ════════════════════════════════════════════════════════════════

/// Remote broker RPC surface. Concrete transport bindings implement
/// this; the gateway core only ever sees the trait object.
///
/// Payloads are opaque JSON documents carried as strings — the gateway
/// never parses or reinterprets them. The API crate defines only the
/// trait, without depending on tokio; bindings box their futures.
pub trait MessageBroker: Send + Sync {
    /// Read the message at `(topic, partition, offset)` and return its
    /// JSON payload.
    fn query_by_offset(
        &self,
        topic: &str,
        partition: i64,
        offset: i64,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>>;

    /// Search `topic`/`partition` for a message matching `keyword` in
    /// its key or value, returning the JSON payload of the match.
    fn query_by_keyword(
        &self,
        topic: &str,
        partition: i32,
        keyword: &str,
        keyword_from: KeywordFrom,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>>;

    /// Write `payload` under `key` to `topic`/`partition`.
    ///
    /// The returned flag is the broker's acknowledgement verbatim: a
    /// broker may accept the call and still answer `false`. That is a
    /// negative acknowledgement, not an error.
    fn produce(
        &self,
        topic: &str,
        partition: i32,
        payload: &str,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrokerError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_from_wire_mapping() {
        assert_eq!(KeywordFrom::from_wire("value"), KeywordFrom::Value);
        assert_eq!(KeywordFrom::from_wire("key"), KeywordFrom::Key);
        // Observed gateway behavior: unknown strings fall back to key.
        assert_eq!(KeywordFrom::from_wire(""), KeywordFrom::Key);
        assert_eq!(KeywordFrom::from_wire("VALUE"), KeywordFrom::Key);
    }

    #[test]
    fn broker_error_kinds() {
        assert_eq!(BrokerError::io("x").kind(), ErrorKind::Io);
        assert_eq!(BrokerError::protocol("x").kind(), ErrorKind::Protocol);
        assert_eq!(BrokerError::remote("x").kind(), ErrorKind::Remote);
        let e: BrokerError = std::io::Error::other("refused").into();
        assert_eq!(e.kind(), ErrorKind::Io);
        assert_eq!(e.message(), "refused");
    }
}
