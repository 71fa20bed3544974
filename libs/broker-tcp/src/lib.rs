//! Newline-delimited JSON RPC binding for [`MessageBroker`].
//!
//! One connection per call, no pooling, no retries — retry policy
//! belongs to the caller. Requests are a single JSON object tagged
//! with `op`; replies are a single JSON line `{ok?, msg_json?, error?}`.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use broker_api::{BrokerError, KeywordFrom, MessageBroker};

// ════════════════════════════════════════════════════════════════
//  Wire format
// ════════════════════════════════════════════════════════════════

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum RpcRequest<'a> {
    QueryByOffset {
        topic: &'a str,
        partition: i64,
        offset: i64,
    },
    QueryByKeyword {
        topic: &'a str,
        partition: i32,
        keyword: &'a str,
        keyword_from: KeywordFrom,
    },
    Produce {
        topic: &'a str,
        partition: i32,
        payload: &'a str,
        key: &'a str,
    },
}

#[derive(Deserialize)]
struct RpcReply {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    msg_json: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ════════════════════════════════════════════════════════════════
//  TcpBrokerClient
// ════════════════════════════════════════════════════════════════

/// Concrete broker binding over a line-oriented TCP endpoint.
pub struct TcpBrokerClient {
    addr: String,
}

impl TcpBrokerClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn call(&self, req: RpcRequest<'_>) -> Result<RpcReply, BrokerError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| BrokerError::io(format!("connect {}: {e}", self.addr)))?;
        let (read_half, mut write_half) = stream.into_split();

        let mut line = serde_json::to_string(&req)
            .map_err(|e| BrokerError::protocol(format!("encode request: {e}")))?;
        line.push('\n');
        write_half
            .write_all(line.as_bytes())
            .await
            .map_err(|e| BrokerError::io(format!("send to {}: {e}", self.addr)))?;

        let mut reply_line = String::new();
        let n = BufReader::new(read_half)
            .read_line(&mut reply_line)
            .await
            .map_err(|e| BrokerError::io(format!("read from {}: {e}", self.addr)))?;
        if n == 0 {
            return Err(BrokerError::io(format!(
                "{}: connection closed without reply",
                self.addr
            )));
        }

        let mut reply: RpcReply = serde_json::from_str(reply_line.trim_end())
            .map_err(|e| BrokerError::protocol(format!("decode reply: {e}")))?;
        if let Some(error) = reply.error.take() {
            tracing::warn!(addr = %self.addr, %error, "broker reported failure");
            return Err(BrokerError::remote(error));
        }
        Ok(reply)
    }
}

impl MessageBroker for TcpBrokerClient {
    fn query_by_offset(
        &self,
        topic: &str,
        partition: i64,
        offset: i64,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>> {
        let topic = topic.to_string();
        Box::pin(async move {
            let reply = self
                .call(RpcRequest::QueryByOffset {
                    topic: &topic,
                    partition,
                    offset,
                })
                .await?;
            reply
                .msg_json
                .ok_or_else(|| BrokerError::protocol("reply missing msg_json"))
        })
    }

    fn query_by_keyword(
        &self,
        topic: &str,
        partition: i32,
        keyword: &str,
        keyword_from: KeywordFrom,
    ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>> {
        let topic = topic.to_string();
        let keyword = keyword.to_string();
        Box::pin(async move {
            let reply = self
                .call(RpcRequest::QueryByKeyword {
                    topic: &topic,
                    partition,
                    keyword: &keyword,
                    keyword_from,
                })
                .await?;
            reply
                .msg_json
                .ok_or_else(|| BrokerError::protocol("reply missing msg_json"))
        })
    }

    fn produce(
        &self,
        topic: &str,
        partition: i32,
        payload: &str,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BrokerError>> + Send + '_>> {
        let topic = topic.to_string();
        let payload = payload.to_string();
        let key = key.to_string();
        Box::pin(async move {
            let reply = self
                .call(RpcRequest::Produce {
                    topic: &topic,
                    partition,
                    payload: &payload,
                    key: &key,
                })
                .await?;
            // An absent flag reads as a negative acknowledgement.
            Ok(reply.ok.unwrap_or(false))
        })
    }
}
