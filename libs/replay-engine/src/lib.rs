pub mod error;

use std::sync::Arc;

use broker_api::MessageBroker;

pub use error::GatewayError;

// ════════════════════════════════════════════════════════════════
//  Parameter parsing
// ════════════════════════════════════════════════════════════════

/// Coerce a wire partition string to an index, degrading to `0` when
/// it does not parse.
///
/// This is the observed behavior of the produce and keyword-query
/// paths, in contrast to the hard failure of the offset/replay paths.
/// The inconsistency is deliberate; both call sites go through this
/// one helper so it stays visible.
pub fn partition_or_zero(s: &str) -> i32 {
    s.parse::<i32>().unwrap_or(0)
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, GatewayError> {
    value
        .parse::<T>()
        .map_err(|_| GatewayError::parameter(field, value))
}

// ════════════════════════════════════════════════════════════════
//  ReplayCoordinator
// ════════════════════════════════════════════════════════════════

/// Read-then-write orchestration against the broker.
///
/// Holds nothing but a shared broker handle; every invocation is
/// independent and may run concurrently with others. The two stages
/// are not transactional: no lock or fencing token is held between
/// the read and the write, so concurrent replays of the same offset
/// are not serialized here. Callers needing exactly-once replay must
/// de-duplicate downstream using offset + key. No retries are
/// performed; retry policy belongs to the caller or the binding.
pub struct ReplayCoordinator {
    broker: Arc<dyn MessageBroker>,
}

impl ReplayCoordinator {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &Arc<dyn MessageBroker> {
        &self.broker
    }

    /// Read the message at `(topic, partition, offset)` and republish
    /// its payload verbatim under `new_key`.
    ///
    /// Read-safe: a failed read never triggers a write. A successful
    /// read followed by a failed write is NOT rolled back — the
    /// semantics are at-least-once-attempted-write, not atomicity.
    /// `Ok(false)` is the broker's negative acknowledgement passed
    /// through, not an error.
    pub async fn replay(
        &self,
        topic: &str,
        partition: &str,
        offset: &str,
        new_key: &str,
    ) -> Result<bool, GatewayError> {
        let p: i64 = parse_field("partition", partition)?;
        let o: i64 = parse_field("offset", offset)?;

        let payload = self
            .broker
            .query_by_offset(topic, p, o)
            .await
            .map_err(GatewayError::Query)?;

        tracing::debug!(topic, partition = p, offset = o, "replaying message");

        self.broker
            .produce(topic, p as i32, &payload, new_key)
            .await
            .map_err(GatewayError::Produce)
    }

    /// Read a single message by topic/partition/offset, returning its
    /// JSON payload untouched.
    pub async fn query_by_offset(
        &self,
        topic: &str,
        partition: &str,
        offset: &str,
    ) -> Result<String, GatewayError> {
        let p: i64 = parse_field("partition", partition)?;
        let o: i64 = parse_field("offset", offset)?;
        self.broker
            .query_by_offset(topic, p, o)
            .await
            .map_err(GatewayError::Query)
    }

    /// Write an opaque JSON payload plus key to a topic.
    ///
    /// An unparseable partition hint degrades to `0` instead of
    /// failing (see [`partition_or_zero`]).
    pub async fn produce(
        &self,
        topic: &str,
        partition: &str,
        payload: &str,
        key: &str,
    ) -> Result<bool, GatewayError> {
        let p = partition_or_zero(partition);
        self.broker
            .produce(topic, p, payload, key)
            .await
            .map_err(GatewayError::Produce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use broker_api::{BrokerError, KeywordFrom};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        QueryByOffset { topic: String, partition: i64, offset: i64 },
        Produce { topic: String, partition: i32, payload: String, key: String },
    }

    struct StubBroker {
        calls: Mutex<Vec<Call>>,
        query_reply: Result<String, BrokerError>,
        produce_reply: Result<bool, BrokerError>,
    }

    impl StubBroker {
        fn new(
            query_reply: Result<String, BrokerError>,
            produce_reply: Result<bool, BrokerError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                query_reply,
                produce_reply,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MessageBroker for StubBroker {
        fn query_by_offset(
            &self,
            topic: &str,
            partition: i64,
            offset: i64,
        ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>> {
            self.calls.lock().unwrap().push(Call::QueryByOffset {
                topic: topic.to_string(),
                partition,
                offset,
            });
            let reply = self.query_reply.clone();
            Box::pin(async move { reply })
        }

        fn query_by_keyword(
            &self,
            _topic: &str,
            _partition: i32,
            _keyword: &str,
            _keyword_from: KeywordFrom,
        ) -> Pin<Box<dyn Future<Output = Result<String, BrokerError>> + Send + '_>> {
            let reply = self.query_reply.clone();
            Box::pin(async move { reply })
        }

        fn produce(
            &self,
            topic: &str,
            partition: i32,
            payload: &str,
            key: &str,
        ) -> Pin<Box<dyn Future<Output = Result<bool, BrokerError>> + Send + '_>> {
            self.calls.lock().unwrap().push(Call::Produce {
                topic: topic.to_string(),
                partition,
                payload: payload.to_string(),
                key: key.to_string(),
            });
            let reply = self.produce_reply.clone();
            Box::pin(async move { reply })
        }
    }

    #[tokio::test]
    async fn replay_reads_then_writes_verbatim() {
        let broker = StubBroker::new(Ok(r#"{"x":1}"#.to_string()), Ok(true));
        let coord = ReplayCoordinator::new(broker.clone());

        let ok = coord.replay("orders", "3", "42", "new-key").await.unwrap();
        assert!(ok);
        assert_eq!(
            broker.calls(),
            vec![
                Call::QueryByOffset {
                    topic: "orders".into(),
                    partition: 3,
                    offset: 42,
                },
                Call::Produce {
                    topic: "orders".into(),
                    partition: 3,
                    payload: r#"{"x":1}"#.into(),
                    key: "new-key".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn replay_failed_read_never_writes() {
        let broker = StubBroker::new(Err(BrokerError::io("connection reset")), Ok(true));
        let coord = ReplayCoordinator::new(broker.clone());

        let err = coord.replay("orders", "3", "42", "k").await.unwrap_err();
        assert!(matches!(err, GatewayError::Query(_)));
        assert_eq!(err.to_string(), "query: connection reset");
        // Read-safe: no produce call happened.
        assert_eq!(broker.calls().len(), 1);
    }

    #[tokio::test]
    async fn replay_negative_ack_is_not_an_error() {
        let broker = StubBroker::new(Ok("{}".to_string()), Ok(false));
        let coord = ReplayCoordinator::new(broker.clone());

        let ok = coord.replay("orders", "0", "7", "k").await.unwrap();
        assert!(!ok);
        assert_eq!(broker.calls().len(), 2);
    }

    #[tokio::test]
    async fn replay_failed_write_is_annotated() {
        let broker = StubBroker::new(Ok("{}".to_string()), Err(BrokerError::remote("full")));
        let coord = ReplayCoordinator::new(broker.clone());

        let err = coord.replay("orders", "1", "2", "k").await.unwrap_err();
        assert!(matches!(err, GatewayError::Produce(_)));
        assert_eq!(err.to_string(), "produce: full");
    }

    #[tokio::test]
    async fn replay_rejects_non_numeric_parameters_before_any_call() {
        let broker = StubBroker::new(Ok("{}".to_string()), Ok(true));
        let coord = ReplayCoordinator::new(broker.clone());

        let err = coord.replay("orders", "abc", "42", "k").await.unwrap_err();
        assert!(err.is_parameter());
        let err = coord.replay("orders", "3", "4.5", "k").await.unwrap_err();
        assert!(err.is_parameter());
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn query_by_offset_parses_strictly() {
        let broker = StubBroker::new(Ok(r#"{"a":2}"#.to_string()), Ok(true));
        let coord = ReplayCoordinator::new(broker.clone());

        let payload = coord.query_by_offset("t", "0", "10").await.unwrap();
        assert_eq!(payload, r#"{"a":2}"#);

        let err = coord.query_by_offset("t", "0", "ten").await.unwrap_err();
        assert!(err.is_parameter());
    }

    #[tokio::test]
    async fn produce_degrades_bad_partition_to_zero() {
        let broker = StubBroker::new(Ok(String::new()), Ok(true));
        let coord = ReplayCoordinator::new(broker.clone());

        let ok = coord.produce("t", "abc", "{}", "k").await.unwrap();
        assert!(ok);
        assert_eq!(
            broker.calls(),
            vec![Call::Produce {
                topic: "t".into(),
                partition: 0,
                payload: "{}".into(),
                key: "k".into(),
            }]
        );
    }

    #[test]
    fn partition_or_zero_coercion() {
        assert_eq!(partition_or_zero("7"), 7);
        assert_eq!(partition_or_zero(""), 0);
        assert_eq!(partition_or_zero("abc"), 0);
        assert_eq!(partition_or_zero("-1"), -1);
    }
}
