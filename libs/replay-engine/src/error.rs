use broker_api::BrokerError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed numeric input. Raised before any broker call.
    #[error("invalid {field}: '{value}'")]
    Parameter { field: &'static str, value: String },

    /// Query stage failed; no write was attempted.
    #[error("query: {0}")]
    Query(#[source] BrokerError),

    /// Produce stage failed; the preceding read is not rolled back.
    #[error("produce: {0}")]
    Produce(#[source] BrokerError),
}

impl GatewayError {
    pub fn parameter(field: &'static str, value: impl Into<String>) -> Self {
        GatewayError::Parameter { field, value: value.into() }
    }

    /// True for errors the HTTP adapter maps to a client fault (400).
    pub fn is_parameter(&self) -> bool {
        matches!(self, GatewayError::Parameter { .. })
    }
}
