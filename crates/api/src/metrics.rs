use normalizer::EventKind;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

static WEBHOOK_DELIVERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "webhook_deliveries_total",
        "Webhook deliveries received, by event type and outcome",
        &["event_type", "outcome"]
    )
    .expect("webhook_deliveries counter")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Stored,
    Ignored,
    Error,
}

impl DeliveryOutcome {
    fn as_str(self) -> &'static str {
        match self {
            DeliveryOutcome::Stored => "stored",
            DeliveryOutcome::Ignored => "ignored",
            DeliveryOutcome::Error => "error",
        }
    }
}

/// Event types outside the handled set share the `other` label.
pub fn record_delivery(event_type: &str, outcome: DeliveryOutcome) {
    let kind = EventKind::from_header(event_type).map_or("other", EventKind::as_str);
    WEBHOOK_DELIVERIES
        .with_label_values(&[kind, outcome.as_str()])
        .inc();
}

/// Text exposition of the default registry, with its content type.
pub fn render() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}
