use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub locate_requests_total: IntCounterVec,
    pub order_validations_total: IntCounterVec,
    pub locate_latency_seconds: HistogramVec,
    pub outlets_registered: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let locate_requests_total = IntCounterVec::new(
            Opts::new("locate_requests_total", "Total locate requests by kind"),
            &["kind"],
        )
        .expect("valid locate_requests_total metric");

        let order_validations_total = IntCounterVec::new(
            Opts::new(
                "order_validations_total",
                "Order location validations by outcome",
            ),
            &["outcome"],
        )
        .expect("valid order_validations_total metric");

        let locate_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "locate_latency_seconds",
                "Latency of ranking and validation in seconds",
            ),
            &["kind"],
        )
        .expect("valid locate_latency_seconds metric");

        let outlets_registered =
            IntGauge::new("outlets_registered", "Outlets currently in the directory")
                .expect("valid outlets_registered metric");

        registry
            .register(Box::new(locate_requests_total.clone()))
            .expect("register locate_requests_total");
        registry
            .register(Box::new(order_validations_total.clone()))
            .expect("register order_validations_total");
        registry
            .register(Box::new(locate_latency_seconds.clone()))
            .expect("register locate_latency_seconds");
        registry
            .register(Box::new(outlets_registered.clone()))
            .expect("register outlets_registered");

        Self {
            registry,
            locate_requests_total,
            order_validations_total,
            locate_latency_seconds,
            outlets_registered,
        }
    }

    pub fn observe_locate(&self, kind: &str, elapsed_seconds: f64) {
        self.locate_requests_total.with_label_values(&[kind]).inc();
        self.locate_latency_seconds
            .with_label_values(&[kind])
            .observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
