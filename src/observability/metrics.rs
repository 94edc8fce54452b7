use prometheus::{
    Encoder, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub commissions_total: IntCounterVec,
    pub trips_in_queue: IntGauge,
    pub commission_latency_seconds: HistogramVec,
    pub commission_amount: Histogram,
    pub vehicle_idle_penalty: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let commissions_total = IntCounterVec::new(
            Opts::new("commissions_total", "Total commission computations by outcome"),
            &["outcome"],
        )
        .expect("valid commissions_total metric");

        let trips_in_queue = IntGauge::new("trips_in_queue", "Trips waiting to be scored")
            .expect("valid trips_in_queue metric");

        let commission_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "commission_latency_seconds",
                "Latency of commission scoring in seconds",
            ),
            &["outcome"],
        )
        .expect("valid commission_latency_seconds metric");

        let commission_amount = Histogram::with_opts(
            HistogramOpts::new("commission_amount", "Commission paid per trip").buckets(vec![
                150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0,
            ]),
        )
        .expect("valid commission_amount metric");

        let vehicle_idle_penalty = GaugeVec::new(
            Opts::new(
                "vehicle_idle_penalty",
                "Idle penalty applied to the vehicle's latest scored trip [0..1]",
            ),
            &["vehicle"],
        )
        .expect("valid vehicle_idle_penalty metric");

        registry
            .register(Box::new(commissions_total.clone()))
            .expect("register commissions_total");
        registry
            .register(Box::new(trips_in_queue.clone()))
            .expect("register trips_in_queue");
        registry
            .register(Box::new(commission_latency_seconds.clone()))
            .expect("register commission_latency_seconds");
        registry
            .register(Box::new(commission_amount.clone()))
            .expect("register commission_amount");
        registry
            .register(Box::new(vehicle_idle_penalty.clone()))
            .expect("register vehicle_idle_penalty");

        Self {
            registry,
            commissions_total,
            trips_in_queue,
            commission_latency_seconds,
            commission_amount,
            vehicle_idle_penalty,
        }
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
