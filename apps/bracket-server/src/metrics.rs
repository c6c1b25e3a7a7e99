use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static GENERATION_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "bracket_generation_requests_total",
            "bracket generation requests by result",
        ),
        &["result"],
    )
    .expect("valid generation request metric");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub static ARTIFACT_PUBLICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "bracket_artifact_publications_total",
            "artifact publications by mode",
        ),
        &["mode"],
    )
    .expect("valid artifact publication metric");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub fn gather() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %err, "metrics encode error");
    }
    buffer
}
