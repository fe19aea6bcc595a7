//! # BLS Node Subsystem Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | bn-01 BLS Engine | Aggregate 64 shares with subgroup checks | < 50ms |
//! | bn-01 BLS Engine | EIP-2537 encode/decode | < 100µs |
//! | bn-02 Gossip | Handle one envelope (merge + forward) | < 50µs |

use std::sync::Arc;
use std::time::Duration;

use bn_01_bls_engine::{
    aggregate, decode_g1, decode_g2, encode_g1, encode_g2, sign, verify, BlsSecretKey,
    NodeIdentity, SignatureShare,
};
use bn_02_gossip_membership::test_utils::ControllableTimeSource;
use bn_02_gossip_membership::{
    GossipApi, GossipConfig, GossipEnvelope, GossipMessage, GossipPayload, GossipService,
    InMemoryTransport, MessageType,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::NodeId;

const MESSAGE: &[u8] = b"Hello World";

// ============================================================================
// BN-01: BLS Engine
// ============================================================================

fn shares(count: usize) -> Vec<SignatureShare> {
    (0..count)
        .map(|_| {
            let identity = NodeIdentity::generate();
            let signature = sign(MESSAGE, identity.secret());
            SignatureShare::new(identity.node_id(), &signature, identity.public_key())
        })
        .collect()
}

fn bench_bls_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bn-01-aggregation");
    group.measurement_time(Duration::from_secs(10));

    for size in [4, 16, 64, 256] {
        let input = shares(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", size), &input, |b, input| {
            b.iter(|| black_box(aggregate(input).is_ok()))
        });
    }

    let result = aggregate(&shares(16)).expect("valid shares");
    group.bench_function("verify_aggregate_16", |b| {
        b.iter(|| {
            black_box(verify(
                MESSAGE,
                &result.aggregate_signature,
                &result.aggregate_public_key,
            ))
        })
    });

    group.finish();
}

fn bench_eip2537_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("bn-01-codec");

    let secret = BlsSecretKey::generate();
    let identity = NodeIdentity::generate();
    let signature = sign(MESSAGE, &secret);
    let g1 = encode_g1(identity.public_key());
    let g2 = encode_g2(&signature);

    group.bench_function("encode_g1", |b| b.iter(|| black_box(encode_g1(identity.public_key()))));
    group.bench_function("encode_g2", |b| b.iter(|| black_box(encode_g2(&signature))));
    group.bench_function("decode_g1", |b| b.iter(|| black_box(decode_g1(&g1).is_ok())));
    group.bench_function("decode_g2", |b| b.iter(|| black_box(decode_g2(&g2).is_ok())));

    group.finish();
}

// ============================================================================
// BN-02: Gossip Membership
// ============================================================================

fn peer(index: u32) -> NodeId {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&index.to_be_bytes());
    NodeId::new(bytes)
}

fn envelope(
    origin: NodeId,
    subject: NodeId,
    message_type: MessageType,
    incarnation: u64,
    ttl: u32,
    sequence: u64,
) -> GossipEnvelope {
    let payload = GossipPayload {
        subject,
        url: format!("mem://{}", subject.short()),
        snapshot: Vec::new(),
    };
    let message = GossipMessage::new(origin, sequence, message_type, incarnation, ttl, payload);
    GossipEnvelope::new(origin, message)
}

fn bench_gossip_receive(c: &mut Criterion) {
    let mut group = c.benchmark_group("bn-02-gossip");

    let clock = ControllableTimeSource::new(1_000);
    let config = GossipConfig {
        max_peers: 1_024,
        max_message_history: 10_000,
        ..GossipConfig::default()
    };
    let transport = Arc::new(InMemoryTransport::new());
    let service = GossipService::new(
        peer(0),
        "mem://bench".into(),
        config,
        Arc::clone(&transport),
        Box::new(clock.clone()),
    )
    .expect("valid config");

    for i in 1..=64 {
        service.on_envelope(envelope(peer(i), peer(i), MessageType::Heartbeat, 0, 0, 0));
    }

    let mut sequence = 1u64;
    group.bench_function("on_envelope_heartbeat", |b| {
        b.iter(|| {
            sequence += 1;
            let subject = peer(1 + (sequence % 64) as u32);
            let outcome = service.on_envelope(envelope(
                subject,
                subject,
                MessageType::Heartbeat,
                0,
                3,
                sequence,
            ));
            transport.take_sent();
            black_box(outcome)
        })
    });

    group.bench_function("envelope_encode_decode", |b| {
        let suspect = envelope(peer(3), peer(7), MessageType::Suspect, 4, 3, 9);
        b.iter(|| {
            let bytes = suspect.encode().expect("encodable");
            black_box(GossipEnvelope::decode(&bytes).is_ok())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bls_aggregation,
    bench_eip2537_codec,
    bench_gossip_receive,
);

criterion_main!(benches);
