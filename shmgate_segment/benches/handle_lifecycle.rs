//! Lifecycle benchmarks on the simulated backend

use criterion::{Criterion, criterion_group, criterion_main};
use shmgate_segment::{CreateFlags, IPC_PRIVATE, Mode, SegmentHandle, SegmentRegistry, SimulatedBridge};
use std::hint::black_box;
use std::sync::Arc;

fn mode() -> Mode {
    Mode::from_bits_truncate(0o600)
}

/// Benchmark attach/detach cycles on one segment
fn bench_attach_detach(c: &mut Criterion) {
    let mut handle = SegmentHandle::new(Arc::new(SimulatedBridge::new()));
    handle.create(IPC_PRIVATE, 65536, CreateFlags::CREATE, mode()).unwrap();

    c.bench_function("attach_detach", |b| {
        b.iter(|| {
            black_box(handle.attach().unwrap());
            handle.detach().unwrap();
        });
    });
}

/// Benchmark writes and truncating reads for different sizes
fn bench_write_read(c: &mut Criterion) {
    let mut handle = SegmentHandle::new(Arc::new(SimulatedBridge::new()));
    handle.create(IPC_PRIVATE, 65536, CreateFlags::CREATE, mode()).unwrap();
    handle.attach().unwrap();

    for size in [64usize, 1024, 4096] {
        let data = vec![0xAAu8; size];
        c.bench_function(&format!("write_{size}_bytes"), |b| {
            b.iter(|| handle.write_data(black_box(&data)).unwrap());
        });
        c.bench_function(&format!("read_{size}_bytes"), |b| {
            b.iter(|| black_box(handle.read_data(size).unwrap()));
        });
    }
}

/// Benchmark the full request path: resolve, attach, write, detach
fn bench_registry_request(c: &mut Criterion) {
    let registry = SegmentRegistry::new(Arc::new(SimulatedBridge::new()));
    let id = registry.create(5678, 4096, CreateFlags::CREATE, mode()).unwrap();

    c.bench_function("registry_write_request", |b| {
        b.iter(|| {
            registry
                .with_segment(5678, id, |h| h.with_attachment(|h| h.write_text("payload")))
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_attach_detach,
    bench_write_read,
    bench_registry_request
);
criterion_main!(benches);
