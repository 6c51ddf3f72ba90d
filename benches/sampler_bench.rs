use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use hoststream::system::Sampler;
use hoststream::system::identity::{clean_name, pick_network_adapter};
use hoststream::system::platform::{CpuTimes, FixtureProbe, InterfaceCounters};
use hoststream::wire;

fn make_probe(interfaces: usize) -> FixtureProbe {
    let mut probe = FixtureProbe::laptop().with_cpu((0..1_000_000u64).map(|t| CpuTimes {
        idle: t * 7,
        kernel: t * 10,
        user: t * 3,
    }));
    probe.interfaces = Some(
        (0..interfaces)
            .map(|i| InterfaceCounters {
                name: format!("if{i}"),
                received: i as u64 * 1_000,
                sent: i as u64 * 100,
                up: i % 3 != 0,
            })
            .collect(),
    );
    probe
}

fn bench_sample_and_encode(c: &mut Criterion) {
    let mut sampler = Sampler::new(make_probe(32), "/");
    sampler.warm_up();
    let mut line = Vec::with_capacity(512);

    c.bench_function("sample_and_encode", |b| {
        b.iter(|| {
            let snapshot = sampler.sample();
            line.clear();
            wire::write_record(&mut line, black_box(&snapshot)).unwrap();
            black_box(line.len())
        })
    });
}

fn bench_identity_cleaning(c: &mut Criterion) {
    let adapters: Vec<String> = [
        "WAN Miniport (IKEv2)",
        "WAN Miniport (SSTP)",
        "Microsoft Kernel Debug Network Adapter",
        "Hyper-V Virtual Ethernet Adapter",
        "Bluetooth Device (Personal Area Network)",
        "Intel(R) Wi-Fi 6 AX201 160MHz Gigabit Ethernet Controller",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    c.bench_function("clean_name", |b| {
        b.iter(|| clean_name(black_box("NVIDIA GeForce RTX 3060 Laptop GPU DCH Driver")))
    });
    c.bench_function("pick_network_adapter", |b| {
        b.iter(|| pick_network_adapter(black_box(&adapters)))
    });
}

criterion_group!(benches, bench_sample_and_encode, bench_identity_cleaning);
criterion_main!(benches);
