// Copyright 2024 Ulvetanna Inc.

use std::iter::repeat_with;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::thread_rng;
use wizard_field::{Field, KoalaBear};
use wizard_ntt::{SingleThreadedNTT, NTT};

fn bench_forward_transform(c: &mut Criterion) {
	let mut group = c.benchmark_group("forward_transform");
	for log_n in [12, 16, 20] {
		let mut rng = thread_rng();
		let mut data = repeat_with(|| KoalaBear::random(&mut rng))
			.take(1 << log_n)
			.collect::<Vec<_>>();
		group.throughput(Throughput::Elements(1 << log_n));

		let single_threaded = SingleThreadedNTT::<KoalaBear>::new(log_n).unwrap();
		let precomputed = single_threaded.precompute_twiddles();
		let multithreaded = precomputed.clone().multithreaded();

		group.bench_function(BenchmarkId::new("on-the-fly", log_n), |b| {
			b.iter(|| single_threaded.forward_transform(&mut data))
		});
		group.bench_function(BenchmarkId::new("precompute", log_n), |b| {
			b.iter(|| precomputed.forward_transform(&mut data))
		});
		group.bench_function(BenchmarkId::new("multithreaded", log_n), |b| {
			b.iter(|| multithreaded.forward_transform(&mut data))
		});
	}
	group.finish();
}

criterion_group!(ntt, bench_forward_transform);
criterion_main!(ntt);
