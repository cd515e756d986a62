// Copyright 2024-2025 Irreducible Inc.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use wizard_core::{compile, prove, PermutationCompiler, Registry};
use wizard_field::{Field, KoalaBear};

type F = KoalaBear;

/// Proves that two tables of `width` columns hold the same rows.
fn bench_permutation_prover(c: &mut Criterion) {
	let mut group = c.benchmark_group("permutation_prover");
	let mut rng = StdRng::seed_from_u64(0);
	for log_n in [12, 16] {
		for width in [1, 3] {
			let compiled = compile(
				|registry: &mut Registry<F>| {
					let a = (0..width)
						.map(|k| registry.add_column(format!("A_{k}")).committed(0, 1 << log_n))
						.collect::<Result<Vec<_>, _>>()?;
					let b = (0..width)
						.map(|k| registry.add_column(format!("B_{k}")).committed(0, 1 << log_n))
						.collect::<Result<Vec<_>, _>>()?;
					registry.add_permutation(
						"PERM",
						0,
						vec![a.into_iter().map(Into::into).collect()],
						vec![b.into_iter().map(Into::into).collect()],
					)?;
					Ok(())
				},
				&[&PermutationCompiler::default()],
			)
			.unwrap();

			let a = (0..width)
				.map(|_| {
					(0..1 << log_n)
						.map(|_| F::random(&mut rng))
						.collect::<Vec<_>>()
				})
				.collect::<Vec<_>>();
			let mut order = (0..1 << log_n).collect::<Vec<usize>>();
			order.shuffle(&mut rng);
			let b = a
				.iter()
				.map(|column| order.iter().map(|&i| column[i]).collect::<Vec<_>>())
				.collect::<Vec<_>>();

			let registry = compiled.registry();
			let ids = |prefix: &str| {
				(0..width)
					.map(|k| registry.column_by_name(&format!("{prefix}_{k}")).unwrap())
					.collect::<Vec<_>>()
			};
			let (a_ids, b_ids) = (ids("A"), ids("B"));

			group.throughput(Throughput::Elements((width << log_n) as u64));
			group.bench_function(BenchmarkId::new(format!("width_{width}"), log_n), |bench| {
				bench.iter(|| {
					prove(&compiled, |run| {
						for (&id, values) in a_ids.iter().zip(&a).chain(b_ids.iter().zip(&b)) {
							run.assign_column(id, values.clone())?;
						}
						Ok(())
					})
					.unwrap()
				})
			});
		}
	}
	group.finish();
}

criterion_group!(permutation, bench_permutation_prover);
criterion_main!(permutation);
