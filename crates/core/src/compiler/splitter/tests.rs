// Copyright 2024-2025 Irreducible Inc.

use assert_matches::assert_matches;
use proptest::prelude::*;
use wizard_field::{Field, KoalaBear};

use super::*;
use crate::protocol::{compile, prove, verify, CompiledProtocol};

type F = KoalaBear;

const N: usize = 64;

fn fibonacci(n: usize) -> Vec<F> {
	let mut values = vec![F::ONE, F::ONE];
	while values.len() < n {
		let next = values[values.len() - 1] + values[values.len() - 2];
		values.push(next);
	}
	values
}

fn compile_fibonacci(shard_size: usize) -> CompiledProtocol<F> {
	compile(
		|registry: &mut Registry<F>| {
			let p = Column::from(registry.add_column("P").committed(0, N)?);
			let expr = Expression::column(p)
				- Expression::column(p.shifted(-1))
				- Expression::column(p.shifted(-2));
			registry.add_global_constraint("FIB", 0, expr)?;
			Ok(())
		},
		&[&Splitter { shard_size }],
	)
	.unwrap()
}

fn prove_and_verify_column(
	compiled: &CompiledProtocol<F>,
	name: &str,
	values: Vec<F>,
) -> Result<(), Error> {
	let id = compiled.registry().column_by_name(name).unwrap();
	let proof = prove(compiled, |run| run.assign_column(id, values))?;
	verify(compiled, &proof)
}

fn count_queries(compiled: &CompiledProtocol<F>, prefix: &str) -> usize {
	compiled
		.registry()
		.queries()
		.iter()
		.filter(|query| query.name().starts_with(prefix))
		.count()
}

#[test]
fn test_fibonacci_boundaries() {
	for shard_size in [4, 8, 16] {
		let compiled = compile_fibonacci(shard_size);
		let n_shards = N / shard_size;

		assert_eq!(count_queries(&compiled, "FIB_SPLIT_BOUNDARY_"), (n_shards - 1) * 2);
		let registry = compiled.registry();
		for slot in 0..n_shards {
			assert!(registry
				.query_by_name(&format!("FIB_SPLIT_{slot}_OVER_{n_shards}"))
				.is_some());
		}
		// rows 0 and 1 are not constrained by the original query
		assert!(registry.query_by_name("FIB_SPLIT_BOUNDARY_0").is_none());
		assert!(registry.query_by_name("FIB_SPLIT_BOUNDARY_1").is_none());
		assert!(registry
			.query_by_name(&format!("FIB_SPLIT_BOUNDARY_{}", shard_size + 1))
			.is_some());

		let parent = registry.column_by_name("P").unwrap();
		assert_eq!(registry.column(parent).status(), ColumnStatus::Ignored);
		let shard = registry
			.column_by_name(&format!("P_SUBSLICE_0_OVER_{n_shards}"))
			.unwrap();
		assert_eq!(registry.column(shard).size(), shard_size);

		prove_and_verify_column(&compiled, "P", fibonacci(N)).unwrap();
	}
}

#[test]
fn test_fibonacci_boundary_tamper() {
	let compiled = compile_fibonacci(4);
	let mut values = fibonacci(N);
	// follows the recurrence inside the second shard, only the pinned rows see the change
	values[4] += F::ONE;
	values[5] += F::ONE;
	values[6] += F::ONE + F::ONE;
	values[7] += F::new(3);
	let result = prove_and_verify_column(&compiled, "P", values);
	assert_matches!(result, Err(Error::Verification(_)));
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	#[test]
	fn test_any_tampered_row_is_caught(row in 0..N, log_shard in 2usize..5, delta in 1u32..1000) {
		let compiled = compile_fibonacci(1 << log_shard);
		let mut values = fibonacci(N);
		values[row] += F::new(delta);
		let result = prove_and_verify_column(&compiled, "P", values);
		prop_assert!(matches!(result, Err(Error::Verification(_))));
	}
}

#[test]
fn test_small_columns_are_published() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let small = registry.add_column("SMALL").committed(0, 2)?;
			let fixed = registry
				.add_column("FIXED")
				.precomputed(vec![F::new(5), F::new(6)])?;
			let big = registry
				.add_column("BIG")
				.precomputed((0..8).map(F::new).collect())?;
			registry.add_global_constraint(
				"SMALL_EQ_FIXED",
				0,
				Expression::column(small) - Expression::column(fixed),
			)?;
			registry.add_local_constraint("BIG_STARTS_AT_0", 0, Expression::column(big))?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	let status = |name: &str| registry.column(registry.column_by_name(name).unwrap()).status();
	assert_eq!(status("SMALL"), ColumnStatus::Proof);
	assert_eq!(status("FIXED"), ColumnStatus::VerifyingKey);
	assert_eq!(status("BIG"), ColumnStatus::Ignored);
	assert_eq!(status("BIG_SUBSLICE_1_OVER_2"), ColumnStatus::VerifyingKey);
	let shard = registry.column_by_name("BIG_SUBSLICE_1_OVER_2").unwrap();
	assert_eq!(
		registry.column(shard).values().as_deref(),
		Some([4, 5, 6, 7].map(F::new).as_slice())
	);
	// the small constraint is left for the direct check
	assert!(registry.query_by_name("SMALL_EQ_FIXED_SPLIT_0_OVER_1").is_none());
	assert!(registry.query_by_name("BIG_STARTS_AT_0_SPLIT").is_some());

	prove_and_verify_column(&compiled, "SMALL", vec![F::new(5), F::new(6)]).unwrap();
}

#[test]
fn test_local_constraint_on_shifted_column() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = Column::from(registry.add_column("P").committed(0, 16)?);
			// row 13 of P holds 42
			registry.add_local_constraint(
				"P_13",
				0,
				Expression::column(p.shifted(13)) - Expression::constant(F::new(42)),
			)?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	let split = registry.query_by_name("P_13_SPLIT").unwrap();
	let shard = registry.column_by_name("P_SUBSLICE_3_OVER_4").unwrap();
	let Query::LocalConstraint(constraint) = registry.query(split).query() else {
		panic!("expected a local constraint");
	};
	assert_eq!(constraint.expr.columns().collect::<Vec<_>>(), vec![Column::new(shard, 1)]);
	assert_eq!(constraint.domain_size, 4);

	let mut values = vec![F::ZERO; 16];
	values[13] = F::new(42);
	prove_and_verify_column(&compiled, "P", values.clone()).unwrap();
	values[13] = F::new(43);
	assert_matches!(
		prove_and_verify_column(&compiled, "P", values),
		Err(Error::Verification(VerificationError::LocalConstraintViolated { query })) if query == "P_13_SPLIT"
	);
}

#[test]
fn test_local_opening_moves_to_shard() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = registry.add_column("P").committed(0, 16)?;
			registry.local_opening_at("P_AT_9", 0, p, 9)?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	let p = registry.column_by_name("P").unwrap();
	let opening = registry.query_by_name("P_AT_9").unwrap();
	let split = registry.query_by_name("P_AT_9_SPLIT").unwrap();
	let shard = registry.column_by_name("P_SUBSLICE_2_OVER_4").unwrap();
	assert_matches!(
		registry.query(split).query(),
		Query::LocalOpening(LocalOpening { column }) if *column == Column::new(shard, 1)
	);

	let values = (100..116).map(F::new).collect::<Vec<_>>();
	for (claimed, ok) in [(109, true), (110, false)] {
		let proof = prove(&compiled, |run| {
			run.assign_column(p, values.clone())?;
			run.assign_local_opening(opening, F::new(claimed))
		})
		.unwrap();
		let result = verify(&compiled, &proof);
		if ok {
			result.unwrap();
		} else {
			assert_matches!(
				result,
				Err(Error::Verification(VerificationError::OpeningMismatch { query, .. })) if query == "P_AT_9_SPLIT"
			);
		}
	}
}

#[test]
fn test_periodic_sample_per_shard() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = registry.add_column("P").committed(0, 32)?;
			// P is 7 on every row congruent to 5 mod 16
			registry.add_global_constraint(
				"PERIODIC",
				0,
				Expression::periodic_sample(16, 5) * (Expression::column(p) - Expression::constant(F::new(7))),
			)?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	let vars_of = |slot: usize| {
		let id = registry
			.query_by_name(&format!("PERIODIC_SPLIT_{slot}_OVER_8"))
			.unwrap();
		let Query::GlobalConstraint(constraint) = registry.query(id).query() else {
			panic!("expected a global constraint");
		};
		constraint.expr.vars().to_vec()
	};
	assert!(vars_of(1).contains(&Variable::PeriodicSample {
		period: 4,
		offset: 1
	}));
	assert!(vars_of(5).contains(&Variable::PeriodicSample {
		period: 4,
		offset: 1
	}));
	assert!(!vars_of(2)
		.iter()
		.any(|var| matches!(var, Variable::PeriodicSample { .. })));

	let mut values = vec![F::ZERO; 32];
	values[5] = F::new(7);
	values[21] = F::new(7);
	prove_and_verify_column(&compiled, "P", values.clone()).unwrap();
	values[21] = F::new(8);
	assert_matches!(
		prove_and_verify_column(&compiled, "P", values),
		Err(Error::Verification(VerificationError::ConstraintViolated { query, row: 1 }))
			if query == "PERIODIC_SPLIT_5_OVER_8"
	);
}

#[test]
fn test_shift_across_whole_shards() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = Column::from(registry.add_column("P").committed(0, 16)?);
			let q = registry.add_column("Q").committed(0, 16)?;
			// Q[i] = P[i - 4] for i >= 4
			registry.add_global_constraint(
				"DELAY",
				0,
				Expression::column(q) - Expression::column(p.shifted(-4)),
			)?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	// the first shard would read past the top edge and has no active row
	assert!(registry.query_by_name("DELAY_SPLIT_0_OVER_4").is_none());
	assert_eq!(count_queries(&compiled, "DELAY_SPLIT_BOUNDARY_"), 0);
	for slot in 1..4 {
		assert!(registry
			.query_by_name(&format!("DELAY_SPLIT_{slot}_OVER_4"))
			.is_some());
	}

	let p_values = (1..=16).map(F::new).collect::<Vec<_>>();
	let mut q_values = vec![F::new(99); 16];
	q_values[4..].copy_from_slice(&p_values[..12]);
	let p = registry.column_by_name("P").unwrap();
	let q = registry.column_by_name("Q").unwrap();
	let proof = prove(&compiled, |run| {
		run.assign_column(p, p_values)?;
		run.assign_column(q, q_values)
	})
	.unwrap();
	verify(&compiled, &proof).unwrap();
}

#[test]
fn test_no_bound_cancel_wraps_around() {
	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = Column::from(registry.add_column("P").committed(0, 16)?);
			let q = registry.add_column("Q").committed(0, 16)?;
			// Q is P rotated down by one row, including row zero
			registry.add_global_constraint_no_bound_cancel(
				"ROTATE",
				0,
				Expression::column(q) - Expression::column(p.shifted(-1)),
			)?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	)
	.unwrap();

	let registry = compiled.registry();
	// one pinned row per shard, row zero included
	assert_eq!(count_queries(&compiled, "ROTATE_SPLIT_BOUNDARY_"), 4);
	let pinned = registry.query_by_name("ROTATE_SPLIT_BOUNDARY_0").unwrap();
	let last_shard = registry.column_by_name("P_SUBSLICE_3_OVER_4").unwrap();
	let Query::LocalConstraint(constraint) = registry.query(pinned).query() else {
		panic!("expected a local constraint");
	};
	assert!(constraint
		.expr
		.columns()
		.any(|column| column == Column::new(last_shard, 3)));

	let p_values = (1..=16).map(F::new).collect::<Vec<_>>();
	let mut q_values = p_values.clone();
	q_values.rotate_right(1);
	let p = registry.column_by_name("P").unwrap();
	let q = registry.column_by_name("Q").unwrap();
	let proof = prove(&compiled, |run| {
		run.assign_column(p, p_values.clone())?;
		run.assign_column(q, q_values.clone())
	})
	.unwrap();
	verify(&compiled, &proof).unwrap();

	// a proof where Q misses the wrapped row fails on the pinned boundary
	let mut q_bad = q_values.clone();
	q_bad[0] = F::ZERO;
	let proof = prove(&compiled, |run| {
		run.assign_column(p, p_values)?;
		run.assign_column(q, q_bad)
	})
	.unwrap();
	assert_matches!(
		verify(&compiled, &proof),
		Err(Error::Verification(VerificationError::LocalConstraintViolated { query }))
			if query == "ROTATE_SPLIT_BOUNDARY_0"
	);
}

#[test]
fn test_rejected_inputs() {
	let result = compile(
		|registry: &mut Registry<F>| {
			registry.add_column("P").committed(0, 16)?;
			Ok(())
		},
		&[&Splitter { shard_size: 6 }],
	);
	assert_matches!(result, Err(Error::Compilation { pass: "splitter", .. }));

	let result = compile(
		|registry: &mut Registry<F>| {
			let p = registry.add_column("P").committed(0, 16)?;
			registry.add_univariate_eval("EVAL", 0, vec![p.into()])?;
			Ok(())
		},
		&[&Splitter { shard_size: 4 }],
	);
	assert_matches!(result, Err(Error::Compilation { reason, .. }) if reason.contains("EVAL"));
}

#[test]
fn test_proof_carries_shards_only() {
	let compiled = compile_fibonacci(16);
	let registry = compiled.registry();
	let parent = registry.column_by_name("P").unwrap();
	let proof = prove(&compiled, |run| run.assign_column(parent, fibonacci(N))).unwrap();

	assert_eq!(proof.columns.len(), 4);
	assert!(proof.columns.iter().all(|(id, values)| {
		*id != parent && values.len() == 16
	}));
	let last = registry.column_by_name("P_SUBSLICE_3_OVER_4").unwrap();
	let (_, values) = proof.columns.iter().find(|(id, _)| *id == last).unwrap();
	assert_eq!(values.as_slice(), &fibonacci(N)[48..]);
}
