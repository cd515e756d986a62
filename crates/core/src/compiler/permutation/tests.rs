// Copyright 2024-2025 Irreducible Inc.

use std::collections::BTreeMap;

use assert_matches::assert_matches;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use wizard_field::{Field, KoalaBear};

use super::*;
use crate::{
	column::{ColumnId, ColumnStatus},
	protocol::{compile, prove, verify, CompiledProtocol},
	query::{GrandProductInput, QueryParams},
};

type F = KoalaBear;

fn values(raw: impl IntoIterator<Item = u32>) -> Vec<F> {
	raw.into_iter().map(F::new).collect()
}

fn column(compiled: &CompiledProtocol<F>, name: &str) -> ColumnId {
	compiled.registry().column_by_name(name).unwrap()
}

/// Compiles a protocol whose round-zero columns are all committed and listed in `columns`.
fn compile_with(
	columns: &[(&'static str, usize)],
	declare: impl FnOnce(&mut Registry<F>, &[ColumnId]) -> Result<(), Error>,
) -> CompiledProtocol<F> {
	compile(
		|registry: &mut Registry<F>| {
			let ids = columns
				.iter()
				.map(|&(name, size)| registry.add_column(name).committed(0, size))
				.collect::<Result<Vec<_>, _>>()?;
			declare(registry, &ids)
		},
		&[&PermutationCompiler::default()],
	)
	.unwrap()
}

fn prove_and_verify(
	compiled: &CompiledProtocol<F>,
	assignment: Vec<(&str, Vec<F>)>,
) -> Result<(), Error> {
	let ids = assignment
		.iter()
		.map(|(name, _)| column(compiled, name))
		.collect::<Vec<_>>();
	let proof = prove(compiled, |run| {
		for (id, (_, values)) in ids.into_iter().zip(assignment) {
			run.assign_column(id, values)?;
		}
		Ok(())
	})?;
	verify(compiled, &proof)
}

#[test]
fn test_single_column_permutation() {
	let compiled = compile_with(&[("A", 8), ("B", 8)], |registry, ids| {
		registry.add_permutation("PERM", 0, vec![vec![ids[0].into()]], vec![vec![ids[1].into()]])?;
		Ok(())
	});

	let registry = compiled.registry();
	assert!(registry.coin_by_name("PERM_PERM_ALPHA").is_none());
	let gamma = registry.coin_by_name("PERM_PERM_GAMMA").unwrap();
	assert_eq!(registry.coin(gamma).round(), 1);
	let z = registry.column_by_name("PERM_Z_8_0").unwrap();
	assert_eq!(registry.column(z).round(), 1);
	assert_eq!(registry.column(z).status(), ColumnStatus::Proof);
	assert!(registry.query_by_name("PERM_Z_GLOBAL_8_0").is_some());
	assert!(registry.query_by_name("PERM_Z_LOCAL_8_0").is_some());
	assert!(registry.query_by_name("PERM_Z_OPENING_8_0").is_some());

	prove_and_verify(
		&compiled,
		vec![("A", values(1..=8)), ("B", values((1..=8).rev()))],
	)
	.unwrap();
}

#[test]
fn test_two_column_permutation() {
	let compiled = compile_with(&[("A0", 4), ("A1", 4), ("B0", 4), ("B1", 4)], |registry, ids| {
		registry.add_permutation(
			"PERM",
			0,
			vec![vec![ids[0].into(), ids[1].into()]],
			vec![vec![ids[2].into(), ids[3].into()]],
		)?;
		Ok(())
	});
	assert!(compiled
		.registry()
		.coin_by_name("PERM_PERM_ALPHA")
		.is_some());

	prove_and_verify(
		&compiled,
		vec![
			("A0", values([1, 2, 3, 4])),
			("A1", values([5, 6, 7, 8])),
			("B0", values([3, 1, 4, 2])),
			("B1", values([7, 5, 8, 6])),
		],
	)
	.unwrap();

	// the columns are permutations on their own, but the rows are not
	let result = prove_and_verify(
		&compiled,
		vec![
			("A0", values([1, 2, 3, 4])),
			("A1", values([5, 6, 7, 8])),
			("B0", values([3, 1, 4, 2])),
			("B1", values([5, 7, 8, 6])),
		],
	);
	assert_matches!(
		result,
		Err(Error::Verification(VerificationError::GrandProductMismatch { query, .. })) if query == "PERM"
	);
}

#[test]
fn test_multiple_queries_and_fragments() {
	let compiled = compile_with(
		&[("A", 8), ("B", 8), ("C", 8), ("D", 8), ("E", 8)],
		|registry, ids| {
			registry.add_permutation("P1", 0, vec![vec![ids[0].into()]], vec![vec![ids[1].into()]])?;
			// A and C together hold the rows of B and D
			registry.add_permutation(
				"P2",
				0,
				vec![vec![ids[0].into()], vec![ids[2].into()]],
				vec![vec![ids[1].into()], vec![ids[3].into()]],
			)?;
			registry.add_permutation("P3", 0, vec![vec![ids[2].into()]], vec![vec![ids[4].into()]])?;
			Ok(())
		},
	);

	let mut rng = StdRng::seed_from_u64(0);
	let a = values(0..8);
	let mut b = a.clone();
	b.shuffle(&mut rng);
	let c = values(100..108);
	let mut d = c.clone();
	d.shuffle(&mut rng);
	let mut e = c.clone();
	e.shuffle(&mut rng);

	prove_and_verify(
		&compiled,
		vec![("A", a), ("B", b), ("C", c), ("D", d), ("E", e)],
	)
	.unwrap();
}

#[test]
fn test_mixed_sizes() {
	let compiled = compile_with(&[("A4", 4), ("A8", 8), ("B4", 4), ("B8", 8)], |registry, ids| {
		registry.add_permutation(
			"PERM",
			0,
			vec![vec![ids[0].into()], vec![ids[1].into()]],
			vec![vec![ids[2].into()], vec![ids[3].into()]],
		)?;
		Ok(())
	});
	let registry = compiled.registry();
	assert!(registry.column_by_name("PERM_Z_4_0").is_some());
	assert!(registry.column_by_name("PERM_Z_8_0").is_some());

	// neither size holds a permutation on its own
	prove_and_verify(
		&compiled,
		vec![
			("A4", values(1..=4)),
			("A8", values(5..=12)),
			("B4", values(9..=12)),
			("B8", values(1..=8)),
		],
	)
	.unwrap();
}

#[test]
fn test_tampered_permutation() {
	let compiled = compile_with(&[("A", 8), ("B", 8)], |registry, ids| {
		registry.add_permutation("PERM", 0, vec![vec![ids[0].into()]], vec![vec![ids[1].into()]])?;
		Ok(())
	});

	let mut b = values((1..=8).rev());
	b[3] += F::ONE;
	let result = prove_and_verify(&compiled, vec![("A", values(1..=8)), ("B", b)]);
	assert_matches!(
		result,
		Err(Error::Verification(VerificationError::GrandProductMismatch { .. }))
	);
}

#[test]
fn test_factors_spill_into_extra_z_columns() {
	let names = [("A0", 4), ("A1", 4), ("A2", 4), ("A3", 4), ("B", 4)];
	let compiled = compile_with(&names, |registry, ids| {
		registry.add_permutation(
			"PERM",
			0,
			ids[..4].iter().map(|&id| vec![id.into()]).collect(),
			vec![vec![ids[4].into()]],
		)?;
		Ok(())
	});
	let registry = compiled.registry();
	assert!(registry.column_by_name("PERM_Z_4_0").is_some());
	assert!(registry.column_by_name("PERM_Z_4_1").is_some());
	assert!(registry.column_by_name("PERM_Z_4_2").is_none());

	let result = prove_and_verify(
		&compiled,
		vec![
			("A0", values(1..=4)),
			("A1", values(5..=8)),
			("A2", values(9..=12)),
			("A3", values(13..=16)),
			("B", values(1..=4)),
		],
	);
	// four tables on one side, one on the other
	assert_matches!(
		result,
		Err(Error::Verification(VerificationError::GrandProductMismatch { .. }))
	);
}

fn grand_product_protocol() -> CompiledProtocol<F> {
	compile_with(&[("NUM", 4), ("DEN", 4), ("EXTRA", 8)], |registry, ids| {
		let inputs = BTreeMap::from([
			(
				4,
				GrandProductInput {
					numerators: vec![Expression::column(ids[0])],
					denominators: vec![Expression::column(ids[1])],
				},
			),
			(
				8,
				GrandProductInput {
					numerators: vec![Expression::column(ids[2]) + Expression::one()],
					denominators: vec![],
				},
			),
		]);
		registry.add_grand_product("GP", 0, inputs)?;
		Ok(())
	})
}

fn assign_grand_product_inputs(run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
	let registry = run.registry();
	let num = registry.column_by_name("NUM").unwrap();
	let den = registry.column_by_name("DEN").unwrap();
	let extra = registry.column_by_name("EXTRA").unwrap();
	run.assign_column(num, values([2, 3, 4, 5]))?;
	run.assign_column(den, values([1, 1, 2, 3]))?;
	run.assign_column(extra, values([1, 0, 0, 0, 0, 0, 0, 0]))
}

#[test]
fn test_grand_product_residual() {
	let compiled = grand_product_protocol();
	let gp = compiled.registry().query_by_name("GP").unwrap();

	// (2·3·4·5)/(1·1·2·3) · (1+1)·1^7 = 40
	let proof = prove(&compiled, assign_grand_product_inputs).unwrap();
	let claimed = proof
		.params
		.iter()
		.find(|(id, _)| *id == gp)
		.map(|(_, params)| params.clone());
	assert_eq!(claimed, Some(QueryParams::GrandProduct { y: F::new(40) }));
	verify(&compiled, &proof).unwrap();

	let proof = prove(&compiled, |run| {
		assign_grand_product_inputs(run)?;
		run.assign_grand_product(gp, F::new(41))
	})
	.unwrap();
	assert_matches!(
		verify(&compiled, &proof),
		Err(Error::Verification(VerificationError::GrandProductMismatch { computed, expected, .. }))
			if computed == "40" && expected == "41"
	);
}

#[test]
fn test_zero_denominator_is_reported() {
	let compiled = grand_product_protocol();
	let num = column(&compiled, "NUM");
	let den = column(&compiled, "DEN");
	let extra = column(&compiled, "EXTRA");

	let result = prove(&compiled, |run| {
		run.assign_column(num, values([2, 3, 4, 5]))?;
		run.assign_column(den, values([1, 1, 0, 3]))?;
		run.assign_column(extra, values([0; 8]))
	});
	assert_matches!(result, Err(Error::ZeroDenominator { row: 2, .. }));
}

#[test]
fn test_zero_arity_is_rejected() {
	let result = compile(
		|registry: &mut Registry<F>| {
			let a = registry.add_column("A").committed(0, 4)?;
			registry.add_permutation("PERM", 0, vec![vec![a.into()]], vec![vec![a.into()]])?;
			Ok(())
		},
		&[&PermutationCompiler { arity: 0 }],
	);
	assert_matches!(result, Err(Error::Compilation { .. }));
}
