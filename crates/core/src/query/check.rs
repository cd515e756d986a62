// Copyright 2024-2025 Irreducible Inc.

//! Direct evaluation of every query kind against the values held by a runtime.

use rayon::prelude::*;
use wizard_field::TwoAdicField;
use wizard_math::interpolate_on_roots_of_unity;

use super::{
	GlobalConstraint, GrandProduct, LocalConstraint, LocalOpening, Permutation, Query, QueryInfo,
	UnivariateEval,
};
use crate::{
	column::Column,
	error::VerificationError,
	runtime::{ExpressionEvaluator, Runtime},
};

impl<F: TwoAdicField> QueryInfo<F> {
	/// Checks the query holds for the values and parameters of `run`.
	pub fn check<R: Runtime<F> + ?Sized>(&self, run: &R) -> Result<(), VerificationError> {
		match &self.query {
			Query::GlobalConstraint(query) => self.check_global(run, query),
			Query::LocalConstraint(query) => self.check_local(run, query),
			Query::LocalOpening(query) => self.check_local_opening(run, query),
			Query::UnivariateEval(query) => self.check_univariate_eval(run, query),
			Query::Permutation(query) => self.check_permutation(run, query),
			Query::GrandProduct(query) => self.check_grand_product(run, query),
		}
	}

	fn check_global<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &GlobalConstraint<F>,
	) -> Result<(), VerificationError> {
		let n = query.domain_size;
		let (start, end) = match (query.no_bound_cancel, query.expr.shift_range()) {
			(false, Some((min, max))) => {
				let start = (-min).max(0) as usize;
				let end = n.saturating_sub(max.max(0) as usize);
				(start, end)
			}
			_ => (0, n),
		};
		if start >= end {
			return Ok(());
		}

		let evaluator = ExpressionEvaluator::new(run, &query.expr)?;
		let violation = (start..end)
			.into_par_iter()
			.map_init(Vec::new, |buf, row| (row, evaluator.evaluate_row(row, buf)))
			.find_first(|(_, value)| !value.is_zero());
		match violation {
			Some((row, _)) => Err(VerificationError::ConstraintViolated {
				query: self.name.clone(),
				row,
			}),
			None => Ok(()),
		}
	}

	fn check_local<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &LocalConstraint<F>,
	) -> Result<(), VerificationError> {
		let evaluator = ExpressionEvaluator::new(run, &query.expr)?;
		if !evaluator.evaluate_row(0, &mut Vec::new()).is_zero() {
			return Err(VerificationError::LocalConstraintViolated {
				query: self.name.clone(),
			});
		}
		Ok(())
	}

	fn check_local_opening<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &LocalOpening,
	) -> Result<(), VerificationError> {
		let claimed = run.local_opening_y(self.id)?;
		let actual = run.column_at(query.column, 0)?;
		if claimed != actual {
			return Err(VerificationError::OpeningMismatch {
				query: self.name.clone(),
				claimed: claimed.to_string(),
				actual: actual.to_string(),
			});
		}
		Ok(())
	}

	fn check_univariate_eval<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &UnivariateEval,
	) -> Result<(), VerificationError> {
		let (x, ys) = run.univariate_params(self.id)?;
		for (index, (&column, &y)) in query.columns.iter().zip(ys).enumerate() {
			let evals = run.column_view(column)?;
			if interpolate_on_roots_of_unity(&evals, x)? != y {
				return Err(VerificationError::UnivariateEvalMismatch {
					query: self.name.clone(),
					index,
				});
			}
		}
		Ok(())
	}

	fn check_permutation<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &Permutation,
	) -> Result<(), VerificationError> {
		let mut a = table_rows(run, &query.a)?;
		let mut b = table_rows(run, &query.b)?;
		a.par_sort_unstable();
		b.par_sort_unstable();
		if a != b {
			return Err(VerificationError::PermutationMismatch {
				query: self.name.clone(),
			});
		}
		Ok(())
	}

	fn check_grand_product<R: Runtime<F> + ?Sized>(
		&self,
		run: &R,
		query: &GrandProduct<F>,
	) -> Result<(), VerificationError> {
		let mut numerator = F::ONE;
		let mut denominator = F::ONE;
		for (&size, input) in &query.inputs {
			for expr in &input.numerators {
				numerator *= ExpressionEvaluator::new(run, expr)?
					.evaluate_all(size)
					.into_iter()
					.product::<F>();
			}
			for expr in &input.denominators {
				denominator *= ExpressionEvaluator::new(run, expr)?
					.evaluate_all(size)
					.into_iter()
					.product::<F>();
			}
		}

		let Some(inverse) = denominator.invert() else {
			return Err(VerificationError::ZeroDenominator {
				query: self.name.clone(),
			});
		};
		let computed = numerator * inverse;
		let expected = run.grand_product_y(self.id)?;
		if computed != expected {
			return Err(VerificationError::GrandProductMismatch {
				query: self.name.clone(),
				computed: computed.to_string(),
				expected: expected.to_string(),
			});
		}
		Ok(())
	}
}

/// Rows of every fragment of a table, as canonical integers so they can be sorted.
fn table_rows<F, R>(run: &R, fragments: &[Vec<Column>]) -> Result<Vec<Vec<u64>>, VerificationError>
where
	F: TwoAdicField,
	R: Runtime<F> + ?Sized,
{
	let mut rows = Vec::new();
	for fragment in fragments {
		let views = fragment
			.iter()
			.map(|&column| run.column_view(column))
			.collect::<Result<Vec<_>, _>>()?;
		let size = views.first().map_or(0, Vec::len);
		rows.extend((0..size).map(|row| {
			views
				.iter()
				.map(|view| view[row].as_canonical_u64())
				.collect::<Vec<_>>()
		}));
	}
	Ok(rows)
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use assert_matches::assert_matches;
	use wizard_field::{Field, KoalaBear};

	use super::*;
	use crate::{
		expression::Expression,
		query::GrandProductInput,
		registry::Registry,
		runtime::ProverRuntime,
	};

	type F = KoalaBear;

	fn values(raw: &[u32]) -> Vec<F> {
		raw.iter().copied().map(F::new).collect()
	}

	#[test]
	fn test_global_constraint_skips_wrapped_rows() {
		let mut registry = Registry::<F>::new();
		let p1 = registry
			.add_column("P1")
			.precomputed(values(&[1, 1, 2, 3, 5, 8, 13, 21]))
			.unwrap();
		let p1 = Column::from(p1);
		// P1[i + 2] = P1[i + 1] + P1[i] breaks only on the two wrapped rows
		let expr = Expression::column(p1.shifted(2))
			- Expression::column(p1.shifted(1))
			- Expression::column(p1);
		let bounded = registry
			.add_global_constraint("FIB", 0, expr.clone())
			.unwrap();
		let unbounded = registry
			.add_global_constraint_no_bound_cancel("FIB_WRAPPED", 0, expr)
			.unwrap();

		let run = ProverRuntime::new(&registry);
		registry.query(bounded).check(&run).unwrap();
		assert_matches!(
			registry.query(unbounded).check(&run),
			Err(VerificationError::ConstraintViolated { row: 6, .. })
		);
	}

	#[test]
	fn test_local_opening_reads_shifted_view() {
		let mut registry = Registry::<F>::new();
		let col = registry.add_column("C").committed(0, 4).unwrap();
		let last = registry.local_opening_at("LAST", 0, col, 3).unwrap();

		let mut run = ProverRuntime::new(&registry);
		run.assign_column(col, values(&[4, 5, 6, 7])).unwrap();
		run.assign_local_opening(last, F::new(7)).unwrap();
		registry.query(last).check(&run).unwrap();
	}

	#[test]
	fn test_local_opening_mismatch() {
		let mut registry = Registry::<F>::new();
		let col = registry.add_column("C").committed(0, 4).unwrap();
		let first = registry.add_local_opening("FIRST", 0, col).unwrap();

		let mut run = ProverRuntime::new(&registry);
		run.assign_column(col, values(&[4, 5, 6, 7])).unwrap();
		run.assign_local_opening(first, F::new(5)).unwrap();
		assert_matches!(
			registry.query(first).check(&run),
			Err(VerificationError::OpeningMismatch { claimed, actual, .. })
				if claimed == "5" && actual == "4"
		);
	}

	#[test]
	fn test_univariate_eval_on_constant_polynomial() {
		let mut registry = Registry::<F>::new();
		let a = registry
			.add_column("A")
			.precomputed(values(&[9; 8]))
			.unwrap();
		let b = registry
			.add_column("B")
			.precomputed(values(&[0, 1, 0, 0]))
			.unwrap();
		let eval = registry
			.add_univariate_eval("EVAL", 0, vec![a.into(), b.into()])
			.unwrap();

		// B interpolates to (1/4)·Σ_j ω^{-j}·X^j with ω a primitive fourth root of unity
		let omega = F::two_adic_generator(2).unwrap();
		let x = F::new(5);
		let omega_inv = omega.invert().unwrap();
		let b_at_x = (0..4)
			.map(|j| omega_inv.pow(j) * x.pow(j))
			.sum::<F>() * F::new(4).invert().unwrap();

		let mut run = ProverRuntime::new(&registry);
		run.assign_univariate_eval(eval, x, vec![F::new(9), b_at_x])
			.unwrap();
		registry.query(eval).check(&run).unwrap();
	}

	#[test]
	fn test_permutation_ignores_row_order_only() {
		let mut registry = Registry::<F>::new();
		let a0 = registry
			.add_column("A0")
			.precomputed(values(&[1, 2, 3, 4]))
			.unwrap();
		let a1 = registry
			.add_column("A1")
			.precomputed(values(&[5, 6, 7, 8]))
			.unwrap();
		let b0 = registry
			.add_column("B0")
			.precomputed(values(&[3, 1, 4, 2]))
			.unwrap();
		let b1 = registry
			.add_column("B1")
			.precomputed(values(&[7, 5, 8, 6]))
			.unwrap();
		let c1 = registry
			.add_column("C1")
			.precomputed(values(&[5, 7, 8, 6]))
			.unwrap();
		let good = registry
			.add_permutation(
				"GOOD",
				0,
				vec![vec![a0.into(), a1.into()]],
				vec![vec![b0.into(), b1.into()]],
			)
			.unwrap();
		// same multisets per column, but rows are mixed up
		let bad = registry
			.add_permutation(
				"BAD",
				0,
				vec![vec![a0.into(), a1.into()]],
				vec![vec![b0.into(), c1.into()]],
			)
			.unwrap();

		let run = ProverRuntime::new(&registry);
		registry.query(good).check(&run).unwrap();
		assert_matches!(
			registry.query(bad).check(&run),
			Err(VerificationError::PermutationMismatch { .. })
		);
	}

	#[test]
	fn test_grand_product() {
		let mut registry = Registry::<F>::new();
		let num = registry
			.add_column("NUM")
			.precomputed(values(&[2, 3, 4, 5]))
			.unwrap();
		let den = registry
			.add_column("DEN")
			.precomputed(values(&[1, 1, 2, 3]))
			.unwrap();
		let zero = registry
			.add_column("ZERO")
			.precomputed(values(&[1, 0, 1, 1]))
			.unwrap();
		let inputs = BTreeMap::from([(
			4,
			GrandProductInput {
				numerators: vec![Expression::column(num)],
				denominators: vec![Expression::column(den)],
			},
		)]);
		let product = registry.add_grand_product("GP", 0, inputs).unwrap();
		let degenerate = registry
			.add_grand_product(
				"GP_ZERO",
				0,
				BTreeMap::from([(
					4,
					GrandProductInput {
						numerators: vec![Expression::column(num)],
						denominators: vec![Expression::column(zero)],
					},
				)]),
			)
			.unwrap();
		let mut run = ProverRuntime::new(&registry);
		run.assign_grand_product(product, F::new(20)).unwrap();
		run.assign_grand_product(degenerate, F::ONE).unwrap();
		registry.query(product).check(&run).unwrap();
		assert_matches!(
			registry.query(degenerate).check(&run),
			Err(VerificationError::ZeroDenominator { .. })
		);

		let mut wrong = ProverRuntime::new(&registry);
		wrong.assign_grand_product(product, F::new(21)).unwrap();
		assert_matches!(
			registry.query(product).check(&wrong),
			Err(VerificationError::GrandProductMismatch { computed, expected, .. })
				if computed == "20" && expected == "21"
		);
	}
}
