// Copyright 2024-2025 Irreducible Inc.

//! Reduction of permutation and grand product queries to running-product columns.
//!
//! A permutation `A ≡ B` holds, with overwhelming probability over the coins `α` and `γ`, iff
//! $\prod_{rows} (\gamma + \sum_k \alpha^k a_k) = \prod_{rows} (\gamma + \sum_k \alpha^k b_k)$.
//! Both sides are accumulated by a Z column per [`ZCtx`], whose last row is opened. The
//! verifier multiplies the openings of a query and compares the result with the expected
//! value: one for a permutation, the claimed parameter for a grand product.

mod zctx;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, instrument};
use wizard_field::TwoAdicField;
use wizard_utils::bail;

use self::zctx::ZCtx;
use super::CompilerPass;
use crate::{
	action::{ProverAction, VerifierAction},
	coin::{CoinId, CoinKind},
	column::Column,
	error::{Error, VerificationError},
	expression::Expression,
	query::{GrandProduct, Permutation, Query, QueryId},
	registry::Registry,
	runtime::{ProverRuntime, Runtime, VerifierRuntime},
};

/// Compiles permutation and grand product queries into Z columns.
#[derive(Debug, Clone, Copy)]
pub struct PermutationCompiler {
	/// Number of factors multiplied into a single Z column.
	pub arity: usize,
}

impl Default for PermutationCompiler {
	fn default() -> Self {
		Self { arity: 3 }
	}
}

impl<F: TwoAdicField> CompilerPass<F> for PermutationCompiler {
	fn name(&self) -> &'static str {
		"permutation compiler"
	}

	#[instrument(skip_all, name = "PermutationCompiler::compile", level = "debug")]
	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error> {
		if self.arity == 0 {
			bail!(Error::Compilation {
				pass: CompilerPass::<F>::name(self),
				reason: "arity must be positive".to_string(),
			});
		}

		let mut ctxs_by_round = BTreeMap::<usize, Vec<ZCtx<F>>>::new();
		let mut n_queries = 0;
		for id in registry.unignored_queries() {
			let query = registry.query(id);
			let round = query.round();
			let (ctx_round, expected, factors) = match query.query().clone() {
				Query::Permutation(permutation) => {
					let factors = self.permutation_factors(registry, id, round, &permutation)?;
					(round + 1, Expected::One, factors)
				}
				Query::GrandProduct(GrandProduct { inputs }) => {
					let factors = inputs
						.into_iter()
						.map(|(size, input)| (size, (input.numerators, input.denominators)))
						.collect();
					(round, Expected::Claimed, factors)
				}
				_ => continue,
			};

			let ctxs = factors
				.into_iter()
				.map(|(size, (numerators, denominators))| {
					ZCtx::declare(registry, id, ctx_round, size, numerators, denominators, self.arity)
				})
				.collect::<Result<Vec<_>, _>>()?;
			registry.register_verifier_action(
				ctx_round,
				CheckProduct {
					query: id,
					openings: ctxs
						.iter()
						.flat_map(|ctx| ctx.z.iter().map(|z| z.opening))
						.collect(),
					expected,
				},
			);
			registry.mark_ignored(id);
			ctxs_by_round.entry(ctx_round).or_default().extend(ctxs);
			n_queries += 1;
		}

		let n_ctxs = ctxs_by_round.values().map(Vec::len).sum::<usize>();
		for (round, ctxs) in ctxs_by_round {
			registry.register_prover_action(round, ComputeZ { ctxs });
		}
		debug!(n_queries, n_ctxs, "compiled grand products");
		Ok(())
	}
}

type Factors<F> = BTreeMap<usize, (Vec<Expression<F>>, Vec<Expression<F>>)>;

impl PermutationCompiler {
	/// Registers the coins of a permutation and returns its factors grouped by size.
	fn permutation_factors<F: TwoAdicField>(
		&self,
		registry: &mut Registry<F>,
		id: QueryId,
		round: usize,
		permutation: &Permutation,
	) -> Result<Factors<F>, Error> {
		let name = registry.query(id).name().clone();
		let width = permutation.a[0].len();
		let alpha = if width > 1 {
			Some(registry.add_coin(format!("{name}_PERM_ALPHA"), round + 1, CoinKind::Field)?)
		} else {
			None
		};
		let gamma = registry.add_coin(format!("{name}_PERM_GAMMA"), round + 1, CoinKind::Field)?;

		let mut factors = Factors::new();
		for fragment in &permutation.a {
			let size = registry.column(fragment[0].root()).size();
			let factor = fragment_factor(fragment, alpha, gamma);
			factors.entry(size).or_default().0.push(factor);
		}
		for fragment in &permutation.b {
			let size = registry.column(fragment[0].root()).size();
			let factor = fragment_factor(fragment, alpha, gamma);
			factors.entry(size).or_default().1.push(factor);
		}
		Ok(factors)
	}
}

/// `γ + Σ_k α^k·col_k`.
fn fragment_factor<F: TwoAdicField>(
	fragment: &[Column],
	alpha: Option<CoinId>,
	gamma: CoinId,
) -> Expression<F> {
	let combination = fragment
		.iter()
		.enumerate()
		.map(|(k, &column)| match (k, alpha) {
			(0, _) | (_, None) => Expression::column(column),
			(k, Some(alpha)) => Expression::coin(alpha).pow(k as u64) * Expression::column(column),
		})
		.sum::<Expression<F>>();
	combination + Expression::coin(gamma)
}

#[derive(Debug, Clone, Copy)]
enum Expected {
	One,
	/// The parameter of the grand product query.
	Claimed,
}

/// Fills the Z columns of every context declared at a round.
struct ComputeZ<F: TwoAdicField> {
	ctxs: Vec<ZCtx<F>>,
}

impl<F: TwoAdicField> ProverAction<F> for ComputeZ<F> {
	#[instrument(skip_all, name = "permutation::compute_z", level = "debug")]
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		let assignments = {
			let run = &*run;
			self.ctxs
				.par_iter()
				.map(|ctx| ctx.compute(run))
				.collect::<Result<Vec<_>, _>>()?
		};

		let mut products = BTreeMap::<QueryId, F>::new();
		for (ctx, assignments) in self.ctxs.iter().zip(assignments) {
			for assignment in assignments {
				let last = assignment.values.last().copied().unwrap_or(F::ONE);
				*products.entry(ctx.query).or_insert(F::ONE) *= last;
				run.assign_column(assignment.column, assignment.values)?;
				run.assign_local_opening(assignment.opening, last)?;
			}
		}

		// grand products left unassigned by the caller get the computed residual
		for (query, product) in products {
			if matches!(run.registry().query(query).query(), Query::GrandProduct(_))
				&& !run.has_params(query)
			{
				run.assign_grand_product(query, product)?;
			}
		}
		Ok(())
	}
}

/// Multiplies the end openings of a query and compares with the expected product.
struct CheckProduct {
	query: QueryId,
	openings: Vec<QueryId>,
	expected: Expected,
}

impl<F: TwoAdicField> VerifierAction<F> for CheckProduct {
	fn run(&self, run: &VerifierRuntime<'_, F>) -> Result<(), VerificationError> {
		let computed = self
			.openings
			.iter()
			.map(|&opening| run.local_opening_y(opening))
			.product::<Result<F, _>>()?;
		let expected = match self.expected {
			Expected::One => F::ONE,
			Expected::Claimed => run.grand_product_y(self.query)?,
		};
		if computed != expected {
			return Err(VerificationError::GrandProductMismatch {
				query: run.registry().query(self.query).name().clone(),
				computed: computed.to_string(),
				expected: expected.to_string(),
			});
		}
		Ok(())
	}
}
