// Copyright 2024-2025 Irreducible Inc.

//! Batching of univariate evaluation claims at several points into one claim at a random point.
//!
//! Let $P_i$ be the polynomials read by the evaluation queries, $S_i$ the points where $P_i$ is
//! claimed and $H$ the set of every point. With $I_i = \sum_{h \in S_i} y_{i,h} L_h$, where
//! $L_h$ is the Lagrange basis over $H$, the prover commits to
//! $$Q = \sum_i r^i \frac{P_i - I_i}{\prod_{h \in S_i} (X - h)},$$
//! split into shares of `target_size` coefficients. At a fresh random point $x$ the verifier
//! checks
//! $$Q(x) \prod_{h \in H} (x - h) = \sum_i r^i (P_i(x) - I_i(x)) \prod_{h \in H \setminus S_i} (x - h)$$
//! against a single evaluation query over every $P_i$ and every share.


use std::sync::{Arc, Mutex};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, instrument};
use wizard_field::{
	util::{inner_product_unchecked, powers},
	Field, TwoAdicField,
};
use wizard_math::{add_scaled_poly, interpolate_on_roots_of_unity, ruffini_div, EvaluationDomain};
use wizard_ntt::{SingleThreadedNTT, NTT};
use wizard_utils::{bail, rayon::worker_count};

use super::CompilerPass;
use crate::{
	action::{ProverAction, VerifierAction},
	coin::{CoinId, CoinKind},
	column::{Column, ColumnId},
	error::{Error, VerificationError},
	query::{Query, QueryId, UnivariateEval},
	registry::Registry,
	runtime::{ProverRuntime, Runtime, VerifierRuntime},
};

/// Replaces every univariate evaluation query by one query at a random point.
#[derive(Debug, Clone, Copy)]
pub struct MultiPointToSinglePoint {
	/// Size of the quotient shares, shrunk to the quotient size when larger.
	pub target_size: usize,
}

impl<F: TwoAdicField> CompilerPass<F> for MultiPointToSinglePoint {
	fn name(&self) -> &'static str {
		"multi-point to single-point"
	}

	#[instrument(skip_all, name = "MultiPointToSinglePoint::compile", level = "debug")]
	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error> {
		if !self.target_size.is_power_of_two() {
			bail!(Error::Compilation {
				pass: CompilerPass::<F>::name(self),
				reason: format!("target size {} is not a power of two", self.target_size),
			});
		}

		let queries = registry
			.unignored_queries()
			.into_iter()
			.filter(|&id| matches!(registry.query(id).query(), Query::UnivariateEval(_)))
			.collect::<Vec<_>>();
		if queries.is_empty() {
			debug!("no univariate evaluation to batch");
			return Ok(());
		}

		let mut polys = Vec::<BatchedPoly>::new();
		for (q, &id) in queries.iter().enumerate() {
			let Query::UnivariateEval(UnivariateEval { columns }) = registry.query(id).query() else {
				unreachable!("queries are filtered on their kind");
			};
			for (j, &column) in columns.iter().enumerate() {
				match polys.iter_mut().find(|poly| poly.column == column) {
					Some(poly) => poly.claims.push((q, j)),
					None => polys.push(BatchedPoly {
						column,
						claims: vec![(q, j)],
					}),
				}
			}
		}
		for &id in &queries {
			registry.mark_ignored(id);
		}

		let n_points = queries.len();
		let n_polys = polys.len();
		let max_size = polys
			.iter()
			.map(|poly| registry.column(poly.column.root()).size())
			.max()
			.unwrap_or(1);
		let quotient_size = polys
			.iter()
			.map(|poly| {
				registry.column(poly.column.root()).size().max(n_points) - poly.claims.len()
			})
			.max()
			.unwrap_or(0)
			.max(1)
			.next_power_of_two();
		let share_size = self.target_size.min(quotient_size);
		let n_shares = quotient_size / share_size;

		let round = registry.num_rounds();
		let lin_comb = registry.add_coin("MPTS_LIN_COMB", round, CoinKind::Field)?;
		let shares = (0..n_shares)
			.map(|k| {
				registry
					.add_column(format!("MPTS_QUOTIENT_SHARE_{k}"))
					.committed(round, share_size)
			})
			.collect::<Result<Vec<_>, _>>()?;
		let rand_eval = registry.add_coin("MPTS_RAND_EVAL", round + 1, CoinKind::Field)?;
		let eval_columns = polys
			.iter()
			.map(|poly| poly.column)
			.chain(shares.iter().map(|&share| Column::from(share)))
			.collect();
		let eval_query = registry.add_univariate_eval("MPTS_EVAL_QUERY", round + 1, eval_columns)?;

		let batch = Arc::new(Batch {
			queries,
			polys,
			lin_comb,
			rand_eval,
			shares,
			share_size,
			quotient_size,
			log_ntt_size: max_size.max(quotient_size).trailing_zeros() as usize,
			eval_query,
		});
		registry.register_prover_action(
			round,
			AccumulateQuotient {
				batch: batch.clone(),
			},
		);
		registry.register_prover_action(
			round + 1,
			EvaluateAtRandomPoint {
				batch: batch.clone(),
			},
		);
		registry.register_verifier_action(round + 1, CheckQuotient { batch });

		info!(
			n_points,
			n_polys,
			quotient_size,
			n_shares,
			"batched univariate evaluations"
		);
		Ok(())
	}
}

/// A polynomial read by at least one evaluation query.
#[derive(Debug)]
struct BatchedPoly {
	column: Column,
	/// `(query, index)` pairs: the claim is the `index`-th value of the `query`-th batched query.
	claims: Vec<(usize, usize)>,
}

impl BatchedPoly {
	fn is_claimed_by(&self, query: usize) -> bool {
		self.claims.iter().any(|&(q, _)| q == query)
	}
}

/// Declarations shared by the actions of one batch.
#[derive(Debug)]
struct Batch {
	queries: Vec<QueryId>,
	polys: Vec<BatchedPoly>,
	lin_comb: CoinId,
	rand_eval: CoinId,
	shares: Vec<ColumnId>,
	share_size: usize,
	quotient_size: usize,
	log_ntt_size: usize,
	eval_query: QueryId,
}

impl Batch {
	/// Points and claimed values of the batched queries.
	fn claims<'r, F: TwoAdicField, R: Runtime<F> + ?Sized>(
		&self,
		run: &'r R,
	) -> Result<(Vec<F>, Vec<&'r [F]>), VerificationError> {
		let (points, values) = self
			.queries
			.iter()
			.map(|&id| run.univariate_params(id))
			.collect::<Result<Vec<_>, _>>()?
			.into_iter()
			.unzip();
		Ok((points, values))
	}

	fn query_name<F: TwoAdicField>(&self, registry: &Registry<F>, q: usize) -> String {
		registry.query(self.queries[q]).name().clone()
	}
}

/// Indices of the first two equal points.
fn shared_point<F: Field>(points: &[F]) -> Option<(usize, usize)> {
	points
		.iter()
		.enumerate()
		.tuple_combinations()
		.find(|((_, a), (_, b))| a == b)
		.map(|((i, _), (j, _))| (i, j))
}

/// Computes the quotient and assigns its shares.
struct AccumulateQuotient {
	batch: Arc<Batch>,
}

impl<F: TwoAdicField> ProverAction<F> for AccumulateQuotient {
	#[instrument(skip_all, name = "mpts::accumulate_quotient", level = "debug")]
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		let batch = &*self.batch;
		let registry = run.registry();
		let (points, values) = batch.claims(&*run)?;
		let values = values.into_iter().map(<[F]>::to_vec).collect::<Vec<_>>();
		if let Some((a, b)) = shared_point(&points) {
			panic!(
				"univariate evaluations {} and {} share the evaluation point {}",
				batch.query_name(registry, a),
				batch.query_name(registry, b),
				points[a],
			);
		}

		let lagrange = EvaluationDomain::from_points(points.clone())?.lagrange_polys();
		let r = run.coin_field(batch.lin_comb)?;
		let r_powers = powers(r).take(batch.polys.len()).collect::<Vec<_>>();
		let ntt = SingleThreadedNTT::<F>::new(batch.log_ntt_size)?.multithreaded();

		// one accumulator per worker
		let min_len = batch.polys.len().div_ceil(worker_count(batch.polys.len()));
		let quotient = Mutex::new(vec![F::ZERO; batch.quotient_size]);
		{
			let run = &*run;
			batch
				.polys
				.par_iter()
				.zip(r_powers.par_iter())
				.with_min_len(min_len)
				.try_fold(
					|| vec![F::ZERO; batch.quotient_size],
					|mut acc, (poly, &r_i)| -> Result<_, Error> {
						let mut coeffs = run.column_view(poly.column)?;
						ntt.inverse_transform(&mut coeffs)?;
						for &(q, j) in &poly.claims {
							add_scaled_poly(&mut coeffs, &lagrange[q], -values[q][j]);
						}
						for &(q, _) in &poly.claims {
							let (divided, remainder) = ruffini_div(&coeffs, points[q]);
							assert!(
								remainder == F::ZERO,
								"{} does not evaluate to the value claimed by {} at {}",
								registry.column_name(poly.column),
								batch.query_name(registry, q),
								points[q],
							);
							coeffs = divided;
						}
						add_scaled_poly(&mut acc, &coeffs, r_i);
						Ok(acc)
					},
				)
				.try_for_each(|partial| -> Result<(), Error> {
					let partial = partial?;
					let mut quotient = quotient
						.lock()
						.expect("workers do not panic holding the lock");
					for (total, coeff) in quotient.iter_mut().zip(partial) {
						*total += coeff;
					}
					Ok(())
				})?;
		}

		let quotient = quotient
			.into_inner()
			.expect("workers do not panic holding the lock");
		for (&share, chunk) in batch.shares.iter().zip(quotient.chunks(batch.share_size)) {
			let mut evals = chunk.to_vec();
			ntt.forward_transform(&mut evals)?;
			run.assign_column(share, evals)?;
		}
		debug!(n_polys = batch.polys.len(), n_shares = batch.shares.len(), "assigned quotient shares");
		Ok(())
	}
}

/// Evaluates every batched polynomial and every share at the random point.
struct EvaluateAtRandomPoint {
	batch: Arc<Batch>,
}

impl<F: TwoAdicField> ProverAction<F> for EvaluateAtRandomPoint {
	#[instrument(skip_all, name = "mpts::evaluate", level = "debug")]
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		let batch = &*self.batch;
		let x = run.coin_field(batch.rand_eval)?;
		let ys = {
			let run = &*run;
			let Query::UnivariateEval(UnivariateEval { columns }) =
				run.registry().query(batch.eval_query).query()
			else {
				unreachable!("the batch query is a univariate evaluation");
			};
			columns
				.par_iter()
				.map(|&column| -> Result<F, Error> {
					let evals = run.column_view(column)?;
					Ok(interpolate_on_roots_of_unity(&evals, x)?)
				})
				.collect::<Result<Vec<_>, _>>()?
		};
		run.assign_univariate_eval(batch.eval_query, x, ys)
	}
}

/// Checks the quotient identity at the random point.
struct CheckQuotient {
	batch: Arc<Batch>,
}

impl<F: TwoAdicField> VerifierAction<F> for CheckQuotient {
	fn run(&self, run: &VerifierRuntime<'_, F>) -> Result<(), VerificationError> {
		let batch = &*self.batch;
		let registry = run.registry();
		let name = registry.query(batch.eval_query).name().clone();

		let (x, ys) = run.univariate_params(batch.eval_query)?;
		if x != run.coin_field(batch.rand_eval)? {
			return Err(VerificationError::WrongEvaluationPoint { query: name });
		}
		if ys.len() != batch.polys.len() + batch.shares.len() {
			return Err(VerificationError::MissingParams { query: name });
		}

		let (points, values) = batch.claims(run)?;
		if let Some((a, b)) = shared_point(&points) {
			return Err(VerificationError::DuplicateEvaluationPoint {
				query: batch.query_name(registry, a),
				other: batch.query_name(registry, b),
			});
		}
		let lagrange = EvaluationDomain::from_points(points.clone())?.lagrange_evals(x);
		let vanishing = points.iter().map(|&h| x - h).collect::<Vec<_>>();
		let r = run.coin_field(batch.lin_comb)?;

		let (poly_evals, share_evals) = ys.split_at(batch.polys.len());
		let quotient = inner_product_unchecked(
			share_evals.iter().copied(),
			powers(x.pow(batch.share_size as u64)),
		);
		let left = quotient * vanishing.iter().product::<F>();

		let right = batch
			.polys
			.iter()
			.zip(poly_evals)
			.zip(powers(r))
			.map(|((poly, &eval), r_i)| {
				let interpolant = poly
					.claims
					.iter()
					.map(|&(q, j)| values[q][j] * lagrange[q])
					.sum::<F>();
				let outside = (0..points.len())
					.filter(|&q| !poly.is_claimed_by(q))
					.map(|q| vanishing[q])
					.product::<F>();
				r_i * (eval - interpolant) * outside
			})
			.sum::<F>();

		if left != right {
			return Err(VerificationError::QuotientMismatch {
				query: name,
				left: left.to_string(),
				right: right.to_string(),
			});
		}
		Ok(())
	}
}
