// Copyright 2024-2025 Irreducible Inc.

//! Running-product columns of one grand product context.

use tracing::instrument;
use wizard_field::{util::batch_invert_par, TwoAdicField};

use crate::{
	column::{Column, ColumnId},
	error::Error,
	expression::Expression,
	query::QueryId,
	registry::{self, Registry},
	runtime::{ExpressionEvaluator, ProverRuntime},
};

/// One running-product column together with the factors it accumulates.
#[derive(Debug, Clone)]
pub(super) struct ZColumn<F: TwoAdicField> {
	pub column: ColumnId,
	/// Local opening of the last row, which holds the partial product of the context.
	pub opening: QueryId,
	pub numerator: Expression<F>,
	pub denominator: Expression<F>,
}

/// Factors of one query sharing a column size, packed `arity` at a time into Z columns.
#[derive(Debug, Clone)]
pub(super) struct ZCtx<F: TwoAdicField> {
	pub query: QueryId,
	pub query_name: String,
	pub size: usize,
	pub z: Vec<ZColumn<F>>,
}

/// Values computed by the prover for one Z column.
pub(super) struct ZAssignment<F> {
	pub column: ColumnId,
	pub opening: QueryId,
	pub values: Vec<F>,
}

impl<F: TwoAdicField> ZCtx<F> {
	/// Declares the Z columns, their constraints and their end openings at `round`.
	pub fn declare(
		registry: &mut Registry<F>,
		query: QueryId,
		round: usize,
		size: usize,
		numerators: Vec<Expression<F>>,
		denominators: Vec<Expression<F>>,
		arity: usize,
	) -> Result<Self, registry::Error> {
		let query_name = registry.query(query).name().clone();
		let n_z = numerators
			.len()
			.div_ceil(arity)
			.max(denominators.len().div_ceil(arity));

		let mut numerators = numerators.into_iter();
		let mut denominators = denominators.into_iter();
		let mut z = Vec::with_capacity(n_z);
		for k in 0..n_z {
			let numerator = numerators.by_ref().take(arity).product::<Expression<F>>();
			let denominator = denominators.by_ref().take(arity).product::<Expression<F>>();

			let column = registry
				.add_column(format!("{query_name}_Z_{size}_{k}"))
				.committed(round, size)?;
			let current = Expression::column(column);
			let previous = Expression::column(Column::from(column).shifted(-1));

			registry.add_global_constraint(
				format!("{query_name}_Z_GLOBAL_{size}_{k}"),
				round,
				current.clone() * denominator.clone() - previous * numerator.clone(),
			)?;
			registry.add_local_constraint(
				format!("{query_name}_Z_LOCAL_{size}_{k}"),
				round,
				current * denominator.clone() - numerator.clone(),
			)?;
			let opening = registry.add_local_opening(
				format!("{query_name}_Z_OPENING_{size}_{k}"),
				round,
				Column::from(column).shifted(-1),
			)?;

			z.push(ZColumn {
				column,
				opening,
				numerator,
				denominator,
			});
		}

		Ok(Self {
			query,
			query_name,
			size,
			z,
		})
	}

	/// Computes every Z column as the running product of `numerator / denominator`.
	#[instrument(skip_all, name = "ZCtx::compute", level = "debug")]
	pub fn compute(&self, run: &ProverRuntime<'_, F>) -> Result<Vec<ZAssignment<F>>, Error> {
		self.z
			.iter()
			.map(|z| {
				let numerators = ExpressionEvaluator::new(run, &z.numerator)?.evaluate_all(self.size);
				let denominators =
					ExpressionEvaluator::new(run, &z.denominator)?.evaluate_all(self.size);
				let inverses = batch_invert_par(&denominators).map_err(|err| match err {
					wizard_field::Error::ZeroInBatchInversion { index } => Error::ZeroDenominator {
						query: self.query_name.clone(),
						row: index,
					},
					err => err.into(),
				})?;

				let mut acc = F::ONE;
				let values = numerators
					.iter()
					.zip(&inverses)
					.map(|(&numerator, &inverse)| {
						acc *= numerator * inverse;
						acc
					})
					.collect();
				Ok(ZAssignment {
					column: z.column,
					opening: z.opening,
					values,
				})
			})
			.collect()
	}
}
