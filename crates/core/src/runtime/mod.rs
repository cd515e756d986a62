// Copyright 2024-2025 Irreducible Inc.

//! Per-session state of the prover and of the verifier.

mod prover;
mod verifier;

use digest::Digest;
pub use prover::ProverRuntime;
use rayon::prelude::*;
pub use verifier::VerifierRuntime;
use wizard_field::TwoAdicField;

use crate::{
	coin::{CoinId, CoinKind, CoinValue},
	column::{Column, ColumnId},
	error::VerificationError,
	expression::{Accessor, Expression, Variable},
	query::{QueryId, QueryParams},
	registry::Registry,
	transcript::Transcript,
};

/// Read access shared by the prover and the verifier runtime.
pub trait Runtime<F: TwoAdicField>: Sync {
	fn registry(&self) -> &Registry<F>;

	/// Values of a natural column, `None` when unassigned or freed.
	fn column_values(&self, id: ColumnId) -> Option<&[F]>;

	fn coin_value(&self, id: CoinId) -> Option<&CoinValue<F>>;

	fn query_params(&self, id: QueryId) -> Option<&QueryParams<F>>;

	fn column(&self, id: ColumnId) -> Result<&[F], VerificationError> {
		self.column_values(id)
			.ok_or_else(|| VerificationError::MissingColumn {
				name: self.registry().column(id).name().clone(),
			})
	}

	fn column_at(&self, column: Column, row: usize) -> Result<F, VerificationError> {
		Ok(column.read(self.column(column.root())?, row))
	}

	/// The rows of a possibly shifted view, in view order.
	fn column_view(&self, column: Column) -> Result<Vec<F>, VerificationError> {
		let values = self.column(column.root())?;
		Ok((0..values.len()).map(|row| column.read(values, row)).collect())
	}

	fn coin_field(&self, id: CoinId) -> Result<F, VerificationError> {
		self.coin_value(id)
			.and_then(CoinValue::as_field)
			.ok_or_else(|| VerificationError::MissingCoin {
				name: self.registry().coin(id).name().clone(),
			})
	}

	fn params(&self, id: QueryId) -> Result<&QueryParams<F>, VerificationError> {
		self.query_params(id)
			.ok_or_else(|| missing_params(self.registry(), id))
	}

	fn local_opening_y(&self, id: QueryId) -> Result<F, VerificationError> {
		match self.params(id)? {
			QueryParams::LocalOpening { y } => Ok(*y),
			_ => Err(missing_params(self.registry(), id)),
		}
	}

	fn univariate_params(&self, id: QueryId) -> Result<(F, &[F]), VerificationError> {
		match self.params(id)? {
			QueryParams::UnivariateEval { x, ys } => Ok((*x, ys.as_slice())),
			_ => Err(missing_params(self.registry(), id)),
		}
	}

	fn grand_product_y(&self, id: QueryId) -> Result<F, VerificationError> {
		match self.params(id)? {
			QueryParams::GrandProduct { y } => Ok(*y),
			_ => Err(missing_params(self.registry(), id)),
		}
	}

	fn accessor_value(&self, accessor: Accessor) -> Result<F, VerificationError> {
		match accessor {
			Accessor::LocalOpening(id) => self.local_opening_y(id),
			Accessor::GrandProduct(id) => self.grand_product_y(id),
			Accessor::UnivariateEval { query, index } => {
				let (_, ys) = self.univariate_params(query)?;
				ys.get(index)
					.copied()
					.ok_or_else(|| missing_params(self.registry(), query))
			}
		}
	}
}

fn missing_params<F: TwoAdicField>(registry: &Registry<F>, id: QueryId) -> VerificationError {
	VerificationError::MissingParams {
		query: registry.query(id).name().clone(),
	}
}

enum Source<'a, F> {
	Column { values: &'a [F], column: Column },
	Scalar(F),
	Periodic { period: usize, offset: usize },
}

/// An expression with every variable bound to runtime values, evaluated row by row.
pub struct ExpressionEvaluator<'a, F: TwoAdicField> {
	expr: &'a Expression<F>,
	sources: Vec<Source<'a, F>>,
}

impl<'a, F: TwoAdicField> ExpressionEvaluator<'a, F> {
	pub fn new<R: Runtime<F> + ?Sized>(
		run: &'a R,
		expr: &'a Expression<F>,
	) -> Result<Self, VerificationError> {
		let sources = expr
			.vars()
			.iter()
			.map(|var| {
				Ok(match *var {
					Variable::Column(column) => Source::Column {
						values: run.column(column.root())?,
						column,
					},
					Variable::Coin(id) => Source::Scalar(run.coin_field(id)?),
					Variable::Accessor(accessor) => Source::Scalar(run.accessor_value(accessor)?),
					Variable::PeriodicSample { period, offset } => {
						Source::Periodic { period, offset }
					}
				})
			})
			.collect::<Result<Vec<_>, VerificationError>>()?;
		Ok(Self { expr, sources })
	}

	/// Evaluates row `row`, reading shifted columns cyclically. `buf` is scratch space.
	pub fn evaluate_row(&self, row: usize, buf: &mut Vec<F>) -> F {
		buf.clear();
		buf.extend(self.sources.iter().map(|source| match source {
			Source::Column { values, column } => column.read(values, row),
			Source::Scalar(value) => *value,
			Source::Periodic { period, offset } => {
				if row % period == *offset {
					F::ONE
				} else {
					F::ZERO
				}
			}
		}));
		self.expr.evaluate(buf)
	}

	/// Evaluates every row of a domain of `size` rows on the rayon pool.
	pub fn evaluate_all(&self, size: usize) -> Vec<F> {
		(0..size)
			.into_par_iter()
			.map_init(Vec::new, |buf, row| self.evaluate_row(row, buf))
			.collect()
	}
}

/// Absorbs everything the verifier learns during `round`.
///
/// Columns come first, in registration order, restricted to the statuses the transcript
/// absorbs. Query parameters follow in registration order, ignored queries included.
pub(crate) fn absorb_round<F, H, R>(
	run: &R,
	transcript: &mut Transcript<H>,
	round: usize,
) -> Result<(), VerificationError>
where
	F: TwoAdicField,
	H: Digest,
	R: Runtime<F> + ?Sized,
{
	let registry = run.registry();
	for column in registry.columns() {
		if column.round() == round && column.status().is_absorbed() {
			transcript.update(run.column(column.id())?);
		}
	}
	for query in registry.queries() {
		if query.round() == round && query.query().is_parametrized() {
			transcript.update(&run.params(query.id())?.transcript_elements());
		}
	}
	Ok(())
}

/// Draws the coins of `round`, in registration order.
///
/// Seeded coins all read the state reached before the first draw of the round.
pub(crate) fn sample_coins<F, H>(
	registry: &Registry<F>,
	transcript: &mut Transcript<H>,
	round: usize,
) -> Vec<(CoinId, CoinValue<F>)>
where
	F: TwoAdicField,
	H: Digest,
{
	let seed = transcript.state().clone();
	registry
		.coins()
		.iter()
		.filter(|coin| coin.round() == round)
		.map(|coin| {
			let value = match coin.kind() {
				CoinKind::Field => CoinValue::Field(transcript.random_field()),
				CoinKind::FieldVec(len) => CoinValue::FieldVec(transcript.random_field_vec(len)),
				CoinKind::IntegerVec { count, modulus } => {
					CoinValue::IntegerVec(transcript.random_integers(count, modulus))
				}
				CoinKind::FieldFromSeed => {
					CoinValue::Field(Transcript::<H>::random_field_from_seed(&seed, coin.name()))
				}
			};
			(coin.id(), value)
		})
		.collect()
}
