// Copyright 2024-2025 Irreducible Inc.

use std::collections::HashMap;

use digest::Digest;
use tracing::debug;
use wizard_field::TwoAdicField;
use wizard_utils::bail;

use super::{absorb_round, sample_coins, Runtime};
use crate::{
	coin::{CoinId, CoinValue},
	column::{ColumnId, ColumnStatus},
	error::{Error, VerificationError},
	protocol::Proof,
	query::{Query, QueryId, QueryParams},
	registry::Registry,
	transcript::Transcript,
};

enum ColumnSlot<'a, F> {
	Unassigned,
	Fixed(&'a [F]),
	Assigned(Vec<F>),
	Freed,
}

/// The prover's view of one proving session.
///
/// Columns are assigned once, during their own round. Coins of a round become available when
/// the driver moves into it, after the transcript absorbed everything of the previous round.
pub struct ProverRuntime<'a, F: TwoAdicField> {
	registry: &'a Registry<F>,
	columns: Vec<ColumnSlot<'a, F>>,
	coins: HashMap<CoinId, CoinValue<F>>,
	params: HashMap<QueryId, QueryParams<F>>,
	round: usize,
}

impl<'a, F: TwoAdicField> ProverRuntime<'a, F> {
	pub(crate) fn new(registry: &'a Registry<F>) -> Self {
		let columns = registry
			.columns()
			.iter()
			.map(|column| match column.values() {
				Some(values) => ColumnSlot::Fixed(values.as_slice()),
				None => ColumnSlot::Unassigned,
			})
			.collect();
		Self {
			registry,
			columns,
			coins: HashMap::new(),
			params: HashMap::new(),
			round: 0,
		}
	}

	pub const fn round(&self) -> usize {
		self.round
	}

	/// Assigns the values of a natural column declared at the current round.
	pub fn assign_column(&mut self, id: ColumnId, values: Vec<F>) -> Result<(), Error> {
		let column = self.registry.column(id);
		let name = column.name().clone();
		if column.status().is_precomputed() {
			bail!(Error::AssignPrecomputed { name });
		}
		if column.round() != self.round {
			bail!(Error::ColumnRoundMismatch {
				name,
				column_round: column.round(),
				current_round: self.round,
			});
		}
		if values.len() != column.size() {
			bail!(Error::ColumnLengthMismatch {
				name,
				expected: column.size(),
				actual: values.len(),
			});
		}

		let slot = &mut self.columns[id.index()];
		if !matches!(slot, ColumnSlot::Unassigned) {
			bail!(Error::ColumnAlreadyAssigned { name });
		}
		*slot = ColumnSlot::Assigned(values);
		Ok(())
	}

	/// Drops the values of a column nothing reads anymore.
	pub fn free_column(&mut self, id: ColumnId) {
		self.columns[id.index()] = ColumnSlot::Freed;
	}

	pub fn is_assigned(&self, id: ColumnId) -> bool {
		matches!(self.columns[id.index()], ColumnSlot::Fixed(_) | ColumnSlot::Assigned(_))
	}

	pub fn has_params(&self, id: QueryId) -> bool {
		self.params.contains_key(&id)
	}

	pub fn assign_local_opening(&mut self, id: QueryId, y: F) -> Result<(), Error> {
		self.assign_params(id, QueryParams::LocalOpening { y })
	}

	pub fn assign_univariate_eval(&mut self, id: QueryId, x: F, ys: Vec<F>) -> Result<(), Error> {
		self.assign_params(id, QueryParams::UnivariateEval { x, ys })
	}

	pub fn assign_grand_product(&mut self, id: QueryId, y: F) -> Result<(), Error> {
		self.assign_params(id, QueryParams::GrandProduct { y })
	}

	fn assign_params(&mut self, id: QueryId, params: QueryParams<F>) -> Result<(), Error> {
		let query = self.registry.query(id);
		let matches = match (query.query(), &params) {
			(Query::LocalOpening(_), QueryParams::LocalOpening { .. }) => true,
			(Query::GrandProduct(_), QueryParams::GrandProduct { .. }) => true,
			(Query::UnivariateEval(eval), QueryParams::UnivariateEval { ys, .. }) => {
				ys.len() == eval.columns.len()
			}
			_ => false,
		};
		if !matches {
			bail!(Error::ParamsKindMismatch {
				query: query.name().clone(),
				kind: query.query().kind(),
			});
		}
		if self.params.contains_key(&id) {
			bail!(Error::ParamsAlreadyAssigned {
				query: query.name().clone(),
			});
		}
		self.params.insert(id, params);
		Ok(())
	}

	/// Closes the current round: absorbs its messages and draws the coins of the next one.
	pub(crate) fn go_next_round<H: Digest>(
		&mut self,
		transcript: &mut Transcript<H>,
	) -> Result<(), Error> {
		self.check_round_complete()?;
		absorb_round(&*self, transcript, self.round)?;

		self.round += 1;
		let coins = sample_coins(self.registry, transcript, self.round);
		debug!(round = self.round, n_coins = coins.len(), "prover entered round");
		self.coins.extend(coins);
		Ok(())
	}

	/// Checks every message of the current round is assigned.
	pub(crate) fn check_round_complete(&self) -> Result<(), Error> {
		for column in self.registry.columns() {
			if column.round() == self.round
				&& column.status().is_absorbed()
				&& !self.is_assigned(column.id())
			{
				bail!(Error::MissingAssignment {
					name: column.name().clone(),
					round: self.round,
				});
			}
		}
		for query in self.registry.queries() {
			if query.round() == self.round
				&& query.query().is_parametrized()
				&& !self.has_params(query.id())
			{
				bail!(Error::MissingParams {
					query: query.name().clone(),
					round: self.round,
				});
			}
		}
		Ok(())
	}

	/// Collects the columns sent in the clear and every query parameter, in round order.
	pub(crate) fn into_proof(mut self) -> Result<Proof<F>, Error> {
		let mut columns = Vec::new();
		for column in self.registry.columns() {
			if column.status() != ColumnStatus::Proof {
				continue;
			}
			let slot = std::mem::replace(&mut self.columns[column.id().index()], ColumnSlot::Freed);
			let values = match slot {
				ColumnSlot::Assigned(values) => values,
				ColumnSlot::Fixed(values) => values.to_vec(),
				ColumnSlot::Unassigned | ColumnSlot::Freed => {
					return Err(VerificationError::MissingColumn {
						name: column.name().clone(),
					}
					.into())
				}
			};
			columns.push((column.id(), values));
		}

		let mut queries = self.registry.queries().iter().collect::<Vec<_>>();
		queries.sort_by_key(|query| (query.round(), query.id()));
		let params = queries
			.into_iter()
			.filter_map(|query| {
				self.params
					.remove(&query.id())
					.map(|params| (query.id(), params))
			})
			.collect();

		Ok(Proof { columns, params })
	}
}

impl<F: TwoAdicField> Runtime<F> for ProverRuntime<'_, F> {
	fn registry(&self) -> &Registry<F> {
		self.registry
	}

	fn column_values(&self, id: ColumnId) -> Option<&[F]> {
		match &self.columns[id.index()] {
			ColumnSlot::Fixed(values) => Some(*values),
			ColumnSlot::Assigned(values) => Some(values.as_slice()),
			ColumnSlot::Unassigned | ColumnSlot::Freed => None,
		}
	}

	fn coin_value(&self, id: CoinId) -> Option<&CoinValue<F>> {
		self.coins.get(&id)
	}

	fn query_params(&self, id: QueryId) -> Option<&QueryParams<F>> {
		self.params.get(&id)
	}
}
