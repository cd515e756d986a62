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
	error::VerificationError,
	protocol::Proof,
	query::{QueryId, QueryParams},
	registry::Registry,
	transcript::Transcript,
};

/// The verifier's view of one proof.
///
/// Columns sent in the clear come from the proof, verifying-key columns from the registry.
/// Committed columns are never available.
pub struct VerifierRuntime<'a, F: TwoAdicField> {
	registry: &'a Registry<F>,
	columns: HashMap<ColumnId, &'a [F]>,
	coins: HashMap<CoinId, CoinValue<F>>,
	params: HashMap<QueryId, &'a QueryParams<F>>,
	round: usize,
}

impl<'a, F: TwoAdicField> VerifierRuntime<'a, F> {
	/// Binds a proof to the compiled registry, rejecting values the protocol does not expect.
	pub(crate) fn new(
		registry: &'a Registry<F>,
		proof: &'a Proof<F>,
	) -> Result<Self, VerificationError> {
		let mut columns = HashMap::new();
		for column in registry.columns() {
			if column.status() == ColumnStatus::VerifyingKey {
				if let Some(values) = column.values() {
					columns.insert(column.id(), values.as_slice());
				}
			}
		}
		for (id, values) in &proof.columns {
			let Some(column) = registry.columns().get(id.index()) else {
				bail!(VerificationError::UnexpectedColumn {
					name: id.to_string(),
				});
			};
			if column.status() != ColumnStatus::Proof
				|| values.len() != column.size()
				|| columns.insert(*id, values.as_slice()).is_some()
			{
				bail!(VerificationError::UnexpectedColumn {
					name: column.name().clone(),
				});
			}
		}

		let mut params = HashMap::new();
		for (id, query_params) in &proof.params {
			let Some(query) = registry.queries().get(id.index()) else {
				bail!(VerificationError::UnexpectedParams {
					query: id.to_string(),
				});
			};
			if !query.query().is_parametrized() || params.insert(*id, query_params).is_some() {
				bail!(VerificationError::UnexpectedParams {
					query: query.name().clone(),
				});
			}
		}

		Ok(Self {
			registry,
			columns,
			coins: HashMap::new(),
			params,
			round: 0,
		})
	}

	pub const fn round(&self) -> usize {
		self.round
	}

	/// Replays the transcript of the current round and draws the coins of the next one.
	pub(crate) fn go_next_round<H: Digest>(
		&mut self,
		transcript: &mut Transcript<H>,
	) -> Result<(), VerificationError> {
		absorb_round(&*self, transcript, self.round)?;

		self.round += 1;
		let coins = sample_coins(self.registry, transcript, self.round);
		debug!(round = self.round, n_coins = coins.len(), "verifier entered round");
		self.coins.extend(coins);
		Ok(())
	}
}

impl<F: TwoAdicField> Runtime<F> for VerifierRuntime<'_, F> {
	fn registry(&self) -> &Registry<F> {
		self.registry
	}

	fn column_values(&self, id: ColumnId) -> Option<&[F]> {
		self.columns.get(&id).copied()
	}

	fn coin_value(&self, id: CoinId) -> Option<&CoinValue<F>> {
		self.coins.get(&id)
	}

	fn query_params(&self, id: QueryId) -> Option<&QueryParams<F>> {
		self.params.get(&id).copied()
	}
}
