// Copyright 2024-2025 Irreducible Inc.

use tracing::debug;
use wizard_field::TwoAdicField;

use super::CompilerPass;
use crate::{
	action::VerifierAction,
	column::ColumnStatus,
	error::{Error, VerificationError},
	query::QueryId,
	registry::Registry,
	runtime::{Runtime, VerifierRuntime},
};

/// Sends every remaining column to the verifier and checks every remaining query directly.
///
/// Stands in for a polynomial commitment scheme: committed columns become proof columns,
/// precomputed ones become part of the verifying key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectCheck;

impl<F: TwoAdicField> CompilerPass<F> for DirectCheck {
	fn name(&self) -> &'static str {
		"direct check"
	}

	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error> {
		let ids = registry
			.columns()
			.iter()
			.map(|column| (column.id(), column.status()))
			.collect::<Vec<_>>();
		for (id, status) in ids {
			match status {
				ColumnStatus::Committed => registry.set_column_status(id, ColumnStatus::Proof),
				ColumnStatus::Precomputed => {
					registry.set_column_status(id, ColumnStatus::VerifyingKey)
				}
				ColumnStatus::Proof | ColumnStatus::VerifyingKey | ColumnStatus::Ignored => {}
			}
		}

		let queries = registry.unignored_queries();
		debug!(n_queries = queries.len(), "checking remaining queries directly");
		for id in queries {
			let round = registry.query(id).round();
			registry.register_verifier_action(round, CheckQuery { query: id });
			registry.mark_ignored(id);
		}
		Ok(())
	}
}

struct CheckQuery {
	query: QueryId,
}

impl<F: TwoAdicField> VerifierAction<F> for CheckQuery {
	fn run(&self, run: &VerifierRuntime<'_, F>) -> Result<(), VerificationError> {
		run.registry().query(self.query).check(run)
	}
}
