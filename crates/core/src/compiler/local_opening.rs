// Copyright 2024-2025 Irreducible Inc.

use tracing::{debug, instrument};
use wizard_field::TwoAdicField;

use super::CompilerPass;
use crate::{
	error::Error,
	expression::{Accessor, Expression},
	query::{LocalOpening, Query},
	registry::Registry,
};

/// Turns every local opening into a local constraint binding the column to the claimed value.
///
/// The opening stays in the registry, marked as ignored, so its parameter is still sent and
/// absorbed by the transcript.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOpeningReducer;

impl<F: TwoAdicField> CompilerPass<F> for LocalOpeningReducer {
	fn name(&self) -> &'static str {
		"local opening reducer"
	}

	#[instrument(skip_all, name = "LocalOpeningReducer::compile", level = "debug")]
	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error> {
		let mut n_reduced = 0;
		for id in registry.unignored_queries() {
			let query = registry.query(id);
			let Query::LocalOpening(LocalOpening { column }) = *query.query() else {
				continue;
			};
			let name = format!("{}_REDUCED", query.name());
			let round = query.round();

			let expr = Expression::column(column) - Expression::accessor(Accessor::LocalOpening(id));
			registry.add_local_constraint(name, round, expr)?;
			registry.mark_ignored(id);
			n_reduced += 1;
		}
		debug!(n_reduced, "reduced local openings");
		Ok(())
	}
}
