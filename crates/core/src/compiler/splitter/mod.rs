// Copyright 2024-2025 Irreducible Inc.

//! Splitting of large columns into shards of a fixed size.
//!
//! A column of size `N ≥ S` is replaced by `n = N / S` shards, shard `i` holding rows
//! `[i·S, (i + 1)·S)`. Every query over split columns is rewritten to read shards instead:
//!
//! * A global constraint is replayed once per shard. A read at shift `k` from shard `slot`
//!   becomes a read of shard `slot + trunc(k / S)` at the remaining inner shift, which keeps the
//!   sign of `k`. Rows where an inner shift wraps around the shard no longer read the right
//!   values, they are checked by local constraints pinned at their absolute row instead.
//! * A local constraint is pinned at row zero of the shards.
//! * A local opening is moved to the shard holding its row.

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, instrument};
use wizard_field::TwoAdicField;
use wizard_utils::{bail, checked_arithmetics::posmod};

use super::CompilerPass;
use crate::{
	action::{ProverAction, VerifierAction},
	column::{Column, ColumnId, ColumnStatus},
	error::{Error, VerificationError},
	expression::{Expression, Substitute, Variable},
	query::{GlobalConstraint, LocalConstraint, LocalOpening, Query, QueryId},
	registry::Registry,
	runtime::{ProverRuntime, Runtime, VerifierRuntime},
};

/// Splits every column of size at least `shard_size` into shards of that size.
///
/// Smaller columns cannot be split and are published instead: committed columns are sent in
/// the proof, precomputed ones join the verifying key.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
	pub shard_size: usize,
}

impl<F: TwoAdicField> CompilerPass<F> for Splitter {
	fn name(&self) -> &'static str {
		"splitter"
	}

	#[instrument(skip_all, name = "Splitter::compile", level = "debug")]
	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error> {
		if !self.shard_size.is_power_of_two() {
			bail!(self.error(format!("shard size {} is not a power of two", self.shard_size)));
		}

		let shards = self.split_columns(registry)?;
		let ctx = SplitCtx {
			shard_size: self.shard_size,
			shards: &shards,
		};

		let mut n_rewritten = 0;
		for id in registry.unignored_queries() {
			let query = registry.query(id);
			let name = query.name().clone();
			let round = query.round();
			let rewritten = match query.query().clone() {
				Query::GlobalConstraint(constraint) if constraint.domain_size >= self.shard_size => {
					ctx.split_global(registry, &name, round, &constraint)?;
					true
				}
				Query::LocalConstraint(LocalConstraint { expr, domain_size })
					if domain_size >= self.shard_size =>
				{
					let pinned = ctx.pin_local(&expr, domain_size, 0);
					registry.add_local_constraint(format!("{name}_SPLIT"), round, pinned)?;
					true
				}
				Query::LocalOpening(LocalOpening { column }) if ctx.is_split(column) => {
					let located = ctx.locate(registry, column);
					let split = registry.add_local_opening(format!("{name}_SPLIT"), round, located)?;
					registry.register_prover_action(
						round,
						CopyOpening {
							from: id,
							to: split,
						},
					);
					registry.register_verifier_action(
						round,
						CheckOpeningCopy {
							from: id,
							to: split,
						},
					);
					true
				}
				Query::UnivariateEval(_) | Query::Permutation(_) | Query::GrandProduct(_) => {
					if let Some(column) = query.query().columns().into_iter().find(|&c| ctx.is_split(c)) {
						bail!(self.error(format!(
							"{} {name} reads the split column {}, compile it before splitting",
							query.query().kind(),
							registry.column_name(column),
						)));
					}
					false
				}
				_ => false,
			};
			if rewritten {
				registry.mark_ignored(id);
				n_rewritten += 1;
			}
		}

		info!(
			shard_size = self.shard_size,
			n_split = shards.len(),
			n_rewritten,
			"split columns"
		);
		Ok(())
	}
}

impl Splitter {
	fn error(&self, reason: String) -> Error {
		Error::Compilation {
			pass: "splitter",
			reason,
		}
	}

	/// Registers the shards of every large column and publishes the small ones.
	fn split_columns<F: TwoAdicField>(
		&self,
		registry: &mut Registry<F>,
	) -> Result<HashMap<ColumnId, Vec<ColumnId>>, Error> {
		let shard_size = self.shard_size;
		let columns = registry
			.columns()
			.iter()
			.filter(|column| column.status() != ColumnStatus::Ignored)
			.map(|column| column.id())
			.collect::<Vec<_>>();

		let mut shards = HashMap::new();
		let mut by_round = HashMap::<usize, Vec<(ColumnId, Vec<ColumnId>)>>::new();
		let mut n_published = 0;
		for id in columns {
			let column = registry.column(id);
			let (name, round, size, status) =
				(column.name().clone(), column.round(), column.size(), column.status());

			if size < shard_size {
				let published = match status {
					ColumnStatus::Committed => ColumnStatus::Proof,
					ColumnStatus::Precomputed => ColumnStatus::VerifyingKey,
					status => status,
				};
				if published != status {
					debug!(column = %name, size, "column too small to split, publishing it");
					registry.set_column_status(id, published);
					n_published += 1;
				}
				continue;
			}
			if size % shard_size != 0 {
				bail!(self.error(format!(
					"column {name} of size {size} is not a multiple of the shard size {shard_size}"
				)));
			}

			let n = size / shard_size;
			let values = column.values().clone();
			let mut column_shards = Vec::with_capacity(n);
			for i in 0..n {
				let addition = registry.add_column(format!("{name}_SUBSLICE_{i}_OVER_{n}"));
				let shard = match &values {
					Some(values) => {
						let chunk = values[i * shard_size..(i + 1) * shard_size].to_vec();
						match status {
							ColumnStatus::VerifyingKey => addition.verifying_key(chunk)?,
							_ => addition.precomputed(chunk)?,
						}
					}
					None => addition.with_status(round, shard_size, status)?,
				};
				column_shards.push(shard);
			}
			registry.set_column_status(id, ColumnStatus::Ignored);
			if values.is_none() {
				by_round
					.entry(round)
					.or_default()
					.push((id, column_shards.clone()));
			}
			shards.insert(id, column_shards);
		}

		let mut rounds = by_round.into_iter().collect::<Vec<_>>();
		rounds.sort_unstable_by_key(|(round, _)| *round);
		for (round, columns) in rounds {
			registry.register_prover_action(round, AssignShards { shard_size, columns });
		}
		if !shards.is_empty() {
			let last_round = registry.num_rounds() - 1;
			let parents = shards.keys().copied().collect();
			registry.register_prover_action(last_round, FreeColumns { columns: parents });
		}
		debug!(n_published, "published small columns");
		Ok(shards)
	}
}

struct SplitCtx<'a> {
	shard_size: usize,
	shards: &'a HashMap<ColumnId, Vec<ColumnId>>,
}

impl SplitCtx<'_> {
	fn is_split(&self, column: Column) -> bool {
		self.shards.contains_key(&column.root())
	}

	fn shards_of(&self, column: Column) -> &[ColumnId] {
		self.shards
			.get(&column.root())
			.unwrap_or_else(|| panic!("column {} was not split", column.root()))
	}

	/// The shard view holding row zero of `column`.
	fn locate<F: TwoAdicField>(&self, registry: &Registry<F>, column: Column) -> Column {
		let size = registry.column(column.root()).size();
		let pos = posmod(column.shift(), size);
		let shards = self.shards_of(column);
		Column::new(shards[pos / self.shard_size], (pos % self.shard_size) as isize)
	}

	/// Rewrites `expr` to be evaluated at row zero instead of the absolute row `row`.
	///
	/// Periodic samples are resolved to constants, the result is a local constraint over shards.
	fn pin_local<F: TwoAdicField>(
		&self,
		expr: &Expression<F>,
		domain_size: usize,
		row: usize,
	) -> Expression<F> {
		expr.substitute(|var| match *var {
			Variable::Column(column) => {
				let off = posmod(column.shift() + row as isize, domain_size);
				let shards = self.shards_of(column);
				Substitute::Variable(Variable::Column(Column::new(
					shards[off / self.shard_size],
					(off % self.shard_size) as isize,
				)))
			}
			Variable::PeriodicSample { period, offset } => {
				Substitute::Constant(if row % period == offset {
					F::ONE
				} else {
					F::ZERO
				})
			}
			other => Substitute::Variable(other),
		})
	}

	/// Replays a global constraint on every shard, pinning the rows the replay cannot check.
	fn split_global<F: TwoAdicField>(
		&self,
		registry: &mut Registry<F>,
		name: &str,
		round: usize,
		constraint: &GlobalConstraint<F>,
	) -> Result<(), Error> {
		let GlobalConstraint {
			expr,
			domain_size,
			no_bound_cancel,
		} = constraint;
		let (domain_size, no_bound_cancel) = (*domain_size, *no_bound_cancel);
		let shard_size = self.shard_size;
		let n = domain_size / shard_size;
		let (min, max) = expr.shift_range().unwrap_or((0, 0));
		let is_active = |row: usize| {
			no_bound_cancel
				|| (row as isize + min.min(0) >= 0 && row as isize + max.max(0) < domain_size as isize)
		};

		let mut n_pinned = 0;
		let mut pin = |registry: &mut Registry<F>, row: usize| -> Result<(), Error> {
			if is_active(row) {
				registry.add_local_constraint(
					format!("{name}_SPLIT_BOUNDARY_{row}"),
					round,
					self.pin_local(expr, domain_size, row),
				)?;
				n_pinned += 1;
			}
			Ok(())
		};

		for slot in 0..n {
			let mut wraps = false;
			let replay = expr.substitute(|var| match *var {
				Variable::Column(column) => {
					let shift = column.shift();
					let hop = shift / shard_size as isize;
					let inner = shift - hop * shard_size as isize;
					let target = slot as isize + hop;
					wraps |= target < 0 || target >= n as isize;
					let shards = self.shards_of(column);
					Substitute::Variable(Variable::Column(Column::new(
						shards[posmod(target, n)],
						inner,
					)))
				}
				Variable::PeriodicSample { period, offset } if period > shard_size => {
					let start = slot * shard_size % period;
					if (start..start + shard_size).contains(&offset) {
						Substitute::Variable(Variable::PeriodicSample {
							period: shard_size,
							offset: offset - start,
						})
					} else {
						Substitute::Constant(F::ZERO)
					}
				}
				other => Substitute::Variable(other),
			});

			if wraps && !no_bound_cancel {
				// reads leave the protocol edge, pin every row of the shard
				for j in 0..shard_size {
					pin(registry, slot * shard_size + j)?;
				}
				continue;
			}

			let (inner_min, inner_max) = replay.shift_range().unwrap_or((0, 0));
			let boundary = (0..(-inner_min).max(0) as usize)
				.chain(shard_size.saturating_sub(inner_max.max(0) as usize)..shard_size)
				.collect::<BTreeSet<_>>();
			registry.add_global_constraint(format!("{name}_SPLIT_{slot}_OVER_{n}"), round, replay)?;
			for j in boundary {
				pin(registry, slot * shard_size + j)?;
			}
		}

		debug!(query = name, n_shards = n, n_pinned, "split global constraint");
		Ok(())
	}
}

/// Copies the rows of parent columns into their shards.
struct AssignShards {
	shard_size: usize,
	columns: Vec<(ColumnId, Vec<ColumnId>)>,
}

impl<F: TwoAdicField> ProverAction<F> for AssignShards {
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		for (parent, shards) in &self.columns {
			let chunks = run
				.column(*parent)?
				.chunks(self.shard_size)
				.map(<[F]>::to_vec)
				.collect::<Vec<_>>();
			for (&shard, chunk) in shards.iter().zip(chunks) {
				run.assign_column(shard, chunk)?;
			}
		}
		Ok(())
	}
}

/// Releases columns whose values live on in their shards.
struct FreeColumns {
	columns: Vec<ColumnId>,
}

impl<F: TwoAdicField> ProverAction<F> for FreeColumns {
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		for &column in &self.columns {
			run.free_column(column);
		}
		Ok(())
	}
}

struct CopyOpening {
	from: QueryId,
	to: QueryId,
}

impl<F: TwoAdicField> ProverAction<F> for CopyOpening {
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error> {
		let y = run.local_opening_y(self.from)?;
		run.assign_local_opening(self.to, y)
	}
}

struct CheckOpeningCopy {
	from: QueryId,
	to: QueryId,
}

impl<F: TwoAdicField> VerifierAction<F> for CheckOpeningCopy {
	fn run(&self, run: &VerifierRuntime<'_, F>) -> Result<(), VerificationError> {
		let claimed = run.local_opening_y(self.from)?;
		let actual = run.local_opening_y(self.to)?;
		if claimed != actual {
			return Err(VerificationError::OpeningMismatch {
				query: run.registry().query(self.from).name().clone(),
				claimed: claimed.to_string(),
				actual: actual.to_string(),
			});
		}
		Ok(())
	}
}
