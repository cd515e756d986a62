// Copyright 2024-2025 Irreducible Inc.

//! The protocol registry: columns, coins, queries and actions, organised by round.
//!
//! Compiler passes take the registry by mutable reference and rewrite it in place. Every entity
//! lives in an arena and is referred to by a typed id, names are kept unique per entity kind.

mod error;

use std::collections::{BTreeMap, HashMap};

pub use error::Error;
use wizard_field::TwoAdicField;
use wizard_utils::bail;

use crate::{
	action::{ActionSlot, ProverAction, VerifierAction},
	coin::{CoinId, CoinInfo, CoinKind},
	column::{Column, ColumnId, ColumnInfo, ColumnStatus},
	expression::{Accessor, Expression, Variable},
	query::{
		GlobalConstraint, GrandProduct, GrandProductInput, LocalConstraint, LocalOpening,
		Permutation, Query, QueryId, QueryInfo, UnivariateEval,
	},
};

/// Builder returned by [`Registry::add_column`], picks how the column gets its values.
pub struct ColumnAddition<'a, F: TwoAdicField> {
	name: String,
	registry: &'a mut Registry<F>,
}

impl<F: TwoAdicField> ColumnAddition<'_, F> {
	/// A column assigned by the prover during `round` and committed to.
	pub fn committed(self, round: usize, size: usize) -> Result<ColumnId, Error> {
		self.with_status(round, size, ColumnStatus::Committed)
	}

	/// A column assigned by the prover during `round` and sent in the clear.
	pub fn proof(self, round: usize, size: usize) -> Result<ColumnId, Error> {
		self.with_status(round, size, ColumnStatus::Proof)
	}

	/// A column whose values are fixed by the protocol itself.
	pub fn precomputed(self, values: Vec<F>) -> Result<ColumnId, Error> {
		self.registry
			.insert_column(self.name, 0, values.len(), ColumnStatus::Precomputed, Some(values))
	}

	/// A column whose values are fixed by the protocol and handed to the verifier directly.
	pub fn verifying_key(self, values: Vec<F>) -> Result<ColumnId, Error> {
		self.registry
			.insert_column(self.name, 0, values.len(), ColumnStatus::VerifyingKey, Some(values))
	}

	pub fn with_status(
		self,
		round: usize,
		size: usize,
		status: ColumnStatus,
	) -> Result<ColumnId, Error> {
		self.registry
			.insert_column(self.name, round, size, status, None)
	}
}

/// Declarations of a protocol, mutated in place by the compiler passes.
pub struct Registry<F: TwoAdicField> {
	columns: Vec<ColumnInfo<F>>,
	coins: Vec<CoinInfo>,
	queries: Vec<QueryInfo<F>>,
	prover_actions: Vec<Vec<ActionSlot<dyn ProverAction<F>>>>,
	verifier_actions: Vec<Vec<ActionSlot<dyn VerifierAction<F>>>>,
	column_names: HashMap<String, ColumnId>,
	coin_names: HashMap<String, CoinId>,
	query_names: HashMap<String, QueryId>,
}

impl<F: TwoAdicField> Default for Registry<F> {
	fn default() -> Self {
		Self {
			columns: Vec::new(),
			coins: Vec::new(),
			queries: Vec::new(),
			prover_actions: Vec::new(),
			verifier_actions: Vec::new(),
			column_names: HashMap::new(),
			coin_names: HashMap::new(),
			query_names: HashMap::new(),
		}
	}
}

impl<F: TwoAdicField> Registry<F> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_column(&mut self, name: impl ToString) -> ColumnAddition<'_, F> {
		ColumnAddition {
			name: name.to_string(),
			registry: self,
		}
	}

	/// Registers a random coin drawn at the start of `round`.
	pub fn add_coin(
		&mut self,
		name: impl ToString,
		round: usize,
		kind: CoinKind,
	) -> Result<CoinId, Error> {
		let name = name.to_string();
		if round == 0 {
			bail!(Error::CoinAtRoundZero { name });
		}
		let empty = match kind {
			CoinKind::FieldVec(len) => len == 0,
			CoinKind::IntegerVec { count, modulus } => count == 0 || modulus == 0,
			CoinKind::Field | CoinKind::FieldFromSeed => false,
		};
		if empty {
			bail!(Error::ZeroSize { name });
		}
		if self.coin_names.contains_key(&name) {
			bail!(Error::DuplicateName { kind: "coin", name });
		}

		let id = CoinId(self.coins.len());
		self.coin_names.insert(name.clone(), id);
		self.coins.push(CoinInfo {
			id,
			name,
			round,
			kind,
		});
		self.reserve_round(round);
		Ok(id)
	}

	/// Registers an expression vanishing on every row of its domain.
	///
	/// Rows where a shifted column read leaves the domain are not checked.
	pub fn add_global_constraint(
		&mut self,
		name: impl ToString,
		round: usize,
		expr: Expression<F>,
	) -> Result<QueryId, Error> {
		self.add_global_constraint_with_bounds(name, round, expr, false)
	}

	/// Same as [`Self::add_global_constraint`], checking wrapped-around rows as well.
	pub fn add_global_constraint_no_bound_cancel(
		&mut self,
		name: impl ToString,
		round: usize,
		expr: Expression<F>,
	) -> Result<QueryId, Error> {
		self.add_global_constraint_with_bounds(name, round, expr, true)
	}

	fn add_global_constraint_with_bounds(
		&mut self,
		name: impl ToString,
		round: usize,
		expr: Expression<F>,
		no_bound_cancel: bool,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		let domain_size = self.validate_expression(&name, round, &expr)?;
		self.insert_query(
			name,
			round,
			Query::GlobalConstraint(GlobalConstraint {
				expr,
				domain_size,
				no_bound_cancel,
			}),
		)
	}

	/// Registers an expression vanishing on the first row of its domain.
	pub fn add_local_constraint(
		&mut self,
		name: impl ToString,
		round: usize,
		expr: Expression<F>,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		let domain_size = self.validate_expression(&name, round, &expr)?;
		self.insert_query(name, round, Query::LocalConstraint(LocalConstraint { expr, domain_size }))
	}

	/// Registers a claim on the first row of `column`.
	pub fn add_local_opening(
		&mut self,
		name: impl ToString,
		round: usize,
		column: impl Into<Column>,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		let column = column.into();
		self.validate_column(&name, round, column.root())?;
		self.insert_query(name, round, Query::LocalOpening(LocalOpening { column }))
	}

	/// Registers a claim on row `row` of `column`, as an opening of the shifted view.
	pub fn local_opening_at(
		&mut self,
		name: impl ToString,
		round: usize,
		column: impl Into<Column>,
		row: usize,
	) -> Result<QueryId, Error> {
		let column = column.into();
		self.add_local_opening(name, round, column.shifted(row as isize))
	}

	/// Registers a claim on the evaluations of `columns` at a common point.
	pub fn add_univariate_eval(
		&mut self,
		name: impl ToString,
		round: usize,
		columns: Vec<Column>,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		if columns.is_empty() {
			bail!(Error::EmptyQuery { name });
		}
		for (i, column) in columns.iter().enumerate() {
			self.validate_column(&name, round, column.root())?;
			if columns[..i].contains(column) {
				bail!(Error::DuplicatePolynomial {
					column: self.column_name(*column),
					name,
				});
			}
		}
		self.insert_query(name, round, Query::UnivariateEval(UnivariateEval { columns }))
	}

	/// Registers a claim that the rows of the `a` fragments are a permutation of the rows of the
	/// `b` fragments.
	pub fn add_permutation(
		&mut self,
		name: impl ToString,
		round: usize,
		a: Vec<Vec<Column>>,
		b: Vec<Vec<Column>>,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		let Some(width) = a.first().map(Vec::len) else {
			bail!(Error::EmptyQuery { name });
		};
		if width == 0 || b.is_empty() {
			bail!(Error::EmptyQuery { name });
		}
		for fragment in a.iter().chain(&b) {
			if fragment.len() != width {
				bail!(Error::FragmentWidthMismatch {
					name,
					expected: width,
					actual: fragment.len(),
				});
			}
			for column in fragment {
				self.validate_column(&name, round, column.root())?;
			}
			self.common_size(&name, fragment.iter().map(|column| column.root()))?;
		}
		self.insert_query(name, round, Query::Permutation(Permutation { a, b }))
	}

	/// Registers a grand product claim, inputs are grouped by column size.
	pub fn add_grand_product(
		&mut self,
		name: impl ToString,
		round: usize,
		inputs: BTreeMap<usize, GrandProductInput<F>>,
	) -> Result<QueryId, Error> {
		let name = name.to_string();
		if inputs.is_empty() {
			bail!(Error::EmptyQuery { name });
		}
		for (&size, input) in &inputs {
			for expr in input.numerators.iter().chain(&input.denominators) {
				let actual = self.validate_expression(&name, round, expr)?;
				if actual != size {
					bail!(Error::GrandProductSizeMismatch { name, size, actual });
				}
			}
		}
		self.insert_query(name, round, Query::GrandProduct(GrandProduct { inputs }))
	}

	pub fn register_prover_action(
		&mut self,
		round: usize,
		action: impl ProverAction<F> + 'static,
	) {
		let action: Box<dyn ProverAction<F>> = Box::new(action);
		self.reserve_round(round);
		self.prover_actions[round].push(ActionSlot::new(action));
	}

	pub fn register_verifier_action(
		&mut self,
		round: usize,
		action: impl VerifierAction<F> + 'static,
	) {
		let action: Box<dyn VerifierAction<F>> = Box::new(action);
		self.reserve_round(round);
		self.verifier_actions[round].push(ActionSlot::new(action));
	}

	/// Number of interaction rounds, one past the largest round of any declaration.
	pub fn num_rounds(&self) -> usize {
		let max_round = self
			.columns
			.iter()
			.map(|column| column.round)
			.chain(self.coins.iter().map(|coin| coin.round))
			.chain(self.queries.iter().map(|query| query.round))
			.max()
			.unwrap_or(0);
		(max_round + 1).max(self.prover_actions.len())
	}

	pub fn column(&self, id: ColumnId) -> &ColumnInfo<F> {
		&self.columns[id.0]
	}

	pub fn columns(&self) -> &[ColumnInfo<F>] {
		&self.columns
	}

	pub fn column_by_name(&self, name: &str) -> Option<ColumnId> {
		self.column_names.get(name).copied()
	}

	/// Display name of a possibly shifted view.
	pub fn column_name(&self, column: Column) -> String {
		let name = &self.columns[column.root().0].name;
		match column.shift() {
			0 => name.clone(),
			shift => format!("{name}_SHIFT_{shift}"),
		}
	}

	pub fn coin(&self, id: CoinId) -> &CoinInfo {
		&self.coins[id.0]
	}

	pub fn coins(&self) -> &[CoinInfo] {
		&self.coins
	}

	pub fn coin_by_name(&self, name: &str) -> Option<CoinId> {
		self.coin_names.get(name).copied()
	}

	pub fn query(&self, id: QueryId) -> &QueryInfo<F> {
		&self.queries[id.0]
	}

	pub fn queries(&self) -> &[QueryInfo<F>] {
		&self.queries
	}

	pub fn query_by_name(&self, name: &str) -> Option<QueryId> {
		self.query_names.get(name).copied()
	}

	/// Ids of the queries not yet rewritten by a pass, in registration order.
	pub fn unignored_queries(&self) -> Vec<QueryId> {
		self.queries
			.iter()
			.filter(|query| !query.ignored)
			.map(|query| query.id)
			.collect()
	}

	pub fn prover_actions(&self, round: usize) -> &[ActionSlot<dyn ProverAction<F>>] {
		self.prover_actions.get(round).map_or(&[], Vec::as_slice)
	}

	pub fn verifier_actions(&self, round: usize) -> &[ActionSlot<dyn VerifierAction<F>>] {
		self.verifier_actions.get(round).map_or(&[], Vec::as_slice)
	}

	pub fn set_column_status(&mut self, id: ColumnId, status: ColumnStatus) {
		self.columns[id.0].status = status;
	}

	pub fn mark_ignored(&mut self, id: QueryId) {
		self.queries[id.0].ignored = true;
	}

	pub fn skip_prover_action(&mut self, round: usize, index: usize) {
		self.prover_actions[round][index].skipped = true;
	}

	pub fn skip_verifier_action(&mut self, round: usize, index: usize) {
		self.verifier_actions[round][index].skipped = true;
	}

	/// Checks an expression against the declarations and returns its domain size.
	///
	/// Every column read must be declared no later than `round` and all of them must share one
	/// size. Coins must be scalar and accessors must point at parametrized queries of the right
	/// kind.
	pub fn validate_expression(
		&self,
		name: &str,
		round: usize,
		expr: &Expression<F>,
	) -> Result<usize, Error> {
		for column in expr.columns() {
			self.validate_column(name, round, column.root())?;
		}
		let domain_size = self.common_size(name, expr.columns().map(Column::root))?;

		for var in expr.vars() {
			match *var {
				Variable::Column(_) => {}
				Variable::Coin(id) => {
					let coin = self.coins.get(id.0).ok_or(Error::UnknownCoin(id))?;
					check_round(name, round, &coin.name, coin.round)?;
					if !coin.kind.is_scalar() {
						bail!(Error::NonScalarCoin {
							name: name.to_string(),
							coin: coin.name.clone(),
						});
					}
				}
				Variable::Accessor(accessor) => self.validate_accessor(name, round, accessor)?,
				Variable::PeriodicSample { period, offset } => {
					if period == 0 || offset >= period || domain_size % period != 0 {
						bail!(Error::InvalidPeriodicSample {
							name: name.to_string(),
							period,
							offset,
							domain_size,
						});
					}
				}
			}
		}
		Ok(domain_size)
	}

	fn validate_accessor(&self, name: &str, round: usize, accessor: Accessor) -> Result<(), Error> {
		let id = accessor.query();
		let query = self.queries.get(id.0).ok_or(Error::UnknownQuery(id))?;
		check_round(name, round, &query.name, query.round)?;
		let matches = match (accessor, &query.query) {
			(Accessor::LocalOpening(_), Query::LocalOpening(_)) => true,
			(Accessor::GrandProduct(_), Query::GrandProduct(_)) => true,
			(Accessor::UnivariateEval { index, .. }, Query::UnivariateEval(eval)) => {
				index < eval.columns.len()
			}
			_ => false,
		};
		if !matches {
			bail!(Error::AccessorKindMismatch {
				name: name.to_string(),
				query: query.name.clone(),
			});
		}
		Ok(())
	}

	fn validate_column(&self, name: &str, round: usize, id: ColumnId) -> Result<(), Error> {
		let column = self.columns.get(id.0).ok_or(Error::UnknownColumn(id))?;
		check_round(name, round, &column.name, column.round)
	}

	fn common_size(
		&self,
		name: &str,
		columns: impl IntoIterator<Item = ColumnId>,
	) -> Result<usize, Error> {
		let mut size = None;
		for id in columns {
			let column_size = self.columns[id.0].size;
			match size {
				None => size = Some(column_size),
				Some(first) if first != column_size => {
					bail!(Error::HeterogeneousDomain {
						name: name.to_string(),
						first,
						second: column_size,
					});
				}
				Some(_) => {}
			}
		}
		size.ok_or_else(|| Error::EmptyDomain {
			name: name.to_string(),
		})
	}

	fn insert_column(
		&mut self,
		name: String,
		round: usize,
		size: usize,
		status: ColumnStatus,
		values: Option<Vec<F>>,
	) -> Result<ColumnId, Error> {
		if !size.is_power_of_two() {
			bail!(Error::NonPowerOfTwoSize { name, size });
		}
		if self.column_names.contains_key(&name) {
			bail!(Error::DuplicateName {
				kind: "column",
				name,
			});
		}

		let id = ColumnId(self.columns.len());
		self.column_names.insert(name.clone(), id);
		self.columns.push(ColumnInfo {
			id,
			name,
			round,
			size,
			status,
			values,
		});
		self.reserve_round(round);
		Ok(id)
	}

	fn insert_query(&mut self, name: String, round: usize, query: Query<F>) -> Result<QueryId, Error> {
		if self.query_names.contains_key(&name) {
			bail!(Error::DuplicateName {
				kind: "query",
				name,
			});
		}

		let id = QueryId(self.queries.len());
		self.query_names.insert(name.clone(), id);
		self.queries.push(QueryInfo {
			id,
			name,
			round,
			query,
			ignored: false,
		});
		self.reserve_round(round);
		Ok(id)
	}

	/// Keeps the per-round action tables at least `round + 1` long.
	fn reserve_round(&mut self, round: usize) {
		if self.prover_actions.len() <= round {
			self.prover_actions.resize_with(round + 1, Vec::new);
			self.verifier_actions.resize_with(round + 1, Vec::new);
		}
	}
}

fn check_round(
	name: &str,
	round: usize,
	dependency: &str,
	dependency_round: usize,
) -> Result<(), Error> {
	if dependency_round > round {
		bail!(Error::RoundViolation {
			name: name.to_string(),
			round,
			dependency: dependency.to_string(),
			dependency_round,
		});
	}
	Ok(())
}
