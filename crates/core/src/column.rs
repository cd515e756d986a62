// Copyright 2024-2025 Irreducible Inc.

use std::fmt;

use getset::{CopyGetters, Getters};
use wizard_utils::checked_arithmetics::posmod;

/// Identifier of a natural column in a [`crate::registry::Registry`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub(crate) usize);

impl ColumnId {
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ColumnId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "column#{}", self.0)
	}
}

/// Visibility of a column towards the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnStatus {
	/// Assigned by the prover and committed to, the verifier never sees the values.
	Committed,
	/// Fixed at declaration time and known to both parties through the commitment.
	Precomputed,
	/// Sent in the clear as part of the proof.
	Proof,
	/// Fixed at declaration time and handed to the verifier directly.
	VerifyingKey,
	/// Superseded by a compiler pass, neither committed nor sent.
	Ignored,
}

impl ColumnStatus {
	/// Whether the transcript absorbs the column at the end of its round.
	pub const fn is_absorbed(self) -> bool {
		matches!(self, Self::Committed | Self::Proof)
	}

	/// Whether the values are fixed when the protocol is declared.
	pub const fn is_precomputed(self) -> bool {
		matches!(self, Self::Precomputed | Self::VerifyingKey)
	}
}

/// A natural column, as stored in the registry.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct ColumnInfo<F> {
	#[get_copy = "pub"]
	pub(crate) id: ColumnId,
	#[get = "pub"]
	pub(crate) name: String,
	#[get_copy = "pub"]
	pub(crate) round: usize,
	#[get_copy = "pub"]
	pub(crate) size: usize,
	#[get_copy = "pub"]
	pub(crate) status: ColumnStatus,
	/// Values of precomputed and verifying-key columns.
	#[get = "pub"]
	pub(crate) values: Option<Vec<F>>,
}

/// A view over a natural column, possibly cyclically shifted.
///
/// Row `i` of the view reads row `(i + shift) mod size` of the root column. Shifting a shifted
/// view adds the offsets, the size of a view is always the size of its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column {
	root: ColumnId,
	shift: isize,
}

impl Column {
	pub const fn new(root: ColumnId, shift: isize) -> Self {
		Self { root, shift }
	}

	pub const fn root(self) -> ColumnId {
		self.root
	}

	pub const fn shift(self) -> isize {
		self.shift
	}

	#[must_use]
	pub const fn shifted(self, offset: isize) -> Self {
		Self {
			root: self.root,
			shift: self.shift + offset,
		}
	}

	/// The row of the root column read at row `row` of this view.
	pub const fn root_row(self, row: usize, size: usize) -> usize {
		posmod(row as isize + self.shift, size)
	}

	/// Reads row `row` of this view out of the root column values.
	pub fn read<F: Copy>(self, values: &[F], row: usize) -> F {
		values[self.root_row(row, values.len())]
	}
}

impl From<ColumnId> for Column {
	fn from(root: ColumnId) -> Self {
		Self::new(root, 0)
	}
}
