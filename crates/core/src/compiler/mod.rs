// Copyright 2024-2025 Irreducible Inc.

//! Compiler passes rewriting high-level queries into lower-level ones.
//!
//! Each pass walks the queries it has not seen yet, registers the replacement declarations and
//! actions, and marks the rewritten queries as ignored. The canonical order is
//! [`LocalOpeningReducer`], [`PermutationCompiler`], [`Splitter`], [`MultiPointToSinglePoint`].

mod direct_check;
mod local_opening;
mod mpts;
mod permutation;
mod splitter;

use auto_impl::auto_impl;
pub use direct_check::DirectCheck;
pub use local_opening::LocalOpeningReducer;
pub use mpts::MultiPointToSinglePoint;
pub use permutation::PermutationCompiler;
pub use splitter::Splitter;
use wizard_field::TwoAdicField;

use crate::{error::Error, registry::Registry};

/// A rewrite of the protocol registry.
#[auto_impl(&, Box)]
pub trait CompilerPass<F: TwoAdicField> {
	/// Short name used in logs and errors.
	fn name(&self) -> &'static str;

	fn compile(&self, registry: &mut Registry<F>) -> Result<(), Error>;
}
