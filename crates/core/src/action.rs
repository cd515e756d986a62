// Copyright 2024-2025 Irreducible Inc.

//! Prover and verifier actions, the code a compiler pass attaches to a round.

use wizard_field::TwoAdicField;

use crate::{
	error::{Error, VerificationError},
	runtime::{ProverRuntime, VerifierRuntime},
};

/// Work the prover performs during a round, typically assigning columns and query parameters.
pub trait ProverAction<F: TwoAdicField>: Send + Sync {
	fn run(&self, run: &mut ProverRuntime<'_, F>) -> Result<(), Error>;
}

/// A check the verifier performs once the transcript is replayed.
pub trait VerifierAction<F: TwoAdicField>: Send + Sync {
	fn run(&self, run: &VerifierRuntime<'_, F>) -> Result<(), VerificationError>;
}

/// An action registered at a round, together with its skip flag.
///
/// A later pass may take over the work of an action, skipping it keeps the registration order
/// of the others intact.
pub struct ActionSlot<A: ?Sized> {
	action: Box<A>,
	pub(crate) skipped: bool,
}

impl<A: ?Sized> ActionSlot<A> {
	pub(crate) fn new(action: Box<A>) -> Self {
		Self {
			action,
			skipped: false,
		}
	}

	pub fn action(&self) -> &A {
		&self.action
	}

	pub const fn is_skipped(&self) -> bool {
		self.skipped
	}
}
