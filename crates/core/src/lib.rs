// Copyright 2024-2025 Irreducible Inc.

//! Wizard: a compiler for interactive oracle proofs over two-adic prime fields.
//!
//! A protocol is declared against a [`Registry`] as columns, random coins and queries spread over
//! rounds. [`compile`] runs a list of [`CompilerPass`]es that rewrite high-level queries into
//! simpler ones, then appends a direct check of whatever remains. [`prove`] and [`verify`] drive
//! the compiled protocol round by round, deriving every coin from a Fiat-Shamir [`Transcript`].

pub mod action;
pub mod coin;
pub mod column;
pub mod compiler;
mod error;
pub mod expression;
pub mod protocol;
pub mod query;
pub mod registry;
pub mod runtime;
pub mod transcript;

pub use action::{ProverAction, VerifierAction};
pub use coin::{CoinId, CoinKind, CoinValue};
pub use column::{Column, ColumnId, ColumnStatus};
pub use compiler::{
	CompilerPass, DirectCheck, LocalOpeningReducer, MultiPointToSinglePoint, PermutationCompiler,
	Splitter,
};
pub use error::{Error, VerificationError};
pub use expression::{Accessor, Expression, Variable};
pub use protocol::{
	compile, prove, prove_with_digest, verify, verify_with_digest, CompiledProtocol, Proof,
};
pub use query::{GrandProductInput, Query, QueryId, QueryParams};
pub use registry::Registry;
pub use runtime::{ProverRuntime, Runtime, VerifierRuntime};
pub use transcript::Transcript;
