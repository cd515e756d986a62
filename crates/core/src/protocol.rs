// Copyright 2024-2025 Irreducible Inc.

//! Entry points: compile a protocol declaration, prove and verify it.

use digest::Digest;
use groestl_crypto::Groestl256;
use tracing::{debug, info, instrument};
use wizard_field::TwoAdicField;

use crate::{
	column::ColumnId,
	compiler::{CompilerPass, DirectCheck},
	error::Error,
	query::{QueryId, QueryParams},
	registry::Registry,
	runtime::{ProverRuntime, VerifierRuntime},
	transcript::Transcript,
};

/// What the prover sends: the columns visible to the verifier and every query parameter.
///
/// Parameters are ordered by the round of their query, then by registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<F> {
	pub columns: Vec<(ColumnId, Vec<F>)>,
	pub params: Vec<(QueryId, QueryParams<F>)>,
}

/// A registry rewritten by the compiler passes, ready to be proved and verified.
pub struct CompiledProtocol<F: TwoAdicField> {
	registry: Registry<F>,
}

impl<F: TwoAdicField> CompiledProtocol<F> {
	pub const fn registry(&self) -> &Registry<F> {
		&self.registry
	}
}

/// Declares a protocol through `define` and compiles it.
///
/// The passes run in the given order. A final direct check is always appended: it publishes
/// every remaining column and checks every remaining query on the verifier side.
#[instrument(skip_all, name = "wizard::compile", level = "debug")]
pub fn compile<F, D>(define: D, passes: &[&dyn CompilerPass<F>]) -> Result<CompiledProtocol<F>, Error>
where
	F: TwoAdicField,
	D: FnOnce(&mut Registry<F>) -> Result<(), Error>,
{
	let mut registry = Registry::new();
	define(&mut registry)?;

	for pass in passes {
		apply_pass(*pass, &mut registry)?;
	}
	apply_pass(&DirectCheck, &mut registry)?;

	info!(
		n_rounds = registry.num_rounds(),
		n_columns = registry.columns().len(),
		n_coins = registry.coins().len(),
		n_queries = registry.queries().len(),
		"compiled protocol"
	);
	Ok(CompiledProtocol { registry })
}

fn apply_pass<F: TwoAdicField>(
	pass: &dyn CompilerPass<F>,
	registry: &mut Registry<F>,
) -> Result<(), Error> {
	pass.compile(registry)?;
	debug!(
		pass = pass.name(),
		n_columns = registry.columns().len(),
		n_queries = registry.queries().len(),
		"applied compiler pass"
	);
	Ok(())
}

/// Runs the prover with the default Grøstl-256 transcript.
pub fn prove<F, A>(compiled: &CompiledProtocol<F>, assign: A) -> Result<Proof<F>, Error>
where
	F: TwoAdicField,
	A: FnOnce(&mut ProverRuntime<'_, F>) -> Result<(), Error>,
{
	prove_with_digest::<F, Groestl256, A>(compiled, assign)
}

/// Runs the prover.
///
/// `assign` fills the columns and parameters of round zero. Later rounds are driven by the
/// prover actions of the registry, between rounds the transcript absorbs the messages of the
/// finished round and draws the coins of the next one.
#[instrument(skip_all, name = "wizard::prove", level = "debug")]
pub fn prove_with_digest<F, H, A>(compiled: &CompiledProtocol<F>, assign: A) -> Result<Proof<F>, Error>
where
	F: TwoAdicField,
	H: Digest,
	A: FnOnce(&mut ProverRuntime<'_, F>) -> Result<(), Error>,
{
	let registry = compiled.registry();
	let mut transcript = Transcript::<H>::new();
	let mut run = ProverRuntime::new(registry);
	assign(&mut run)?;

	for round in 0..registry.num_rounds() {
		if round > 0 {
			run.go_next_round(&mut transcript)?;
		}
		for slot in registry.prover_actions(round) {
			if !slot.is_skipped() {
				slot.action().run(&mut run)?;
			}
		}
	}
	run.check_round_complete()?;

	let proof = run.into_proof()?;
	info!(
		n_columns = proof.columns.len(),
		n_params = proof.params.len(),
		"generated proof"
	);
	Ok(proof)
}

/// Runs the verifier with the default Grøstl-256 transcript.
pub fn verify<F: TwoAdicField>(compiled: &CompiledProtocol<F>, proof: &Proof<F>) -> Result<(), Error> {
	verify_with_digest::<F, Groestl256>(compiled, proof)
}

/// Runs the verifier, replaying the transcript of the prover round by round.
///
/// Verifier actions of a round run once its coins are drawn, the first failure is returned.
#[instrument(skip_all, name = "wizard::verify", level = "debug")]
pub fn verify_with_digest<F, H>(compiled: &CompiledProtocol<F>, proof: &Proof<F>) -> Result<(), Error>
where
	F: TwoAdicField,
	H: Digest,
{
	let registry = compiled.registry();
	let mut transcript = Transcript::<H>::new();
	let mut run = VerifierRuntime::new(registry, proof)?;

	for round in 0..registry.num_rounds() {
		if round > 0 {
			run.go_next_round(&mut transcript)?;
		}
		for slot in registry.verifier_actions(round) {
			if !slot.is_skipped() {
				slot.action().run(&run)?;
			}
		}
	}
	Ok(())
}
