// Copyright 2024-2025 Irreducible Inc.

use anyhow::Result;
use clap::{value_parser, Parser};
use tracing::info;
use wizard_core::{
	compile, prove, verify, Column, Expression, LocalOpeningReducer, Registry, Splitter,
};
use wizard_field::{Field, KoalaBear};
use wizard_utils::{rayon::adjust_thread_pool, tracing::init_tracing};

type F = KoalaBear;

#[derive(Debug, Parser)]
struct Args {
	/// Base-2 logarithm of the number of rows of the sequence.
	#[arg(long, default_value_t = 16, value_parser = value_parser!(u32).range(3..24))]
	log_size: u32,
	/// Base-2 logarithm of the shard size, at most the log size.
	#[arg(long, default_value_t = 10, value_parser = value_parser!(u32).range(1..24))]
	log_shard_size: u32,
	/// Row whose value is opened.
	#[arg(long, default_value_t = 42)]
	opened_row: usize,
}

fn main() -> Result<()> {
	adjust_thread_pool()
		.as_ref()
		.expect("failed to init thread pool");

	let args = Args::parse();
	init_tracing();

	let size = 1usize << args.log_size;
	let shard_size = 1usize << args.log_shard_size.min(args.log_size);
	let opened_row = args.opened_row % size;
	println!("Proving a Fibonacci sequence of {size} rows in shards of {shard_size}");

	let compiled = compile(
		|registry: &mut Registry<F>| {
			let p = Column::from(registry.add_column("FIB").committed(0, size)?);
			registry.add_global_constraint(
				"FIB_RECURRENCE",
				0,
				Expression::column(p)
					- Expression::column(p.shifted(-1))
					- Expression::column(p.shifted(-2)),
			)?;
			registry.add_local_constraint(
				"FIB_START",
				0,
				Expression::column(p) - Expression::one(),
			)?;
			registry.add_local_constraint(
				"FIB_SECOND",
				0,
				Expression::column(p.shifted(1)) - Expression::one(),
			)?;
			registry.local_opening_at("FIB_OPENED", 0, p, opened_row)?;
			Ok(())
		},
		&[&LocalOpeningReducer, &Splitter { shard_size }],
	)?;

	let mut values = vec![F::ONE, F::ONE];
	for i in 2..size {
		values.push(values[i - 1] + values[i - 2]);
	}
	let opened = values[opened_row];

	let registry = compiled.registry();
	let column = registry
		.column_by_name("FIB")
		.expect("column declared above");
	let opening = registry
		.query_by_name("FIB_OPENED")
		.expect("query declared above");
	let proof = prove(&compiled, |run| {
		run.assign_column(column, values)?;
		run.assign_local_opening(opening, opened)
	})?;
	info!(n_columns = proof.columns.len(), "proof generated");

	verify(&compiled, &proof)?;
	println!("Row {opened_row} holds {opened}");
	Ok(())
}
