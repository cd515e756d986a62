// Copyright 2024-2025 Irreducible Inc.

use anyhow::{ensure, Result};
use clap::{value_parser, Parser};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use wizard_core::{
	compile, prove, verify, MultiPointToSinglePoint, PermutationCompiler, Registry,
};
use wizard_field::{Field, KoalaBear};
use wizard_math::interpolate_on_roots_of_unity;
use wizard_utils::{rayon::adjust_thread_pool, tracing::init_tracing};

type F = KoalaBear;

#[derive(Debug, Parser)]
struct Args {
	/// Base-2 logarithm of the number of rows of each table.
	#[arg(long, default_value_t = 14, value_parser = value_parser!(u32).range(1..24))]
	log_size: u32,
	/// Number of columns of each table.
	#[arg(long, default_value_t = 2, value_parser = value_parser!(u32).range(1..16))]
	width: u32,
	/// Factors packed into one running-product column.
	#[arg(long, default_value_t = 3)]
	arity: usize,
	/// Points at which the first column of the shuffled table is evaluated.
	#[arg(long, num_args = 1.., default_values_t = [5, 11])]
	points: Vec<u32>,
	#[arg(long, default_value_t = 0)]
	seed: u64,
}

fn main() -> Result<()> {
	adjust_thread_pool()
		.as_ref()
		.expect("failed to init thread pool");

	let args = Args::parse();
	init_tracing();
	ensure!(
		args.points.iter().all(|&x| args.points.iter().filter(|&&y| y == x).count() == 1),
		"evaluation points must be distinct"
	);

	let size = 1usize << args.log_size;
	let width = args.width as usize;
	println!("Proving a shuffle of {width} columns of {size} rows");

	let compiled = compile(
		|registry: &mut Registry<F>| {
			let a = (0..width)
				.map(|k| registry.add_column(format!("ORIGINAL_{k}")).committed(0, size))
				.collect::<Result<Vec<_>, _>>()?;
			let b = (0..width)
				.map(|k| registry.add_column(format!("SHUFFLED_{k}")).committed(0, size))
				.collect::<Result<Vec<_>, _>>()?;
			registry.add_permutation(
				"SHUFFLE",
				0,
				vec![a.iter().map(|&id| id.into()).collect()],
				vec![b.iter().map(|&id| id.into()).collect()],
			)?;
			for (i, _) in args.points.iter().enumerate() {
				registry.add_univariate_eval(format!("SHUFFLED_EVAL_{i}"), 0, vec![b[0].into()])?;
			}
			Ok(())
		},
		&[
			&PermutationCompiler { arity: args.arity },
			&MultiPointToSinglePoint { target_size: size },
		],
	)?;

	let mut rng = StdRng::seed_from_u64(args.seed);
	let original = (0..width)
		.map(|_| (0..size).map(|_| F::random(&mut rng)).collect::<Vec<_>>())
		.collect::<Vec<_>>();
	let mut order = (0..size).collect::<Vec<_>>();
	order.shuffle(&mut rng);
	let shuffled = original
		.iter()
		.map(|column| order.iter().map(|&i| column[i]).collect::<Vec<_>>())
		.collect::<Vec<_>>();
	let claims = args
		.points
		.iter()
		.map(|&x| {
			let x = F::new(x);
			Ok((x, interpolate_on_roots_of_unity(&shuffled[0], x)?))
		})
		.collect::<Result<Vec<_>>>()?;

	let registry = compiled.registry();
	let id = |name: String| registry.column_by_name(&name).expect("column declared above");
	let columns = (0..width)
		.map(|k| id(format!("ORIGINAL_{k}")))
		.zip(original)
		.chain((0..width).map(|k| id(format!("SHUFFLED_{k}"))).zip(shuffled))
		.collect::<Vec<_>>();
	let evals = (0..claims.len())
		.map(|i| {
			registry
				.query_by_name(&format!("SHUFFLED_EVAL_{i}"))
				.expect("query declared above")
		})
		.collect::<Vec<_>>();

	let proof = prove(&compiled, |run| {
		for (column, values) in columns {
			run.assign_column(column, values)?;
		}
		for (&eval, &(x, y)) in evals.iter().zip(&claims) {
			run.assign_univariate_eval(eval, x, vec![y])?;
		}
		Ok(())
	})?;
	verify(&compiled, &proof)?;
	println!("Verified a proof with {} parameters", proof.params.len());
	Ok(())
}
