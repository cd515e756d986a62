// Copyright 2023 Ulvetanna Inc.

use crate::env::boolean_env_flag_set;

/// Installs the global tracing subscriber.
///
/// Spans go to a CSV file when `PROFILE_CSV_FILE` is set. Otherwise a timing tree is printed
/// when the spans close, unless `PROFILE_NO_TREE` is set. Events are always formatted to stdout
/// and filtered through `RUST_LOG`.
pub fn init_tracing() {
	use std::env;

	use tracing_profile::{CsvLayer, PrintTreeConfig, PrintTreeLayer};
	use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer());

	#[cfg(feature = "tracy")]
	let registry = registry.with(tracing_tracy::TracyLayer::default());

	if let Ok(csv_path) = env::var("PROFILE_CSV_FILE") {
		let _ = registry.with(CsvLayer::new(csv_path)).try_init();
	} else if boolean_env_flag_set("PROFILE_NO_TREE") {
		let _ = registry.try_init();
	} else {
		let _ = registry
			.with(PrintTreeLayer::new(PrintTreeConfig {
				attention_above_percent: 25.0,
				relevant_above_percent: 2.5,
				hide_below_percent: 1.0,
				display_unaccounted: false,
			}))
			.try_init();
	};
}
