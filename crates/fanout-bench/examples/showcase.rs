//! Runs the sample transforms through each engine and prints the results.
//!
//! Set `RUST_LOG=fanout_engine=debug` to see dispatch events.

use std::fmt::Display;
use std::process;

use fanout_core::EngineError;
use fanout_engine::Engine;
use fanout_test_utils::{add, eval_tup, eval_tup_fast, fraction, sample_input, square, Tup};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_row<T: Display>(label: &str, values: impl IntoIterator<Item = T>) {
    println!("{label}");
    for v in values {
        print!("{v} ");
    }
    println!("END\n");
}

fn show_tup(t: &Tup) -> String {
    format!("({},{})", t.orig, t.orig_times_2)
}

fn run() -> Result<(), EngineError> {
    let engine = Engine::default();
    info!(workers = engine.worker_count(), "engine ready");
    let input = sample_input(10);

    let mut squares = vec![0; input.len()];
    engine.map(&input, &mut squares, square)?;
    print_row("Test 1: square", &squares);

    let mut fractions = vec![0.0f32; input.len()];
    engine.map(&input, &mut fractions, fraction)?;
    print_row("Test 2: 1/x", fractions.iter().map(|f| format!("{f:.6}")));

    let mut tups = vec![Tup::default(); input.len()];
    engine.map(&input, &mut tups, eval_tup)?;
    print_row("Test 3: orig and orig*2 struct", tups.iter().map(show_tup));

    let mut fast = vec![Tup::default(); input.len()];
    engine.map_fast(&input, &mut fast, eval_tup_fast)?;
    print_row(
        "Test 4: orig and orig*2 struct - MAP FAST",
        fast.iter().map(show_tup),
    );

    let table = engine.tabulate(input.len(), |i| i * 3)?;
    print_row("Test 5: tabulate 3i", &table);

    let sum = engine.reduce(&input, add)?;
    println!("Test 6: reduce sum\n{sum} END\n");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("showcase failed: {e}");
        process::exit(1);
    }
}
