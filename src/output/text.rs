//! Human-readable text output

use crate::config::{Config, StrategyConfig};
use crate::harness::EntropyMetrics;
use crate::report::normalize_results;
use std::fmt;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────────────────";

/// Print the effective configuration before a run
pub fn print_configuration(config: &Config) {
    println!("Configuration:");
    println!("  Universe size:  {} ids", format_number(config.benchmark.universe_size));
    println!("  Batches:        {} per strategy", format_number(config.benchmark.n_batches as u64));
    println!("  Batch size:     {}", config.loader.batch_size);
    match config.benchmark.seed {
        Some(seed) => println!("  Seed:           {}", seed),
        None => println!("  Seed:           (entropy)"),
    }
    println!("  Strategies:");
    for strategy in &config.strategies {
        if strategy.description.is_empty() {
            println!("    - {}", strategy);
        } else {
            println!("    - {}: {}", strategy, strategy.description);
        }
    }
    if let Some(path) = &config.output.json_path {
        println!("  JSON report:    {}", path.display());
    }
}

/// Print raw and normalized entropy tables to stdout
pub fn print_results(results: &[EntropyMetrics], strategies: &[StrategyConfig]) {
    print!("{}", ResultsTable::new(results, strategies));
}

/// Raw and normalized entropy tables followed by an interpretation guide
///
/// Normalized scores need both a `random` and a `sequential` record; without them a
/// warning replaces the normalized table. The guide lists every strategy that carries
/// a description.
pub struct ResultsTable<'a> {
    results: &'a [EntropyMetrics],
    strategies: &'a [StrategyConfig],
}

impl<'a> ResultsTable<'a> {
    pub fn new(results: &'a [EntropyMetrics], strategies: &'a [StrategyConfig]) -> Self {
        Self { results, strategies }
    }

    fn write_raw(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Raw Entropy Metrics:")?;
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(
            f,
            "{:<15} {:>16} {:>16} {:>10} {:>12} {:>10}",
            "Strategy", "Within-Batch L1", "Across-Batch L1", "Batches", "IDs", "Time"
        )?;
        writeln!(f, "{}", THIN_RULE)?;
        for r in self.results {
            writeln!(
                f,
                "{:<15} {:>16.1} {:>16.1} {:>10} {:>12} {:>9.2}s",
                r.strategy,
                r.within_batch_l1,
                r.across_batch_l1,
                format_number(r.n_batches as u64),
                format_number(r.total_ids as u64),
                r.measurement_time.as_secs_f64()
            )?;
        }
        Ok(())
    }

    fn write_normalized(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        let scores = match normalize_results(self.results) {
            Ok(scores) => scores,
            Err(e) => return writeln!(f, "Warning: {}, skipping normalized scores", e),
        };

        writeln!(f, "Normalized Entropy Scores [0=Sequential, 1=Random]:")?;
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(
            f,
            "{:<15} {:>16} {:>16}",
            "Strategy", "Within-Batch L1", "Across-Batch L1"
        )?;
        writeln!(f, "{}", THIN_RULE)?;
        for s in &scores {
            writeln!(
                f,
                "{:<15} {:>16.3} {:>16.3}",
                s.strategy, s.within_batch, s.across_batch
            )?;
        }
        Ok(())
    }

    fn write_guide(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "INTERPRETATION GUIDE:")?;
        writeln!(f, "  Within-Batch: how dispersed the ids are within each batch")?;
        writeln!(f, "  Across-Batch: how much batch composition changes between batches")?;
        writeln!(f, "  L1 Distance:  mean absolute difference between sampled id pairs")?;
        for strategy in self.strategies {
            if !strategy.description.is_empty() {
                let label = format!("{}:", strategy.name);
                writeln!(f, "  {:<13} {}", label, strategy.description)?;
            }
        }
        writeln!(f, "  {:<13} uniform draw from the whole universe", "Random:")?;
        writeln!(f, "  Scores near 0 look sequential, near 1 look random")?;
        writeln!(f, "  Scores may fall outside [0, 1] when a strategy beats an anchor")?;
        writeln!(f, "{}", RULE)
    }
}

impl fmt::Display for ResultsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "                      ENTROPY MEASUREMENT RESULTS")?;
        writeln!(f, "{}", RULE)?;

        self.write_raw(f)?;
        self.write_normalized(f)?;
        self.write_guide(f)
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;

    for c in s.chars().rev() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
        count += 1;
    }

    result.chars().rev().collect()
}
