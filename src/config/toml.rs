//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the effective configuration: config file (or defaults) overridden by CLI
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(universe_size) = cli.universe_size {
        config.benchmark.universe_size = universe_size;
    }
    if let Some(n_batches) = cli.n_batches {
        config.benchmark.n_batches = n_batches;
    }
    if cli.seed.is_some() {
        config.benchmark.seed = cli.seed;
    }

    if let Some(batch_size) = cli.batch_size {
        config.loader.batch_size = batch_size;
    }
    if let Some(fragment_size) = cli.fragment_size {
        config.loader.fragment_size = fragment_size;
    }
    if cli.verbose {
        config.loader.verbose = true;
    }

    if cli.json.is_some() {
        config.output.json_path = cli.json.clone();
    }

    // Strategy filter keeps the configured order
    if !cli.strategies.is_empty() {
        for name in &cli.strategies {
            if !config.strategies.iter().any(|s| &s.name == name) {
                let known: Vec<_> = config.strategies.iter().map(|s| s.name.as_str()).collect();
                anyhow::bail!(
                    "Unknown strategy '{}' (configured: {})",
                    name,
                    known.join(", ")
                );
            }
        }
        config.strategies.retain(|s| cli.strategies.contains(&s.name));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
[benchmark]
universe_size = 250000
n_batches = 2000
seed = 7

[loader]
batch_size = 64
n_scanners = 8

[[strategies]]
name = "sequential"

[[strategies]]
name = "shuffled-fragments"
description = "Fragments with a small chunk"
by_fragment = true
batches_per_chunk = 4

[output]
json_path = "entropy.json"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_toml_string(SAMPLE).unwrap();
        assert_eq!(config.benchmark.universe_size, 250_000);
        assert_eq!(config.benchmark.n_batches, 2000);
        assert_eq!(config.benchmark.seed, Some(7));
        assert_eq!(config.loader.batch_size, 64);
        assert_eq!(config.loader.n_scanners, 8);
        // Unset loader fields fall back to defaults
        assert_eq!(config.loader.n_epochs, 1000);

        assert_eq!(config.strategies.len(), 2);
        assert_eq!(config.strategies[0].batches_per_chunk, 50);
        assert!(config.strategies[1].by_fragment);
        assert_eq!(config.strategies[1].batches_per_chunk, 4);
        assert_eq!(config.output.json_path, Some(PathBuf::from("entropy.json")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(parse_toml_string("[benchmark\nuniverse_size = ").is_err());
        assert!(parse_toml_string("[benchmark]\nuniverse_size = \"lots\"").is_err());
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.benchmark.universe_size, 250_000);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::try_parse_from([
            "loadentropy",
            "-n",
            "10",
            "--seed",
            "99",
            "--json",
            "out.json",
            "-s",
            "shuffled-fragments",
        ])
        .unwrap();
        let config = merge_cli_with_config(&cli, parse_toml_string(SAMPLE).unwrap()).unwrap();

        assert_eq!(config.benchmark.n_batches, 10);
        assert_eq!(config.benchmark.seed, Some(99));
        assert_eq!(config.benchmark.universe_size, 250_000);
        assert_eq!(config.output.json_path, Some(PathBuf::from("out.json")));
        assert_eq!(config.strategies.len(), 1);
        assert_eq!(config.strategies[0].name, "shuffled-fragments");
    }

    #[test]
    fn test_unknown_strategy_filter() {
        let cli = Cli::try_parse_from(["loadentropy", "-s", "nope"]).unwrap();
        let err = merge_cli_with_config(&cli, Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown strategy 'nope'"));
    }
}
