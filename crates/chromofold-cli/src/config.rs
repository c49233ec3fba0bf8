use crate::cli::ReconstructArgs;
use crate::error::{CliError, Result};
use chromofold::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialFilterConfig {
    #[serde(rename = "frequency-threshold")]
    frequency_threshold: Option<f64>,
    #[serde(rename = "min-separation")]
    min_separation: Option<u32>,
    #[serde(rename = "max-separation")]
    max_separation: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialConversionConfig {
    #[serde(rename = "average-distance")]
    average_distance: Option<f64>,
    #[serde(rename = "scale-distance")]
    scale_distance: Option<f64>,
    #[serde(rename = "wide-curve")]
    wide_curve: Option<f64>,
    #[serde(rename = "keep-original-scale")]
    keep_original_scale: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOptimizerConfig {
    #[serde(rename = "learning-rate")]
    learning_rate: Option<f64>,
    #[serde(rename = "max-iterations")]
    max_iterations: Option<usize>,
    #[serde(rename = "convergence-threshold")]
    convergence_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSearchConfig {
    start: Option<f64>,
    end: Option<f64>,
    step: Option<f64>,
    restarts: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialReconstructionConfig {
    #[serde(rename = "convert-factor")]
    convert_factor: Option<f64>,
    #[serde(rename = "chromosome-lengths")]
    chromosome_lengths: Option<Vec<usize>>,
    #[serde(rename = "augment-adjacency")]
    augment_adjacency: Option<bool>,
    seed: Option<u64>,
    filter: Option<PartialFilterConfig>,
    conversion: Option<PartialConversionConfig>,
    optimizer: Option<PartialOptimizerConfig>,
    search: Option<PartialSearchConfig>,
}

impl PartialReconstructionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Merges file values with CLI overrides into a validated engine config.
    ///
    /// CLI flags win over file values, file values win over defaults. The
    /// boolean flags only force their setting when given; an absent flag
    /// leaves the file value (or the default) in place.
    pub fn merge_with_cli(
        mut self,
        args: &ReconstructArgs,
    ) -> Result<core_config::ReconstructionConfig> {
        let filter = self.filter.take().unwrap_or_default();
        let conversion = self.conversion.take().unwrap_or_default();
        let optimizer = self.optimizer.take().unwrap_or_default();
        let search = self.search.take().unwrap_or_default();

        let mut builder = core_config::ReconstructionConfigBuilder::new();

        if let Some(threshold) = filter.frequency_threshold {
            builder = builder.frequency_threshold(threshold);
        }
        if let Some(bins) = filter.min_separation {
            builder = builder.min_separation(bins);
        }
        if let Some(bins) = filter.max_separation {
            builder = builder.max_separation(bins);
        }

        if let Some(distance) = conversion.average_distance {
            builder = builder.average_distance(distance);
        }
        if let Some(distance) = conversion.scale_distance {
            builder = builder.scale_distance(distance);
        }
        if let Some(width) = conversion.wide_curve {
            builder = builder.wide_curve(width);
        }
        if args.keep_original_scale {
            builder = builder.keep_original_scale(true);
        } else if let Some(keep) = conversion.keep_original_scale {
            builder = builder.keep_original_scale(keep);
        }

        if let Some(rate) = args.learning_rate.or(optimizer.learning_rate) {
            builder = builder.learning_rate(rate);
        }
        if let Some(iterations) = args.max_iterations.or(optimizer.max_iterations) {
            builder = builder.max_iterations(iterations);
        }
        if let Some(threshold) = args.threshold.or(optimizer.convergence_threshold) {
            builder = builder.convergence_threshold(threshold);
        }

        if let Some(factor) = args.convert_factor.or(self.convert_factor) {
            builder = builder.convert_factor(factor);
        }
        if let Some(start) = args.factor_start.or(search.start) {
            builder = builder.factor_start(start);
        }
        if let Some(end) = args.factor_end.or(search.end) {
            builder = builder.factor_end(end);
        }
        if let Some(step) = args.factor_step.or(search.step) {
            builder = builder.factor_step(step);
        }
        if let Some(restarts) = args.restarts.or(search.restarts) {
            builder = builder.restarts(restarts);
        }

        if let Some(lengths) = args.chromosome_lengths.clone().or(self.chromosome_lengths) {
            builder = builder.chromosome_lengths(lengths);
        }
        if args.no_adjacent_augmentation {
            builder = builder.augment_adjacency(false);
        } else if let Some(enabled) = self.augment_adjacency {
            builder = builder.augment_adjacency(enabled);
        }
        if let Some(seed) = args.seed.or(self.seed) {
            builder = builder.seed(seed);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use chromofold::engine::config::FactorMode;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_config_file(dir: &Path, content: &str) -> PathBuf {
        let file_path = dir.join("config.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn reconstruct_args(extra: &[&str]) -> ReconstructArgs {
        let mut argv = vec![
            "chromofold",
            "reconstruct",
            "-i",
            "contacts.txt",
            "-o",
            "out",
        ];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        match cli.command {
            Commands::Reconstruct(args) => args,
            _ => panic!("Expected 'reconstruct' subcommand"),
        }
    }

    #[test]
    fn empty_file_and_flags_yield_the_default_config() {
        let args = reconstruct_args(&[]);
        let config = PartialReconstructionConfig::default()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config, core_config::ReconstructionConfig::default());
    }

    #[test]
    fn file_values_reach_the_merged_config() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            convert-factor = 1.5
            chromosome-lengths = [4, 4]
            seed = 42

            [filter]
            frequency-threshold = 0.5
            max-separation = 100

            [optimizer]
            learning-rate = 0.5
            "#,
        );

        let args = reconstruct_args(&[]);
        let config = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.factor, FactorMode::Fixed(1.5));
        assert_eq!(config.chromosome_lengths, Some(vec![4, 4]));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.filter.frequency_threshold, 0.5);
        assert_eq!(config.filter.max_separation, Some(100));
        assert_eq!(config.optimizer.learning_rate, 0.5);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            seed = 1

            [optimizer]
            learning-rate = 0.5
            max-iterations = 100
            "#,
        );

        let args = reconstruct_args(&["--learning-rate", "2.0", "--seed", "7"]);
        let config = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.optimizer.learning_rate, 2.0);
        assert_eq!(config.optimizer.max_iterations, 100);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn convert_factor_flag_disables_the_configured_search() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            [search]
            start = 0.5
            end = 2.0
            step = 0.5
            "#,
        );

        let args = reconstruct_args(&["--convert-factor", "1.5"]);
        let config = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.factor, FactorMode::Fixed(1.5));
    }

    #[test]
    fn search_range_from_file_shapes_the_grid() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            [search]
            start = 0.5
            end = 2.0
            step = 0.5
            restarts = 2
            "#,
        );

        let args = reconstruct_args(&[]);
        let config = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        match config.factor {
            FactorMode::Search(search) => {
                assert_eq!(search.start, 0.5);
                assert_eq!(search.end, 2.0);
                assert_eq!(search.step, 0.5);
                assert_eq!(search.restarts, 2);
            }
            FactorMode::Fixed(_) => panic!("Expected a search"),
        }
    }

    #[test]
    fn augmentation_flag_forces_off_over_the_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(dir.path(), "augment-adjacency = true\n");

        let args = reconstruct_args(&["--no-adjacent-augmentation"]);
        let config = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert!(!config.augment_adjacency);
    }

    #[test]
    fn unknown_keys_are_rejected_at_parse_time() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(dir.path(), "convert-faktor = 1.0\n");

        let result = PartialReconstructionConfig::from_file(&config_path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            [optimizer]
            learning-rate = 0.0
            "#,
        );

        let args = reconstruct_args(&[]);
        let result = PartialReconstructionConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args);

        match result {
            Err(CliError::Config(message)) => assert!(message.contains("learning-rate")),
            other => panic!("Expected a config error, got {:?}", other.map(|_| ())),
        }
    }
}
