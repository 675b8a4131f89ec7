//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{
    config::{RemovalConfig, DEFAULT_THRESHOLD_PERCENTILE},
    error::BgRemovalError,
};
use anyhow::{Context, Result};
use tracing::warn;

/// Convert CLI arguments to a `RemovalConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `RemovalConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        let mut builder = RemovalConfig::builder()
            .threshold_percentile(
                cli.threshold_percentile
                    .unwrap_or(DEFAULT_THRESHOLD_PERCENTILE),
            )
            .fallback_only(cli.fallback_only);

        if let Some(model) = &cli.model {
            builder = builder.model_path(model.clone());
        }

        builder.build().context("Invalid configuration")
    }

    /// Check arguments against the filesystem before any processing
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if !cli.input.exists() {
            return Err(BgRemovalError::MissingInput(cli.input.clone()).into());
        }

        if cli.input.is_dir() {
            anyhow::bail!("Input path is a directory: {}", cli.input.display());
        }

        if cli.output.is_dir() {
            anyhow::bail!("Output path is a directory: {}", cli.output.display());
        }

        if cli.fallback_only && cli.model.is_some() {
            warn!("--model is ignored when --fallback-only is set");
        }

        Ok(())
    }
}
