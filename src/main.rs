//! SegmentCast: interactive customer segment predictor
//!
//! Prompts for four values (or takes them from `--predict`), loads the model
//! artifacts, and prints the predicted cluster and segment label.

use anyhow::Result;
use clap::Parser;
use segmentcast::cli;
use segmentcast::{AppConfig, Args, ClusterId, CustomerFeatures, PredictionError, SegmentModel};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            println!("\nAn unexpected error occurred: {:#}", e);
            return Ok(());
        }
    };
    info!(model_dir = %config.model_dir.display(), "Configuration resolved");

    let predict = |customer: &CustomerFeatures| -> Result<ClusterId, PredictionError> {
        SegmentModel::load(&config.model_dir, &config.artifacts)?.predict(customer)
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    cli::run(
        &args,
        &mut stdin.lock(),
        &mut stdout.lock(),
        &config.segments,
        predict,
    )?;

    Ok(())
}

/// Logs go to stderr so they never interleave with the prompts on stdout
fn init_logging(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "segmentcast=debug"
    } else {
        "segmentcast=warn"
    };

    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new("warn").add_directive(directive.parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Defaults, then the config file, then command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::default(),
    };

    if let Some(model_dir) = &args.model_dir {
        config.model_dir = model_dir.clone();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: Option<PathBuf>, model_dir: Option<&str>) -> Args {
        Args {
            model_dir: model_dir.map(PathBuf::from),
            config,
            predict: None,
            verbose: false,
        }
    }

    fn write_config() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
model_dir = "from-file"

[segments]
0 = "Champions"
"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(&args(None, None)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_resolve_file_over_defaults() {
        let file = write_config();
        let config = resolve_config(&args(Some(file.path().to_path_buf()), None)).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("from-file"));
        assert_eq!(config.segments.name(ClusterId(0)), "Champions");
    }

    #[test]
    fn test_resolve_flag_over_file() {
        let file = write_config();
        let config =
            resolve_config(&args(Some(file.path().to_path_buf()), Some("from-flag"))).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("from-flag"));
        // Only the directory is overridden
        assert_eq!(config.segments.name(ClusterId(0)), "Champions");
    }

    #[test]
    fn test_resolve_flag_without_file() {
        let config = resolve_config(&args(None, Some("from-flag"))).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("from-flag"));
        assert_eq!(config.artifacts, AppConfig::default().artifacts);
    }

    #[test]
    fn test_resolve_missing_file_is_error() {
        let missing = PathBuf::from("does/not/exist.toml");
        assert!(resolve_config(&args(Some(missing), Some("from-flag"))).is_err());
    }
}
