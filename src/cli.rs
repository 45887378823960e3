//! Command-line interface: argument parsing and the interactive prompt session

use crate::data::CustomerFeatures;
use crate::error::PredictionError;
use crate::model::ClusterId;
use crate::segment::SegmentMap;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Message printed when a value cannot be parsed as a number
pub const INVALID_INPUT_MESSAGE: &str = "Error: Invalid input. Please enter numeric values only.";

const PROMPTS: [&str; 4] = [
    "Enter Recency (days, e.g., 20): ",
    "Enter Frequency (total orders, e.g., 10): ",
    "Enter Monetary (total sales in $, e.g., 7000): ",
    "Enter Discount Amount (total discount in $, e.g., 1100): ",
];

/// Predict a customer segment from recency, frequency, monetary and discount values
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the transformer and clustering artifacts
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Optional TOML or JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the prompts: provide R,F,M,D values as comma-separated string
    /// Example: --predict "20,10,7000,1100"
    #[arg(short, long, allow_hyphen_values = true)]
    pub predict: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse customer values from the predict string
    /// Expected format: "recency,frequency,monetary,discount"
    pub fn parse_features(&self) -> crate::Result<Option<CustomerFeatures>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != 4 {
            anyhow::bail!("Predict values must be in format 'recency,frequency,monetary,discount'");
        }

        let mut values = [0.0; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = parse_decimal(part)
                .ok_or_else(|| anyhow::anyhow!("Invalid numeric value: {}", part))?;
        }

        Ok(Some(CustomerFeatures::from(values)))
    }
}

/// Parse a decimal the way users type it, allowing `_` between digits (`7_000`)
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let grouped_ok = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped_ok {
        return None;
    }

    text.replace('_', "").parse().ok()
}

/// Failure while reading a value from the console
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid numeric value: {0:?}")]
    Invalid(String),

    #[error("EOF when reading a line")]
    Eof,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Print the prompt and parse one decimal value from the next input line
pub fn prompt_value<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<f64, InputError> {
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => return Err(InputError::Eof),
        Ok(_) => {}
        // Undecodable bytes are bad input, not a broken console
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(InputError::Invalid(e.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let trimmed = line.trim();
    parse_decimal(trimmed).ok_or_else(|| InputError::Invalid(trimmed.to_string()))
}

/// Prompt for the four values in feature order
pub fn prompt_features<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<CustomerFeatures, InputError> {
    let mut values = [0.0; 4];
    for (value, prompt) in values.iter_mut().zip(PROMPTS) {
        *value = prompt_value(input, out, prompt)?;
    }
    Ok(CustomerFeatures::from(values))
}

/// Print a prediction result or the error in its place
pub fn report_prediction<W: Write>(
    out: &mut W,
    prediction: &Result<ClusterId, PredictionError>,
    segments: &SegmentMap,
) -> io::Result<()> {
    match prediction {
        Ok(cluster) => {
            writeln!(out, "\n--- Prediction Result ---")?;
            writeln!(out, "Predicted Cluster ID: {}", cluster)?;
            writeln!(out, "Customer Segment:     {}", segments.name(*cluster))
        }
        Err(e) => writeln!(out, "\n{}", e),
    }
}

fn predict_and_report<W, P>(
    out: &mut W,
    customer: &CustomerFeatures,
    segments: &SegmentMap,
    predict: P,
) -> io::Result<()>
where
    W: Write,
    P: FnOnce(&CustomerFeatures) -> Result<ClusterId, PredictionError>,
{
    let prediction = predict(customer);
    if let Err(ref e) = prediction {
        tracing::warn!(kind = %e.kind(), detail = e.detail(), "Prediction failed");
    }
    report_prediction(out, &prediction, segments)
}

/// Run one interactive session: banner, prompts, prediction, report
///
/// Every failure is reported on `out`; only errors writing to `out` itself
/// are returned.
pub fn run_interactive<R, W, P>(
    input: &mut R,
    out: &mut W,
    segments: &SegmentMap,
    predict: P,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    P: FnOnce(&CustomerFeatures) -> Result<ClusterId, PredictionError>,
{
    writeln!(out, "--- Superstore Customer Segment Predictor ---")?;
    writeln!(
        out,
        "IMPORTANT: Please enter Monetary & Discount values in Dollars (e.g., 5000.50)"
    )?;

    match prompt_features(input, out) {
        Ok(customer) => {
            predict_and_report(out, &customer, segments, predict)
        }
        Err(InputError::Invalid(value)) => {
            tracing::debug!(%value, "Rejected non-numeric input");
            writeln!(out, "\n{}", INVALID_INPUT_MESSAGE)
        }
        Err(e) => writeln!(out, "\nAn unexpected error occurred: {}", e),
    }
}

/// Dispatch on the parsed arguments: `--predict` values, or the prompt session
///
/// A malformed `--predict` string is reported like any other invalid input.
pub fn run<R, W, P>(
    args: &Args,
    input: &mut R,
    out: &mut W,
    segments: &SegmentMap,
    predict: P,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    P: FnOnce(&CustomerFeatures) -> Result<ClusterId, PredictionError>,
{
    match args.parse_features() {
        Ok(Some(customer)) => {
            predict_and_report(out, &customer, segments, predict)
        }
        Ok(None) => run_interactive(input, out, segments, predict),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected --predict values");
            writeln!(out, "\n{}", INVALID_INPUT_MESSAGE)
        }
    }
}
