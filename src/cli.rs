//! Command line surface: interactive prompts, one-shot search and server start.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::{CartonResponse, DIAGRAM_TITLE, start_api_server};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::geometry::TopDownLayout;
use crate::model::Product;
use crate::optimizer::{SearchConstraints, find_best_carton};
use crate::render::{render_svg, render_text};
use crate::report::format_report;

#[derive(Parser, Debug)]
#[command(name = "carton-fit")]
#[command(about = "Finds the master carton size that holds the most units of a product")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Prompt for the product values (default)
    Interactive {
        /// Also write the top-down diagram as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Search with product values given as arguments
    Search {
        /// Product length in inches
        #[arg(long, allow_negative_numbers = true)]
        length: f64,

        /// Product width in inches
        #[arg(long, allow_negative_numbers = true)]
        width: f64,

        /// Product height in inches
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Weight of one unit in pounds
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the top-down diagram as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Start the HTTP service with the web UI
    Serve,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

const PROMPTS: [(&str, &str); 4] = [
    ("product length", "Enter the product length (in inches): "),
    ("product width", "Enter the product width (in inches): "),
    ("product height", "Enter the product height (in inches): "),
    ("product weight", "Enter the product weight (in lbs): "),
];

/// Runs the selected command.
pub async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    let constraints = SearchConstraints::default();
    let command = cli.command.unwrap_or(Commands::Interactive { svg: None });

    match command {
        Commands::Interactive { svg } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout().lock();
            writeln!(out, "Welcome to the Master Carton Optimizer!")?;
            let product = prompt_product(&mut input, &mut out)?;
            run_search(
                &product,
                &constraints,
                OutputFormat::Text,
                svg.as_deref(),
                &mut out,
            )
        }
        Commands::Search {
            length,
            width,
            height,
            weight,
            json,
            svg,
        } => {
            let product = Product::new((length, width, height), weight)?;
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            run_search(
                &product,
                &constraints,
                format,
                svg.as_deref(),
                &mut io::stdout().lock(),
            )
        }
        Commands::Serve => start_api_server(config.api).await,
    }
}

fn parse_measurement(field: &'static str, raw: &str) -> Result<f64, AppError> {
    raw.trim().parse::<f64>().map_err(|_| AppError::Parse {
        field,
        input: raw.trim().to_string(),
    })
}

fn read_value<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: &'static str,
    prompt: &str,
) -> Result<f64, AppError> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(AppError::MissingInput(field));
    }
    parse_measurement(field, &line)
}

/// Asks for length, width, height and weight, in that order.
pub fn prompt_product<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Product, AppError> {
    let mut values = [0.0; 4];
    for (slot, (field, prompt)) in values.iter_mut().zip(PROMPTS) {
        *slot = read_value(input, output, field, prompt)?;
    }
    let [length, width, height, weight] = values;
    Ok(Product::new((length, width, height), weight)?)
}

/// Searches the best carton and writes the result.
///
/// The text format prints the report followed by the terminal diagram. The
/// SVG file is only written when a path is given and a carton was found.
pub fn run_search<W: Write>(
    product: &Product,
    constraints: &SearchConstraints,
    format: OutputFormat,
    svg_path: Option<&Path>,
    out: &mut W,
) -> Result<(), AppError> {
    let result = find_best_carton(product, constraints);
    let layout = result
        .best
        .as_ref()
        .map(|solution| TopDownLayout::from_solution(solution, product));

    match format {
        OutputFormat::Text => {
            writeln!(out)?;
            write!(out, "{}", format_report(&result, product))?;
            if let Some(layout) = &layout {
                writeln!(out)?;
                writeln!(out, "{}", DIAGRAM_TITLE)?;
                write!(out, "{}", render_text(layout))?;
            }
        }
        OutputFormat::Json => {
            let response = CartonResponse::from_search_result(result, product, *constraints);
            serde_json::to_writer_pretty(&mut *out, &response)?;
            writeln!(out)?;
        }
    }

    if let (Some(path), Some(layout)) = (svg_path, &layout) {
        std::fs::write(path, render_svg(layout, DIAGRAM_TITLE))?;
        info!("🖼️ Diagram written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> (Result<Product, AppError>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let product = prompt_product(&mut reader, &mut output);
        (product, String::from_utf8(output).unwrap())
    }

    fn search_output(product: &Product, format: OutputFormat, svg: Option<&Path>) -> String {
        let mut out = Vec::new();
        run_search(product, &SearchConstraints::default(), format, svg, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prompt_reads_four_values_in_order() {
        let (product, output) = prompt("10\n 4.5 \n2\n0.75\n");
        let product = product.unwrap();

        assert_eq!(product.length(), 10.0);
        assert_eq!(product.width(), 4.5);
        assert_eq!(product.height(), 2.0);
        assert_eq!(
            output,
            "Enter the product length (in inches): \
             Enter the product width (in inches): \
             Enter the product height (in inches): \
             Enter the product weight (in lbs): "
        );
    }

    #[test]
    fn prompt_reports_non_numeric_input() {
        let (product, _) = prompt("10\nwide\n2\n1\n");
        match product {
            Err(AppError::Parse { field, input }) => {
                assert_eq!(field, "product width");
                assert_eq!(input, "wide");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn prompt_reports_missing_input() {
        let (product, _) = prompt("10\n10\n");
        assert!(matches!(
            product,
            Err(AppError::MissingInput("product height"))
        ));
    }

    #[test]
    fn prompt_rejects_non_positive_values() {
        let (product, _) = prompt("10\n10\n10\n0\n");
        assert!(matches!(product, Err(AppError::Validation(_))));

        let (product, _) = prompt("-1\n10\n10\n1\n");
        assert!(matches!(product, Err(AppError::Validation(_))));
    }

    #[test]
    fn text_output_has_report_and_diagram() {
        let product = Product::new((10.0, 10.0, 10.0), 1.0).unwrap();
        let output = search_output(&product, OutputFormat::Text, None);

        assert!(output.contains("Units Per Carton: 8"));
        assert!(output.contains("Carton Weight: 3.63 kg"));
        assert!(output.contains(DIAGRAM_TITLE));
        assert!(output.contains(&format!("+{}+", "-".repeat(40))));
    }

    #[test]
    fn text_output_without_carton_skips_diagram() {
        let product = Product::new((30.0, 5.0, 5.0), 1.0).unwrap();
        let output = search_output(&product, OutputFormat::Text, None);

        assert_eq!(output, "\nNo valid carton configuration found.\n");
    }

    #[test]
    fn json_output_is_api_response() {
        let product = Product::new((5.0, 5.0, 5.0), 2.0).unwrap();
        let output = search_output(&product, OutputFormat::Json, None);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["found"], true);
        assert_eq!(value["total_units"], 25);
        assert_eq!(value["carton"]["length"], 5);
    }

    #[test]
    fn svg_file_is_written_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carton.svg");
        let product = Product::new((10.0, 10.0, 10.0), 1.0).unwrap();
        search_output(&product, OutputFormat::Text, Some(&path));

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches(r#"class="unit""#).count(), 4);
    }

    #[test]
    fn svg_file_is_not_written_without_carton() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carton.svg");
        let product = Product::new((30.0, 5.0, 5.0), 1.0).unwrap();
        search_output(&product, OutputFormat::Text, Some(&path));

        assert!(!path.exists());
    }

    #[test]
    fn cli_without_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["carton-fit"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_search_arguments() {
        let cli = Cli::try_parse_from([
            "carton-fit",
            "search",
            "--length",
            "10",
            "--width",
            "4.5",
            "--height",
            "-2",
            "--weight",
            "1",
            "--json",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Search {
                length: 10.0,
                width: 4.5,
                height: -2.0,
                weight: 1.0,
                json: true,
                svg: None,
            })
        );
    }

    #[test]
    fn cli_requires_all_search_values() {
        assert!(Cli::try_parse_from(["carton-fit", "search", "--length", "10"]).is_err());
    }
}
