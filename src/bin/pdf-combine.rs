//! PDF Combine CLI tool
//!
//! A command-line tool for assembling a new PDF from pages of existing ones
//! and stamping positioned text onto individual pages.

use clap::{Parser, Subcommand};
use glob::glob;
use std::path::PathBuf;
use std::process;

use pdf_combine::model::{Assembly, Color, TextOverlay};
use pdf_combine::pdf::{count_pages, export_assembly, ExportReport};

/// PDF Combine - Assemble and annotate pages from existing PDFs
#[derive(Parser)]
#[command(name = "pdf-combine")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Concatenate all pages of several PDFs
    pdf-combine combine -o output.pdf \"[0-9]*.pdf\"

    # Stamp red 18pt text one inch from the bottom-left of page 2
    pdf-combine stamp input.pdf -o stamped.pdf --page 2 \\
        --text \"72,72:APPROVED\" --size 18 --color \"#cc0000\"

    # Combine and open the result
    pdf-combine combine -o output.pdf --open file1.pdf file2.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate all pages of the input PDFs into one file
    Combine {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Stamp positioned text onto one page of a PDF
    Stamp {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Page to stamp (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Text placement as "x,y:content" with x/y in PDF points measured
        /// from the page's bottom-left corner. Repeatable.
        #[arg(long, required = true)]
        text: Vec<String>,

        /// Font family (resolved against the standard PDF base fonts)
        #[arg(long, default_value = "Helvetica")]
        font: String,

        /// Font size in points
        #[arg(long, default_value_t = 12.0)]
        size: f32,

        /// Text color as "#rrggbb"
        #[arg(long, default_value = "#000000")]
        color: String,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Combine { inputs, output, open } => cmd_combine(inputs, output, open),
        Commands::Stamp {
            input,
            output,
            page,
            text,
            font,
            size,
            color,
            open,
        } => cmd_stamp(input, output, page, text, font, size, color, open),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern)? {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                return Err(format!("No files matched pattern: {}", pattern).into());
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

fn report_warnings(report: &ExportReport) {
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
}

/// Concatenate all pages of the inputs into one output file
fn cmd_combine(
    inputs: Vec<String>,
    output: PathBuf,
    open: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = expand_globs(inputs)?;

    let mut assembly = Assembly::new();
    for path in &inputs {
        assembly.add_pages(path)?;
    }

    eprintln!(
        "Combining {} pages from {} files...",
        assembly.len(),
        inputs.len()
    );

    let report = export_assembly(&assembly, &output)?;
    report_warnings(&report);

    eprintln!("Wrote {} pages to: {}", report.pages_written, output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Stamp text overlays onto one page of the input
#[allow(clippy::too_many_arguments)]
fn cmd_stamp(
    input: PathBuf,
    output: PathBuf,
    page: usize,
    text_specs: Vec<String>,
    font: String,
    size: f32,
    color: String,
    open: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let color = parse_color(&color)?;

    let mut assembly = Assembly::new();
    let ids = assembly.add_pages(&input)?;

    if page == 0 || page > ids.len() {
        return Err(format!(
            "Page {} out of range: {} has {} pages",
            page,
            input.display(),
            ids.len()
        )
        .into());
    }

    let overlays: Vec<TextOverlay> = text_specs
        .iter()
        .map(|spec| parse_text_spec(spec, &font, size, color))
        .collect::<Result<_, _>>()?;

    assembly.set_overlays(ids[page - 1], overlays);

    let report = export_assembly(&assembly, &output)?;
    report_warnings(&report);

    eprintln!("Wrote {} pages to: {}", report.pages_written, output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let page_count = count_pages(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", page_count);

    Ok(())
}

/// Parse an "x,y:content" placement spec into an overlay
fn parse_text_spec(
    spec: &str,
    font: &str,
    size: f32,
    color: Color,
) -> Result<TextOverlay, Box<dyn std::error::Error>> {
    let (position, content) = spec
        .split_once(':')
        .ok_or_else(|| format!("Invalid text spec (expected \"x,y:content\"): {}", spec))?;
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("Invalid position in text spec: {}", spec))?;

    Ok(TextOverlay {
        text: content.to_string(),
        x: x.trim().parse()?,
        y: y.trim().parse()?,
        font_family: font.to_string(),
        font_size: size,
        color,
    })
}

/// Parse a "#rrggbb" color into channels in [0, 1]
fn parse_color(value: &str) -> Result<Color, Box<dyn std::error::Error>> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid color (expected \"#rrggbb\"): {}", value).into());
    }

    let channel = |range| u8::from_str_radix(&hex[range], 16).map(|v| v as f32 / 255.0);
    Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
