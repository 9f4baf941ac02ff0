//! annotext CLI - collect PDF highlights and comments into notes

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use annotext::render::ReportStats;
use annotext::{
    batch, process_file, write_report, Annotation, Document, ErrorMode, ExtractOptions,
    JsonFormat, PageSelection, ReportFormat, ReportOptions,
};

#[derive(Parser)]
#[command(name = "annotext")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Collect PDF highlights and comments with their sentences", long_about = None)]
struct Cli {
    /// Directory to scan for PDF files
    #[arg(value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(value_name = "OUTPUT", env = "ANNOTEXT_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one consolidated report for every PDF under a directory
    Report {
        /// Directory to scan for PDF files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (defaults to DIR)
        #[arg(short, long, value_name = "DIR", env = "ANNOTEXT_OUTPUT")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "markdown")]
        format: FormatArg,

        /// Report file name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Keep documents that have no context sentences
        #[arg(long)]
        keep_all: bool,

        /// Leave the highlighted text out of comment blocks
        #[arg(long)]
        no_highlight_text: bool,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Print the annotations of one PDF
    Show {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Export the annotations of one PDF as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args, Default)]
struct ExtractArgs {
    /// Text columns per page (detected when omitted)
    #[arg(long, value_name = "N")]
    columns: Option<usize>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Fail on the first page that cannot be rendered
    #[arg(long)]
    strict: bool,
}

impl ExtractArgs {
    fn to_options(&self) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
        let mut options = ExtractOptions::new();
        if let Some(columns) = self.columns {
            options = options.with_columns(columns);
        }
        if let Some(pages) = &self.pages {
            let selection =
                PageSelection::parse(pages).map_err(|e| format!("Invalid page range: {}", e))?;
            options = options.with_pages(selection);
        }
        if self.strict {
            options = options.with_error_mode(ErrorMode::Strict);
        }
        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Consolidated Markdown notes
    Markdown,
    /// JSON array of documents
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Report {
            input,
            output,
            format,
            name,
            extract,
            keep_all,
            no_highlight_text,
            sequential,
        }) => {
            let mut report = ReportOptions::new()
                .with_format(format.into())
                .with_skip_without_context(!keep_all)
                .with_highlight_text(!no_highlight_text);
            if let Some(name) = name {
                report = report.with_file_name(name);
            }
            extract.to_options().and_then(|options| {
                cmd_report(
                    &input,
                    output.as_deref(),
                    &options.with_parallel(!sequential),
                    &report,
                )
            })
        }
        Some(Commands::Show { input, extract }) => {
            extract.to_options().and_then(|options| cmd_show(&input, &options))
        }
        Some(Commands::Json {
            input,
            output,
            compact,
            extract,
        }) => extract
            .to_options()
            .and_then(|options| cmd_json(&input, output.as_deref(), compact, &options)),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: report on the given directory
            if let Some(input) = cli.input {
                cmd_report(
                    &input,
                    cli.output.as_deref(),
                    &ExtractOptions::default(),
                    &ReportOptions::default(),
                )
            } else {
                println!("{}", "Usage: annotext <DIR> [OUTPUT]".yellow());
                println!("       annotext --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_report(
    input: &Path,
    output: Option<&Path>,
    options: &ExtractOptions,
    report: &ReportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = batch::find_pdfs(input)?;
    if paths.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let result = batch::process_paths(&paths, options, |path, error| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match error {
            Some(e) => pb.println(format!("{} {}: {}", "Skipped".yellow(), name, e)),
            None => pb.set_message(name),
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let output_dir = output.unwrap_or(input);
    let (written, stats) = write_report(output_dir, &result.documents, report)?;

    println!(
        "{} {} of {} file(s)",
        "Processed".green().bold(),
        result.documents.len(),
        result.processed()
    );
    print_stats(&stats);

    match written {
        Some(path) => println!("{} {}", "Saved to".green(), path.display()),
        None => println!("{}", "No context sentences found, nothing written".yellow()),
    }
    Ok(())
}

fn print_stats(stats: &ReportStats) {
    println!("  {} {} document(s)", "├─".dimmed(), stats.document_count);
    if stats.skipped_documents > 0 {
        println!(
            "  {} {} without context sentences",
            "├─".dimmed(),
            stats.skipped_documents
        );
    }
    println!(
        "  {} {} note(s), {} with comments",
        "└─".dimmed(),
        stats.bullet_count(),
        stats.comment_count
    );
}

fn cmd_show(input: &Path, options: &ExtractOptions) -> Result<(), Box<dyn std::error::Error>> {
    let doc = process_file(input, options)?;

    println!("{}", doc.display_title().cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in &doc.pages {
        if page.annotations.is_empty() && page.outlines.is_empty() {
            continue;
        }

        let heading = match &page.label {
            Some(label) => format!("Page {} (#{})", label, page.index + 1),
            None => format!("Page {}", page.index + 1),
        };
        println!("\n{}", heading.bold());

        for outline in &page.outlines {
            let indent = "  ".repeat(outline.level);
            println!("  {}{} {}", indent, "§".magenta(), outline.title);
        }
        for annot in &page.annotations {
            print_annotation(annot);
        }
    }

    println!();
    println!(
        "{}: {}",
        "Annotations".bold(),
        doc.annotation_count()
    );
    Ok(())
}

fn print_annotation(annot: &Annotation) {
    let mut header = format!("[{}]", annot.kind).cyan().to_string();
    if let Some(author) = &annot.author {
        header.push_str(&format!(" {}", author.dimmed()));
    }
    if annot.is_reply() {
        header.push_str(&format!(" {}", "reply".dimmed()));
    }
    println!("  {}", header);

    if let Some(text) = annot.highlighted_text() {
        println!("    {} {}", "text:".bold(), text);
    }
    if let Some(context) = &annot.context {
        println!("    {} {}", "context:".bold(), context.green());
    }
    if let Some(contents) = &annot.contents {
        println!("    {} {}", "comment:".bold(), contents.yellow());
    }
    if !annot.replies.is_empty() {
        println!("    {} {}", "replies:".bold(), annot.replies.len());
    }
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc: Document = process_file(input, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = annotext::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "annotext".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF highlight and comment collector");
    println!();
    println!("License: MIT");
}
