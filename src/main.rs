//! CLI for toa-extract - Build a Table of Authorities from a Word document.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toa_extract::{
    docx::{DEFAULT_FONT_SIZE_PT, DEFAULT_HEADING},
    ActionOutcome, Clipboard, Controller, DocxError, ExportError, LoadError, LoadReport,
    SystemClipboard, TableOptions,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Extract case citations from a Word document into a Table of Authorities
#[derive(Parser)]
#[command(name = "toa-extract")]
#[command(version)]
#[command(after_help = "\
Examples:
  toa-extract extract brief.docx
  toa-extract export-txt brief.docx -o authorities.txt
  toa-extract export-docx brief.docx -o authorities.docx --font-size 12
  toa-extract insert brief.docx
  toa-extract session")]
struct Cli {
    #[command(flatten)]
    table: TableArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TableArgs {
    /// Heading placed above the table in generated documents
    #[arg(long, global = true, default_value = DEFAULT_HEADING)]
    heading: String,

    /// Font size of table entries in generated documents, in points
    #[arg(long, global = true, default_value_t = DEFAULT_FONT_SIZE_PT, value_parser = parse_font_size)]
    font_size: f32,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the formatted citations of a document, one per line
    Extract {
        /// Input .docx file
        input: PathBuf,

        /// Print the citations and load counts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the citations to a plain text file
    ExportTxt {
        /// Input .docx file
        input: PathBuf,

        /// Output .txt file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the citations to a new .docx file
    ExportDocx {
        /// Input .docx file
        input: PathBuf,

        /// Output .docx file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Append the table to a copy of the document named <name>_with_TOA.docx
    Insert {
        /// Input .docx file
        input: PathBuf,
    },

    /// Copy the citations to the system clipboard
    Copy {
        /// Input .docx file
        input: PathBuf,
    },

    /// Read commands from stdin, keeping the loaded document between them
    #[command(after_help = "\
Commands:
  load <path>          load a .docx file
  show                 print the current citations
  export-txt <path>    write the citations to a text file
  export-docx <path>   write the citations to a new .docx file
  insert               append the table to a copy of the loaded document
  copy                 copy the citations to the clipboard
  help                 list commands
  quit                 leave the session")]
    Session,
}

fn parse_font_size(value: &str) -> Result<f32, String> {
    let size: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !(1.0..=1638.0).contains(&size) {
        return Err(format!("font size must be between 1 and 1638 points, got {}", size));
    }
    Ok(size)
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input document not found / unreadable
    InputFile(String),
    /// Exit 11: input is not a valid .docx document
    Document(String),
    /// Exit 12: citation recognition failed
    Recognition(String),
    /// Exit 13: clipboard unavailable
    Clipboard(String),
    /// Exit 15: cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::Document(_) => 11,
            AppError::Recognition(_) => 12,
            AppError::Clipboard(_) => 13,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::Document(msg) => {
                write!(
                    f,
                    "{}\n  hint: the file must be a Word .docx document (legacy .doc files are not supported)",
                    msg
                )
            }
            AppError::Recognition(msg) => {
                write!(f, "{}", msg)
            }
            AppError::Clipboard(msg) => {
                write!(
                    f,
                    "{}\n  hint: use export-txt when no desktop clipboard is available",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

fn map_load_error(path: &Path, e: LoadError) -> AppError {
    let msg = format!("'{}': {}", path.display(), e);
    match e {
        LoadError::Extract(DocxError::Io(_)) => AppError::InputFile(msg),
        LoadError::Extract(_) => AppError::Document(msg),
        LoadError::Recognize(_) => AppError::Recognition(msg),
    }
}

fn map_export_error(e: ExportError) -> AppError {
    match e {
        ExportError::Clipboard(_) => AppError::Clipboard(e.to_string()),
        ExportError::Document(DocxError::Io(_)) | ExportError::Write { .. } => {
            AppError::OutputFile(e.to_string())
        }
        ExportError::Document(_) => AppError::Document(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let options = TableOptions {
        heading: cli.table.heading,
        font_size_pt: cli.table.font_size,
    };
    let mut controller = Controller::new(options);

    match cli.command {
        Commands::Extract { input, json } => {
            let report = load(&mut controller, &input)?;
            if json {
                print_json(&controller, report)?;
            } else {
                print_citations(&controller)?;
            }
        }
        Commands::ExportTxt { input, output } => {
            load(&mut controller, &input)?;
            let outcome = controller.export_text(&output).map_err(map_export_error)?;
            report_outcome(&outcome);
        }
        Commands::ExportDocx { input, output } => {
            load(&mut controller, &input)?;
            let outcome = controller.export_docx(&output).map_err(map_export_error)?;
            report_outcome(&outcome);
        }
        Commands::Insert { input } => {
            load(&mut controller, &input)?;
            let outcome = controller.insert_into_original().map_err(map_export_error)?;
            report_outcome(&outcome);
        }
        Commands::Copy { input } => {
            load(&mut controller, &input)?;
            let mut clipboard = SystemClipboard::holding();
            if clipboard.is_holding() && !controller.citations().is_empty() {
                eprintln!("keeping the citations on the clipboard until another application replaces them");
            }
            let outcome = controller.copy_to(&mut clipboard).map_err(map_export_error)?;
            report_outcome(&outcome);
        }
        Commands::Session => {
            session(&mut controller, &mut SystemClipboard::new())?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Load a document and print a one-line summary.
fn load(controller: &mut Controller, input: &Path) -> Result<LoadReport, AppError> {
    let report = controller
        .load(input)
        .map_err(|e| map_load_error(input, e))?;

    let mut summary = format!(
        "found {} citation(s) in {}, {} table entr{}",
        report.recognized,
        input.display(),
        report.entries,
        if report.entries == 1 { "y" } else { "ies" }
    );
    if report.filtered > 0 {
        summary.push_str(&format!(
            "; skipped {} non-case citation(s) (Id., statutes, supra)",
            report.filtered
        ));
    }
    if report.format_errors > 0 {
        summary.push_str(&format!(
            "; {} citation(s) could not be formatted",
            report.format_errors
        ));
    }
    eprintln!("{}", summary);

    Ok(report)
}

fn report_outcome(outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Written(path) => eprintln!("wrote {}", path.display()),
        ActionOutcome::Copied { entries } => eprintln!("copied {} citation(s) to clipboard", entries),
        ActionOutcome::NothingToDo(notice) => eprintln!("{}", notice),
    }
}

fn print_citations(controller: &Controller) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for citation in controller.citations() {
        writeln!(handle, "{}", citation).map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    source: Option<&'a Path>,
    citations: &'a [String],
    report: LoadReport,
}

fn print_json(controller: &Controller, report: LoadReport) -> Result<(), AppError> {
    let output = ExtractOutput {
        source: controller.source(),
        citations: controller.citations(),
        report,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| AppError::OutputFile(format!("cannot serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Interactive mode: one command per line, errors are reported and the session goes on.
fn session(controller: &mut Controller, clipboard: &mut dyn Clipboard) -> Result<(), AppError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| AppError::InputFile(format!("stdin: {}", e)))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let result = match (command, arg) {
            ("quit" | "exit", _) => break,
            ("help", _) => {
                print_session_help();
                Ok(())
            }
            ("show", _) => {
                if controller.citations().is_empty() {
                    eprintln!("No citations loaded.");
                    Ok(())
                } else {
                    print_citations(controller)
                }
            }
            ("load", path) if !path.is_empty() => load(controller, Path::new(path)).map(|_| ()),
            ("export-txt", path) if !path.is_empty() => controller
                .export_text(Path::new(path))
                .map(|outcome| report_outcome(&outcome))
                .map_err(map_export_error),
            ("export-docx", path) if !path.is_empty() => controller
                .export_docx(Path::new(path))
                .map(|outcome| report_outcome(&outcome))
                .map_err(map_export_error),
            ("insert", _) => controller
                .insert_into_original()
                .map(|outcome| report_outcome(&outcome))
                .map_err(map_export_error),
            ("copy", _) => controller
                .copy_to(clipboard)
                .map(|outcome| report_outcome(&outcome))
                .map_err(map_export_error),
            ("load" | "export-txt" | "export-docx", _) => {
                eprintln!("'{}' needs a path argument", command);
                Ok(())
            }
            _ => {
                eprintln!("unknown command '{}' (try 'help')", command);
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn print_session_help() {
    println!("load <path>          load a .docx file");
    println!("show                 print the current citations");
    println!("export-txt <path>    write the citations to a text file");
    println!("export-docx <path>   write the citations to a new .docx file");
    println!("insert               append the table to a copy of the loaded document");
    println!("copy                 copy the citations to the clipboard");
    println!("help                 list commands");
    println!("quit                 leave the session");
}
