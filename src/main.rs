// Command-line front end: extract ID card fields from OCR text, saved
// recognitions or images and print them as JSON.

use clap::{Parser, Subcommand};
use idscan::{
    processing::recognizer::{available_engines, default_recognizer},
    DocumentType, ExtractionResult, ExtractorConfig, FieldMapping, IdExtractor, IdScanError, RawRecognition,
};
use log::{error, info};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "idscan")]
#[command(about = "Structured field extraction for Philippine ID cards")]
struct Args {
    /// Extractor settings (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log extraction steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract fields from OCR text (stdin when no input is given)
    Extract {
        /// Document type, e.g. drivers_license or national_id
        #[arg(short = 't', long = "type")]
        document_type: DocumentType,

        /// Text file to read
        #[arg(short, long, conflicts_with = "recognition")]
        input: Option<PathBuf>,

        /// Saved recognition (JSON fragments with polygons)
        #[arg(short, long)]
        recognition: Option<PathBuf>,

        /// Extra field -> keywords mapping (JSON)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },
    /// Recognize an image with the built-in OCR engine and extract fields
    Scan {
        #[arg(short = 't', long = "type")]
        document_type: DocumentType,

        #[arg(short = 'f', long)]
        image: PathBuf,

        #[arg(short, long)]
        mapping: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },
    /// List supported document types and compiled-in OCR engines
    Status,
}

fn load_mapping(path: Option<&Path>) -> Result<Option<FieldMapping>, IdScanError> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&contents)?))
        }
        None => Ok(None),
    }
}

fn read_text(input: Option<&Path>) -> Result<String, IdScanError> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_result(result: &ExtractionResult, pretty: bool) -> Result<(), IdScanError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{}", json);
    Ok(())
}

fn print_status() -> Result<(), IdScanError> {
    let types: Vec<&str> = DocumentType::ALL.iter().map(|t| t.as_str()).collect();
    let status = serde_json::json!({
        "documentTypes": types,
        "engines": available_engines(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn run(args: Args) -> Result<(), IdScanError> {
    let config = match &args.config {
        Some(path) => ExtractorConfig::from_file(path)?,
        None => ExtractorConfig::default(),
    };
    let extractor = IdExtractor::with_config(config);

    match args.command {
        Command::Extract {
            document_type,
            input,
            recognition,
            mapping,
            pretty,
        } => {
            let mapping = load_mapping(mapping.as_deref())?;
            let result = match recognition {
                Some(path) => {
                    let contents = std::fs::read_to_string(&path)?;
                    let recognition: RawRecognition = serde_json::from_str(&contents)?;
                    info!("Loaded {} fragments from {:?}", recognition.fragments.len(), path);
                    extractor.extract_recognition(&recognition, document_type, mapping.as_ref())
                }
                None => {
                    let text = read_text(input.as_deref())?;
                    extractor.extract(&text, document_type, mapping.as_ref())
                }
            };
            print_result(&result, pretty)
        }
        Command::Scan {
            document_type,
            image,
            mapping,
            pretty,
        } => {
            let mapping = load_mapping(mapping.as_deref())?;
            let recognizer = default_recognizer(extractor.config())?;
            let bytes = std::fs::read(&image)?;
            info!("Scanning {:?} as {}", image, document_type);
            let result = extractor.scan(recognizer.as_ref(), &bytes, document_type, mapping.as_ref())?;
            print_result(&result, pretty)
        }
        Command::Status => print_status(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
