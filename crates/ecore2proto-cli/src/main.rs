//! ecore2proto CLI: convert Eclipse Ecore models to proto3.
//!
//! ```text
//! ecore2proto model.ecore
//! ecore2proto models/ -o proto_out/ -v
//! ecore2proto base.ecore domain.ecore -o out/ --java-package com.example
//! ```

mod convert;
mod discover;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use ecore2proto_codegen::GeneratorOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ecore2proto")]
#[command(
    author,
    version,
    about = "Convert Eclipse Ecore (.ecore) models to Protocol Buffer (.proto) files"
)]
struct Cli {
    /// Ecore files or directories containing ecore files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for generated .proto files.
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Java package prefix (`option java_package`).
    #[arg(long = "java-package", default_value = "")]
    java_package: String,

    /// Go package prefix (`option go_package`).
    #[arg(long = "go-package", default_value = "")]
    go_package: String,

    /// Prefix for every proto package.
    #[arg(long = "proto-package", default_value = "")]
    proto_package: String,

    /// Package of the annotation options unit (`<name>_options.proto`).
    #[arg(long = "options-package", default_value = "ui")]
    options_package: String,

    /// Also write the resolved model as JSON.
    #[arg(long = "dump-ir", value_name = "FILE")]
    dump_ir: Option<PathBuf>,

    /// Log progress (info level) to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            options_package: self.options_package.clone(),
            java_package_prefix: self.java_package.clone(),
            go_package_prefix: self.go_package.clone(),
            proto_package_prefix: self.proto_package.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let files = discover::discover_inputs(&cli.inputs);
    if files.is_empty() {
        bail!("No .ecore files found");
    }
    tracing::info!(count = files.len(), "discovered ecore files");

    let conversion = convert::convert_files(&files, &cli.generator_options())?;

    if let Some(path) = &cli.dump_ir {
        convert::dump_ir(path, &conversion.packages)?;
        println!("  {} {}", "→".cyan(), path.display());
    }

    let written = convert::write_units(&cli.output_dir, &conversion.units)?;

    println!(
        "{} {} proto file(s) in {}",
        "Generated".green().bold(),
        written.len(),
        cli.output_dir.display().to_string().bold()
    );
    for path in &written {
        println!("  {} {}", "→".cyan(), path.display());
    }
    if !conversion.skipped.is_empty() {
        eprintln!(
            "{} {} file(s) failed to parse: {}",
            "warning:".yellow().bold(),
            conversion.skipped.len(),
            conversion.skipped.join(", ")
        );
    }

    Ok(())
}
