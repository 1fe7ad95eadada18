#![deny(missing_docs)]

//! # OAS RAML Converter CLI
//!
//! Command line front-end for converting API descriptions between
//! Swagger 2.0, RAML 0.8 and RAML 1.0.
//!
//! Supported Commands:
//! - `convert`: Converts a file, URL or stdin document to another format.
//! - `formats`: Lists the registered format tokens.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod convert;
mod error;
mod source;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Swagger / RAML converter")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converts a document between formats.
    Convert(convert::ConvertArgs),
    /// Lists the supported format tokens.
    Formats,
}

fn list_formats() -> String {
    oas_raml_core::formats::all()
        .iter()
        .map(|d| {
            let forms: Vec<String> = d.serialization_forms.iter().map(|f| f.to_string()).collect();
            let note = if d.deprecated { " (deprecated)" } else { "" };
            format!("{:<8} {:<12} {}{}", d.token, d.display_name, forms.join(", "), note)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert(args) => convert::execute(args)?,
        Commands::Formats => println!("{}", list_formats()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::parse_from([
            "oas-raml-converter",
            "convert",
            "api.raml",
            "--to",
            "swagger",
            "--validate",
            "false",
            "--output-format",
            "yaml",
        ]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        assert_eq!(args.to, "swagger");
        assert!(!args.validate);
        assert_eq!(args.output_format, Some(convert::OutputFormat::Yaml));
    }

    #[test]
    fn test_list_formats() {
        let listing = list_formats();
        assert!(listing.contains("raml10"));
        assert!(listing.contains("(deprecated)"));
    }
}
