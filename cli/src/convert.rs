#![deny(missing_docs)]

//! # Convert Command
//!
//! Reads a document, converts it through the core facade and writes the
//! result to a file or stdout.

use std::fs;
use std::path::PathBuf;

use oas_raml_core::formats::AUTO_TOKEN;
use oas_raml_core::{convert, ConvertOptions, SerializationForm};

use crate::error::CliResult;
use crate::source::read_source;

/// Output serialization accepted on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl From<OutputFormat> for SerializationForm {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Json => SerializationForm::Json,
            OutputFormat::Yaml => SerializationForm::Yaml,
        }
    }
}

/// Arguments for the convert command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Input file path, `http(s)://` URL, or `-` for stdin.
    pub source: String,

    /// Source format token (`swagger`, `oas20`, `raml08`, `raml10` or `auto`).
    #[clap(long, env = "OAS_RAML_FROM", default_value = AUTO_TOKEN)]
    pub from: String,

    /// Target format token.
    #[clap(long, env = "OAS_RAML_TO")]
    pub to: String,

    /// Validate the input before converting.
    #[clap(long, env = "OAS_RAML_VALIDATE", default_value_t = true, action = clap::ArgAction::Set)]
    pub validate: bool,

    /// Output serialization; defaults to the target format's primary form.
    #[clap(long, env = "OAS_RAML_OUTPUT_FORMAT", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Write the result here instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl ConvertArgs {
    /// Maps the flags onto facade options.
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            validate: self.validate,
            output: self.output_format.map(SerializationForm::from),
        }
    }
}

/// Executes the conversion.
pub fn execute(args: &ConvertArgs) -> CliResult<()> {
    let raw = read_source(&args.source)?;
    let converted = convert(&args.from, &args.to, &raw, &args.options())?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &converted)?;
            log::info!("wrote {:?}", path);
        }
        None => println!("{}", converted),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("api.raml");
        fs::write(
            &input,
            "#%RAML 1.0\ntitle: Pets\nversion: v1\n/pets:\n  get:\n    responses:\n      200:\n        description: ok\n",
        )
        .unwrap();
        let output = dir.path().join("out/swagger.json");

        let args = ConvertArgs {
            source: input.to_string_lossy().to_string(),
            from: "auto".into(),
            to: "swagger".into(),
            validate: true,
            output_format: None,
            output: Some(output.clone()),
        };
        execute(&args).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["swagger"], "2.0");
        assert_eq!(written["info"]["title"], "Pets");
    }

    #[test]
    fn test_options_mapping() {
        let args = ConvertArgs {
            source: "-".into(),
            from: "raml10".into(),
            to: "swagger".into(),
            validate: false,
            output_format: Some(OutputFormat::Yaml),
            output: None,
        };
        let options = args.options();
        assert!(!options.validate);
        assert_eq!(options.output, Some(SerializationForm::Yaml));
    }

    #[test]
    fn test_unsupported_target_fails_before_writing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("api.raml");
        fs::write(&input, "#%RAML 1.0\ntitle: Pets\n").unwrap();
        let output = dir.path().join("out.json");
        let args = ConvertArgs {
            source: input.to_string_lossy().to_string(),
            from: "raml10".into(),
            to: "oas30".into(),
            validate: true,
            output_format: None,
            output: Some(output.clone()),
        };
        assert!(execute(&args).is_err());
        assert!(!output.exists());
    }
}
