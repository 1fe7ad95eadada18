#![deny(missing_docs)]

//! # Input Sources
//!
//! Reads the document to convert from a file, stdin (`-`) or, with the
//! `client` feature, an `http(s)://` URL.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Returns true when `source` names a remote document.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the raw document text.
pub fn read_source(source: &str) -> CliResult<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if is_url(source) {
        return fetch(source);
    }
    let path = Path::new(source);
    if !path.exists() {
        return Err(CliError::General(format!("Input file not found: {:?}", path)));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(feature = "client")]
fn fetch(url: &str) -> CliResult<String> {
    log::debug!("fetching {}", url);
    let fail = |e: ureq::Error| CliError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };
    let mut response = ureq::get(url).call().map_err(fail)?;
    response.body_mut().read_to_string().map_err(fail)
}

#[cfg(not(feature = "client"))]
fn fetch(url: &str) -> CliResult<String> {
    Err(CliError::Fetch {
        url: url.to_string(),
        message: "built without the `client` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/api.raml"));
        assert!(is_url("http://localhost/swagger.json"));
        assert!(!is_url("api/swagger.json"));
    }

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "#%RAML 1.0\ntitle: A\n").unwrap();
        let text = read_source(file.path().to_str().unwrap()).unwrap();
        assert_eq!(text, "#%RAML 1.0\ntitle: A\n");
    }

    #[test]
    fn test_missing_file() {
        let err = read_source("does/not/exist.raml").unwrap_err();
        assert!(matches!(err, CliError::General(_)));
    }
}
