use std::io::Read;

use lazy_static::lazy_static;
use regex::Regex;

use crate::adapters::DocumentVersion;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("no OpenAPI or Swagger version declaration found in input")]
    NoVersionFound,
    #[error("unsupported document version '{0}'")]
    UnsupportedVersion(String),
    #[error("error while reading from input")]
    IoError(#[source] std::io::Error),
}

const VERSION_YAML_STR: &str =
    r#"^\s*["']?(openapi|swagger)["']?\s*:\s*["']?((\d+\.\d+)(\.\d+)?)["']?"#;

lazy_static! {
    static ref VERSION_YAML: Regex = Regex::new(VERSION_YAML_STR).unwrap();
}

fn version_of(kind: &str, full_version: &str) -> Result<DocumentVersion, ProbeError> {
    let major_minor = full_version.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");
    let v = match (kind, major_minor.as_str()) {
        #[cfg(feature = "swagger20")]
        ("swagger", "2.0") => DocumentVersion::Swagger20,
        #[cfg(feature = "oas30")]
        ("openapi", "3.0") => DocumentVersion::OAS30,
        _ => return Err(ProbeError::UnsupportedVersion(full_version.to_string())),
    };
    Ok(v)
}

/// Detects whether `input` is a Swagger 2.0 or an OpenAPI 3.0 document.
///
/// JSON documents are inspected for a top level `openapi`/`swagger` key, YAML
/// documents must declare the version within their first few lines.
pub fn probe_version(mut input: impl Read) -> Result<DocumentVersion, ProbeError> {
    const MAX_PROBE_LINES: usize = 10;

    let mut text = String::new();
    input.read_to_string(&mut text).map_err(ProbeError::IoError)?;

    if text.trim_start().starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| ProbeError::NoVersionFound)?;
        for kind in ["openapi", "swagger"] {
            if let Some(v) = value.get(kind).and_then(|v| v.as_str()) {
                return version_of(kind, v);
            }
        }
        return Err(ProbeError::NoVersionFound);
    }

    for line in text.lines().take(MAX_PROBE_LINES) {
        if let Some(captures) = VERSION_YAML.captures(line) {
            let kind = captures.get(1).map_or("", |m| m.as_str());
            let full_version = captures.get(2).map_or("", |m| m.as_str());
            return version_of(kind, full_version);
        }
    }

    Err(ProbeError::NoVersionFound)
}

#[cfg(test)]
mod tests {
    use super::{DocumentVersion, ProbeError, probe_version};

    #[test]
    pub fn test_match_yaml() {
        let input = r"
            # leading comment
            openapi: 3.0.3
            "
        .as_bytes();

        let v = probe_version(input).unwrap();
        assert_eq!(v, DocumentVersion::OAS30);
    }

    #[test]
    pub fn test_match_swagger_yaml() {
        let input = "swagger: '2.0'\ninfo:\n  title: PMS API\n".as_bytes();
        assert_eq!(probe_version(input).unwrap(), DocumentVersion::Swagger20);
    }

    #[test]
    pub fn test_match_json() {
        let input = r#"{"info": {"title": "PMS API", "version": ""}, "swagger": "2.0", "paths": {}}"#;
        assert_eq!(
            probe_version(input.as_bytes()).unwrap(),
            DocumentVersion::Swagger20
        );
        let input = r#"{"openapi": "3.0.1", "info": {}}"#;
        assert_eq!(probe_version(input.as_bytes()).unwrap(), DocumentVersion::OAS30);
    }

    #[test]
    pub fn test_binary() {
        let input = [0u8, 0x0au8, 0xffu8, 0xe0].as_ref();

        match probe_version(input) {
            Ok(_) => panic!("version should not be recognized in junk"),
            Err(ProbeError::IoError(_)) => (),
            Err(e) => panic!("expected IoError, got {e:?}"),
        }
    }

    #[test]
    pub fn test_unsupported_version() {
        let input = r"
            # leading comment
            openapi: 99.99.99
            "
        .as_bytes();

        match probe_version(input) {
            Err(ProbeError::UnsupportedVersion(v)) => assert_eq!(v, "99.99.99"),
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }

        let input = r#"{"openapi": "3.1.0"}"#.as_bytes();
        assert!(matches!(
            probe_version(input),
            Err(ProbeError::UnsupportedVersion(_))
        ));
    }

    #[test]
    pub fn test_no_version() {
        let input = "info:\n  title: nothing here\n".as_bytes();
        assert!(matches!(probe_version(input), Err(ProbeError::NoVersionFound)));
    }
}
