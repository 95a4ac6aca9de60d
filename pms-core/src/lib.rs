use std::{io::Read, path::Path, str::FromStr};

use anyhow::Context;
use pms_model::EndpointTable;
use proc_macro2::TokenStream;
use rust_format::{Formatter, RustFmt};

mod codewriter;
mod config;
mod oasprobe;
mod table;
mod translate;
mod types;

pub mod adapters;

pub use adapters::DocumentVersion;
pub use config::{ApiConfig, DEFAULT_MODULE_NAME, parse_config};
pub use oasprobe::{ProbeError, probe_version};
pub use table::build_table;
pub use types::{
    BodyKind, OperationDef, ParameterDef, ParameterLocation, RequestBodyDef, Spec,
};

/// Reads an API description (Swagger 2.0 or OpenAPI 3.0, JSON or YAML) and
/// turns it into an endpoint table.
pub fn load_table_from_str(s: &str) -> anyhow::Result<EndpointTable> {
    let version = probe_version(s.as_bytes())?;
    log::debug!("document version: {version:?}");
    match version {
        #[cfg(feature = "swagger20")]
        DocumentVersion::Swagger20 => build_table(&adapters::swagger20::Swagger20Spec::from_str(s)?),
        #[cfg(feature = "oas30")]
        DocumentVersion::OAS30 => build_table(&adapters::oas30::OAS30Spec::from_str(s)?),
    }
}

pub fn load_table_from_reader(mut input: impl Read) -> anyhow::Result<EndpointTable> {
    let mut s = String::new();
    input.read_to_string(&mut s)?;
    load_table_from_str(&s)
}

pub fn load_table_from_path(path: &Path) -> anyhow::Result<EndpointTable> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading API description {}", path.display()))?;
    load_table_from_str(&s).with_context(|| format!("loading {}", path.display()))
}

pub fn generate_from_path(path: &Path, config: &ApiConfig) -> anyhow::Result<TokenStream> {
    let table = load_table_from_path(path)?;
    generate_from_table(&table, config)
}

pub fn generate_from_str(s: &str, config: &ApiConfig) -> anyhow::Result<TokenStream> {
    let table = load_table_from_str(s)?;
    generate_from_table(&table, config)
}

pub fn generate_from_reader(input: impl Read, config: &ApiConfig) -> anyhow::Result<TokenStream> {
    let table = load_table_from_reader(input)?;
    generate_from_table(&table, config)
}

pub fn generate_from_table(table: &EndpointTable, config: &ApiConfig) -> anyhow::Result<TokenStream> {
    codewriter::write_to_token_stream(table, config)
}

/// Generates the module for the document named in `config` and writes it as
/// Rust source to `output_path`. The source is formatted with rustfmt when
/// available.
pub fn generate_file(config: &ApiConfig, output_path: &Path) -> anyhow::Result<()> {
    let input_path = config
        .path
        .as_deref()
        .context("no API description path configured")?;
    let ts = generate_from_path(Path::new(input_path), config)?;

    let source = match RustFmt::default().format_tokens(ts.clone()) {
        Ok(formatted) => formatted,
        Err(e) => {
            log::warn!("rustfmt unavailable, writing unformatted source: {e}");
            ts.to_string()
        }
    };
    std::fs::write(output_path, source)
        .with_context(|| format!("writing {}", output_path.display()))?;
    Ok(())
}
