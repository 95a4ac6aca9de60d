use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use pms_client::model::EndpointTable;
use pms_client::{
    ApiClient, ClientConfig, Dispatcher, FileStorage, HeaderSession, ReqwestTransport,
    TemplateStore, TokenStore,
};
use url::Url;

use crate::cli::Cli;

const DEFAULT_STORAGE_DIR: &str = ".pms";

/// Settings of one invocation: the config file merged with command line
/// flags and environment variables, which take precedence.
pub struct Context {
    pub config: ClientConfig,
    storage: Arc<FileStorage>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => ClientConfig::from_path(path)?,
            None => ClientConfig::default(),
        };
        merge(&mut config, cli);

        let dir = config
            .storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
        log::debug!("storage directory: {}", dir.display());
        Ok(Self {
            config,
            storage: Arc::new(FileStorage::new(dir)),
        })
    }

    pub fn base_url(&self) -> Result<Url> {
        Ok(self.config.resolve_base_url()?)
    }

    pub fn spec_path(&self) -> Result<&Path> {
        self.config
            .spec
            .as_deref()
            .context("no API description configured (use --spec or PMS_SPEC)")
    }

    pub fn table(&self) -> Result<EndpointTable> {
        load_table(self.spec_path()?)
    }

    pub fn tokens(&self) -> TokenStore<Arc<FileStorage>> {
        TokenStore::new(self.storage.clone())
    }

    pub fn templates(&self) -> TemplateStore<Arc<FileStorage>> {
        TemplateStore::new(self.storage.clone())
    }

    pub fn client(&self) -> Result<ApiClient<ReqwestTransport>> {
        let session = HeaderSession::from_token_store(&self.tokens())?;
        Ok(ApiClient::new(
            Dispatcher::with_reqwest(self.base_url()?),
            session,
            self.table()?,
        ))
    }
}

fn merge(config: &mut ClientConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    if let Some(spec) = &cli.spec {
        config.spec = Some(spec.clone());
    }
}

/// Loads an endpoint table from an API description or, failing that, from a
/// table stored as JSON by `pms generate`.
pub fn load_table(path: &Path) -> Result<EndpointTable> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    match pms_core::load_table_from_str(&s) {
        Ok(table) => Ok(table),
        Err(e) => EndpointTable::from_json(&s)
            .map_err(|_| e)
            .with_context(|| format!("loading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pms_client::model::{EndpointDescriptor, HttpVerb};

    #[test]
    fn test_load_stored_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let table: EndpointTable = [EndpointDescriptor::new(
            "message_list",
            HttpVerb::Get,
            "/api/message/message/",
        )]
        .into_iter()
        .collect();
        std::fs::write(&path, table.to_json().unwrap()).unwrap();
        assert_eq!(load_table(&path).unwrap(), table);

        std::fs::write(&path, "nonsense").unwrap();
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pms.yaml");
        std::fs::write(
            &config_path,
            "base_url: http://from-file.test\nspec: file.json\n",
        )
        .unwrap();

        use clap::Parser;
        let cli = Cli::try_parse_from([
            "pms",
            "--config",
            config_path.to_str().unwrap(),
            "--base-url",
            "http://from-flag.test",
            "endpoints",
        ])
        .unwrap();
        let ctx = Context::from_cli(&cli).unwrap();
        assert_eq!(ctx.base_url().unwrap().as_str(), "http://from-flag.test/");
        assert_eq!(ctx.spec_path().unwrap(), Path::new("file.json"));
    }
}
