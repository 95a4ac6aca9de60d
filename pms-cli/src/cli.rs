use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "pms")]
#[command(about = "Command line client for the PMS REST API", long_about = None)]
pub struct Cli {
    /// YAML config file
    #[arg(short = 'c', long, env = "PMS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, env = "PMS_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Directory for the stored token and templates
    #[arg(long, env = "PMS_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// API description (Swagger 2.0 / OpenAPI 3.0) or stored endpoint table
    #[arg(long, env = "PMS_SPEC", global = true)]
    pub spec: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Downloads the API description served by the backend
    FetchSpec {
        #[arg(short = 'o', long, default_value = "pms-swagger.json")]
        output: PathBuf,

        #[arg(long, default_value = "/api/doc?format=openapi")]
        sub_path: String,
    },
    /// Generates the endpoint table (JSON) or Rust wrappers from the API description
    Generate {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file; stdout if omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        #[arg(long)]
        module_name: Option<String>,
    },
    /// Lists the operations of the API description
    Endpoints,
    /// Calls any operation by name
    Call(CallArgs),
    #[command(subcommand)]
    Message(MessageCommand),
    /// Lists company users, as offered when notifying employees
    Users {
        #[arg(long)]
        company: u64,

        /// Only users of the owner company
        #[arg(long)]
        owner: bool,

        #[arg(long)]
        project: Option<u64>,

        #[arg(long)]
        search: Option<String>,
    },
    #[command(subcommand)]
    Template(TemplateCommand),
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Rust,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Operation name, e.g. message_list
    pub operation: String,

    /// Parameter as name=value; values are read as JSON when they parse as such
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, Value)>,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Extra query parameter as name=value, sent without mapping
    #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
    pub query: Vec<(String, Value)>,
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
    /// Posts a new message
    Send {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        #[arg(long)]
        project: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Stores a new template
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        #[arg(long)]
        project: Option<u64>,
    },
    /// Shows the stored templates
    List,
    /// Posts a stored template as a message
    Send {
        index: usize,

        /// Project to post to, if the template has none
        #[arg(long)]
        project: Option<u64>,
    },
    /// Removes all stored templates
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Stores the token sent as `Authorization: token <t>`
    SetToken { token: String },
    /// Forgets the stored token
    Clear,
}

/// Parses `name=value`. The value is taken as JSON if it parses, so `id=7`
/// is a number and `search=design` a string.
pub fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
