use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Command};
use context::Context;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("command-line args: {cli:?}");

    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Command::FetchSpec { output, sub_path } => {
            commands::fetch_spec(&ctx, &output, &sub_path).await
        }
        Command::Generate {
            format,
            output,
            module_name,
        } => commands::generate(&ctx, format, output.as_deref(), module_name),
        Command::Endpoints => commands::endpoints(&ctx),
        Command::Call(args) => commands::call(&ctx, args).await,
        Command::Message(cmd) => commands::message(&ctx, cmd).await,
        Command::Users {
            company,
            owner,
            project,
            search,
        } => commands::users(&ctx, company, owner, project, search).await,
        Command::Template(cmd) => commands::template(&ctx, cmd).await,
        Command::Auth(cmd) => commands::auth(&ctx, cmd),
    }
}
