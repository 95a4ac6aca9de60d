use std::path::Path;

use anyhow::{Context as _, Result, bail};
use pms_client::model::{ApiResult, AuthToken, CallParameters, Template};
use pms_core::ApiConfig;
use serde_json::json;

use crate::cli::{AuthCommand, CallArgs, MessageCommand, OutputFormat, TemplateCommand};
use crate::context::Context;

fn print_result(result: &ApiResult) -> Result<()> {
    println!("{}", result.status_code);
    println!("{}", serde_json::to_string_pretty(&result.body)?);
    Ok(())
}

pub async fn fetch_spec(ctx: &Context, output: &Path, sub_path: &str) -> Result<()> {
    let url = ctx.base_url()?.join(sub_path)?;
    println!("Fetching API description from {url}...");

    let client = reqwest::Client::new();
    let response = client
        .get(url.clone())
        .header("Accept", "application/json")
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()?;
    let content = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    let version = pms_core::probe_version(&content[..])
        .context("downloaded document is not a supported API description")?;
    log::debug!("document version {version:?}");

    std::fs::write(output, &content)
        .with_context(|| format!("Failed to write to {}", output.display()))?;
    println!("Saved {} bytes to {}", content.len(), output.display());
    Ok(())
}

pub fn generate(
    ctx: &Context,
    format: OutputFormat,
    output: Option<&Path>,
    module_name: Option<String>,
) -> Result<()> {
    let spec = ctx.spec_path()?;
    match format {
        OutputFormat::Json => {
            let table = pms_core::load_table_from_path(spec)?;
            let json = table.to_json()?;
            match output {
                Some(path) => std::fs::write(path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        OutputFormat::Rust => {
            let config = ApiConfig {
                module_name,
                ..ApiConfig::new_from_path(spec.to_string_lossy())
            };
            match output {
                Some(path) => pms_core::generate_file(&config, path)?,
                None => println!("{}", pms_core::generate_from_path(spec, &config)?),
            }
        }
    }
    Ok(())
}

pub fn endpoints(ctx: &Context) -> Result<()> {
    let table = ctx.table()?;
    for e in table.iter() {
        println!("{:<40} {:<7} {}", e.name, e.method.as_str(), e.path);
    }
    Ok(())
}

pub async fn call(ctx: &Context, args: CallArgs) -> Result<()> {
    let mut params: CallParameters = args.params.into_iter().collect();
    if let Some(data) = &args.data {
        let data: serde_json::Value =
            serde_json::from_str(data).context("--data is not valid JSON")?;
        params.set(pms_client::model::BODY_PARAM, data);
    }
    for (name, value) in args.query {
        params = params.with_extra_query(name, value);
    }

    let result = ctx.client()?.call(&args.operation, &params).await?;
    print_result(&result)
}

async fn post_message(ctx: &Context, title: &str, body: &str, project: u64) -> Result<()> {
    let params = CallParameters::new().with(
        pms_client::model::BODY_PARAM,
        json!({"title": title, "body": body, "project": project}),
    );
    let result = ctx.client()?.call("message_create", &params).await?;
    print_result(&result)
}

pub async fn message(ctx: &Context, cmd: MessageCommand) -> Result<()> {
    match cmd {
        MessageCommand::Send {
            title,
            body,
            project,
        } => post_message(ctx, &title, &body, project).await,
    }
}

pub async fn users(
    ctx: &Context,
    company: u64,
    owner: bool,
    project: Option<u64>,
    search: Option<String>,
) -> Result<()> {
    let mut params = CallParameters::new()
        .with("companyId", company)
        .with("inOwnerCompany", owner);
    if let Some(project) = project {
        params.set("project", project);
    }
    if let Some(search) = search {
        params.set("search", search);
    }
    let result = ctx.client()?.call("companyuser_list", &params).await?;
    print_result(&result)
}

pub async fn template(ctx: &Context, cmd: TemplateCommand) -> Result<()> {
    let store = ctx.templates();
    match cmd {
        TemplateCommand::Add {
            title,
            body,
            project,
        } => {
            store.append(Template::new(title, body, project))?;
            println!("{} templates stored", store.load().len());
        }
        TemplateCommand::List => {
            for (i, t) in store.load().iter().enumerate() {
                let project = t.project.map(|p| p.to_string()).unwrap_or_default();
                println!("{i:>3}  {:<30} {:<6} {}", t.title, project, t.body);
            }
        }
        TemplateCommand::Send { index, project } => {
            let Some(t) = store.get(index) else {
                bail!("no template at index {index}");
            };
            let Some(project) = project.or(t.project) else {
                bail!("template '{}' has no project, pass --project", t.title);
            };
            post_message(ctx, &t.title, &t.body, project).await?;
        }
        TemplateCommand::Clear => store.clear()?,
    }
    Ok(())
}

pub fn auth(ctx: &Context, cmd: AuthCommand) -> Result<()> {
    let tokens = ctx.tokens();
    match cmd {
        AuthCommand::SetToken { token } => tokens.save(&AuthToken::new(token))?,
        AuthCommand::Clear => tokens.clear()?,
    }
    Ok(())
}
