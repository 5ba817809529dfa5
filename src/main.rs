use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

use viewsource::projector::InMemoryLoader;
use viewsource::{EngineConfig, ListResult, ListSource, Ordering, QueryParams};

/// Page, sort and filter a JSON array of rows through the list engine.
#[derive(Debug, Parser)]
#[command(name = "viewsource", version)]
struct Cli {
    /// JSON file containing an array of row objects
    input: PathBuf,

    /// Field to sort by
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Substring filter as FIELD=VALUE (repeatable)
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    #[arg(long)]
    skip: Option<usize>,

    #[arg(long)]
    take: Option<usize>,

    /// Print every matching row instead of one page
    #[arg(long)]
    all: bool,

    /// Engine config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

fn parse_filters(filters: &[String]) -> Result<Option<Value>> {
    if filters.is_empty() {
        return Ok(None);
    }
    let mut map = Map::new();
    for entry in filters {
        let Some((field, value)) = entry.split_once('=') else {
            bail!("invalid filter '{}', expected FIELD=VALUE", entry);
        };
        map.insert(field.to_string(), Value::String(value.to_string()));
    }
    Ok(Some(Value::Object(map)))
}

fn build_params(cli: &Cli) -> Result<QueryParams<Value>> {
    let mut params = QueryParams::new();
    params.skip = cli.skip;
    params.take = cli.take;
    if let Some(field) = &cli.sort {
        let ordering = if cli.desc {
            Ordering::desc(field.as_str())
        } else {
            Ordering::asc(field.as_str())
        };
        params.orderings = vec![ordering];
    }
    params.filter = parse_filters(&cli.filters)?;
    Ok(params)
}

fn render(result: &ListResult<Value>) -> Value {
    json!({
        "data": result.data.as_ref(),
        "total": result.total,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {} as a JSON array", cli.input.display()))?;

    let params = build_params(&cli)?;
    let source = ListSource::with_config(InMemoryLoader::new(rows), params, &config);

    let result = if cli.all {
        source.fetch_all_data().await?
    } else {
        let mut pages = source.pages();
        let page = pages
            .wait_for(|page| page.is_some())
            .await
            .context("list source stopped before the first page")?
            .clone();
        match page {
            Some(page) => page,
            None => bail!("no page was produced"),
        }
    };

    println!("{}", serde_json::to_string_pretty(&render(&result))?);
    Ok(())
}
