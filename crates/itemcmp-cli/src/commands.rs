use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use itemcmp_catalog::CatalogService;
use itemcmp_server::{CatalogServer, ProductResponse, ServerConfig};
use itemcmp_store::JsonFileStore;
use itemcmp_types::{Product, ProductId, SellerId};
use tracing::{debug, info};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let bind = match &cli.command {
        Command::Serve(args) => args.bind,
        _ => None,
    };
    let config = resolve_config(&cli, bind)?;
    let format = cli.format;

    match cli.command {
        Command::Serve(_) => cmd_serve(config),
        Command::Init(_) => cmd_init(&config),
        Command::List(_) => cmd_list(&config, format),
        Command::Show(args) => cmd_show(&config, args),
        Command::Compare(args) => cmd_compare(&config, args, format),
        Command::Delete(args) => cmd_delete(&config, args),
    }
}

/// Defaults, then the `--config` file, then the environment (seeded from
/// the env file), then flags.
fn resolve_config(cli: &Cli, bind: Option<std::net::SocketAddr>) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if !ServerConfig::load_env_file(&cli.env_file)? {
        debug!(path = %cli.env_file.display(), "no env file");
    }
    config.apply_env()?;
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = dir.clone();
    }
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    Ok(config)
}

fn catalog(config: &ServerConfig) -> CatalogService {
    CatalogService::new(Arc::new(JsonFileStore::new(&config.storage_dir)))
}

fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(CatalogServer::new(config).serve())?;
    Ok(())
}

fn cmd_init(config: &ServerConfig) -> anyhow::Result<()> {
    JsonFileStore::new(&config.storage_dir).ensure_root()?;
    info!(storage = %config.storage_dir.display(), "storage directory ready");
    println!(
        "{} Initialized product storage in {}",
        "✓".green().bold(),
        config.storage_dir.display().to_string().bold()
    );
    Ok(())
}

fn cmd_list(config: &ServerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let products = catalog(config).list_all()?;
    match format {
        OutputFormat::Json => println!("{}", to_json(products)?),
        OutputFormat::Text if products.is_empty() => println!("No products."),
        OutputFormat::Text => print!("{}", render_list(&products)),
    }
    Ok(())
}

fn cmd_show(config: &ServerConfig, args: ShowArgs) -> anyhow::Result<()> {
    let product = catalog(config).get_by_id(ProductId::new(args.id))?;
    println!("{}", serde_json::to_string_pretty(&ProductResponse::from(product))?);
    Ok(())
}

fn cmd_compare(config: &ServerConfig, args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ids: Vec<ProductId> = args.ids.into_iter().map(ProductId::new).collect();
    let products = catalog(config).compare_by_ids(&ids)?;
    match format {
        OutputFormat::Json => println!("{}", to_json(products)?),
        OutputFormat::Text => print!("{}", render_comparison(&products)),
    }
    Ok(())
}

fn cmd_delete(config: &ServerConfig, args: DeleteArgs) -> anyhow::Result<()> {
    let seller = SellerId::new(args.seller)?;
    catalog(config).delete_by_id(ProductId::new(args.id), &seller)?;
    info!(id = args.id, %seller, "deleted from command line");
    println!("{} Deleted product {}", "✓".green().bold(), args.id.to_string().yellow());
    Ok(())
}

fn to_json(products: Vec<Product>) -> anyhow::Result<String> {
    let responses: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(serde_json::to_string_pretty(&responses)?)
}

fn render_list(products: &[Product]) -> String {
    let mut out = String::new();
    for p in products {
        out.push_str(&format!(
            "{:>6}  {:<32} {:>10}  {}\n",
            p.id.to_string().yellow(),
            p.name,
            p.price.to_string(),
            p.seller_id.as_str().dimmed()
        ));
    }
    out
}

/// One row per attribute, one column per product. Specification keys are
/// the union across all products; a product lacking a key shows `-`.
fn render_comparison(products: &[Product]) -> String {
    let mut rows: Vec<(String, Vec<String>)> = vec![
        ("id".into(), products.iter().map(|p| p.id.to_string()).collect()),
        ("name".into(), products.iter().map(|p| p.name.clone()).collect()),
        ("price".into(), products.iter().map(|p| p.price.to_string()).collect()),
        ("brand".into(), products.iter().map(|p| or_dash(p.brand.as_deref())).collect()),
        (
            "rating".into(),
            products.iter().map(|p| or_dash(p.rating.map(|r| r.to_string()).as_deref())).collect(),
        ),
        (
            "description".into(),
            products.iter().map(|p| or_dash(p.description.as_deref())).collect(),
        ),
        ("seller".into(), products.iter().map(|p| p.seller_id.to_string()).collect()),
    ];

    let spec_keys: BTreeSet<&String> = products.iter().flat_map(|p| p.specifications.keys()).collect();
    for key in spec_keys {
        let values = products
            .iter()
            .map(|p| or_dash(p.specifications.get(key).map(String::as_str)))
            .collect();
        rows.push((key.clone(), values));
    }

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let col_widths: Vec<usize> = (0..products.len())
        .map(|col| rows.iter().map(|(_, v)| v[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for (label, values) in &rows {
        out.push_str(&format!("{:<label_width$}", label.bold()));
        for (value, width) in values.iter().zip(&col_widths) {
            out.push_str(&format!("  {value:<width$}"));
        }
        out.push('\n');
    }
    out
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
