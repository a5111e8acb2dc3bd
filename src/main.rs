//! Bindery CLI - render data-bound HTML components

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use bindery::binding::AttributeBinding;
use bindery::render::{ComponentRenderer, FsFetcher, HttpFetcher, ResourceFetcher};
use bindery::{BinderConfig, BinderyError, Engine, FixSuggestion};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "Bindery - reactive data binding for HTML components")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./bindery.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Components directory (overrides the configured root)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Fetch components over HTTP below this URL
    #[arg(long, conflicts_with = "root")]
    base_url: Option<String>,
}

#[derive(Args)]
struct StoreArgs {
    /// Merge a JSON or YAML document into the store first
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Write KEY=VALUE after rendering (VALUE is JSON, else a string)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    sets: Vec<(String, Value)>,

    /// Print the store as JSON after the markup
    #[arg(long)]
    dump_store: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one component and print its bound markup
    Render {
        /// Component id (folder name below the root)
        component: String,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Render every <tpl id="..."> placeholder of a page
    Page {
        /// Page markup file
        file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List the bindings discovered in a template
    Bindings {
        /// Template markup file
        file: PathBuf,

        /// Merge a JSON or YAML document into the store first
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List components found below the root
    Components {
        /// Components directory (overrides the configured root)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<BinderyError>()
            .and_then(|e| e.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries markup
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BinderConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            component,
            source,
            store,
        } => {
            let engine = engine_with_seed(config, store.seed.as_deref())?;
            let renderer = ComponentRenderer::new(Arc::clone(&engine), fetcher(&engine, &source)?);
            let rendered = renderer.render(&component).await?;
            apply_sets(&engine, &store.sets)?;
            println!("{}", rendered.to_html());
            dump_store(&engine, store.dump_store)
        }
        Commands::Page {
            file,
            source,
            store,
        } => {
            let markup = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading page {}", file.display()))?;
            let engine = engine_with_seed(config, store.seed.as_deref())?;
            let renderer = ComponentRenderer::new(Arc::clone(&engine), fetcher(&engine, &source)?);
            let page = renderer.render_page(&markup).await?;
            for id in page.failed() {
                eprintln!("{} component '{}' failed to render", "warning:".yellow(), id);
            }
            apply_sets(&engine, &store.sets)?;
            println!("{}", page.to_html());
            dump_store(&engine, store.dump_store)
        }
        Commands::Bindings { file, seed, json } => {
            let markup = std::fs::read_to_string(&file)
                .with_context(|| format!("reading template {}", file.display()))?;
            let engine = engine_with_seed(config, seed.as_deref())?;
            list_bindings(&engine, &markup, json)
        }
        Commands::Components { root } => {
            let root = root.unwrap_or_else(|| PathBuf::from(&config.components_root));
            list_components(&root, &config)
        }
    }
}

fn engine_with_seed(config: BinderConfig, seed: Option<&Path>) -> anyhow::Result<Arc<Engine>> {
    let engine = Arc::new(Engine::new(config));
    if let Some(path) = seed {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let document: Value = if is_yaml {
            serde_yaml::from_str(&text).map_err(BinderyError::from)?
        } else {
            serde_json::from_str(&text).map_err(BinderyError::from)?
        };
        engine.store().merge(&document)?;
    }
    Ok(engine)
}

fn fetcher(engine: &Engine, source: &SourceArgs) -> anyhow::Result<Arc<dyn ResourceFetcher>> {
    if let Some(base) = &source.base_url {
        return Ok(Arc::new(HttpFetcher::new(base)?));
    }
    let root = source
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from(&engine.config().components_root));
    Ok(Arc::new(FsFetcher::new(root)))
}

fn apply_sets(engine: &Engine, sets: &[(String, Value)]) -> anyhow::Result<()> {
    for (key, value) in sets {
        engine
            .set(key, value.clone())
            .with_context(|| format!("applying --set {}", key))?;
    }
    Ok(())
}

fn dump_store(engine: &Engine, enabled: bool) -> anyhow::Result<()> {
    if enabled {
        let snapshot = engine.store().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

/// `key=value`; the value is JSON when it parses, a plain string otherwise
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[derive(Serialize)]
struct BindingReport<'a> {
    id: String,
    tag: &'a str,
    bindings: Vec<BindingLine<'a>>,
}

#[derive(Serialize)]
struct BindingLine<'a> {
    #[serde(flatten)]
    binding: &'a AttributeBinding,
    value: Value,
}

fn list_bindings(engine: &Engine, markup: &str, json: bool) -> anyhow::Result<()> {
    let bound = engine.binder().bind_markup(markup, engine.store());
    let document = bound.document();

    let reports: Vec<BindingReport<'_>> = bound
        .registry()
        .entries()
        .iter()
        .map(|entry| BindingReport {
            id: entry.id().to_string(),
            tag: document.element(entry.node()).map_or("?", |e| e.tag()),
            bindings: entry
                .attributes()
                .iter()
                .map(|binding| BindingLine {
                    binding,
                    value: engine.get(&binding.key).unwrap_or(Value::Null),
                })
                .collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{} No bindings found", "→".cyan());
        return Ok(());
    }
    if let Some(namespace) = bound.namespace() {
        println!("{} namespace: {}", "→".cyan(), namespace.cyan().bold());
    }
    for report in &reports {
        println!("{} <{}>", format!("#{}", report.id).green().bold(), report.tag);
        for line in &report.bindings {
            println!(
                "  {:<8} {} = {}",
                line.binding.family.to_string().yellow(),
                line.binding.key,
                line.value
            );
        }
    }
    Ok(())
}

fn list_components(root: &Path, config: &BinderConfig) -> anyhow::Result<()> {
    if !root.is_dir() {
        return Err(BinderyError::ResourceMissing {
            path: root.display().to_string(),
            details: "not a directory".to_string(),
        }
        .into());
    }

    let view = format!("index{}", config.extensions.view);
    let components: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.path().join(&view).is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    if components.is_empty() {
        println!("{} No components in {}", "→".cyan(), root.display());
        return Ok(());
    }
    for component in components {
        println!("{} {}", "✓".green(), component);
    }
    Ok(())
}
