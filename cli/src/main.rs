//! rota CLI — driving adapter for the rota router.
//!
//! Subcommands:
//! - `resolve <config> <path>... [--json]` — resolve paths against a route config
//! - `check <config>` — validate config loads without errors
//! - `tokens <input> [--path]` — print the token sequence of a template or path

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use rota::config::{load_router, Resolution, RouteConfig};
use rota::{tokenize_path, tokenize_template, RouteError, Router, Token};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "rota")]
#[command(about = "Resolve paths against a rota route config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one or more paths
    Resolve {
        /// Route config file (.json, otherwise YAML)
        config: String,
        /// Paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
        /// Print each resolution as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Validate a route config
    Check {
        /// Route config file (.json, otherwise YAML)
        config: String,
    },
    /// Print the tokens of a template (or, with --path, a concrete path)
    Tokens {
        /// Template or path text
        input: String,
        /// Tokenize as a concrete path instead of a template
        #[arg(long)]
        path: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rota=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Resolve {
            config,
            paths,
            json,
        } => cmd_resolve(&config, &paths, json),
        Command::Check { config } => cmd_check(&config),
        Command::Tokens { input, path } => {
            cmd_tokens(&input, path);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(config_path: &str, paths: &[String], json: bool) -> Result<(), String> {
    let router = build_router(config_path)?;
    tracing::debug!(config = config_path, paths = paths.len(), "resolving");
    for path in paths {
        println!("{}", resolve_line(&router, path, json)?);
    }
    Ok(())
}

fn cmd_check(config_path: &str) -> Result<(), String> {
    build_router(config_path)?;
    println!("Config valid");
    Ok(())
}

fn cmd_tokens(input: &str, as_path: bool) {
    let tokens = if as_path {
        tokenize_path(input)
    } else {
        tokenize_template(input)
    };
    for token in &tokens {
        println!("{}", describe(token));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Router assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_router(config_path: &str) -> Result<Router<Resolution>, String> {
    let config = load_config(config_path)?;
    load_router(config).map_err(|e| format!("config invalid: {e}"))
}

/// One output line for `path`. A miss is reported, not treated as a failure.
fn resolve_line(router: &Router<Resolution>, path: &str, json: bool) -> Result<String, String> {
    match router.resolve(path) {
        Ok(resolution) if json => serde_json::to_string(&resolution)
            .map_err(|e| format!("failed to encode resolution: {e}")),
        Ok(resolution) => Ok(format_resolution(path, &resolution)),
        Err(RouteError::NotFound { .. }) if json => Ok("null".to_string()),
        Err(RouteError::NotFound { .. }) => Ok(format!("{path} -> (no match)")),
        Err(e) => Err(format!("failed to resolve \"{path}\": {e}")),
    }
}

fn format_resolution(path: &str, resolution: &Resolution) -> String {
    let mut line = format!("{path} -> {}", resolution.action);
    if !resolution.params.is_empty() {
        let params: Vec<String> = resolution
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        line.push_str(&format!(" [{}]", params.join(", ")));
    }
    if !resolution.tail.is_empty() {
        line.push_str(&format!(" tail={}", resolution.tail));
    }
    line
}

fn describe(token: &Token) -> String {
    match token {
        Token::Separator => "separator".to_string(),
        Token::Text(value) => format!("text {value:?}"),
        Token::Param(name) => format!("param {name}"),
        Token::Const { name, value } => format!("const {name}={value:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<RouteConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_config(path, &content)
}

fn parse_config(path: &str, content: &str) -> Result<RouteConfig, String> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}
