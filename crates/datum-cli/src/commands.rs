use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use datum_backend::{Backend, DiskBlobStore, TokenGenerator, UuidTokenGenerator, Value};
use datum_server::input::decode_body;
use datum_server::{DatumServer, Format, ServerConfig};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Get(args) => cmd_get(args, cli.format),
        Command::Set(args) => cmd_set(args),
        Command::Delete(args) => cmd_delete(args),
        Command::Token => {
            println!("{}", UuidTokenGenerator.new_token());
            Ok(())
        }
        Command::Onetime(args) => cmd_alias(args, AliasKind::Onetime),
        Command::View(args) => cmd_alias(args, AliasKind::View),
    }
}

fn open_backend(dir: &Path) -> anyhow::Result<Backend> {
    debug!(dir = %dir.display(), "opening data directory");
    let store = DiskBlobStore::open(dir)
        .with_context(|| format!("opening data directory {}", dir.display()))?;
    Ok(Backend::new(Arc::new(store)))
}

/// Resolve the effective server config: file values first, then flags.
fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = args.addr {
        config.bind_addr = addr;
    }
    if let Some(dir) = &args.dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    let server = DatumServer::new(config)?;
    println!(
        "{} datum server on {} (data: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().data_dir.display()
    );
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_get(args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let backend = open_backend(&args.store.dir)?;
    let target = &args.target;
    let token = backend.resolve(&target.token)?;
    match backend.get(&token, &target.space, &target.path)? {
        Some(value) => {
            println!("{}", format_value(&value, format)?);
            Ok(())
        }
        None => anyhow::bail!("{} not found in {}/{}", target.path, target.token, target.space),
    }
}

fn cmd_set(args: SetArgs) -> anyhow::Result<()> {
    let backend = open_backend(&args.store.dir)?;
    let format = if args.json { Format::Json } else { Format::Plain };
    let value = decode_body(args.value.as_bytes(), format, args.key_id.as_deref())?;
    let token = backend.resolve(&args.token)?;
    let deleting = value.is_none();
    backend.set(&token, &args.space, &args.path, value)?;
    let verb = if deleting { "Deleted" } else { "Set" };
    println!("{} {} {}", "✓".green(), verb, args.path.yellow());
    Ok(())
}

fn cmd_delete(args: DeleteArgs) -> anyhow::Result<()> {
    let backend = open_backend(&args.store.dir)?;
    let token = backend.resolve(&args.token)?;
    backend.delete(&token, &args.space, &args.path)?;
    println!("{} Deleted {}", "✓".green(), args.path.yellow());
    Ok(())
}

#[derive(Clone, Copy)]
enum AliasKind {
    Onetime,
    View,
}

fn cmd_alias(args: AliasArgs, kind: AliasKind) -> anyhow::Result<()> {
    let backend = open_backend(&args.store.dir)?;
    let alias = match kind {
        AliasKind::Onetime => backend.create_onetime(&args.parent)?,
        AliasKind::View => backend.create_view(&args.parent)?,
    };
    println!("{alias}");
    Ok(())
}

fn format_value(value: &Value, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match (value, format) {
        (_, OutputFormat::Json) => serde_json::to_string_pretty(value)?,
        (Value::Document(doc), OutputFormat::Toml) => {
            toml::to_string(doc)?.trim_end().to_string()
        }
        (Value::Document(doc), OutputFormat::Text) => serde_json::to_string_pretty(doc)?,
        (Value::Scalar(scalar), _) => scalar.to_string(),
        (Value::Encrypted(enc), _) => format!(
            "{} key={} ({} bytes)",
            "encrypted".cyan(),
            enc.key_id.yellow(),
            enc.ciphertext.len()
        ),
    })
}
