//! Version Gate CLI
//!
//! Loads a policy config and explains what the gate would do with it.
//!
//! ## Commands
//!
//! - `versions`: list every known release with its token and protocol id
//! - `validate`: validate the config and print its fingerprint and counts
//! - `check <version>...`: print the decision for each version, with and
//!   without bypass permissions
//!
//! ## Configuration
//!
//! Environment variables:
//! - `VERSION_GATE_CONFIG`: path to the JSON config (overridden by `--config`)
//! - `RUST_LOG`: Log level filter (default: versiongate=info,version_gate=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin versiongate -- --config gate.json check 1.8 MINECRAFT_1_12_2
//! ```

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use version_gate::{
    Capability, CapabilitySet, JoinOutcome, LoginVerdict, ProtocolVersion, RawConfig,
    ReminderTick, VersionGate,
};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "versiongate=info,version_gate=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Split `--config <path>` out of the argument list.
fn parse_args(args: Vec<String>) -> Result<(Option<String>, Vec<String>), Box<dyn std::error::Error>> {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config = Some(iter.next().ok_or("--config needs a path")?);
        } else {
            rest.push(arg);
        }
    }

    Ok((config, rest))
}

fn load_config(path: Option<String>) -> Result<RawConfig, Box<dyn std::error::Error>> {
    let path = path.or_else(|| std::env::var("VERSION_GATE_CONFIG").ok());

    match path {
        Some(path) => {
            info!(path = %path, "Loading config");
            Ok(RawConfig::from_path(&path)?)
        }
        None => {
            warn!("No config given (--config or VERSION_GATE_CONFIG), using stock config");
            Ok(RawConfig::stock())
        }
    }
}

fn print_versions() {
    println!("{:<10} {:<20} {:>8}", "RELEASE", "TOKEN", "PROTOCOL");
    for version in ProtocolVersion::ALL {
        let protocol = version
            .protocol_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        println!("{:<10} {:<20} {:>8}", version.release(), version.token(), protocol);
    }
}

fn print_validation(gate: &VersionGate<mpsc::UnboundedSender<ReminderTick>>) {
    let snapshot = gate.snapshot();

    println!("fingerprint: {}", snapshot.fingerprint());
    if let Some(range) = snapshot.whitelist_range() {
        println!("range:       {} - {}", range.oldest(), range.newest());
    }
    let whitelist: Vec<_> = snapshot.whitelist().iter().map(|v| v.release()).collect();
    let blacklist: Vec<_> = snapshot.blacklist().iter().map(|v| v.release()).collect();
    println!("whitelist:   {} [{}]", whitelist.len(), whitelist.join(", "));
    println!("blacklist:   {} [{}]", blacklist.len(), blacklist.join(", "));
    println!("reminders:   {}", snapshot.reminder());
    if let Some(recommended) = snapshot.recommended() {
        println!("recommended: {}", recommended.version);
    }
}

fn print_checks(
    gate: &VersionGate<mpsc::UnboundedSender<ReminderTick>>,
    inputs: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    if inputs.is_empty() {
        return Err("check needs at least one version".into());
    }

    let bypass = CapabilitySet::none().with(Capability::BypassAll);

    for input in inputs {
        let Some(version) = ProtocolVersion::resolve(input) else {
            println!("{input}: unresolvable (treated as not whitelisted)");
            continue;
        };

        let plain = match gate.check_login(version, Some(CapabilitySet::none())) {
            LoginVerdict::Allow(decision) => decision.to_string(),
            LoginVerdict::Deny { decision, message } => format!("{decision} \"{message}\""),
            LoginVerdict::Deferred => "deferred".to_string(),
        };
        let bypassed = match gate.check_join(version, &bypass) {
            JoinOutcome::Admit { decision, messages } => {
                format!("{decision} ({} message(s) after join)", messages.len())
            }
            JoinOutcome::Kick { decision, .. } => decision.to_string(),
        };

        println!("{} ({})", version, version.token());
        println!("  no permissions: {plain}");
        println!("  bypass-all:     {bypassed}");
    }

    Ok(())
}

fn usage() -> &'static str {
    "usage: versiongate [--config <path>] <versions | validate | check <version>...>"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (config_path, rest) = parse_args(std::env::args().skip(1).collect())?;
    let Some((command, inputs)) = rest.split_first() else {
        return Err(usage().into());
    };

    if command == "versions" {
        print_versions();
        return Ok(());
    }

    let raw = load_config(config_path)?;
    let (queue, _ticks) = mpsc::unbounded_channel::<ReminderTick>();
    let gate = VersionGate::new(&raw, queue, Handle::current())?;

    let result = match command.as_str() {
        "validate" => {
            print_validation(&gate);
            Ok(())
        }
        "check" => print_checks(&gate, inputs),
        _ => Err(usage().into()),
    };

    gate.shutdown();
    result
}
