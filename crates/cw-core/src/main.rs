//! Colony Watch Core - predictive status engine CLI
//!
//! Reads a colony fixture (history, current readings, break thresholds,
//! host findings) and reports:
//! - stockpile forecasts (time until each resource runs out)
//! - colonist mood forecasts (time until the extreme break threshold)
//! - the aggregated colony health report

use clap::{Args, Parser, Subcommand};
use cw_common::{Band, Error, OutputFormat, SeriesKey, StructuredError, SCHEMA_VERSION};
use cw_config::{get_preset, list_presets, load_config, LoadedConfig, PresetName, ValidationError};
use cw_core::adapters::{MoodInput, MoodOverview, ResourceReport};
use cw_core::exit_codes::ExitCode;
use cw_core::fixture::{ColonyFixture, FixtureError};
use cw_core::forecast::Confidence;
use cw_core::health::HealthReport;
use cw_core::logging::{event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage};
use cw_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use cw_core::store::DEFAULT_RETENTION;
use cw_core::Engine;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Colony Watch Core - forecast colony shortages and mood breaks
#[derive(Parser)]
#[command(name = "cw-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to forecast.json (overrides CW_FORECAST_CONFIG and config dirs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in preset used when no config file is found
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr: human or jsonl
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast stockpile depletion
    Resources(ResourcesArgs),
    /// Forecast colonist mood against break thresholds
    Mood(MoodArgs),
    /// Aggregate colony health report
    Health(HealthArgs),
    /// Validate configuration and build every adapter
    Check,
    /// Print JSON schemas for output types
    Schema(SchemaArgs),
    /// List built-in presets
    Presets(PresetsArgs),
}

#[derive(Args, Debug)]
struct ResourcesArgs {
    /// Colony fixture file
    #[arg(long)]
    fixture: PathBuf,

    /// Only these resources (repeatable)
    #[arg(long = "resource")]
    resources: Vec<String>,
}

#[derive(Args, Debug)]
struct MoodArgs {
    /// Colony fixture file
    #[arg(long)]
    fixture: PathBuf,

    /// Only these colonists (repeatable)
    #[arg(long = "colonist")]
    colonists: Vec<String>,
}

#[derive(Args, Debug)]
struct HealthArgs {
    /// Colony fixture file
    #[arg(long)]
    fixture: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name (see --list)
    type_name: Option<String>,

    /// List available types
    #[arg(long)]
    list: bool,

    /// Print every schema
    #[arg(long)]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct PresetsArgs {
    /// Print the full configuration of one preset
    #[arg(long)]
    show: Option<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let level = LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = tracing::info_span!("run", run_id = %run_id);
    let _guard = span.enter();
    info!(event = event_names::RUN_STARTED, stage = %Stage::Init, "run started");

    let ctx = RunContext {
        global: &cli.global,
        run_id: &run_id,
    };
    let exit_code = match &cli.command {
        Commands::Resources(args) => run_resources(&ctx, args),
        Commands::Mood(args) => run_mood(&ctx, args),
        Commands::Health(args) => run_health(&ctx, args),
        Commands::Check => run_check(&ctx),
        Commands::Schema(args) => run_schema(&ctx, args),
        Commands::Presets(args) => run_presets(&ctx, args),
    };

    info!(event = event_names::RUN_FINISHED, exit_code = %exit_code, "run finished");
    std::process::exit(exit_code.as_i32());
}

struct RunContext<'a> {
    global: &'a GlobalOpts,
    run_id: &'a str,
}

impl RunContext<'_> {
    fn envelope(&self, config: Option<&LoadedConfig>) -> serde_json::Value {
        serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": self.run_id,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "config": config.map(|c| serde_json::json!({
                "source": c.snapshot.source,
                "path": c.snapshot.path,
                "preset": c.snapshot.preset,
                "id": c.snapshot.short_id(),
            })),
        })
    }

    fn respond(&self, config: Option<&LoadedConfig>, key: &str, payload: serde_json::Value) {
        let mut response = self.envelope(config);
        if let serde_json::Value::Object(ref mut map) = response {
            map.insert(key.to_string(), payload);
        }
        print_json(&response, false);
    }
}

// ============================================================================
// Shared setup
// ============================================================================

fn load(ctx: &RunContext<'_>) -> Result<(LoadedConfig, Engine), ExitCode> {
    let preset = match ctx.global.preset.as_deref() {
        Some(name) => match PresetName::parse(name) {
            Some(preset) => Some(preset),
            None => {
                let known: Vec<&str> = PresetName::ALL.iter().map(|p| p.as_str()).collect();
                output_message_error(
                    ctx,
                    ExitCode::ArgsError,
                    &format!("unknown preset '{}' (known: {})", name, known.join(", ")),
                );
                return Err(ExitCode::ArgsError);
            }
        },
        None => None,
    };

    let loaded = load_config(ctx.global.config.as_deref(), preset)
        .map_err(|e| output_config_error(ctx, &e))?;
    info!(
        event = event_names::CONFIG_LOADED,
        stage = %Stage::Init,
        source = %loaded.snapshot.source,
        hash = loaded.snapshot.short_id(),
        "config loaded"
    );

    let engine = Engine::from_config(&loaded.config).map_err(|e| output_error(ctx, &e))?;
    Ok((loaded, engine))
}

fn load_fixture(ctx: &RunContext<'_>, path: &std::path::Path) -> Result<ColonyFixture, ExitCode> {
    let fixture = ColonyFixture::from_file(path).map_err(|e| output_fixture_error(ctx, &e))?;
    info!(
        event = event_names::FIXTURE_LOADED,
        stage = %Stage::Load,
        series = fixture.series.len(),
        "fixture loaded"
    );
    Ok(fixture)
}

fn worst<I: IntoIterator<Item = Band>>(bands: I) -> Band {
    bands.into_iter().max().unwrap_or(Band::Healthy)
}

// ============================================================================
// Commands
// ============================================================================

fn run_resources(ctx: &RunContext<'_>, args: &ResourcesArgs) -> ExitCode {
    let (loaded, engine) = match load(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };
    // A bad --resource is a usage error, not a broken config.
    for name in &args.resources {
        if loaded.config.resource(name).is_none() {
            let message = Error::UnknownDomain(name.clone()).to_string();
            return output_message_error(ctx, ExitCode::ArgsError, &message);
        }
    }
    let fixture = match load_fixture(ctx, &args.fixture) {
        Ok(f) => f,
        Err(code) => return code,
    };

    let reports = match forecast_resources(&engine, &fixture, &args.resources) {
        Ok(r) => r,
        Err(e) => return output_fixture_error(ctx, &e),
    };

    match ctx.global.format {
        OutputFormat::Json => ctx.respond(Some(&loaded), "resources", to_value(&reports)),
        OutputFormat::Summary => {
            for report in &reports {
                println!("{}", resource_line(report));
            }
        }
        OutputFormat::Md => print!("{}", resources_md(&reports)),
    }

    ExitCode::from_band(worst(reports.iter().map(ResourceReport::band)))
}

fn run_mood(ctx: &RunContext<'_>, args: &MoodArgs) -> ExitCode {
    let (loaded, engine) = match load(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let fixture = match load_fixture(ctx, &args.fixture) {
        Ok(f) => f,
        Err(code) => return code,
    };

    let overview = match assess_mood(&engine, &fixture, &args.colonists) {
        Ok(o) => o,
        Err(e) => return output_fixture_error(ctx, &e),
    };

    match ctx.global.format {
        OutputFormat::Json => ctx.respond(Some(&loaded), "mood", to_value(&overview)),
        OutputFormat::Summary => {
            for report in &overview.colonists {
                println!(
                    "{}: {} (mood {:.2}, floor {:.2}, {}, {}, {})",
                    report.colonist_id,
                    report.band(),
                    report.assessment.current,
                    report.floor,
                    report.assessment.trend,
                    report.assessment.forecast.horizon.describe(),
                    confidence_str(report.assessment.forecast.confidence),
                );
            }
        }
        OutputFormat::Md => print!("{}", mood_md(&overview)),
    }

    ExitCode::from_band(worst(overview.colonists.iter().map(|r| r.band())))
}

fn run_health(ctx: &RunContext<'_>, args: &HealthArgs) -> ExitCode {
    let (loaded, engine) = match load(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let fixture = match load_fixture(ctx, &args.fixture) {
        Ok(f) => f,
        Err(code) => return code,
    };

    let resources = match forecast_resources(&engine, &fixture, &[]) {
        Ok(r) => r,
        Err(e) => return output_fixture_error(ctx, &e),
    };
    let mood = match assess_mood(&engine, &fixture, &[]) {
        Ok(o) => o,
        Err(e) => return output_fixture_error(ctx, &e),
    };
    let report = engine.health(&resources, fixture.subsystems.clone(), &mood);
    info!(
        event = event_names::HEALTH_AGGREGATED,
        stage = %Stage::Aggregate,
        overall = %report.overall.band,
        systems = report.systems.len(),
        "health aggregated"
    );

    match ctx.global.format {
        OutputFormat::Json => ctx.respond(Some(&loaded), "health", to_value(&report)),
        OutputFormat::Summary => {
            println!("overall: {} - {}", report.overall.band, report.summary);
            for alert in &report.critical_alerts {
                println!("  ! {}", alert);
            }
        }
        OutputFormat::Md => print!("{}", health_md(&report)),
    }

    ExitCode::from_band(report.overall.band)
}

fn run_check(ctx: &RunContext<'_>) -> ExitCode {
    let (loaded, engine) = match load(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let resources: Vec<&str> = engine.resources().iter().map(|r| r.name()).collect();

    match ctx.global.format {
        OutputFormat::Json => ctx.respond(
            Some(&loaded),
            "check",
            serde_json::json!({
                "status": "valid",
                "resources": resources,
                "mood_domain": engine.mood().domain(),
                "snapshot": loaded.snapshot,
            }),
        ),
        OutputFormat::Summary => {
            println!(
                "[{}] config: OK ({}, {} resources)",
                loaded.snapshot.short_id(),
                loaded.snapshot.source,
                resources.len()
            );
        }
        OutputFormat::Md => {
            println!("# Configuration Check");
            println!();
            println!("Status: valid");
            match &loaded.snapshot.path {
                Some(path) => println!("Config: {}", path),
                None => println!(
                    "Config: built-in preset ({})",
                    loaded.snapshot.preset.as_deref().unwrap_or("default")
                ),
            }
            println!("Resources: {}", resources.join(", "));
            println!("Mood domain: {}", engine.mood().domain());
        }
    }

    ExitCode::Clean
}

fn run_schema(ctx: &RunContext<'_>, args: &SchemaArgs) -> ExitCode {
    if args.list {
        match ctx.global.format {
            OutputFormat::Json => {
                let list: Vec<serde_json::Value> = available_schemas()
                    .into_iter()
                    .map(|(name, desc)| serde_json::json!({"name": name, "description": desc}))
                    .collect();
                print_json(&serde_json::Value::Array(list), args.compact);
            }
            _ => {
                for (name, desc) in available_schemas() {
                    println!("{:<18} {}", name, desc);
                }
            }
        }
        return ExitCode::Clean;
    }

    if args.all {
        print_json(&to_value(&generate_all_schemas()), args.compact);
        return ExitCode::Clean;
    }

    match args.type_name.as_deref() {
        Some(name) => match generate_schema(name) {
            Some(schema) => {
                print_json(&schema, args.compact);
                ExitCode::Clean
            }
            None => output_message_error(
                ctx,
                ExitCode::ArgsError,
                &format!("unknown schema type '{}' (see --list)", name),
            ),
        },
        None => output_message_error(
            ctx,
            ExitCode::ArgsError,
            "pass a type name, --list, or --all",
        ),
    }
}

fn run_presets(ctx: &RunContext<'_>, args: &PresetsArgs) -> ExitCode {
    if let Some(name) = args.show.as_deref() {
        return match PresetName::parse(name) {
            Some(preset) => {
                print_json(&to_value(&get_preset(preset)), false);
                ExitCode::Clean
            }
            None => output_message_error(
                ctx,
                ExitCode::ArgsError,
                &format!("unknown preset '{}'", name),
            ),
        };
    }

    let presets = list_presets();
    match ctx.global.format {
        OutputFormat::Json => ctx.respond(None, "presets", to_value(&presets)),
        OutputFormat::Summary => {
            for p in &presets {
                println!("{}: {}", p.name, p.description);
            }
        }
        OutputFormat::Md => {
            println!("| Preset | Description |");
            println!("|--------|-------------|");
            for p in &presets {
                println!("| {} | {} |", p.name, p.description);
            }
        }
    }
    ExitCode::Clean
}

// ============================================================================
// Engine calls over a fixture
// ============================================================================

fn forecast_resources(
    engine: &Engine,
    fixture: &ColonyFixture,
    only: &[String],
) -> Result<Vec<ResourceReport>, FixtureError> {
    let store = fixture.to_store(DEFAULT_RETENTION)?;
    let reports = engine.forecast_resources(&store, |key: &SeriesKey| {
        if !only.is_empty() && !only.iter().any(|n| n == key.as_str()) {
            return None;
        }
        fixture.current_value(key)
    })?;
    for report in &reports {
        debug!(
            event = event_names::FORECAST_SERIES,
            stage = %Stage::Forecast,
            resource = %report.resource,
            band = %report.band(),
            "resource forecast"
        );
    }
    Ok(reports)
}

fn assess_mood(
    engine: &Engine,
    fixture: &ColonyFixture,
    only: &[String],
) -> Result<MoodOverview, FixtureError> {
    let domain = engine.mood().domain();
    let ids = if only.is_empty() {
        fixture.entities(domain)
    } else {
        only.to_vec()
    };

    let now = fixture.now();
    let mut inputs = Vec::with_capacity(ids.len());
    for id in &ids {
        let current = fixture
            .current_value(&SeriesKey::entity(domain, id))
            .ok_or_else(|| FixtureError::Invalid(format!("no mood reading for colonist {}", id)))?;
        inputs.push(MoodInput {
            colonist_id: id,
            current,
            negative_thoughts: fixture.negative_thoughts(id),
            now,
        });
    }

    let store = fixture.to_store(DEFAULT_RETENTION)?;
    engine
        .assess_mood(&store, &fixture.floors, &inputs)
        .map_err(|e| {
            if e.category() == cw_common::ErrorCategory::Host {
                error!(event = event_names::FORECAST_HOST_ERROR, error = %e, "host lookup failed");
            }
            FixtureError::Engine(e)
        })
}

// ============================================================================
// Rendering
// ============================================================================

fn to_value<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
}

fn print_json(value: &serde_json::Value, compact: bool) {
    let text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match text {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn confidence_str(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::Measured => "measured",
        Confidence::Estimated => "estimated",
    }
}

fn resource_line(report: &ResourceReport) -> String {
    format!(
        "{}: {} ({:.0} left, {:+.1}/day, {}, {})",
        report.resource,
        report.band(),
        report.assessment.current,
        report.assessment.rate.value,
        report.assessment.forecast.horizon.describe(),
        confidence_str(report.assessment.forecast.confidence),
    )
}

fn resources_md(reports: &[ResourceReport]) -> String {
    let mut out = String::from("# Resource Forecast\n\n");
    out.push_str("| Resource | Current | Rate | Horizon | Confidence | Band |\n");
    out.push_str("|----------|---------|------|---------|------------|------|\n");
    for r in reports {
        out.push_str(&format!(
            "| {} | {:.0} | {:+.1} | {} | {} | {} |\n",
            r.label,
            r.assessment.current,
            r.assessment.rate.value,
            r.assessment.forecast.horizon.describe(),
            confidence_str(r.assessment.forecast.confidence),
            r.band(),
        ));
    }
    let advice: Vec<&ResourceReport> = reports.iter().filter(|r| r.recommendation.is_some()).collect();
    if !advice.is_empty() {
        out.push_str("\n## Recommendations\n\n");
        for r in advice {
            out.push_str(&format!(
                "- **{}**: {}\n",
                r.label,
                r.recommendation.as_deref().unwrap_or_default()
            ));
        }
    }
    out
}

fn mood_md(overview: &MoodOverview) -> String {
    let mut out = String::from("# Mood Forecast\n\n");
    out.push_str("| Colonist | Mood | Break at | Trend | Time to break | Band |\n");
    out.push_str("|----------|------|----------|-------|---------------|------|\n");
    for r in &overview.colonists {
        out.push_str(&format!(
            "| {} | {:.2} | {:.2} | {} | {} | {} |\n",
            r.colonist_id,
            r.assessment.current,
            r.floor,
            r.assessment.trend,
            r.assessment.forecast.horizon.describe(),
            r.band(),
        ));
    }
    if !overview.high_risk.is_empty() {
        out.push_str("\n## High Risk\n\n");
        for c in &overview.high_risk {
            out.push_str(&format!("- {} ({}, {})\n", c.colonist_id, c.band, c.horizon));
        }
    }
    out
}

fn health_md(report: &HealthReport) -> String {
    let mut out = String::from("# Colony Health\n\n");
    out.push_str(&format!(
        "**Overall: {}** - {}\n\n",
        report.overall.band, report.summary
    ));
    if !report.critical_alerts.is_empty() {
        out.push_str("## Critical Alerts\n\n");
        for alert in &report.critical_alerts {
            out.push_str(&format!("- {}\n", alert));
        }
        out.push('\n');
    }
    out.push_str("| Subsystem | Band | Issues |\n");
    out.push_str("|-----------|------|--------|\n");
    for s in &report.systems {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            s.subsystem,
            s.band,
            s.issues.join("; ")
        ));
    }
    if !report.top_recommendations.is_empty() {
        out.push_str("\n## Top Recommendations\n\n");
        for (i, rec) in report.top_recommendations.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, rec));
        }
    }
    out
}

// ============================================================================
// Errors
// ============================================================================

fn output_error(ctx: &RunContext<'_>, err: &Error) -> ExitCode {
    let exit_code = ExitCode::from_error(err);
    let structured = StructuredError::from(err);

    match ctx.global.format {
        OutputFormat::Json => {
            let mut response = ctx.envelope(None);
            if let serde_json::Value::Object(ref mut map) = response {
                map.insert("status".to_string(), serde_json::json!("error"));
                map.insert("error".to_string(), to_value(&structured));
            }
            eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        OutputFormat::Summary => eprintln!("[{}] error: {}", ctx.run_id, err),
        OutputFormat::Md => {
            eprintln!("# {}", err.headline());
            eprintln!();
            eprintln!("Error: {}", err);
            eprintln!("Hint: {}", err.remediation());
        }
    }
    exit_code
}

fn output_config_error(ctx: &RunContext<'_>, err: &ValidationError) -> ExitCode {
    error!(event = event_names::CONFIG_ERROR, code = err.code(), error = %err, "config rejected");
    output_message_error(ctx, ExitCode::ConfigError, &err.to_string())
}

fn output_fixture_error(ctx: &RunContext<'_>, err: &FixtureError) -> ExitCode {
    match err {
        FixtureError::Engine(e) => output_error(ctx, e),
        FixtureError::Io { .. } => output_message_error(ctx, ExitCode::IoError, &err.to_string()),
        FixtureError::Parse(_) | FixtureError::Invalid(_) => {
            output_message_error(ctx, ExitCode::ArgsError, &err.to_string())
        }
    }
}

fn output_message_error(ctx: &RunContext<'_>, exit_code: ExitCode, message: &str) -> ExitCode {
    match ctx.global.format {
        OutputFormat::Json => {
            let mut response = ctx.envelope(None);
            if let serde_json::Value::Object(ref mut map) = response {
                map.insert("status".to_string(), serde_json::json!("error"));
                map.insert(
                    "error".to_string(),
                    serde_json::json!({
                        "code": exit_code.as_i32(),
                        "name": exit_code.code_name(),
                        "message": message,
                    }),
                );
            }
            eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        OutputFormat::Summary => eprintln!("[{}] error: {}", ctx.run_id, message),
        OutputFormat::Md => {
            eprintln!("# Error");
            eprintln!();
            eprintln!("{}", message);
        }
    }
    exit_code
}
