//! flavorkit Android CLI
//!
//! Resolves, inspects, and builds Android build variants.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flavorkit_android::build_config::{self, FieldFormat};
use flavorkit_android::gradle::{self, GradleAction};
use flavorkit_android::resolver::{self, KEY_VERSION_CODE, KEY_VERSION_NAME};
use flavorkit_android::sdk::FlutterSdkCheck;
use flavorkit_android::{
    resolve, resolve_matrix, resolve_version, BuildVariant, Channel, PropertySources,
    ResolvedConfig, Traceability,
};
use flavorkit_cli::output::{format_count, format_duration, Status};
use flavorkit_cli::progress;
use flavorkit_core::config::Config;
use flavorkit_core::error::{exit_codes, Error};
use flavorkit_core::health::{HealthChecker, HealthStatus, PathCheck};
use flavorkit_core::properties::{self, PropertySource};
use flavorkit_telemetry::{level_for_verbosity, TelemetryConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flavorkit-android")]
#[command(about = "Resolve and build Android build variants and distribution channels")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root directory
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration of one variant and channel
    Resolve {
        /// Build variant: debug, release, profile
        #[arg(long)]
        variant: String,
        /// Distribution channel: googleplay, huawei, xiaomi, direct
        #[arg(long)]
        channel: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Print signing passwords instead of masking them
        #[arg(long)]
        show_secrets: bool,
        /// Skip the git commit lookup
        #[arg(long)]
        no_git: bool,
    },

    /// Resolve every variant and channel combination
    Matrix {
        /// Only this build variant
        #[arg(long)]
        variant: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the generated BuildConfig constants
    Fields {
        /// Build variant: debug, release, profile
        #[arg(long)]
        variant: String,
        /// Distribution channel: googleplay, huawei, xiaomi, direct
        #[arg(long)]
        channel: String,
        /// Format: gradle, kotlin, json
        #[arg(long, default_value = "gradle")]
        format: String,
    },

    /// Print version code, version name, and build provenance
    #[command(name = "version-info")]
    VersionInfo {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update the version in the developer properties
    #[command(name = "set-version")]
    SetVersion {
        /// New version name
        #[arg(long)]
        name: Option<String>,
        /// New version code (positive integer)
        #[arg(long, allow_hyphen_values = true)]
        code: Option<String>,
    },

    /// Build a variant through the Gradle wrapper
    Build {
        /// Build variant: debug, release, profile
        #[arg(long, default_value = "debug")]
        variant: String,
        /// Distribution channel: googleplay, huawei, xiaomi, direct
        #[arg(long)]
        channel: String,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
    },

    /// Diagnose environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

struct Context {
    config: Config,
    quiet: bool,
}

impl Context {
    fn info(&self, message: &str) {
        if !self.quiet {
            Status::info(message);
        }
    }

    fn sources(&self) -> flavorkit_core::Result<PropertySources> {
        PropertySources::load(&self.config)
    }

    fn base_application_id(&self) -> &str {
        &self.config.schema.project.base_application_id
    }
}

/// Resolved configuration with the composed identifiers spelled out
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedView {
    application_id: String,
    full_version_name: String,
    gradle_variant: String,
    #[serde(flatten)]
    config: ResolvedConfig,
}

impl ResolvedView {
    fn new(config: ResolvedConfig, base: &str, show_secrets: bool) -> Self {
        Self {
            application_id: config.application_id(base),
            full_version_name: config.full_version_name(),
            gradle_variant: config.gradle_variant_name(),
            config: if show_secrets { config } else { config.redacted() },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let loaded = Config::load(&cli.project_dir, cli.config.as_deref());

    let (configured_level, json_logs) = match &loaded {
        Ok(config) => (
            config.schema.logging.level.clone(),
            config.schema.logging.json,
        ),
        Err(_) => ("warn".to_string(), false),
    };
    flavorkit_telemetry::init_with_config(&TelemetryConfig {
        log_level: level_for_verbosity(cli.verbose, cli.quiet, &configured_level),
        json: json_logs,
        show_target: cli.verbose > 1,
    })?;

    let config = match loaded {
        Ok(config) => config,
        Err(e) => std::process::exit(fail(&e)),
    };
    tracing::debug!(path = ?config.path, root = %config.root.display(), "Configuration loaded");

    let ctx = Context {
        config,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Resolve {
            variant,
            channel,
            json,
            show_secrets,
            no_git,
        } => run_resolve(&ctx, &variant, &channel, json, show_secrets, no_git),
        Commands::Matrix { variant, json } => run_matrix(&ctx, variant.as_deref(), json),
        Commands::Fields {
            variant,
            channel,
            format,
        } => run_fields(&ctx, &variant, &channel, &format),
        Commands::VersionInfo { json } => run_version_info(&ctx, json),
        Commands::SetVersion { name, code } => {
            run_set_version(&ctx, name.as_deref(), code.as_deref())
        }
        Commands::Build {
            variant,
            channel,
            bundle,
            clean,
        } => run_build(&ctx, &variant, &channel, bundle, clean),
        Commands::Doctor { json } => run_doctor(&ctx, json),
    };

    std::process::exit(exit_code);
}

/// Report an error and return the exit code it maps to
fn fail(error: &Error) -> i32 {
    tracing::debug!(report = ?error.to_report(), "Command failed");
    Status::error(&error.to_string());
    error.code.exit_code()
}

fn parse_pair(variant: &str, channel: &str) -> flavorkit_core::Result<(BuildVariant, Channel)> {
    Ok((variant.parse()?, channel.parse()?))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            exit_codes::SUCCESS
        }
        Err(e) => fail(&Error::from(e)),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn run_resolve(
    ctx: &Context,
    variant: &str,
    channel: &str,
    json: bool,
    show_secrets: bool,
    no_git: bool,
) -> i32 {
    let (variant, channel) = match parse_pair(variant, channel) {
        Ok(pair) => pair,
        Err(e) => return fail(&e),
    };
    let sources = match ctx.sources() {
        Ok(sources) => sources,
        Err(e) => return fail(&e),
    };

    let mut config = resolve(variant, channel, &sources);
    if !no_git {
        config = config.with_traceability(Traceability::capture(&ctx.config.root));
    }

    let view = ResolvedView::new(config, ctx.base_application_id(), show_secrets);
    if json {
        return print_json(&view);
    }

    let config = &view.config;
    Status::header(&format!("{} ({channel}/{variant})", view.gradle_variant));
    Status::field("Application ID", &view.application_id);
    Status::field("Version", &format!("{} ({})", view.full_version_name, config.version_code));
    Status::field("API base URL", &config.api_base_url);
    Status::field("Channel", &config.channel_label);
    Status::field("Debug", yes_no(config.is_debug));
    Status::field("Minify", yes_no(config.minify_enabled));
    Status::field("Shrink resources", yes_no(config.shrink_resources));
    Status::field("Flavor dimension", config.flavor_dimension);
    if !config.matching_fallbacks.is_empty() {
        let fallbacks: Vec<String> = config
            .matching_fallbacks
            .iter()
            .map(ToString::to_string)
            .collect();
        Status::field("Matching fallbacks", &fallbacks.join(", "));
    }
    for (key, value) in &config.manifest_placeholders {
        Status::field(&format!("Placeholder {key}"), value);
    }

    match &config.signing {
        Some(signing) => {
            Status::field("Key alias", signing.key_alias.as_deref().unwrap_or("-"));
            Status::field("Key password", signing.key_password.as_deref().unwrap_or("-"));
            let store = signing
                .store_file
                .as_ref()
                .map_or_else(|| "-".to_string(), |p| p.display().to_string());
            Status::field("Keystore", &store);
            Status::field("Store password", signing.store_password.as_deref().unwrap_or("-"));
            if !signing.is_complete() {
                Status::warning(&format!(
                    "Signing identity is incomplete, missing: {}",
                    signing.missing_keys().join(", ")
                ));
            }
        }
        None if variant.profile().release_signing => {
            Status::field("Signing", "unsigned (no key.properties)");
        }
        None => Status::field("Signing", "debug key"),
    }

    if let Some(trace) = &config.traceability {
        Status::field("Git commit", &trace.git_commit);
        Status::field("Build time", &trace.build_time_string());
    }

    exit_codes::SUCCESS
}

fn run_matrix(ctx: &Context, variant: Option<&str>, json: bool) -> i32 {
    let filter = match variant.map(str::parse::<BuildVariant>).transpose() {
        Ok(filter) => filter,
        Err(e) => return fail(&e),
    };
    let sources = match ctx.sources() {
        Ok(sources) => sources,
        Err(e) => return fail(&e),
    };

    let base = ctx.base_application_id();
    let views: Vec<ResolvedView> = resolve_matrix(&sources)
        .into_iter()
        .filter(|c| filter.is_none_or(|v| c.variant == v))
        .map(|c| ResolvedView::new(c, base, false))
        .collect();

    if json {
        return print_json(&views);
    }

    Status::header(&format!(
        "Build matrix ({})",
        format_count(views.len(), "variant", "variants")
    ));
    for view in &views {
        println!(
            "  {:<20} {:<40} {:<20} {}",
            view.gradle_variant,
            view.application_id,
            view.full_version_name,
            view.config.api_base_url
        );
    }

    exit_codes::SUCCESS
}

fn run_fields(ctx: &Context, variant: &str, channel: &str, format: &str) -> i32 {
    let (variant, channel) = match parse_pair(variant, channel) {
        Ok(pair) => pair,
        Err(e) => return fail(&e),
    };
    let format: FieldFormat = match format.parse() {
        Ok(format) => format,
        Err(e) => return fail(&e),
    };
    let sources = match ctx.sources() {
        Ok(sources) => sources,
        Err(e) => return fail(&e),
    };

    let config = resolve(variant, channel, &sources);
    let trace = Traceability::capture(&ctx.config.root);

    match build_config::render(&config, &trace, format) {
        Ok(rendered) => {
            print!("{rendered}");
            if format == FieldFormat::Json {
                println!();
            }
            exit_codes::SUCCESS
        }
        Err(e) => fail(&Error::from(e)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    version_code: u32,
    version_name: String,
    git_commit: String,
    build_time: String,
}

fn run_version_info(ctx: &Context, json: bool) -> i32 {
    let sources = match ctx.sources() {
        Ok(sources) => sources,
        Err(e) => return fail(&e),
    };

    let version = resolve_version(&sources);
    let trace = Traceability::capture(&ctx.config.root);
    let info = VersionInfo {
        version_code: version.version_code,
        version_name: version.version_name,
        git_commit: trace.git_commit.clone(),
        build_time: trace.build_time_string(),
    };

    if json {
        return print_json(&info);
    }

    Status::field("Version Code", &info.version_code.to_string());
    Status::field("Version Name", &info.version_name);
    Status::field("Git Commit", &info.git_commit);
    Status::field("Build Time", &info.build_time);

    exit_codes::SUCCESS
}

fn run_set_version(ctx: &Context, name: Option<&str>, code: Option<&str>) -> i32 {
    let mut updates: Vec<(&str, String)> = Vec::new();

    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return fail(&Error::validation("Version name must not be blank"));
        }
        updates.push((KEY_VERSION_NAME, name.to_string()));
    }

    if let Some(raw) = code {
        let Some(code) = resolver::parse_version_code(raw) else {
            return fail(
                &Error::validation(format!("Invalid version code: {raw}"))
                    .with_suggestion("Version codes are integers between 1 and 2147483647"),
            );
        };
        updates.push((KEY_VERSION_CODE, code.to_string()));
    }

    if updates.is_empty() {
        return fail(
            &Error::validation("Nothing to update").with_suggestion("Pass --name and/or --code"),
        );
    }

    let path = ctx.config.local_properties_path();
    let pairs: Vec<(&str, &str)> = updates.iter().map(|(k, v)| (*k, v.as_str())).collect();
    if let Err(e) = properties::update_file(&path, &pairs) {
        return fail(&e);
    }

    tracing::info!(path = %path.display(), ?pairs, "Updated version");
    if !ctx.quiet {
        for (key, value) in &pairs {
            Status::success(&format!("{key} = {value}"));
        }
    }

    exit_codes::SUCCESS
}

fn run_build(ctx: &Context, variant: &str, channel: &str, bundle: bool, clean: bool) -> i32 {
    let (variant, channel) = match parse_pair(variant, channel) {
        Ok(pair) => pair,
        Err(e) => return fail(&e),
    };
    let sources = match ctx.sources() {
        Ok(sources) => sources,
        Err(e) => return fail(&e),
    };

    let config = resolve(variant, channel, &sources);
    if variant.profile().release_signing {
        match &config.signing {
            None => Status::warning("No key.properties found; the release artifact will be unsigned"),
            Some(signing) if !signing.is_complete() => Status::warning(&format!(
                "Signing identity is incomplete, missing: {}",
                signing.missing_keys().join(", ")
            )),
            Some(_) => {}
        }
    }

    let project_dir = ctx.config.android_dir();
    let action = if bundle {
        GradleAction::Bundle
    } else {
        GradleAction::Assemble
    };
    let task = gradle::task_name(action, variant, channel);

    if clean {
        ctx.info("Cleaning...");
        if let Err(e) = gradle::clean(&project_dir) {
            return fail(&e.with_context("Clean failed"));
        }
    }

    ctx.info(&format!(
        "Building {} {} {}...",
        config.application_id(ctx.base_application_id()),
        config.full_version_name(),
        if bundle { "bundle" } else { "APK" }
    ));

    let started = std::time::Instant::now();
    match gradle::run_task(&project_dir, &task) {
        Ok(()) => {
            if !ctx.quiet {
                Status::success(&format!(
                    "{task} succeeded in {}",
                    format_duration(started.elapsed())
                ));
                if gradle::is_release_task(&task) {
                    Status::success(&format!("Release build completed for {task}"));
                }
            }
            exit_codes::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_doctor(ctx: &Context, json: bool) -> i32 {
    let local = match PropertySource::load_optional(&ctx.config.local_properties_path()) {
        Ok(local) => local,
        Err(e) => return fail(&e),
    };

    let checker = HealthChecker::new()
        .with_standard_checks()
        .add_check(
            PathCheck::required("gradle-wrapper", gradle::wrapper_path(&ctx.config.android_dir()))
                .with_hint("Builds are delegated to the Gradle wrapper"),
        )
        .add_check(
            PathCheck::optional("local.properties", ctx.config.local_properties_path())
                .with_hint("Version defaults to 1 / 1.0"),
        )
        .add_check(
            PathCheck::optional("key.properties", ctx.config.key_properties_path())
                .with_hint("Release builds will be unsigned"),
        )
        .add_check(FlutterSdkCheck::new(&local));

    let spinner = progress::spinner("Checking environment...", ctx.quiet || json);
    let report = checker.run();
    progress::finish_success(&spinner, "Environment checked");

    let code = if report.status == HealthStatus::Unhealthy {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    };

    if json {
        return match print_json(&report) {
            exit_codes::SUCCESS => code,
            other => other,
        };
    }

    Status::header("Environment Check");
    for check in &report.checks {
        let line = match &check.message {
            Some(message) => format!("{}: {message}", check.name),
            None => match check.details.get("version").or_else(|| check.details.get("path")) {
                Some(detail) => format!("{}: {detail}", check.name),
                None => check.name.clone(),
            },
        };
        match check.status {
            HealthStatus::Healthy => Status::success(&line),
            HealthStatus::Degraded => Status::warning(&line),
            HealthStatus::Unhealthy => Status::error(&line),
        }
    }

    println!();
    let summary = format!(
        "{} in {}",
        format_count(report.checks.len(), "check", "checks"),
        format_duration(Duration::from_millis(report.total_duration_ms))
    );
    match report.status {
        HealthStatus::Healthy => Status::success(&format!("Environment healthy ({summary})")),
        HealthStatus::Degraded => Status::warning(&format!("Environment degraded ({summary})")),
        HealthStatus::Unhealthy => Status::error(&format!(
            "Environment unhealthy: {} failed ({summary})",
            report
                .failed_checks()
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }

    code
}
