//! SmokeSpot CLI - find and share smoking areas
//!
//! Lists nearby smoking areas, shows their details, and submits new ones.

use clap::{ArgGroup, Parser, Subcommand};
use owo_colors::OwoColorize;
use smokespot_api_client::{ApiError, AuthError, RepositoryError};
use smokespot_core::config::Config;
use smokespot_core::error::ErrorReport;
use smokespot_core::error::exit_codes;
use smokespot_core::{ErrorCode, Facility};
use smokespot_geo::Coordinate;
use smokespot_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

use commands::add::{AddArgs, LocationSource};
use commands::{add, auth, geocode, map, show, Context};
use output::{print_json, OutputFormat};

/// Find and share smoking areas
#[derive(Parser)]
#[command(name = "smokespot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (defaults to smokespot.toml or the user config dir)
    #[arg(short, long, global = true, env = "SMOKESPOT_CONFIG")]
    config: Option<PathBuf>,

    /// Current position as "lat,lng"; without it location access counts as denied
    #[arg(long, global = true, env = "SMOKESPOT_AT", allow_hyphen_values = true)]
    at: Option<Coordinate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List smoking areas near you, closest first
    Map {
        /// Show at most this many areas
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only areas within this many kilometres
        #[arg(short, long)]
        radius: Option<f64>,
    },

    /// Show one smoking area
    Show {
        /// Area id
        id: String,
    },

    /// Submit a new smoking area
    #[command(group(
        ArgGroup::new("location")
            .required(true)
            .args(["here", "geocode", "default_location"])
    ))]
    Add {
        /// Name of the place
        #[arg(short, long)]
        name: String,

        /// Street address (filled in from the location when omitted)
        #[arg(short, long)]
        address: Option<String>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,

        /// Facility present at the place (repeatable)
        #[arg(long = "facility", value_name = "FACILITY")]
        facilities: Vec<Facility>,

        /// Photo reference (file URI or URL)
        #[arg(short, long)]
        photo: Option<String>,

        /// Use the current position
        #[arg(long)]
        here: bool,

        /// Look up the coordinate of --address
        #[arg(long)]
        geocode: bool,

        /// Use the default place
        #[arg(long)]
        default_location: bool,
    },

    /// Look up the coordinate of an address
    Geocode {
        /// Address text
        address: String,
    },

    /// Look up the address of a coordinate
    Reverse {
        /// Coordinate as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        coordinate: Coordinate,
    },

    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SMOKESPOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SMOKESPOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,
}

/// The most specific error code found in the chain
fn error_code_for(error: &anyhow::Error) -> ErrorCode {
    if let Some(e) = error.downcast_ref::<RepositoryError>() {
        e.code()
    } else if let Some(e) = error.downcast_ref::<AuthError>() {
        e.code()
    } else if let Some(e) = error.downcast_ref::<ApiError>() {
        e.code()
    } else if let Some(e) = error.downcast_ref::<smokespot_core::Error>() {
        e.code
    } else {
        ErrorCode::Unknown
    }
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    exit_codes::for_code(error_code_for(error))
}

/// Machine-readable form of a failed command
fn error_report(error: &anyhow::Error) -> ErrorReport {
    if let Some(e) = error.downcast_ref::<smokespot_core::Error>() {
        return e.to_report();
    }
    let rich = match error.downcast_ref::<RepositoryError>() {
        Some(RepositoryError::Validation(e)) => smokespot_core::Error::from(e.clone()),
        Some(RepositoryError::AuthRequired) => smokespot_core::Error::auth_required(),
        _ => smokespot_core::Error::new(error_code_for(error), format!("{error:#}")),
    };
    rich.to_report()
}

/// Print a failure to stderr, and as a JSON report on stdout for `--format json`
fn report_error(format: OutputFormat, report: &ErrorReport, display: &str) {
    eprintln!("{} {}", "Error:".red().bold(), display);
    if format.is_json() {
        if let Err(e) = print_json(&serde_json::json!({ "error": report })) {
            tracing::warn!(error = %e, "Could not print error report");
        }
    }
}

fn telemetry_config(config: &Config, verbose: u8) -> TelemetryConfig {
    let logging = &config.schema.logging;
    TelemetryConfig {
        log_level: logging.level.clone(),
        json: logging.json,
        file: logging.file.as_ref().map(PathBuf::from),
        ..TelemetryConfig::default()
    }
    .with_verbosity(verbose)
}

async fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Map { limit, radius } => map::run(ctx, limit, radius).await,

        Commands::Show { id } => show::run(ctx, &id).await,

        Commands::Add {
            name,
            address,
            description,
            facilities,
            photo,
            here,
            geocode,
            default_location: _,
        } => {
            let source = if here {
                LocationSource::Here
            } else if geocode {
                LocationSource::Geocode
            } else {
                LocationSource::DefaultLocation
            };
            let args = AddArgs {
                name,
                address,
                description,
                facilities,
                photo,
                source,
            };
            add::run(ctx, args).await
        }

        Commands::Geocode { address } => geocode::forward(ctx, &address).await,

        Commands::Reverse { coordinate } => geocode::reverse(ctx, coordinate).await,

        Commands::Login { email, password } => auth::login(ctx, &email, &password).await,

        Commands::Signup { email, password } => auth::signup(ctx, &email, &password).await,

        Commands::Logout => auth::logout(ctx).await,

        Commands::Whoami => auth::whoami(ctx).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(cli.format, &e.to_report(), &e.to_string());
            return ExitCode::from(exit_codes::for_code(e.code));
        }
    };

    let _guard = match smokespot_telemetry::init_with_config(telemetry_config(&config, cli.verbose)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::from(exit_codes::CONFIG_ERROR);
        }
    };
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let ctx = Context {
        config,
        format: cli.format,
        at: cli.at,
    };

    match dispatch(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(ctx.format, &error_report(&e), &format!("{e:#}"));
            ExitCode::from(exit_code_for(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "smokespot",
            "--at",
            "25.012,121.5064",
            "add",
            "--name",
            "Riverside bench",
            "--facility",
            "covered",
            "--facility",
            "Ashtray",
            "--here",
        ])
        .unwrap();

        assert_eq!(cli.at, Some(Coordinate::new(25.012, 121.5064)));
        match cli.command {
            Commands::Add { facilities, here, .. } => {
                assert_eq!(facilities, vec![Facility::Covered, Facility::Ashtray]);
                assert!(here);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_requires_one_location_source() {
        assert!(Cli::try_parse_from(["smokespot", "add", "--name", "x"]).is_err());
        assert!(Cli::try_parse_from(["smokespot", "add", "--name", "x", "--here", "--geocode"]).is_err());
    }

    #[test]
    fn test_bad_coordinate_rejected() {
        assert!(Cli::try_parse_from(["smokespot", "reverse", "north"]).is_err());
        assert!(Cli::try_parse_from(["smokespot", "reverse", "95,0"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let validation = anyhow::Error::new(RepositoryError::Validation(
            smokespot_core::ValidationError::MissingField("name"),
        ));
        assert_eq!(exit_code_for(&validation), exit_codes::VALIDATION_ERROR);

        let auth = anyhow::Error::new(RepositoryError::AuthRequired);
        assert_eq!(exit_code_for(&auth), exit_codes::AUTH_ERROR);

        let wrapped = anyhow::Error::new(ApiError::missing_env("SUPABASE_URL")).context("Supabase is not configured");
        assert_eq!(exit_code_for(&wrapped), exit_codes::CONFIG_ERROR);

        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), exit_codes::FAILURE);
    }

    #[test]
    fn test_error_report_carries_suggestion() {
        let auth = error_report(&anyhow::Error::new(RepositoryError::AuthRequired));
        assert_eq!(auth.code, ErrorCode::AuthRequired);
        assert!(auth.suggestion.is_some_and(|s| s.contains("smokespot login")));

        let missing = error_report(&anyhow::Error::new(RepositoryError::Validation(
            smokespot_core::ValidationError::MissingField("name"),
        )));
        assert_eq!(missing.category, "Validation");
        assert!(missing.suggestion.is_some());
    }

    #[test]
    fn test_error_report_keeps_context_chain() {
        let wrapped = anyhow::Error::new(ApiError::missing_env("SUPABASE_URL")).context("Supabase is not configured");
        let report = error_report(&wrapped);
        assert_eq!(report.code, ErrorCode::ConfigError);
        assert_eq!(report.code_str, "E3000");
        assert!(report.message.starts_with("Supabase is not configured"));
        assert!(report.message.contains("SUPABASE_URL"));
    }
}
