use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tracing::debug;

use keel_config::{Configuration, WarningSeverity};

mod profiles;

/// ⚓ Keel: compiler settings and network profiles for Klaytn deployments
#[derive(Parser)]
#[command(name = "keel", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_dotenv")]
    env_file: Option<PathBuf>,

    /// Do not load any .env file
    #[arg(long, global = true)]
    no_dotenv: bool,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
    Compact,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration (signing keys are never printed)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print compiler settings in solc standard-JSON form
    Compiler,
    /// List network profiles with endpoint and credential status
    Profiles,
    /// Check that a profile is ready for deployment
    Resolve {
        /// Profile name: test or production
        profile: String,
    },
    /// Audit configuration for problems
    Doctor,
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn run(self) -> keel_core::Result<()> {
        self.init_tracing();

        // Commands that never touch the configuration.
        match self.command {
            Commands::Version => return Self::cmd_version(),
            Commands::Completions { shell } => return Self::cmd_completions(shell),
            _ => {}
        }

        if self.no_dotenv {
            debug!("--no-dotenv given, skipping .env");
        } else {
            keel_config::load_dotenv(self.env_file.as_deref())?;
        }
        let config = Configuration::global()?;

        match self.command {
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Compiler => Self::cmd_compiler(config),
            Commands::Profiles => profiles::cmd_profiles(config),
            Commands::Resolve { profile } => profiles::cmd_resolve(config, &profile),
            Commands::Doctor => Self::cmd_doctor(config),
            Commands::Version | Commands::Completions { .. } => Ok(()),
        }
    }

    fn init_tracing(&self) {
        // Resolve log level: --verbose > --quiet > --log-level > default
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

        // Logs go to stderr so command output can be piped.
        match self.log_format {
            LogFormat::Json => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_target(true)
                .init(),
            LogFormat::Compact => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init(),
        }
    }

    fn cmd_config(config: &Configuration, json: bool) -> keel_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config)
                    .map_err(|e| keel_core::KeelError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_compiler(config: &Configuration) -> keel_core::Result<()> {
        println!("{}", serde_json::to_string_pretty(&compiler_json(config))?);
        Ok(())
    }

    fn cmd_doctor(config: &Configuration) -> keel_core::Result<()> {
        println!("🩺 Keel Doctor: Configuration Audit");
        println!();

        let warnings = config.validate();
        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &warnings {
            println!("  {w}");
            match w.severity {
                WarningSeverity::Warning => warn_count += 1,
                WarningSeverity::Info => info_count += 1,
            }
        }

        println!();
        if warnings.is_empty() {
            println!("  ✅ no problems found");
        } else {
            println!("  ⚠️  {warn_count} warnings, 💡 {info_count} suggestions");
        }
        Ok(())
    }

    fn cmd_version() -> keel_core::Result<()> {
        println!("⚓ Keel v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> keel_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "keel", &mut std::io::stdout());
        Ok(())
    }
}

/// Compiler version plus the solc `settings` object.
fn compiler_json(config: &Configuration) -> serde_json::Value {
    let compiler = config.compiler();
    serde_json::json!({
        "version": compiler.language_version.to_string(),
        "settings": compiler.solc_settings(),
    })
}
