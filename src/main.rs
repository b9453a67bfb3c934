// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::Path;

use crate::app_config::Config;
use crate::gateways::Credentials;
use crate::pipeline::Pipeline;

mod app_config;
mod archive;
mod chunker;
mod document;
mod errors;
mod fetch;
mod gateways;
mod journals;
mod latex;
mod markup;
mod pipeline;
mod render;
mod session;
mod translators;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl and translate a paper (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Generate shell completions for ronyaku
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Paper URL (journal article page or arXiv abstract/PDF URL)
    #[arg(value_name = "URL")]
    url: String,

    /// Journal identifier; inferred from the URL when omitted
    #[arg(short, long)]
    journal: Option<String>,

    /// Gateway identifier ('useless' disables institutional proxying)
    #[arg(short, long)]
    gateway: Option<String>,

    /// Gateway credential as key=value (repeatable); environment variables
    /// RONYAKU_GATEWAY_<GATEWAY>_<KEY> are read as fallback
    #[arg(short = 'C', long = "credential", value_name = "KEY=VALUE")]
    credentials: Vec<String>,

    /// Translation backend to use
    #[arg(short = 'T', long)]
    translator: Option<String>,

    /// Source language code (e.g. 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Also render the output as PDF (requires wkhtmltopdf)
    #[arg(long)]
    pdf: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ronyaku - journal paper translation tool
///
/// Crawls a paper from a supported journal and translates it section by
/// section through a web translation service, producing a bilingual HTML
/// (or PDF) rendition.
#[derive(Parser, Debug)]
#[command(name = "ronyaku")]
#[command(version = "0.1.0")]
#[command(about = "Crawl journal papers and translate them into bilingual HTML")]
#[command(long_about = "ronyaku crawls a paper from a supported journal and translates it \
section by section through a web translation service.

EXAMPLES:
    ronyaku https://arxiv.org/abs/2005.14165          # Infer journal, default config
    ronyaku -j nature https://www.nature.com/...      # Explicit journal identifier
    ronyaku -g utokyo -C username=u -C password=p URL # Authenticate via a gateway
    ronyaku -T google -s en -t ja URL                 # Pick backend and language pair
    ronyaku --pdf URL                                 # Also render a PDF
    ronyaku completions bash > ronyaku.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED JOURNALS:
    nature, sciencedirect, springer, arxiv

SUPPORTED BACKENDS:
    deepl, google")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Paper URL (journal article page or arXiv abstract/PDF URL)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Journal identifier; inferred from the URL when omitted
    #[arg(short, long)]
    journal: Option<String>,

    /// Gateway identifier ('useless' disables institutional proxying)
    #[arg(short, long)]
    gateway: Option<String>,

    /// Gateway credential as key=value (repeatable)
    #[arg(short = 'C', long = "credential", value_name = "KEY=VALUE")]
    credentials: Vec<String>,

    /// Translation backend to use
    #[arg(short = 'T', long)]
    translator: Option<String>,

    /// Source language code (e.g. 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Also render the output as PDF (requires wkhtmltopdf)
    #[arg(long)]
    pdf: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ronyaku", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let url = cli
                .url
                .ok_or_else(|| anyhow!("URL is required when no subcommand is specified"))?;
            let args = TranslateArgs {
                url,
                journal: cli.journal,
                gateway: cli.gateway,
                credentials: cli.credentials,
                translator: cli.translator,
                source_language: cli.source_language,
                target_language: cli.target_language,
                pdf: cli.pdf,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)
            .context(format!("Failed to load config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(journal) = &options.journal {
        config.journal = journal.clone();
    }
    if let Some(gateway) = &options.gateway {
        config.gateway = gateway.clone();
    }
    if let Some(translator) = &options.translator {
        config.translator = translator.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if options.pdf {
        config.output.pdf = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Optional credentials file, then explicit key=value pairs on top
    if !config.credentials_file.is_empty() {
        Credentials::load_file(Path::new(&config.credentials_file));
    }
    let mut credentials = Credentials::new();
    for pair in &options.credentials {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid credential '{}', expected key=value", pair))?;
        credentials.insert(key, value);
    }

    let pipeline = Pipeline::new(config).with_credentials(credentials);

    // Stop cleanly on Ctrl-C
    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current chunk");
            cancel.cancel();
        }
    });

    let output = pipeline
        .run(&options.url)
        .await
        .map_err(|e| anyhow!("{}", e))?;
    info!("output written to {}", output.display());
    Ok(())
}
