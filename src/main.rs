// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use storyreel::app_config::{self, Config};
use storyreel::app_controller::Controller;
use storyreel::file_utils::FileManager;

/// Idea used when none is given on the command line
const EXAMPLE_IDEA: &str = "My neighbor keeps leaving creepy, anonymous 'gifts' on my doorstep late at night.";

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a story video from an idea (default command)
    #[command(alias = "run")]
    Generate(GenerateArgs),

    /// Generate shell completions for storyreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
    /// Story idea to build the video around
    #[arg(value_name = "IDEA")]
    idea: Option<String>,

    /// Script model to use (e.g. 'mistral', 'llama3')
    #[arg(short, long)]
    model: Option<String>,

    /// Narration voice
    #[arg(short, long)]
    voice: Option<String>,

    /// Background video file, or a directory to pick one from
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Directory receiving the final video
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Words per caption
    #[arg(short, long)]
    group_size: Option<usize>,

    /// Directory for the script, narration and timestamp files
    #[arg(short, long, default_value = ".")]
    work_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// storyreel - short-form story videos from a single idea
///
/// Writes a twist-ending story with a local LLM, narrates it, transcribes the
/// narration word by word and burns grouped captions onto background footage.
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(version)]
#[command(about = "Narrated, captioned story videos from a one-line idea")]
#[command(long_about = "storyreel turns a story idea into a narrated vertical video with word-synchronized captions.

EXAMPLES:
    storyreel \"My roommate labels everything in the fridge\"   # Run with default config
    storyreel -m llama3 -v onyx \"A stranger paid my rent\"     # Pick script model and voice
    storyreel -b background_videos/ \"...\"                      # Random background from a folder
    storyreel --log-level debug \"...\"                          # Verbose logging
    storyreel completions bash > storyreel.bash                # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

REQUIREMENTS:
    ollama              - Local Ollama server serving the script model
    OPENAI_API_KEY      - Speech API key (or speech.api_key in the config)
    whisper_timestamped - Word timestamp CLI on PATH
    ffmpeg / ffprobe    - Media tools on PATH")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install with the most verbose filter; the effective level is applied
    // through set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storyreel", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => run_generate(cli.generate).await,
    }
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

/// Apply command line overrides on top of the loaded config
fn apply_overrides(config: &mut Config, options: &GenerateArgs) {
    if let Some(model) = &options.model {
        config.script.model = model.clone();
    }
    if let Some(voice) = &options.voice {
        config.speech.voice = voice.clone();
    }
    if let Some(background) = &options.background {
        config.video.background_video = background.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.video.output_dir = output_dir.clone();
    }
    if let Some(group_size) = options.group_size {
        config.captions.group_size = group_size;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let idea = match &options.idea {
        Some(idea) if !idea.trim().is_empty() => idea.clone(),
        _ => {
            info!("No idea given, using the example idea.");
            EXAMPLE_IDEA.to_string()
        }
    };

    FileManager::ensure_dir(&options.work_dir)?;
    let controller = Controller::with_config(config)?.with_work_dir(&options.work_dir);

    info!("🎬 storyreel: {}", idea);
    let summary = controller.run(&idea).await;

    for line in summary.render().lines() {
        info!("{}", line);
    }

    if summary.completed() {
        Ok(())
    } else {
        Err(anyhow!("Final video was not generated"))
    }
}
