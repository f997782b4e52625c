//! gen-pod - Turn a document or topic into a short spoken-audio podcast

mod config;
mod extract;
mod pipeline;
mod summarize;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::GenPodcastConfig;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{AudioOutcome, Pipeline, PipelineInput, PipelineOptions, Stage};
use std::path::PathBuf;
use std::time::Duration;
use summarize::SummaryBounds;
use text::ChunkMode;
use tts::VoiceOptions;
use tts::google::GoogleTtsBackend;

#[derive(Parser, Debug)]
#[command(name = "gen-pod")]
#[command(about = "Turn a document or topic into a short spoken-audio podcast", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the document (.txt, .pdf, .docx)
    document: Option<PathBuf>,

    /// Generate the podcast from a topic instead of a document
    #[arg(long, conflicts_with = "document")]
    topic: Option<String>,

    /// Output file path (default: <document-name>_summary.mp3)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chunk size bound for summarization input, in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Chunking unit: sentences or words
    #[arg(long)]
    chunk_mode: Option<String>,

    /// Synthesis voice name (e.g. en-US-Wavenet-F)
    #[arg(long)]
    voice: Option<String>,

    /// BCP-47 language code (e.g. en-US)
    #[arg(long)]
    language: Option<String>,

    /// Speaking rate (0.25-4.0)
    #[arg(long)]
    speaking_rate: Option<f32>,

    /// Model preset from the llm-client config
    #[arg(short, long)]
    model: Option<String>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice name
    SetVoice {
        /// Voice name (e.g. en-US-Wavenet-F)
        name: String,
    },
    /// Set default language code
    SetLanguage {
        /// BCP-47 code (e.g. en-US)
        code: String,
    },
    /// Set default chunk size
    SetChunkSize {
        /// Size bound in characters
        size: usize,
    },
    /// Set default model preset
    SetModel {
        /// Preset name from the llm-client config
        preset: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "warn" }),
    )
    .init();

    // Handle subcommands
    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    // Load configuration
    let config = GenPodcastConfig::load().context("Failed to load configuration")?;

    // Build the LLM provider from the preset config
    let llm_config = llm_client::Config::load()?;
    let preset_name = args
        .model
        .clone()
        .or_else(|| config.model_preset.clone())
        .unwrap_or_else(|| llm_config.default_preset.clone());
    let preset = llm_config.get_preset(&preset_name)?;
    let provider = llm_client::get_provider(preset, llm_config.get_provider_config(&preset.provider))?;

    // Synthesis credentials are resolved before any input is read;
    // a missing key fails the whole process, not a single request.
    let tts = GoogleTtsBackend::from_config(config.google_api_key.clone())
        .context("Speech synthesis credentials unavailable")?;

    // Resolve the request input and a default output path
    let (input, default_output) = match (&args.document, &args.topic) {
        (Some(path), None) => {
            if !path.exists() {
                anyhow::bail!("Document not found: {}", path.display());
            }
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            let output = path.with_file_name(format!("{}_summary.mp3", stem));
            (PipelineInput::Document { bytes, name }, output)
        }
        (None, Some(topic)) => {
            let output = PathBuf::from(format!("{}.mp3", topic.replace(' ', "_")));
            (PipelineInput::Topic(topic.clone()), output)
        }
        _ => {
            anyhow::bail!(
                "Provide a document path or --topic. Run 'gen-pod --help' for usage."
            );
        }
    };
    let output_path = args.output.clone().unwrap_or(default_output);

    if args.debug {
        eprintln!("Output: {}", output_path.display());
        eprintln!("Provider: {}", provider.name());
        eprintln!("Preset: {}", preset_name);
    }

    // Assemble pipeline options from config and flags
    let chunk_mode_name = args.chunk_mode.clone().unwrap_or_else(|| config.chunk_mode.clone());
    let chunk_mode = ChunkMode::parse(&chunk_mode_name).ok_or_else(|| {
        anyhow::anyhow!("Invalid chunk mode '{}'. Use 'sentences' or 'words'.", chunk_mode_name)
    })?;

    let options = PipelineOptions {
        chunk_size: args.chunk_size.unwrap_or(config.chunk_size),
        chunk_mode,
        summary: SummaryBounds {
            max_length: config.summary_max_length,
            min_length: config.summary_min_length,
        },
        generated_text_length: config.generated_text_length,
    };

    let voice = VoiceOptions::new()
        .with_language(args.language.clone().unwrap_or_else(|| config.language_code.clone()))
        .with_voice(args.voice.clone().unwrap_or_else(|| config.voice_name.clone()))
        .with_gender(config.ssml_gender.clone())
        .with_speaking_rate(args.speaking_rate.unwrap_or(config.speaking_rate));

    let pipeline = Pipeline::new(provider, Box::new(tts), options);

    // Run with a progress display
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline
        .run_with_progress(input, &voice, |progress| match progress.stage {
            Stage::Extracting => pb.set_message("Extracting text..."),
            Stage::Chunking => pb.set_message("Chunking text..."),
            Stage::Summarizing => {
                if progress.total > 0 {
                    pb.set_message(format!(
                        "Summarizing chunk {}/{}...",
                        progress.completed.min(progress.total - 1) + 1,
                        progress.total
                    ));
                } else {
                    pb.set_message("Summarizing...");
                }
            }
            Stage::Synthesizing => pb.set_message("Generating audio..."),
        })
        .await;

    pb.finish_and_clear();
    let output = result?;

    // The summary is user-facing output in its own right
    println!("{}", output.combined_summary);

    match output.audio {
        AudioOutcome::Ready(bytes) => {
            std::fs::write(&output_path, &bytes)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            let size_kb = bytes.len() as f64 / 1024.0;
            eprintln!("Audio: {} ({:.1} KB)", output_path.display(), size_kb);
            Ok(())
        }
        AudioOutcome::Failed(err) => {
            // The summary above is still delivered; only audio failed
            anyhow::bail!("Speech synthesis failed: {}", err);
        }
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = GenPodcastConfig::load()?;
            println!("Configuration file: {:?}", GenPodcastConfig::config_path()?);
            println!();
            println!("voice_name = \"{}\"", config.voice_name);
            println!("language_code = \"{}\"", config.language_code);
            println!("ssml_gender = \"{}\"", config.ssml_gender);
            println!("speaking_rate = {}", config.speaking_rate);
            println!("chunk_size = {}", config.chunk_size);
            println!("chunk_mode = \"{}\"", config.chunk_mode);
            println!("summary_max_length = {}", config.summary_max_length);
            println!("summary_min_length = {}", config.summary_min_length);
            println!("generated_text_length = {}", config.generated_text_length);
            if let Some(preset) = &config.model_preset {
                println!("model_preset = \"{}\"", preset);
            } else {
                println!("model_preset = (llm-client default)");
            }
            if config.google_api_key.is_some() {
                println!("google_api_key = (set)");
            } else {
                println!("google_api_key = (from {})", GoogleTtsBackend::ENV_VAR);
            }
        }
        ConfigAction::SetVoice { name } => {
            let mut config = GenPodcastConfig::load()?;
            config.voice_name = name.clone();
            config.save()?;
            println!("Default voice set to: {}", name);
        }
        ConfigAction::SetLanguage { code } => {
            let mut config = GenPodcastConfig::load()?;
            config.language_code = code.clone();
            config.save()?;
            println!("Default language set to: {}", code);
        }
        ConfigAction::SetChunkSize { size } => {
            if *size == 0 {
                anyhow::bail!("Chunk size must be greater than zero");
            }
            let mut config = GenPodcastConfig::load()?;
            config.chunk_size = *size;
            config.save()?;
            println!("Default chunk size set to: {}", size);
        }
        ConfigAction::SetModel { preset } => {
            let mut config = GenPodcastConfig::load()?;
            config.model_preset = Some(preset.clone());
            config.save()?;
            println!("Default model preset set to: {}", preset);
        }
    }
    Ok(())
}
