use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spelling_bee::daemon::{self, Daemon};
use spelling_bee::voice::{AudioCapture, AudioPlayback, PLAYBACK_SAMPLE_RATE, rms_energy};
use spelling_bee::words::WordEntry;
use spelling_bee::{Config, Speaker, Transcriber, Word, WordSource, interpret};

/// Spellbee - voice-driven spelling bee practice
#[derive(Parser)]
#[command(name = "spellbee", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Path to the word database
    #[arg(long)]
    db: Option<std::path::PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Serve the game (default)
    Serve,
    /// Show the word count and available filters
    Words,
    /// Add a word to the list
    AddWord {
        /// The word
        word: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        list: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Speak through the configured speaker
    TestTts {
        /// Text to speak
        #[arg(default_value = "The word is bee. Please spell bee")]
        text: String,
    },
    /// Listen once and show how the answer is understood
    TestListen {
        /// Target word
        #[arg(short, long, default_value = "apple")]
        word: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,spelling_bee=info",
        1 => "info,spelling_bee=debug",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db) = &cli.db {
        config.database_path.clone_from(db);
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Command::TestMic { duration }) => return test_mic(*duration).await,
        Some(Command::TestSpeaker) => return test_speaker().await,
        _ => {}
    }

    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Command::Serve) => {
            tracing::info!(port = config.server.port, "starting spelling bee");
            Daemon::new(config)?.run().await?;
            Ok(())
        }
        Some(Command::Words) => show_words(config),
        Some(Command::AddWord {
            word,
            year,
            list,
            difficulty,
        }) => add_word(config, WordEntry {
            word,
            year,
            list,
            difficulty,
        }),
        Some(Command::TestTts { text }) => test_tts(&config, &text).await,
        Some(Command::TestListen { word }) => test_listen(&config, &word).await,
        Some(Command::TestMic { .. } | Command::TestSpeaker) => Ok(()),
    }
}

/// Print the word count and filter values
fn show_words(config: Config) -> anyhow::Result<()> {
    let path = config.database_path.clone();
    let source = Daemon::new(config)?.word_source();
    let metadata = source.filter_metadata()?;

    println!("Database: {}", path.display());
    println!("Words: {}", source.count()?);
    println!("Years: {}", metadata.years.join(", "));
    println!("Lists: {}", metadata.lists.join(", "));
    println!("Difficulties: {}", metadata.difficulties.join(", "));

    Ok(())
}

/// Add one word to the list
fn add_word(config: Config, entry: WordEntry) -> anyhow::Result<()> {
    let source = Daemon::new(config)?.word_source();
    source.insert(&entry)?;
    println!("Added \"{}\" ({} words)", entry.word, source.count()?);
    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        let deadline = Instant::now() + Duration::from_secs(duration);
        while Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(100));
            let energy = rms_energy(&capture.take_buffer());

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bars = ((energy * 200.0) as usize).min(50);
            println!("{energy:.4} |{}", "#".repeat(bars));
        }

        capture.stop();
        Ok(())
    })
    .await??;

    println!("\n---");
    println!("If the meter moved while you spoke, your microphone is working!");

    Ok(())
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (PLAYBACK_SAMPLE_RATE as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {PLAYBACK_SAMPLE_RATE} Hz...", samples.len());

    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play(samples)).await??;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}

/// Speak through the configured speaker
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Speaking with {:?} backend: \"{text}\"\n", config.voice.speaker);

    let speaker = daemon::build_speaker(&config.voice, &config.api_keys)?;
    speaker.speak(text).await?;

    println!("\n---");
    println!("If you heard the speech, the speaker is working!");

    Ok(())
}

/// Record one answer and classify it
async fn test_listen(config: &Config, word: &str) -> anyhow::Result<()> {
    let target = Word::parse(word).ok_or_else(|| anyhow::anyhow!("blank target word"))?;
    let transcriber = daemon::build_transcriber(&config.voice, &config.api_keys);

    println!(
        "Target: {target}. Spell it within {} seconds...\n",
        config.voice.listen_duration.as_secs()
    );

    let transcription = transcriber.transcribe(config.voice.listen_duration).await;
    match &transcription {
        Ok(Some(text)) => println!("Heard: \"{text}\""),
        Ok(None) => println!("Heard nothing"),
        Err(e) => println!("Transcription failed: {e}"),
    }

    println!("Understood as: {:?}", interpret(transcription, &target));

    Ok(())
}
