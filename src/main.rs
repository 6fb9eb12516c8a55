use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use flashcards_creator::analysis::SentenceAnalysis;
use flashcards_creator::config::{AppConfig, CardType};
use flashcards_creator::deck::DeckBuildReport;
use flashcards_creator::text::{check_formality, parse_two_column_tsv, ColumnOrder};
use flashcards_creator::utils::logger::init_logger;
use flashcards_creator::FlashcardsCreator;

#[derive(Parser)]
#[command(name = "flashcards", about = "Build Anki decks with synthesized audio", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Word-level difficulty analysis of a sentence
    Analyze {
        sentence: String,
        /// Comma-separated words the learner already knows
        #[arg(long, value_delimiter = ',')]
        known: Vec<String>,
    },

    /// Detect tu/vous forms of address
    Formality { text: String },

    /// List provider voices
    Voices {
        /// Only voices labelled with this language
        #[arg(long)]
        language: Option<String>,
        /// Group voices by detected language
        #[arg(long)]
        grouped: bool,
    },

    /// Synthesize one phrase into the audio cache
    Synth {
        text: String,
        #[arg(long)]
        voice: String,
        #[arg(long)]
        rate: Option<f32>,
    },

    /// Build an .apkg deck from a two-column TSV file
    Build {
        tsv: PathBuf,
        /// Language label used to pick voices (e.g. "French")
        #[arg(long)]
        language: String,
        #[arg(long)]
        card_type: Option<CardType>,
        /// Last part of the deck name (defaults to today's date)
        #[arg(long)]
        title: Option<String>,
        /// The first column holds the target-language phrase
        #[arg(long)]
        target_first: bool,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn emit<T: Serialize>(format: &OutputFormat, value: &T, plain: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Plain => println!("{}", plain(value)),
    }
    Ok(())
}

fn render_analysis(analysis: &SentenceAnalysis) -> String {
    let mut lines = vec![format!("{:<20} {:>6}  {:<18} {}", "word", "zipf", "band", "flags")];
    for row in &analysis.tokens {
        let mut flags = Vec::new();
        if row.is_rare {
            flags.push("rare");
        }
        if row.is_known {
            flags.push("known");
        }
        lines.push(format!(
            "{:<20} {:>6.2}  {:<18} {}",
            row.surface,
            row.commonality,
            row.band.label(),
            flags.join(",")
        ));
    }
    lines.push(String::new());
    lines.push(analysis.summary());
    lines.push(format!(
        "median {:.2} | rare {:.0}% | known {:.0}%",
        analysis.median_commonality,
        analysis.rare_share * 100.0,
        analysis.known_share * 100.0
    ));
    if analysis.degraded {
        lines.push("warning: frequency list unavailable, scores are zero".to_string());
    }
    lines.join("\n")
}

fn render_report(report: &DeckBuildReport) -> String {
    let mut lines = vec![
        format!("Deck '{}' written to {}", report.deck_name, report.deck_path.display()),
        format!("{} notes, {} media files", report.notes, report.media_files),
    ];
    for failure in &report.failures {
        lines.push(format!("row {}: {}", failure.row, failure.message));
    }
    lines.join("\n")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::from_env(),
    };

    if let Command::Build { card_type, output_dir, .. } = &cli.command {
        if let Some(card_type) = card_type {
            config.deck.card_type = *card_type;
        }
        if let Some(dir) = output_dir {
            config.deck.output_dir = dir.clone();
        }
    }

    let app = FlashcardsCreator::new(config)?;

    match cli.command {
        Command::Analyze { sentence, known } => {
            let known: HashSet<String> = known
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
            let analysis = app.analyze(&sentence, &known);
            emit(&cli.format, &analysis, render_analysis)?;
        }
        Command::Formality { text } => {
            let check = check_formality(&text);
            emit(&cli.format, &check, |c| {
                c.warning.clone().unwrap_or_else(|| "No second-person pronouns".to_string())
            })?;
        }
        Command::Voices { language, grouped } => {
            let directory = app.voice_directory()?;
            if grouped {
                let groups = directory.group_by_language().await?;
                emit(&cli.format, &groups, |groups| {
                    let mut lines = Vec::new();
                    for (language, voices) in groups {
                        lines.push(format!("{} ({})", language, voices.len()));
                        for voice in voices {
                            lines.push(format!("  {}  {}", voice.id, voice.display_name));
                        }
                    }
                    lines.join("\n")
                })?;
            } else if let Some(language) = language {
                let voices = directory.voices_for_language_strict(&language).await?;
                emit(&cli.format, &voices, |voices| {
                    if voices.is_empty() {
                        return format!("No voices labelled '{}'", language);
                    }
                    voices
                        .iter()
                        .map(|(id, name)| format!("{}  {}", id, name))
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            } else {
                let voices = directory.list_voices().await?;
                emit(&cli.format, &voices, |voices| {
                    voices
                        .iter()
                        .map(|voice| format!("{}  {}", voice.id, voice.display_name))
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
        }
        Command::Synth { text, voice, rate } => {
            let artifact = app.synthesize(&text, &voice, rate).await?;
            emit(&cli.format, &artifact, |a| a.local_path.display().to_string())?;
        }
        Command::Build {
            tsv,
            language,
            title,
            target_first,
            ..
        } => {
            let input = tokio::fs::read_to_string(&tsv)
                .await
                .with_context(|| format!("Failed to read {}", tsv.display()))?;
            let order = if target_first {
                ColumnOrder::TargetFirst
            } else {
                ColumnOrder::UserFirst
            };
            let pairs = parse_two_column_tsv(&input, order)?;
            log::info!("Parsed {} phrase pairs from {}", pairs.len(), tsv.display());

            let report = app.build_deck(&pairs, &language, title.as_deref()).await?;
            emit(&cli.format, &report, render_report)?;
        }
    }

    Ok(())
}
