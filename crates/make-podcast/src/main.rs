use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    overlay_background_music, rewrite_to_podcast_style, summarize_text, synthesize_to_file,
    wrap_with_intro_outro, ArticleExtractor, Config, Extraction, GoogleTts, HfSummarizer,
    PodcastSession, DEFAULT_VOLUME_REDUCTION_DB,
};
use std::io::{self as stdio, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const INTRO_TEXT: &str = "Welcome to the AI Podcast! Today we're diving into some fascinating \
                          insights from the world of artificial intelligence.";
const OUTRO_TEXT: &str = "Thanks for listening to the AI Podcast! Stay curious and keep exploring \
                          the amazing world of AI.";

#[derive(Parser)]
#[command(name = "make-podcast")]
#[command(about = "Turn an article into a narrated MP3 podcast")]
struct Args {
    /// Article URL to extract before entering the menu
    #[arg(short, long)]
    url: Option<String>,

    /// Background music MP3 (defaults to music.mp3 in the session directory)
    #[arg(short, long)]
    music: Option<PathBuf>,

    /// Narration language code
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Skip the intro/outro narration
    #[arg(long)]
    no_intro_outro: bool,

    /// Skip the background music mix
    #[arg(long)]
    no_music: bool,

    /// Verbose diagnostic logging
    #[arg(short, long)]
    verbose: bool,
}

enum Action {
    ExtractUrl,
    PasteText,
    Generate,
    ClearCache,
    Quit,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "shared=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn prompt_action() -> Result<Action> {
    println!("\nWhat next?");
    println!("  1) Extract article from URL");
    println!("  2) Paste article text");
    println!("  3) Generate podcast");
    println!("  4) Clear cache");
    println!("  5) Quit");
    print!("\nEnter your choice (1-5): ");
    stdio::stdout().flush()?;

    let mut input = String::new();
    stdio::stdin().read_line(&mut input)?;

    match input.trim() {
        "1" => Ok(Action::ExtractUrl),
        "2" => Ok(Action::PasteText),
        "3" => Ok(Action::Generate),
        "4" => Ok(Action::ClearCache),
        "5" | "q" => Ok(Action::Quit),
        _ => anyhow::bail!("Invalid selection. Please choose 1-5."),
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    stdio::stdout().flush()?;
    let mut input = String::new();
    stdio::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn read_pasted_text() -> Result<String> {
    println!("Paste the article text; finish with an empty line:");
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let read = stdio::stdin().read_line(&mut line)?;
        if read == 0 || line.trim().is_empty() {
            break;
        }
        lines.push(line.trim_end().to_string());
    }
    Ok(lines.join("\n"))
}

async fn extract_from_url(
    extractor: &ArticleExtractor,
    session: &mut PodcastSession,
    url: &str,
) -> Result<()> {
    println!("\n🌐 Extracting text from {}...", url);

    match extractor.extract(url).await {
        Extraction::Text(text) => {
            println!("✓ Extracted {} characters of article text", text.len());
            session.set_raw_text(text);
        }
        Extraction::Failed(reason) => {
            // Never store the failure message as working text
            println!("✗ {}", reason);
        }
    }

    Ok(())
}

async fn generate_podcast(
    summarizer: &HfSummarizer,
    tts: &GoogleTts,
    session: &mut PodcastSession,
    args: &Args,
) -> Result<()> {
    let Some(raw_text) = session.raw_text().map(str::to_string) else {
        println!("No article text yet. Extract a URL or paste text first.");
        return Ok(());
    };

    println!("\n📝 Step 1: Summarizing text...");
    let summary = summarize_text(summarizer, &raw_text).await;
    session.set_summary(summary.clone());

    println!("🎙️  Step 2: Converting to podcast style...");
    let podcast_text = rewrite_to_podcast_style(&summary);
    session.set_podcast_text(podcast_text.clone());

    println!("🔊 Step 3: Generating audio...");
    let main_audio_path = session.main_audio_path();
    if let Err(e) = synthesize_to_file(tts, &podcast_text, &args.lang, &main_audio_path).await {
        println!("✗ Failed to generate audio: {}", e);
        return Ok(());
    }

    let mut final_audio_path = main_audio_path.clone();

    if !args.no_intro_outro {
        let wrapped_path = session.final_audio_output_path();
        match wrap_with_intro_outro(
            tts,
            &args.lang,
            &main_audio_path,
            INTRO_TEXT,
            OUTRO_TEXT,
            &wrapped_path,
        )
        .await
        {
            Ok(()) => final_audio_path = wrapped_path,
            Err(e) => println!("⚠ Could not add intro/outro, keeping main narration: {}", e),
        }
    }

    if !args.no_music {
        let music_path = args
            .music
            .clone()
            .unwrap_or_else(|| session.default_music_path());

        if music_path.exists() {
            let mixed_path = session.music_mix_path();
            match overlay_background_music(
                &final_audio_path,
                &music_path,
                &mixed_path,
                DEFAULT_VOLUME_REDUCTION_DB,
            ) {
                Ok(()) => final_audio_path = mixed_path,
                Err(e) => println!("⚠ Could not add background music: {}", e),
            }
        }
    }

    session.set_final_audio_path(final_audio_path.clone());

    println!("\n✅ Podcast generated successfully!");
    println!("\n--- Summary ---\n{}", summary);
    println!("\n--- Podcast Script ---\n{}", podcast_text);
    println!("\n🔊 Final audio: {}", final_audio_path.display());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::from_env()?;

    println!("🎙️  AI Podcast Generator");
    println!("Turns an article into podcast-style audio: extract, summarize,");
    println!("rewrite conversationally, narrate, then add intro/outro and music.");

    let mut session = PodcastSession::create()?;
    println!("\n✓ Session directory: {}", session.work_dir().display());

    let extractor = ArticleExtractor::new()?;
    let tts = GoogleTts::new()?;
    let summarizer = HfSummarizer::new(config.hf_api_token.clone(), config.summarizer_model.clone())
        .context("Failed to create summarizer")?;

    if let Some(url) = &args.url {
        extract_from_url(&extractor, &mut session, url).await?;
    }

    loop {
        let action = match prompt_action() {
            Ok(action) => action,
            Err(e) => {
                println!("✗ {}", e);
                continue;
            }
        };

        match action {
            Action::ExtractUrl => {
                let url = prompt_line("Enter article URL: ")?;
                if url.is_empty() {
                    println!("No URL given.");
                    continue;
                }
                extract_from_url(&extractor, &mut session, &url).await?;
            }
            Action::PasteText => {
                let text = read_pasted_text()?;
                if text.trim().is_empty() {
                    println!("No text given.");
                    continue;
                }
                println!("✓ Stored {} characters of article text", text.len());
                session.set_raw_text(text);
            }
            Action::Generate => {
                generate_podcast(&summarizer, &tts, &mut session, &args).await?;
            }
            Action::ClearCache => {
                session.clear_cache()?;
                println!("🗑️  Cache cleared!");
            }
            Action::Quit => break,
        }
    }

    Ok(())
}
