use anyhow::{Context, Result};
use std::path::Path;
use tracing::error;

use crate::audio::AudioSegment;
use crate::tts::{synthesize_to_file, TextToSpeech};

/// Default attenuation applied to the background bed before mixing.
pub const DEFAULT_VOLUME_REDUCTION_DB: f32 = 6.0;

const INTRO_FILENAME: &str = "intro.mp3";
const OUTRO_FILENAME: &str = "outro.mp3";

/// Synthesize intro and outro narration and splice them around the main
/// track: intro, then main, then outro, exported as MP3 to `output_path`.
///
/// Either narration may silently degrade to an empty segment if its
/// synthesis fails; the main track must load or the whole operation
/// fails. The temporary intro/outro files are removed on the success
/// path. After an error the caller must not assume anything about the
/// output file.
pub async fn wrap_with_intro_outro<T: TextToSpeech + ?Sized>(
    tts: &T,
    lang: &str,
    main_audio_path: &Path,
    intro_text: &str,
    outro_text: &str,
    output_path: &Path,
) -> Result<()> {
    let work_dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    let intro_path = work_dir.join(INTRO_FILENAME);
    let outro_path = work_dir.join(OUTRO_FILENAME);

    let intro = narration_or_silence(tts, lang, intro_text, &intro_path, "intro").await;
    let outro = narration_or_silence(tts, lang, outro_text, &outro_path, "outro").await;

    let main_audio = AudioSegment::from_mp3(main_audio_path)
        .with_context(|| format!("Failed to load main audio: {}", main_audio_path.display()))?;

    let mut combined = intro;
    combined.append(&main_audio);
    combined.append(&outro);

    combined
        .export_mp3(output_path)
        .with_context(|| format!("Failed to export combined audio: {}", output_path.display()))?;

    // Clean up temporary files
    for temp in [&intro_path, &outro_path] {
        if temp.exists() {
            let _ = std::fs::remove_file(temp);
        }
    }

    Ok(())
}

/// Synthesize one narration segment, falling back to empty audio when
/// synthesis or loading fails so the caller always has an operand to
/// concatenate.
async fn narration_or_silence<T: TextToSpeech + ?Sized>(
    tts: &T,
    lang: &str,
    text: &str,
    path: &Path,
    role: &str,
) -> AudioSegment {
    if let Err(e) = synthesize_to_file(tts, text, lang, path).await {
        error!("Could not generate {} audio, skipping {}: {}", role, role, e);
        return AudioSegment::empty();
    }

    match AudioSegment::from_mp3(path) {
        Ok(segment) => segment,
        Err(e) => {
            error!("Could not load {} audio, skipping {}: {}", role, role, e);
            AudioSegment::empty()
        }
    }
}

/// Mix a music bed under the main track and export the result as MP3.
///
/// A bed shorter than the main track is tiled whole enough times to
/// reach or pass the main duration, then cut to exactly that duration,
/// so the additive overlay always sees equal-length operands. The bed is
/// attenuated by `volume_reduction_db` before mixing. Tiling can leave
/// an audible seam where the music's phase does not loop cleanly.
pub fn overlay_background_music(
    main_audio_path: &Path,
    music_path: &Path,
    output_path: &Path,
    volume_reduction_db: f32,
) -> Result<()> {
    let main_audio = AudioSegment::from_mp3(main_audio_path)
        .with_context(|| format!("Failed to load main audio: {}", main_audio_path.display()))?;
    let music = AudioSegment::from_mp3(music_path)
        .with_context(|| format!("Failed to load music track: {}", music_path.display()))?;

    if music.duration_ms() == 0 {
        anyhow::bail!("Music track is empty: {}", music_path.display());
    }

    let main_ms = main_audio.duration_ms();

    // Tile the bed to at least the main duration, then cut it to match
    let tiled = if music.duration_ms() < main_ms {
        let times = (main_ms / music.duration_ms() + 1) as usize;
        music.repeated(times)
    } else {
        music
    };
    let bed = tiled
        .truncated_ms(main_ms)
        .with_gain_db(-volume_reduction_db);

    let mixed = main_audio.overlay(&bed);

    mixed
        .export_mp3(output_path)
        .with_context(|| format!("Failed to export mixed audio: {}", output_path.display()))?;

    Ok(())
}
