use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tracing::debug;

/// The synthesis endpoint rejects long queries, so text is sent in
/// pieces no longer than this many characters.
const MAX_PIECE_CHARS: usize = 200;

/// Speech-synthesis capability: text plus a language code in, MP3 bytes
/// out. Success or failure only, no streaming.
#[async_trait]
pub trait TextToSpeech {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>>;
}

/// Synthesize text and write the MP3 to a file.
pub async fn synthesize_to_file<T: TextToSpeech + ?Sized>(
    tts: &T,
    text: &str,
    lang: &str,
    path: &Path,
) -> Result<()> {
    let bytes = tts.synthesize(text, lang).await?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write audio file: {}", path.display()))?;
    Ok(())
}

/// Client for the Google Translate text-to-speech endpoint.
pub struct GoogleTts {
    client: Client,
}

impl GoogleTts {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; MakePodcast/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch_piece(&self, piece: &str, lang: &str) -> Result<Vec<u8>> {
        let url = format!(
            "https://translate.google.com/translate_tts?ie=UTF-8&client=tw-ob&tl={}&q={}",
            lang,
            urlencoding::encode(piece)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send TTS request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("TTS endpoint returned error: {}", status);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read TTS response body")?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TextToSpeech for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>> {
        let pieces = split_for_synthesis(text, MAX_PIECE_CHARS);
        if pieces.is_empty() {
            anyhow::bail!("Cannot synthesize empty text");
        }

        // One request per piece, payloads concatenated; MP3 frames are
        // self-contained so back-to-back payloads play as one stream.
        let mut audio = Vec::new();
        for piece in &pieces {
            debug!("Synthesizing piece of {} chars", piece.chars().count());
            let bytes = self.fetch_piece(piece, lang).await?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

/// Split text into pieces of at most `max_chars` characters, preferring
/// whitespace boundaries. A single word longer than the limit is cut
/// mid-word.
fn split_for_synthesis(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            // Hard-cut an oversized word
            let chars: Vec<char> = word.chars().collect();
            for window in chars.chunks(max_chars) {
                pieces.push(window.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_a_single_piece() {
        let pieces = split_for_synthesis("Welcome to the AI Podcast!", 200);
        assert_eq!(pieces, vec!["Welcome to the AI Podcast!".to_string()]);
    }

    #[test]
    fn test_pieces_respect_the_character_limit() {
        let text = "word ".repeat(100);
        let pieces = split_for_synthesis(&text, 20);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.chars().count() <= 20);
        }
    }

    #[test]
    fn test_splitting_preserves_every_word() {
        let text = "the quick brown fox jumps over the lazy dog";
        let pieces = split_for_synthesis(text, 10);
        let rejoined = pieces.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_oversized_word_is_hard_cut() {
        let word = "a".repeat(25);
        let pieces = split_for_synthesis(&word, 10);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].len(), 10);
        assert_eq!(pieces[2].len(), 5);
    }

    #[test]
    fn test_blank_text_yields_no_pieces() {
        assert!(split_for_synthesis("   ", 200).is_empty());
    }
}
