// Public modules
pub mod assembler;
pub mod audio;
pub mod config;
pub mod extractor;
pub mod session;
pub mod stylizer;
pub mod summarizer;
pub mod tts;

// Re-export commonly used types
pub use assembler::{overlay_background_music, wrap_with_intro_outro, DEFAULT_VOLUME_REDUCTION_DB};
pub use audio::AudioSegment;
pub use config::Config;
pub use extractor::{ArticleExtractor, Extraction};
pub use session::PodcastSession;
pub use stylizer::rewrite_to_podcast_style;
pub use summarizer::{summarize_text, HfSummarizer, Summarize};
pub use tts::{synthesize_to_file, GoogleTts, TextToSpeech};
