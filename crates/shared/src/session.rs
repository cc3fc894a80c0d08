use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed artifact names inside a session's working directory.
pub const MAIN_AUDIO_FILENAME: &str = "main_podcast.mp3";
pub const FINAL_AUDIO_FILENAME: &str = "final_podcast.mp3";
pub const MUSIC_MIX_FILENAME: &str = "podcast_with_music.mp3";
pub const MUSIC_FILENAME: &str = "music.mp3";

const CACHED_FILENAMES: [&str; 5] = [
    MAIN_AUDIO_FILENAME,
    FINAL_AUDIO_FILENAME,
    MUSIC_MIX_FILENAME,
    "intro.mp3",
    "outro.mp3",
];

/// One user session: a unique working directory for the flat audio
/// artifacts plus the text fields the shell displays between actions.
///
/// Each session gets its own directory so two sessions can never clobber
/// each other's fixed-name temp files.
pub struct PodcastSession {
    work_dir: PathBuf,
    raw_text: Option<String>,
    summary: Option<String>,
    podcast_text: Option<String>,
    final_audio_path: Option<PathBuf>,
}

impl PodcastSession {
    /// Create a session with a fresh timestamped working directory under
    /// the local data dir.
    pub fn create() -> Result<Self> {
        let base = dirs::data_local_dir()
            .context("Could not determine local data directory")?
            .join("make-podcast");

        let name = format!(
            "session-{}-{}",
            Local::now().format("%Y%m%d-%H%M%S"),
            std::process::id()
        );

        Self::in_dir(base.join(name))
    }

    /// Create a session rooted at an explicit directory.
    pub fn in_dir(work_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&work_dir).with_context(|| {
            format!("Failed to create session directory: {}", work_dir.display())
        })?;

        Ok(Self {
            work_dir,
            raw_text: None,
            summary: None,
            podcast_text: None,
            final_audio_path: None,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn main_audio_path(&self) -> PathBuf {
        self.work_dir.join(MAIN_AUDIO_FILENAME)
    }

    pub fn final_audio_output_path(&self) -> PathBuf {
        self.work_dir.join(FINAL_AUDIO_FILENAME)
    }

    pub fn music_mix_path(&self) -> PathBuf {
        self.work_dir.join(MUSIC_MIX_FILENAME)
    }

    /// Where a user-supplied music bed is looked for by default.
    pub fn default_music_path(&self) -> PathBuf {
        self.work_dir.join(MUSIC_FILENAME)
    }

    // ==================== Session fields ====================

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn set_raw_text(&mut self, text: String) {
        self.raw_text = Some(text);
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    pub fn podcast_text(&self) -> Option<&str> {
        self.podcast_text.as_deref()
    }

    pub fn set_podcast_text(&mut self, text: String) {
        self.podcast_text = Some(text);
    }

    pub fn final_audio_path(&self) -> Option<&Path> {
        self.final_audio_path.as_deref()
    }

    pub fn set_final_audio_path(&mut self, path: PathBuf) {
        self.final_audio_path = Some(path);
    }

    /// Remove every known audio artifact and reset all session fields.
    /// The working directory itself stays for the next generation.
    pub fn clear_cache(&mut self) -> Result<()> {
        for filename in CACHED_FILENAMES {
            let path = self.work_dir.join(filename);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }

        self.raw_text = None;
        self.summary = None;
        self.podcast_text = None;
        self.final_audio_path = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_in_tempdir() -> (tempfile::TempDir, PodcastSession) {
        let dir = tempfile::tempdir().unwrap();
        let session = PodcastSession::in_dir(dir.path().join("session")).unwrap();
        (dir, session)
    }

    #[test]
    fn test_creates_working_directory() {
        let (_dir, session) = session_in_tempdir();
        assert!(session.work_dir().is_dir());
    }

    #[test]
    fn test_artifact_paths_live_in_the_working_directory() {
        let (_dir, session) = session_in_tempdir();
        assert_eq!(
            session.main_audio_path(),
            session.work_dir().join("main_podcast.mp3")
        );
        assert_eq!(
            session.final_audio_output_path(),
            session.work_dir().join("final_podcast.mp3")
        );
        assert_eq!(
            session.music_mix_path(),
            session.work_dir().join("podcast_with_music.mp3")
        );
    }

    #[test]
    fn test_clear_cache_removes_artifacts_and_resets_fields() {
        let (_dir, mut session) = session_in_tempdir();

        for name in CACHED_FILENAMES {
            std::fs::write(session.work_dir().join(name), b"stub").unwrap();
        }
        session.set_raw_text("article".to_string());
        session.set_summary("summary".to_string());
        session.set_podcast_text("script".to_string());
        session.set_final_audio_path(session.final_audio_output_path());

        session.clear_cache().unwrap();

        for name in CACHED_FILENAMES {
            assert!(!session.work_dir().join(name).exists());
        }
        assert!(session.raw_text().is_none());
        assert!(session.summary().is_none());
        assert!(session.podcast_text().is_none());
        assert!(session.final_audio_path().is_none());
        assert!(session.work_dir().is_dir());
    }

    #[test]
    fn test_clear_cache_with_no_artifacts_is_fine() {
        let (_dir, mut session) = session_in_tempdir();
        session.clear_cache().unwrap();
    }

    #[test]
    fn test_sessions_in_different_dirs_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = PodcastSession::in_dir(dir.path().join("a")).unwrap();
        let b = PodcastSession::in_dir(dir.path().join("b")).unwrap();
        assert_ne!(a.main_audio_path(), b.main_audio_path());
    }
}
