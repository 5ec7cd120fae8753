use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::asset_keys::{validate_asset_key, AssetKeyError};

/// Extensions tried, in order, for an audio key under the audio directory.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["ogg", "wav", "mp3", "flac"];

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {message}")]
    Output { message: String },
    #[error("audio key '{key}' is invalid: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("no audio file for '{key}' under {dir}")]
    NotFound { key: String, dir: PathBuf },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Fire-and-forget sound output. Implementations swallow their own failures;
/// nothing here may influence scene flow.
pub trait AudioSink {
    fn play_music(&self, key: &str, looped: bool);
    fn stop_music(&self);
    fn play_sound(&self, key: &str);
}

/// Sink used when no audio backend is wired in; records requests in the log.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_music(&self, key: &str, looped: bool) {
        debug!(key, looped, "audio_music_requested");
    }

    fn stop_music(&self) {
        debug!("audio_music_stopped");
    }

    fn play_sound(&self, key: &str) {
        debug!(key, "audio_sound_requested");
    }
}

/// Maps `key` to `<audio_dir>/<key>.<ext>` using the first extension in
/// [`AUDIO_EXTENSIONS`] that exists on disk.
pub fn resolve_audio_path(audio_dir: &Path, key: &str) -> Result<PathBuf, AudioError> {
    validate_asset_key(key).map_err(|source| AudioError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| audio_dir.join(format!("{key}.{ext}")))
        .find(|path| path.is_file())
        .ok_or_else(|| AudioError::NotFound {
            key: key.to_string(),
            dir: audio_dir.to_path_buf(),
        })
}

/// Uses the opened backend, or logs why none is available and falls back to
/// [`LogAudio`] so the game runs silently.
pub fn sink_or_log(opened: Result<Rc<dyn AudioSink>, AudioError>) -> Rc<dyn AudioSink> {
    match opened {
        Ok(sink) => sink,
        Err(error) => {
            warn!(error = %error, "audio_output_unavailable");
            Rc::new(LogAudio)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Music { key: String, looped: bool },
    StopMusic,
    Sound { key: String },
}

/// Keeps every request so callers can assert on what was played.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    events: RefCell<Vec<AudioEvent>>,
}

impl RecordingAudio {
    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.borrow().clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play_music(&self, key: &str, looped: bool) {
        self.events.borrow_mut().push(AudioEvent::Music {
            key: key.to_string(),
            looped,
        });
    }

    fn stop_music(&self) {
        self.events.borrow_mut().push(AudioEvent::StopMusic);
    }

    fn play_sound(&self, key: &str) {
        self.events.borrow_mut().push(AudioEvent::Sound {
            key: key.to_string(),
        });
    }
}
