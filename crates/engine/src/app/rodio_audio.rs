use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{info, warn};

use super::audio::{resolve_audio_path, AudioError, AudioSink};

/// Plays `<audio_dir>/<key>.<ext>` on the default output device.
///
/// Single-threaded like the rest of [`super::SceneContext`]. Playback failures
/// are logged once per key and otherwise ignored.
pub struct RodioAudio {
    // Dropping the stream silences every sink created from it.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    audio_dir: PathBuf,
    music: RefCell<Option<(String, Sink)>>,
    warned_keys: RefCell<HashSet<String>>,
}

impl RodioAudio {
    pub fn open(audio_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default().map_err(|err| AudioError::Output {
            message: err.to_string(),
        })?;
        let audio_dir = audio_dir.into();
        info!(dir = %audio_dir.display(), "audio_output_opened");
        Ok(Self {
            _stream: stream,
            handle,
            audio_dir,
            music: RefCell::new(None),
            warned_keys: RefCell::new(HashSet::new()),
        })
    }

    fn start(&self, key: &str, looped: bool) -> Result<Sink, AudioError> {
        let path = resolve_audio_path(&self.audio_dir, key)?;
        let file = File::open(&path).map_err(|source| AudioError::Open {
            path: path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let sink = Sink::try_new(&self.handle).map_err(|err| AudioError::Output {
            message: err.to_string(),
        })?;
        if looped {
            let source = Decoder::new_looped(reader).map_err(|err| decode_error(&path, err))?;
            sink.append(source);
        } else {
            let source = Decoder::new(reader).map_err(|err| decode_error(&path, err))?;
            sink.append(source);
        }
        Ok(sink)
    }

    fn warn_once(&self, key: &str, error: &AudioError) {
        if self.warned_keys.borrow_mut().insert(key.to_string()) {
            warn!(key, error = %error, "audio_playback_failed");
        }
    }
}

fn decode_error(path: &Path, err: rodio::decoder::DecoderError) -> AudioError {
    AudioError::Decode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl AudioSink for RodioAudio {
    fn play_music(&self, key: &str, looped: bool) {
        if let Some((current, sink)) = self.music.borrow().as_ref() {
            // Resuming a hub asks for the track that is already playing.
            if current == key && !sink.empty() {
                return;
            }
        }
        self.stop_music();
        match self.start(key, looped) {
            Ok(sink) => *self.music.borrow_mut() = Some((key.to_string(), sink)),
            Err(error) => self.warn_once(key, &error),
        }
    }

    fn stop_music(&self) {
        if let Some((_, sink)) = self.music.borrow_mut().take() {
            sink.stop();
        }
    }

    fn play_sound(&self, key: &str) {
        match self.start(key, false) {
            Ok(sink) => sink.detach(),
            Err(error) => self.warn_once(key, &error),
        }
    }
}
