//! Preloaded letter clips and sound effects, plus playback lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use futures_util::future::join_all;

use super::decoder::{AudioBuffer, AudioDecoder};
use super::sink::AudioSink;
use super::source::AssetSource;
use crate::round::{ALPHABET, is_letter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Correct,
    Incorrect,
}

impl Effect {
    pub const ALL: [Effect; 2] = [Effect::Correct, Effect::Incorrect];

    fn file_stem(self) -> &'static str {
        match self {
            Effect::Correct => "answer-right",
            Effect::Incorrect => "answer-wrong",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Result of a full preload pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub letters_loaded: usize,
    pub missing_letters: Vec<char>,
    pub missing_effects: Vec<Effect>,
}

impl PreloadReport {
    /// Nothing playable for any letter; the game is unusable.
    pub fn all_letters_failed(&self) -> bool {
        self.letters_loaded == 0
    }

    pub fn is_complete(&self) -> bool {
        self.missing_letters.is_empty() && self.missing_effects.is_empty()
    }
}

pub struct AudioLibrary {
    source: Arc<dyn AssetSource>,
    decoder: Arc<dyn AudioDecoder>,
    sink: Arc<dyn AudioSink>,
    extension: String,
    letters: RwLock<HashMap<char, AudioBuffer>>,
    effects: RwLock<HashMap<Effect, AudioBuffer>>,
}

impl AudioLibrary {
    pub fn new(
        source: Arc<dyn AssetSource>,
        decoder: Arc<dyn AudioDecoder>,
        sink: Arc<dyn AudioSink>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            source,
            decoder,
            sink,
            extension: extension.into(),
            letters: RwLock::new(HashMap::new()),
            effects: RwLock::new(HashMap::new()),
        }
    }

    /// Load every letter and effect concurrently. Individual failures are
    /// logged and left as empty slots; this returns once all attempts settled.
    pub async fn preload(&self) -> PreloadReport {
        log::info!("Preloading audio from {}", self.source.describe());

        let letters = join_all(
            ALPHABET
                .iter()
                .map(|&letter| async move { (letter, self.load_letter(letter).await.is_some()) }),
        );
        let effects = join_all(
            Effect::ALL
                .iter()
                .map(|&effect| async move { (effect, self.load_effect(effect).await) }),
        );
        let (letters, effects) = tokio::join!(letters, effects);

        let mut report = PreloadReport::default();
        for (letter, ok) in letters {
            if ok {
                report.letters_loaded += 1;
            } else {
                report.missing_letters.push(letter);
            }
        }
        report.missing_effects = effects
            .into_iter()
            .filter_map(|(effect, ok)| (!ok).then_some(effect))
            .collect();

        if report.is_complete() {
            log::info!("All audio files loaded successfully");
        } else {
            log::warn!(
                "Audio preload finished with gaps: {}/{} letters, missing letters {:?}, missing effects {:?}",
                report.letters_loaded,
                ALPHABET.len(),
                report.missing_letters,
                report.missing_effects,
            );
        }
        report
    }

    /// Cached clip for `letter`, fetching it if the slot is still empty.
    pub async fn load_letter(&self, letter: char) -> Option<AudioBuffer> {
        if !is_letter(letter) {
            log::warn!("No audio slot for {:?}", letter);
            return None;
        }
        if let Some(buffer) = self.cached_letter(letter) {
            return Some(buffer);
        }

        let file = format!("{}.{}", letter.to_ascii_lowercase(), self.extension);
        match self.fetch_decode(&file).await {
            Ok(buffer) => {
                let mut letters = self.letters.write().unwrap_or_else(|e| e.into_inner());
                Some(letters.entry(letter).or_insert(buffer).clone())
            }
            Err(e) => {
                log::error!("Error loading audio for letter {}: {:#}", letter, e);
                None
            }
        }
    }

    async fn load_effect(&self, effect: Effect) -> bool {
        let file = format!("{}.{}", effect.file_stem(), self.extension);
        match self.fetch_decode(&file).await {
            Ok(buffer) => {
                self.effects
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(effect, buffer);
                true
            }
            Err(e) => {
                log::error!("Error loading sound effect {}: {:#}", effect, e);
                false
            }
        }
    }

    async fn fetch_decode(&self, file: &str) -> Result<AudioBuffer> {
        let data = self.source.fetch(file).await?;
        let decoder = self.decoder.clone();
        let name = file.to_string();
        tokio::task::spawn_blocking(move || decoder.decode(&name, data))
            .await
            .context("Decoder task panicked")?
    }

    pub fn cached_letter(&self, letter: char) -> Option<AudioBuffer> {
        self.letters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&letter)
            .cloned()
    }

    pub fn cached_effect(&self, effect: Effect) -> Option<AudioBuffer> {
        self.effects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&effect)
            .cloned()
    }

    /// Play the clip for `letter`. A missing clip is logged and stays silent.
    pub async fn play_letter(&self, letter: char) {
        match self.load_letter(letter).await {
            Some(buffer) => self.play(&buffer),
            None => log::error!("Failed to load audio for letter {}", letter),
        }
    }

    pub fn play_effect(&self, effect: Effect) {
        match self.cached_effect(effect) {
            Some(buffer) => self.play(&buffer),
            None => log::error!("Sound effect {} not found", effect),
        }
    }

    fn play(&self, buffer: &AudioBuffer) {
        if let Err(e) = self.sink.play(buffer) {
            log::error!("Error playing sound: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, bail};
    use async_trait::async_trait;

    use super::*;
    use crate::audio::decoder::SymphoniaDecoder;
    use crate::audio::decoder::tests::wav_bytes;
    use crate::audio::sink::tests::RecordingSink;

    /// In-memory files; counts fetches per name.
    #[derive(Default)]
    struct MemorySource {
        files: Mutex<HashMap<String, Vec<u8>>>,
        fetches: Mutex<HashMap<String, usize>>,
    }

    impl MemorySource {
        fn with_everything() -> Self {
            let source = Self::default();
            for letter in ALPHABET {
                source.put(&format!("{}.wav", letter.to_ascii_lowercase()), letter as i16);
            }
            source.put("answer-right.wav", 1);
            source.put("answer-wrong.wav", -1);
            source
        }

        fn put(&self, name: &str, value: i16) {
            self.files
                .lock()
                .unwrap()
                .insert(name.to_string(), wav_bytes(8000, 1, &[value; 64]));
        }

        fn remove(&self, name: &str) {
            self.files.lock().unwrap().remove(name);
        }

        fn fetch_count(&self, name: &str) -> usize {
            self.fetches.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl AssetSource for MemorySource {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
            *self.fetches.lock().unwrap().entry(name.to_string()).or_default() += 1;
            self.files
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("404 Not Found: {}", name))
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    /// Rejects anything named in `broken`.
    struct PickyDecoder {
        broken: &'static [&'static str],
        calls: AtomicUsize,
    }

    impl AudioDecoder for PickyDecoder {
        fn decode(&self, name: &str, data: Vec<u8>) -> Result<AudioBuffer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(&name) {
                bail!("corrupt audio: {}", name);
            }
            SymphoniaDecoder.decode(name, data)
        }
    }

    fn library(
        source: Arc<MemorySource>,
        broken: &'static [&'static str],
    ) -> (AudioLibrary, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let decoder = Arc::new(PickyDecoder { broken, calls: AtomicUsize::new(0) });
        (AudioLibrary::new(source, decoder, sink.clone(), "wav"), sink)
    }

    #[tokio::test]
    async fn preloads_everything() {
        let (library, _) = library(Arc::new(MemorySource::with_everything()), &[]);
        let report = library.preload().await;
        assert!(report.is_complete());
        assert_eq!(report.letters_loaded, 26);
        assert_eq!(library.cached_letter('K').unwrap().samples[0], 'K' as i16);
        assert!(library.cached_effect(Effect::Incorrect).is_some());
    }

    #[tokio::test]
    async fn failed_letter_stays_empty_and_silent() {
        let source = Arc::new(MemorySource::with_everything());
        source.remove("z.wav");
        let (library, sink) = library(source.clone(), &[]);

        let report = library.preload().await;
        assert_eq!(report.missing_letters, vec!['Z']);
        assert_eq!(report.letters_loaded, 25);
        assert!(!report.all_letters_failed());
        assert!(library.cached_letter('Z').is_none());

        library.play_letter('Z').await;
        assert_eq!(sink.count(), 0);
        // 播放时会再尝试一次
        assert_eq!(source.fetch_count("z.wav"), 2);

        library.play_letter('Y').await;
        library.play_effect(Effect::Correct);
        assert_eq!(sink.count(), 2);
    }

    #[tokio::test]
    async fn decode_failures_do_not_abort_batch() {
        let (library, _) = library(
            Arc::new(MemorySource::with_everything()),
            &["b.wav", "answer-wrong.wav"],
        );
        let report = library.preload().await;
        assert_eq!(report.missing_letters, vec!['B']);
        assert_eq!(report.missing_effects, vec![Effect::Incorrect]);
        assert!(library.cached_letter('C').is_some());
    }

    #[tokio::test]
    async fn missing_effect_is_silent() {
        let source = Arc::new(MemorySource::with_everything());
        source.remove("answer-right.wav");
        let (library, sink) = library(source, &[]);
        library.preload().await;

        library.play_effect(Effect::Correct);
        assert_eq!(sink.count(), 0);
        library.play_effect(Effect::Incorrect);
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn missed_slot_is_filled_on_demand() {
        let source = Arc::new(MemorySource::with_everything());
        source.remove("q.wav");
        let (library, sink) = library(source.clone(), &[]);
        library.preload().await;
        assert!(library.cached_letter('Q').is_none());

        source.put("q.wav", 7);
        library.play_letter('Q').await;
        assert_eq!(sink.count(), 1);
        assert!(library.cached_letter('Q').is_some());

        // 已缓存，不再请求
        library.play_letter('Q').await;
        assert_eq!(source.fetch_count("q.wav"), 2);
    }

    #[tokio::test]
    async fn unknown_keys_are_rejected_without_fetching() {
        let source = Arc::new(MemorySource::with_everything());
        let (library, sink) = library(source.clone(), &[]);
        library.play_letter('7').await;
        library.play_letter('a').await;
        assert_eq!(sink.count(), 0);
        assert_eq!(source.fetch_count("7.wav"), 0);
    }

    #[tokio::test]
    async fn everything_missing_is_reported() {
        let (library, _) = library(Arc::new(MemorySource::default()), &[]);
        let report = library.preload().await;
        assert!(report.all_letters_failed());
        assert_eq!(report.missing_letters.len(), 26);
        assert_eq!(report.missing_effects.len(), 2);
    }
}
