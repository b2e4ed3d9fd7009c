//! audio - Letter clip loading, caching, and playback
//!
//! Files are fetched from a directory or HTTP base, decoded with symphonia
//! into i16 PCM, cached per letter/effect, and played through an
//! [`AudioSink`] (ALSA when built with the `alsa` feature).

#[cfg(feature = "alsa")]
mod alsa_device;
mod decoder;
mod library;
mod sink;
mod source;

pub use decoder::SymphoniaDecoder;
pub use library::{AudioLibrary, Effect};
pub use sink::AudioSink;
#[cfg(feature = "alsa")]
pub use sink::AlsaSink;
#[cfg(not(feature = "alsa"))]
pub use sink::SilentSink;
pub use source::source_for;
