//! Asynchronous panorama loading: executors, media sources, decoders and the
//! cancellable loader that ties them together.

mod decoder;
mod executor;
mod panorama;
mod source;
mod texture;

pub use decoder::{
    DecoderRegistry, LoaderError, PanoramaDecoder, StillImageDecoder, VideoStreamDecoder,
    probe_mp4_dimensions,
};
pub use executor::{Executor, Job, ManualExecutor, ThreadExecutor};
pub use panorama::{LoadCompletion, LoadToken, PanoramaLoader};
pub use source::{FileSource, MediaSource, MemorySource};
pub use texture::{StillTexture, Texture, VideoStream};

#[cfg(test)]
pub(crate) use decoder::tests::{mp4_bytes, png_bytes};
