// Audio module - loading recordings into mono waveforms

pub mod decode;

// Re-export commonly used types for convenience
pub use decode::{decode_mp3, decode_wav, load, Waveform};
