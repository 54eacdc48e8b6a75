pub mod srt;
pub mod whisper;

pub use srt::SrtWriter;
pub use whisper::{TranscriptSegment, TranscriptionResult, WhisperTranscriber};
