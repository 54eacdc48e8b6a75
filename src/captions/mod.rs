pub mod allocator;
pub mod engine;
pub mod packer;
pub mod timeline;

pub use allocator::{allocate_frames, CaptionError};
pub use engine::{CaptionEngine, DEFAULT_LEAD_IN_FRAMES};
pub use packer::pack_lines;
pub use timeline::{CaptionLine, CaptionTimeline};
