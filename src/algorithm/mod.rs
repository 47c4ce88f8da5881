/// Transparent output buffer with opaque paste and padded crop
pub mod canvas;
/// Run orchestration: focal point, planning and the tile loop
pub mod executor;
/// Primary and fallback prompt selection
pub mod prompts;
