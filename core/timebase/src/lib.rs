pub mod clock;
pub mod resolution;

pub use clock::{SliceClock, SliceWindow};
pub use resolution::FrameResolution;
