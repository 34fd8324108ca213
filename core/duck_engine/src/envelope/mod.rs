pub mod points;

pub use points::{FadePoints, extract_fade_points};
