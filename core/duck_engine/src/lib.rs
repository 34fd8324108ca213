//! Background-music ducking for voice-overs.
//!
//! The speech track is padded, sliced and classified loud/silent. Long
//! silences become fade points, the fade points become a gain curve for the
//! music, and the shaped music is laid under the speech with a final fade-out.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod logger;
pub mod mixer;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod track;

pub use config::DuckingConfig;
pub use error::{DuckError, Result};
pub use pipeline::{DuckOutcome, DuckingPipeline};
pub use report::DuckingReport;
pub use track::AudioBuffer;
