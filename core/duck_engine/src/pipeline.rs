//! End-to-end ducking run: load, analyse, schedule, mix, export.

use log::{debug, info};
use uuid::Uuid;

use crate::{
    analysis::{LoudnessProfile, detect_silences},
    config::DuckingConfig,
    envelope::extract_fade_points,
    error::{DuckError, Result},
    mixer::{apply_tail_fade, overlay},
    report::DuckingReport,
    scheduler::GainSchedule,
    track::{AudioBuffer, padding::pad_track, resample::conform_rate, source::load_audio, wav::export_wav},
};

#[derive(Debug, Clone)]
pub struct DuckOutcome {
    pub mix: AudioBuffer,
    pub report: DuckingReport,
}

#[derive(Debug, Clone)]
pub struct DuckingPipeline {
    config: DuckingConfig,
}

impl DuckingPipeline {
    pub fn new(config: DuckingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &DuckingConfig {
        &self.config
    }

    /// Ducks `music` under `speech` without touching the filesystem.
    pub fn process(&self, speech: &AudioBuffer, music: &AudioBuffer) -> Result<DuckOutcome> {
        let config = &self.config;
        let run_id = Uuid::new_v4();

        let sample_rate = speech.sample_rate().max(music.sample_rate());
        let speech = conform_rate(speech, sample_rate)?;
        let music = conform_rate(music, sample_rate)?;

        let padded = pad_track(&speech, config.opening_silence_ms, config.closing_silence_ms)?;
        let padded_duration_ms = padded.duration_ms();
        if config.min_silence_ms > padded_duration_ms {
            return Err(DuckError::config(format!(
                "min_silence_ms ({}) is longer than the padded speech ({padded_duration_ms} ms)",
                config.min_silence_ms
            )));
        }
        if config.tail_fade_ms > padded_duration_ms {
            return Err(DuckError::config(format!(
                "tail_fade_ms ({}) is longer than the padded speech ({padded_duration_ms} ms)",
                config.tail_fade_ms
            )));
        }
        info!(
            "[{run_id}] speech {} padded to {padded_duration_ms} ms at {sample_rate} Hz",
            padded.name()
        );

        let loudness = LoudnessProfile::measure(&padded, config.slice_width()?)
            .binarize(config.loudness_threshold_dbfs, &config.strategy);
        let intervals = detect_silences(&loudness, config.min_silence_ms);
        info!(
            "[{run_id}] {} of {} slices loud, {} silences found",
            loudness.loud_count(),
            loudness.len(),
            intervals.len()
        );

        let fade_points = extract_fade_points(&intervals, config.fade_in_ms);
        let schedule = GainSchedule::build(
            &fade_points,
            config.levels(),
            config.fade_in_ms,
            config.fade_out_ms,
        );
        debug!("[{run_id}] fade points {fade_points:?}");

        let ducked_music = schedule.render(&music);
        let mix = overlay(&padded, &ducked_music)?;
        let mix = apply_tail_fade(&mix, config.tail_fade_ms)?;

        let report = DuckingReport {
            run_id,
            sample_rate,
            padded_duration_ms,
            slice_count: loudness.len(),
            loud_slice_count: loudness.loud_count(),
            intervals,
            fade_points,
            starting_gain: schedule.starting,
            starting_gain_db: schedule.starting_db,
            segments: schedule.segments,
        };
        info!("[{run_id}] {}", report.summary());

        Ok(DuckOutcome { mix, report })
    }

    /// Loads the configured inputs, ducks them and writes the output file
    /// (and the report, when a report path is configured).
    pub fn run(&self) -> Result<DuckingReport> {
        let config = &self.config;

        let speech = load_audio(&config.speech_path, config.speech_format.as_deref())?;
        let music = load_audio(&config.music_path, config.music_format.as_deref())?;

        let DuckOutcome { mix, report } = self.process(&speech, &music)?;

        export_wav(&mix, &config.output_path, config.output_sample_format)?;
        info!(
            "[{}] wrote {} ({} ms)",
            report.run_id,
            config.output_path.display(),
            mix.duration_ms()
        );

        if let Some(report_path) = &config.report_path {
            report.write_json(report_path)?;
        }

        Ok(report)
    }
}
