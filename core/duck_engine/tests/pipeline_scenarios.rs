use std::{f32::consts::TAU, fs, path::Path};

use duck_engine::{
    AudioBuffer, DuckError, DuckingConfig, DuckingPipeline,
    analysis::{LoudnessStrategy, SilenceInterval},
    scheduler::StartingGain,
    track::wav::read_wav_file,
};
use hound::{SampleFormat, WavSpec, WavWriter};

const RATE: u32 = 8000;

/// Mono speech at `RATE`: loud everywhere except the given `[start, end)` ms ranges.
fn speech_with_gaps(duration_ms: u64, gaps: &[(u64, u64)]) -> AudioBuffer {
    let samples: Vec<f32> = (0..duration_ms * u64::from(RATE) / 1000)
        .map(|i| {
            let ms = i * 1000 / u64::from(RATE);
            let silent = gaps.iter().any(|&(start, end)| ms >= start && ms < end);
            if silent { 0.0 } else { 0.5 }
        })
        .collect();
    AudioBuffer::from_mono("speech", RATE, &samples).unwrap()
}

fn music(duration_ms: u64) -> AudioBuffer {
    let samples: Vec<f32> = (0..duration_ms * u64::from(RATE) / 1000)
        .map(|i| 0.2 * (TAU * 220.0 * i as f32 / RATE as f32).sin())
        .collect();
    AudioBuffer::from_mono("bgm", RATE, &samples).unwrap()
}

fn unpadded() -> DuckingConfig {
    DuckingConfig {
        opening_silence_ms: 0,
        closing_silence_ms: 0,
        ..DuckingConfig::default()
    }
}

fn write_wav_fixture(path: &Path, buffer: &AudioBuffer, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &(l, r) in buffer.frames() {
        writer.write_sample((l * f32::from(i16::MAX)) as i16).unwrap();
        if channels == 2 {
            writer.write_sample((r * f32::from(i16::MAX)) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_single_gap_in_ten_seconds_of_speech() {
    let speech = speech_with_gaps(10_000, &[(2000, 5000)]);
    let pipeline = DuckingPipeline::new(unpadded()).unwrap();

    let report = pipeline.process(&speech, &music(12_000)).unwrap().report;

    assert_eq!(report.intervals.len(), 1);
    let SilenceInterval { start_ms, end_ms } = report.intervals[&1];
    assert!(start_ms.abs_diff(2000) <= 20);
    assert!(end_ms.abs_diff(5000) <= 20);

    assert_eq!(report.fade_points.fade_ins, vec![2000]);
    assert_eq!(report.fade_points.fade_outs.len(), 1);
    assert!(report.fade_points.fade_outs[0].abs_diff(4300) <= 20);
    assert_eq!(report.starting_gain, StartingGain::Quiet);
}

#[test]
fn test_default_padding_lifts_music_at_both_ends() {
    let speech = speech_with_gaps(10_000, &[(2000, 5000)]);
    let pipeline = DuckingPipeline::new(DuckingConfig::default()).unwrap();

    let outcome = pipeline.process(&speech, &music(20_000)).unwrap();
    let spans: Vec<(u64, u64)> = outcome
        .report
        .intervals
        .values()
        .map(|i| (i.start_ms, i.end_ms))
        .collect();

    assert_eq!(spans, vec![(0, 3980), (6000, 8980), (14_000, 17_000)]);
    assert_eq!(outcome.report.fade_points.fade_ins, vec![6000, 14_000]);
    assert_eq!(outcome.report.fade_points.fade_outs, vec![3280, 8280, 16_300]);
    assert_eq!(outcome.report.starting_gain, StartingGain::Loud);
    assert_eq!(outcome.mix.duration_ms(), 17_000);
    assert_eq!(outcome.mix.frames().last().copied(), Some((0.0, 0.0)));
}

#[test]
fn test_all_silent_speech_is_one_interval() {
    let speech = speech_with_gaps(5000, &[(0, 5000)]);
    let report = DuckingPipeline::new(unpadded())
        .unwrap()
        .process(&speech, &music(5000))
        .unwrap()
        .report;

    assert_eq!(report.intervals.len(), 1);
    assert_eq!(report.intervals[&1], SilenceInterval { start_ms: 0, end_ms: 5000 });
    assert!(report.fade_points.fade_ins.is_empty());
    assert_eq!(report.fade_points.fade_outs, vec![4300]);
    assert_eq!(report.starting_gain, StartingGain::Loud);
}

#[test]
fn test_min_silence_longer_than_track_is_config_error() {
    let config = DuckingConfig {
        min_silence_ms: 60_000,
        ..unpadded()
    };
    let result = DuckingPipeline::new(config)
        .unwrap()
        .process(&speech_with_gaps(5000, &[]), &music(5000));

    assert!(matches!(result, Err(DuckError::Config(_))));
}

#[test]
fn test_tail_fade_longer_than_mix_is_config_error() {
    let config = DuckingConfig {
        tail_fade_ms: 20_000,
        ..unpadded()
    };
    let result = DuckingPipeline::new(config)
        .unwrap()
        .process(&speech_with_gaps(5000, &[]), &music(5000));

    assert!(matches!(result, Err(DuckError::Config(_))));
}

#[test]
fn test_click_inside_silence_needs_burst_filter() {
    // 60 ms click in the middle of a 3 s gap
    let speech = speech_with_gaps(10_000, &[(2000, 3500), (3560, 5000)]);

    let binary = DuckingPipeline::new(unpadded())
        .unwrap()
        .process(&speech, &music(10_000))
        .unwrap()
        .report;
    assert!(binary.intervals.is_empty());

    let config = DuckingConfig {
        strategy: LoudnessStrategy::continuous_integral(),
        ..unpadded()
    };
    let filtered = DuckingPipeline::new(config)
        .unwrap()
        .process(&speech, &music(10_000))
        .unwrap()
        .report;
    assert_eq!(filtered.intervals.len(), 1);
    assert!(filtered.intervals[&1].start_ms.abs_diff(2000) <= 40);
    assert!(filtered.intervals[&1].end_ms.abs_diff(5000) <= 60);
}

#[test]
fn test_run_writes_mix_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let speech_path = dir.path().join("speech.wav");
    let music_path = dir.path().join("bgm.wav");
    write_wav_fixture(&speech_path, &speech_with_gaps(6000, &[(1000, 4000)]), 1);
    write_wav_fixture(&music_path, &music(20_000), 2);

    let config = DuckingConfig {
        speech_path,
        music_path,
        output_path: dir.path().join("final.wav"),
        report_path: Some(dir.path().join("report.json")),
        ..DuckingConfig::default()
    };
    let report = DuckingPipeline::new(config.clone()).unwrap().run().unwrap();

    let mix = read_wav_file(&config.output_path).unwrap();
    assert_eq!(mix.sample_rate(), RATE);
    assert_eq!(mix.channels(), 2);
    assert_eq!(mix.duration_ms(), 13_000);
    assert_eq!(report.padded_duration_ms, 13_000);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(json["run_id"], report.run_id.to_string());
    assert_eq!(json["intervals"].as_object().map(|m| m.len()), Some(report.intervals.len()));
}

#[test]
fn test_failed_run_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let speech_path = dir.path().join("speech.wav");
    write_wav_fixture(&speech_path, &speech_with_gaps(3000, &[]), 1);

    let config = DuckingConfig {
        speech_path,
        music_path: dir.path().join("missing.wav"),
        output_path: dir.path().join("final.wav"),
        ..DuckingConfig::default()
    };
    let result = DuckingPipeline::new(config.clone()).unwrap().run();

    assert!(matches!(result, Err(DuckError::Io { .. })));
    assert!(!config.output_path.exists());

    // a rejected mix must not leave a partial file either
    let music_path = dir.path().join("bgm.wav");
    write_wav_fixture(&music_path, &music(3000), 1);
    let config = DuckingConfig {
        music_path,
        tail_fade_ms: 60_000,
        ..config
    };
    assert!(DuckingPipeline::new(config.clone()).unwrap().run().is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}
