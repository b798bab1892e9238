use super::*;
use crate::error::BeepError;
use crate::settings::Settings;
use crate::{compile, NoteTable, PlaybackEvent};
use float_cmp::approx_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn offline_beeper() -> Beeper<OfflineDevice> {
    Beeper::new(|| Ok(OfflineDevice::new()))
}

fn play_offline(text: &str) -> (Schedule, VoiceTimeline) {
    let device = OfflineDevice::new();
    let sequence = compile(text);
    let plan = schedule(&device, sequence.events(), &PlaybackOptions::default()).unwrap();
    let voices = device.voices();
    assert_eq!(voices.len(), 1);
    (plan, voices[0].clone())
}

#[test]
fn test_beats_to_seconds() {
    assert_eq!(beats_to_seconds(1.0, 240.0), 1.0);
    assert_eq!(beats_to_seconds(0.5, 120.0), 1.0);
    assert_eq!(beats_to_seconds(0.25, 60.0), 1.0);
}

#[test]
fn test_volume_to_gain() {
    assert_eq!(volume_to_gain(4.0), 1.0);
    assert_eq!(volume_to_gain(0.5), 0.125);
    assert_eq!(volume_to_gain(0.0), 0.0);
}

#[test]
fn test_schedule_basic_timing() {
    let (plan, voice) = play_offline("c d e");
    assert_eq!(plan.start, 0.0);
    assert_eq!(plan.end, 3.0);
    assert_eq!(plan.steps, 3);

    let times: Vec<f64> = voice.frequency.iter().map(|a| a.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
    assert_eq!(voice.stop, 3.0);
}

#[test]
fn test_schedule_frequencies_and_gain() {
    let (_, voice) = play_offline("a c5");
    let table = NoteTable::global();
    assert_eq!(voice.frequency[0].value, 440.0);
    assert_eq!(voice.frequency[1].value, table.get("c5").unwrap());
    assert!(voice.gain.iter().all(|a| a.value == 0.125));
    assert_eq!(voice.initial_gain, 0.125);
}

#[test]
fn test_schedule_rest_is_silent() {
    let (_, voice) = play_offline("c - d");
    assert_eq!(voice.frequency[1].value, 0.0);
    assert_eq!(voice.gain[1].value, 0.0);
    assert_eq!(voice.gain[1].time, 1.0);
    assert_eq!(voice.frequency_at(1.5), 0.0);
    assert_eq!(voice.gain_at(2.5), 0.125);
}

#[test]
fn test_schedule_volume_changes_do_not_advance_clock() {
    let (plan, voice) = play_offline("c vol=2 d vol=0 e");
    assert_eq!(plan.end, 3.0);
    let gains: Vec<f64> = voice.gain.iter().map(|a| a.value).collect();
    assert_eq!(gains, vec![0.125, 0.5, 0.0]);
    let times: Vec<f64> = voice.gain.iter().map(|a| a.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_schedule_tempo_changes_pace_later_events() {
    let (plan, voice) = play_offline("c bpm=120 c bpm=480 c");
    let times: Vec<f64> = voice.frequency.iter().map(|a| a.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 3.0]);
    assert_eq!(plan.end, 3.5);
}

#[test]
fn test_schedule_gap_timing() {
    let (plan, voice) = play_offline("gap=1/4 c d");
    let times: Vec<f64> = voice.frequency.iter().map(|a| a.time).collect();
    assert_eq!(times, vec![0.0, 0.75, 1.0, 1.75]);
    assert_eq!(plan.end, 2.0);
    assert_eq!(plan.steps, 4);
}

#[test]
fn test_schedule_empty_sequence_opens_and_stops() {
    let device = OfflineDevice::starting_at(5.0);
    let plan = schedule(&device, compile("").events(), &PlaybackOptions::default()).unwrap();
    assert_eq!(plan.start, 5.0);
    assert_eq!(plan.end, 5.0);
    assert_eq!(plan.steps, 0);

    let voices = device.voices();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].start, voices[0].stop);
    assert!(voices[0].frequency.is_empty());
}

#[test]
fn test_schedule_starts_at_device_time() {
    let device = OfflineDevice::starting_at(2.5);
    let plan = schedule(&device, compile("1/2 c").events(), &PlaybackOptions::default()).unwrap();
    assert_eq!(plan.start, 2.5);
    assert_eq!(plan.end, 3.0);
}

#[test]
fn test_schedule_ignores_zero_tempo() {
    let events = [
        PlaybackEvent::TempoSet { value: 0.0 },
        PlaybackEvent::Tone {
            frequency: 440.0,
            duration: 1.0,
        },
    ];
    let device = OfflineDevice::new();
    let plan = schedule(&device, &events, &PlaybackOptions::default()).unwrap();
    assert_eq!(plan.end, 1.0);
}

#[test]
fn test_schedule_replaces_unusable_starting_tempo() {
    for tempo in [0.0, -120.0, f64::INFINITY, f64::NAN] {
        let device = OfflineDevice::new();
        let options = PlaybackOptions {
            tempo,
            ..PlaybackOptions::default()
        };
        let plan = schedule(&device, compile("c d").events(), &options).unwrap();
        assert_eq!(plan.start, 0.0, "{tempo}");
        assert_eq!(plan.end, 2.0, "{tempo}");
    }
}

#[test]
fn test_schedule_settings_tempo_zero() {
    let settings = Settings::from_yaml("tempo: 0").unwrap();
    let device = OfflineDevice::new();
    let options = PlaybackOptions::from(&settings);
    let plan = schedule(&device, compile("c").events(), &options).unwrap();
    assert_eq!(plan.end, 1.0);
    assert_eq!(device.render(100).unwrap().len(), 100);
}

#[test]
fn test_schedule_zero_frequency_tone_is_silent() {
    let events = [PlaybackEvent::Tone {
        frequency: 0.0,
        duration: 1.0,
    }];
    let device = OfflineDevice::new();
    schedule(&device, &events, &PlaybackOptions::default()).unwrap();
    let voice = &device.voices()[0];
    assert_eq!(voice.gain[0].value, 0.0);
}

#[test]
fn test_schedule_uses_options() {
    let device = OfflineDevice::new();
    let options = PlaybackOptions {
        volume: 2.0,
        waveform: Waveform::Sine,
        tempo: 60.0,
    };
    let plan = schedule(&device, compile("c").events(), &options).unwrap();
    assert_eq!(plan.end, 4.0);
    let voice = &device.voices()[0];
    assert_eq!(voice.waveform, Waveform::Sine);
    assert_eq!(voice.gain[0].value, 0.5);
}

#[test]
fn test_overlapping_calls_get_separate_voices() {
    let device = OfflineDevice::new();
    let options = PlaybackOptions::default();
    schedule(&device, compile("c e").events(), &options).unwrap();
    device.advance(0.5);
    schedule(&device, compile("g").events(), &options).unwrap();

    let voices = device.voices();
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[1].start, 0.5);
    assert!(voices[0].is_sounding(1.0) && voices[1].is_sounding(1.0));
}

#[test]
fn test_render_length_and_silence() {
    let device = OfflineDevice::new();
    schedule(&device, compile("1/2 c -").events(), &PlaybackOptions::default()).unwrap();

    let samples = device.render(1000).unwrap();
    assert_eq!(samples.len(), 1000);
    assert!(samples[..500].iter().any(|s| s.abs() > 0.1));
    assert!(samples[500..].iter().all(|s| *s == 0.0));
    assert!(samples.iter().all(|s| s.abs() <= 0.125 + f32::EPSILON));
}

#[test]
fn test_render_rejects_endless_sequence() {
    let device = OfflineDevice::new();
    let events = [PlaybackEvent::Tone {
        frequency: 440.0,
        duration: f64::INFINITY,
    }];
    schedule(&device, &events, &PlaybackOptions::default()).unwrap();
    assert!(matches!(
        device.render(44_100),
        Err(BeepError::RenderTooLong { .. })
    ));
}

#[test]
fn test_render_rejects_sequence_over_budget() {
    let device = OfflineDevice::new();
    schedule(&device, compile("99999999 c").events(), &PlaybackOptions::default()).unwrap();
    let result = device.render(44_100);
    assert!(
        matches!(result, Err(BeepError::RenderTooLong { seconds, limit })
            if seconds == 99_999_999.0 && limit == MAX_RENDER_SECONDS)
    );
}

#[test]
fn test_overflowing_duration_is_dropped() {
    let text = format!("{} c", "9".repeat(400));
    let device = OfflineDevice::new();
    let sequence = compile(text.as_str());
    let plan = schedule(&device, sequence.events(), &PlaybackOptions::default()).unwrap();
    assert_eq!(plan.end, 1.0);
    assert_eq!(device.render(1000).unwrap().len(), 1000);
}

#[test]
fn test_render_empty_device() {
    assert!(OfflineDevice::new().render(44_100).unwrap().is_empty());
}

#[test]
fn test_beeper_is_lazy() {
    let beeper = offline_beeper();
    assert!(!beeper.is_initialized());
    beeper.play("c").unwrap();
    assert!(beeper.is_initialized());
}

#[test]
fn test_beeper_init_plays_warm_up_once() {
    let beeper = offline_beeper();
    beeper.init().unwrap();
    beeper.init().unwrap();

    let voices = beeper.device().unwrap().voices();
    assert_eq!(voices.len(), 1);
    let warm_up = &voices[0];
    assert_eq!(warm_up.frequency[0].value, WARM_UP_FREQUENCY);
    assert_eq!(warm_up.initial_gain, volume_to_gain(WARM_UP_VOLUME));
    assert!(approx_eq!(f64, warm_up.seconds(), WARM_UP_SECONDS, ulps = 4));
}

#[test]
fn test_beeper_factory_runs_once_across_threads() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let beeper = Arc::new(Beeper::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(OfflineDevice::new())
    }));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let beeper = Arc::clone(&beeper);
            std::thread::spawn(move || beeper.play("c d").unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(built.load(Ordering::SeqCst), 1);
    // eight plays plus the warm-up
    assert_eq!(beeper.device().unwrap().voices().len(), 9);
}

#[test]
fn test_beeper_device_unavailable() {
    let beeper: Beeper<OfflineDevice> =
        Beeper::new(|| Err(BeepError::DeviceUnavailable("no output".to_string())));
    let result = beeper.play("c");
    assert!(matches!(result, Err(BeepError::DeviceUnavailable(_))));
    assert!(!beeper.is_initialized());
}

#[test]
fn test_beeper_wraps_other_factory_errors() {
    let beeper: Beeper<OfflineDevice> = Beeper::new(|| {
        Err(BeepError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )))
    });
    assert!(matches!(beeper.init(), Err(BeepError::DeviceUnavailable(_))));
}

#[test]
fn test_beeper_plays_compiled_sequence() {
    let beeper = offline_beeper();
    let jingle = compile("1/4 e e 1/2 e");
    let first = beeper.play(&jingle).unwrap();
    let second = beeper.play(jingle).unwrap();
    assert_eq!(first.seconds(), 1.0);
    assert_eq!(second.seconds(), 1.0);
}

#[test]
fn test_beeper_empty_input() {
    let beeper = offline_beeper();
    let plan = beeper.play("").unwrap();
    assert_eq!(plan.start, plan.end);
}

#[test]
fn test_beeper_tone_is_in_seconds() {
    let settings = Settings {
        tempo: 120.0,
        ..Settings::default()
    };
    let beeper = offline_beeper().with_settings(settings);

    let tone = beeper.tone(261.626, 1.5, 1.0).unwrap();
    assert_eq!(tone.seconds(), 1.5);

    // notation follows the configured tempo
    let notes = beeper.play("c").unwrap();
    assert_eq!(notes.seconds(), 2.0);

    let voices = beeper.device().unwrap().voices();
    assert_eq!(voices[1].frequency[0].value, 261.626);
    assert_eq!(voices[1].gain[0].value, 0.25);
}

#[test]
fn test_beeper_default_beep() {
    let beeper = offline_beeper();
    let plan = beeper.beep().unwrap();
    assert_eq!(plan.seconds(), 1.0);
    let voices = beeper.device().unwrap().voices();
    assert_eq!(voices[1].frequency[0].value, DEFAULT_BEEP_FREQUENCY);
    assert_eq!(voices[1].waveform, Waveform::Square);
}

#[test]
fn test_beeper_play_with_waveform() {
    let beeper = offline_beeper();
    beeper.play_with("c", 4.0, Waveform::Triangle).unwrap();
    let voices = beeper.device().unwrap().voices();
    assert_eq!(voices[1].waveform, Waveform::Triangle);
    assert_eq!(voices[1].gain[0].value, 1.0);
}

#[test]
fn test_beeper_strict_still_plays() {
    let settings = Settings {
        strict: true,
        ..Settings::default()
    };
    let beeper = offline_beeper().with_settings(settings);
    let plan = beeper.play("c nonsense d").unwrap();
    assert_eq!(plan.steps, 2);
}
