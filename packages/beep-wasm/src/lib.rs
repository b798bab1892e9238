use beep::playback::{AudioDevice, Beeper, Schedule, Voice, Waveform};
use beep::{BeepError, CompiledSequence, Diagnostic};
use log::debug;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

#[derive(Serialize)]
struct PlayError {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

fn to_js_error(e: BeepError) -> JsValue {
    let diagnostics = match &e {
        BeepError::Rejected(diagnostics) => diagnostics.clone(),
        _ => Vec::new(),
    };
    let error = PlayError {
        message: e.to_string(),
        diagnostics,
    };
    JsValue::from_str(&serde_json::to_string(&error).unwrap_or_else(|_| e.to_string()))
}

fn unavailable(e: JsValue) -> BeepError {
    BeepError::DeviceUnavailable(format!("{e:?}"))
}

/// The browser's audio context.
struct WebAudioDevice {
    context: AudioContext,
}

impl WebAudioDevice {
    fn new() -> beep::Result<Self> {
        Ok(Self {
            context: AudioContext::new().map_err(unavailable)?,
        })
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

impl AudioDevice for WebAudioDevice {
    type Voice = WebAudioVoice;

    fn now(&self) -> f64 {
        self.context.current_time()
    }

    fn open_voice(&self, waveform: Waveform, gain: f64, start: f64) -> beep::Result<WebAudioVoice> {
        let oscillator = self.context.create_oscillator().map_err(unavailable)?;
        let gain_node = self.context.create_gain().map_err(unavailable)?;

        oscillator.set_type(oscillator_type(waveform));
        gain_node.gain().set_value(gain as f32);
        oscillator
            .connect_with_audio_node(&gain_node)
            .map_err(unavailable)?;
        gain_node
            .connect_with_audio_node(&self.context.destination())
            .map_err(unavailable)?;
        oscillator.start_with_when(start).map_err(unavailable)?;

        Ok(WebAudioVoice {
            oscillator,
            gain: gain_node,
        })
    }
}

struct WebAudioVoice {
    oscillator: OscillatorNode,
    gain: GainNode,
}

impl Voice for WebAudioVoice {
    fn set_frequency_at(&mut self, frequency: f64, time: f64) {
        let param = self.oscillator.frequency();
        if let Err(e) = param.set_value_at_time(frequency as f32, time) {
            debug!("frequency {frequency} at {time}s rejected: {e:?}");
        }
    }

    fn set_gain_at(&mut self, gain: f64, time: f64) {
        if let Err(e) = self.gain.gain().set_value_at_time(gain as f32, time) {
            debug!("gain {gain} at {time}s rejected: {e:?}");
        }
    }

    fn stop_at(self, time: f64) {
        if let Err(e) = self.oscillator.stop_with_when(time) {
            debug!("stop at {time}s rejected: {e:?}");
        }
    }
}

thread_local! {
    static BEEPER: Beeper<WebAudioDevice> = Beeper::new(WebAudioDevice::new);
}

fn scheduled(result: beep::Result<Schedule>) -> Result<JsValue, JsValue> {
    let schedule = result.map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&schedule).map_err(JsValue::from)
}

/// Create the audio context and play the warm-up tone.
/// Call this from a user gesture handler.
#[wasm_bindgen]
pub fn init() -> Result<(), JsValue> {
    BEEPER.with(|beeper| beeper.init()).map_err(to_js_error)
}

/// Play notation text, or an event list returned by `compile`
#[wasm_bindgen]
pub fn play(
    input: JsValue,
    volume: Option<f64>,
    waveform: Option<String>,
) -> Result<JsValue, JsValue> {
    let waveform = match waveform {
        Some(name) => name
            .parse::<Waveform>()
            .map_err(|_| JsValue::from_str(&format!("Unknown waveform '{name}'")))?,
        None => Waveform::default(),
    };
    let volume = volume.unwrap_or(beep::playback::DEFAULT_VOLUME);

    BEEPER.with(|beeper| match input.as_string() {
        Some(text) => scheduled(beeper.play_with(text, volume, waveform)),
        None => {
            let sequence: CompiledSequence = serde_wasm_bindgen::from_value(input)?;
            scheduled(beeper.play_with(sequence, volume, waveform))
        }
    })
}

/// Sound a frequency for a number of seconds
#[wasm_bindgen]
pub fn tone(frequency: f64, seconds: Option<f64>, volume: Option<f64>) -> Result<JsValue, JsValue> {
    let seconds = seconds.unwrap_or(1.0);
    let volume = volume.unwrap_or(beep::playback::DEFAULT_VOLUME);
    BEEPER.with(|beeper| scheduled(beeper.tone(frequency, seconds, volume)))
}

#[wasm_bindgen]
pub fn beep() -> Result<JsValue, JsValue> {
    BEEPER.with(|beeper| scheduled(beeper.beep()))
}

/// Compile notation to an event list that `play` accepts
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&beep::compile(source)).map_err(JsValue::from)
}

/// Lint notation and return diagnostics as a JSON array
#[wasm_bindgen]
pub fn lint(source: &str) -> String {
    serde_json::to_string(&beep::lint(source)).unwrap_or_else(|_| "[]".to_string())
}
