//! Audio cues
//!
//! Sound effects are procedural tone recipes (no asset files). The simulation
//! emits [`GameEvent`]s; the host maps them to [`SoundEffect`]s and hands them
//! to an [`AudioSink`]. On the web the sink drives Web Audio oscillators.

use crate::sim::{GameEvent, PowerUpKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    /// Ingredient picked up
    Collect,
    /// Letter picked up - chime
    LetterCollect,
    /// Target word completed - fanfare
    LevelUp,
    Crash,
    /// Oil slick - slide whistle
    Slip,
    /// Obstacle smashed or shield hit
    Clank,
    FuryStart,
    PowerUp(PowerUpKind),
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::CollectItem(_) => Some(SoundEffect::Collect),
            GameEvent::CollectLetter(_) => Some(SoundEffect::LetterCollect),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::FuryStart => Some(SoundEffect::FuryStart),
            GameEvent::PowerUpAcquired(kind) => Some(SoundEffect::PowerUp(*kind)),
            GameEvent::Slip => Some(SoundEffect::Slip),
            GameEvent::Clank | GameEvent::ShieldBroken | GameEvent::Smash => {
                Some(SoundEffect::Clank)
            }
            GameEvent::Crash => Some(SoundEffect::Crash),
            GameEvent::RunStarted
            | GameEvent::FuryEnd
            | GameEvent::PowerUpExpired(_)
            | GameEvent::SlipEnd
            | GameEvent::RunEnded { .. } => None,
        }
    }

    /// Tone recipe for this effect
    pub fn tones(&self) -> Vec<Tone> {
        match self {
            SoundEffect::Jump => vec![Tone::new(Waveform::Sine, 400.0, 0.2, 0.3)],
            SoundEffect::Collect => vec![
                Tone::new(Waveform::Sine, 800.0, 0.1, 0.1).sweep(1200.0, 0.0, 0.1, Ramp::Exponential),
            ],
            SoundEffect::LetterCollect => vec![
                Tone::new(Waveform::Sine, 1000.0, 0.2, 0.5)
                    .sweep(2000.0, 0.0, 0.2, Ramp::Linear)
                    .fade(Ramp::Linear),
            ],
            SoundEffect::LevelUp => [440.0, 554.0, 659.0, 880.0]
                .iter()
                .enumerate()
                .map(|(i, &freq)| Tone::new(Waveform::Square, freq, 0.1, 0.5).delayed(i as f32 * 0.1))
                .collect(),
            SoundEffect::Crash => vec![Tone::new(Waveform::Sawtooth, 100.0, 0.3, 0.5)],
            SoundEffect::Slip => vec![
                Tone::new(Waveform::Triangle, 600.0, 0.2, 0.5)
                    .sweep(300.0, 0.0, 0.5, Ramp::Linear)
                    .fade(Ramp::Linear),
            ],
            SoundEffect::Clank => vec![Tone::new(Waveform::Square, 800.0, 0.1, 0.1)],
            SoundEffect::FuryStart => vec![
                Tone::new(Waveform::Square, 200.0, 0.2, 0.4)
                    .sweep(600.0, 0.0, 0.4, Ramp::Linear)
                    .fade(Ramp::Linear),
            ],
            SoundEffect::PowerUp(kind) => {
                let tone = match kind {
                    PowerUpKind::Shield => Tone::new(Waveform::Sine, 200.0, 0.15, 0.6)
                        .sweep(100.0, 0.0, 0.5, Ramp::Linear),
                    PowerUpKind::Magnet => Tone::new(Waveform::Triangle, 300.0, 0.15, 0.6)
                        .sweep(600.0, 0.1, 0.5, Ramp::Linear),
                    PowerUpKind::Turbo => Tone::new(Waveform::Sawtooth, 100.0, 0.15, 0.6)
                        .sweep(800.0, 0.0, 0.5, Ramp::Exponential),
                };
                vec![tone]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
}

/// Frequency glide within a tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub to_hz: f32,
    /// Seconds after tone start at which the glide begins
    pub from: f32,
    /// Seconds after tone start at which the target is reached
    pub until: f32,
    pub ramp: Ramp,
}

/// A single oscillator voice with a decaying gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub freq_hz: f32,
    /// Peak gain before master volume
    pub gain: f32,
    /// Seconds
    pub duration: f32,
    /// Start offset from the cue, seconds
    pub delay: f32,
    pub sweep: Option<Sweep>,
    pub fade: Ramp,
}

impl Tone {
    pub fn new(waveform: Waveform, freq_hz: f32, gain: f32, duration: f32) -> Self {
        Self {
            waveform,
            freq_hz,
            gain,
            duration,
            delay: 0.0,
            sweep: None,
            fade: Ramp::Exponential,
        }
    }

    fn sweep(mut self, to_hz: f32, from: f32, until: f32, ramp: Ramp) -> Self {
        self.sweep = Some(Sweep {
            to_hz,
            from,
            until,
            ramp,
        });
        self
    }

    fn fade(mut self, ramp: Ramp) -> Self {
        self.fade = ramp;
        self
    }

    fn delayed(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Time at which the tone has fully stopped
    pub fn end(&self) -> f32 {
        self.delay + self.duration
    }
}

/// Anything that can voice sound cues
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Update gain settings; `volume` is already master x sfx
    fn set_volume(&mut self, _volume: f32, _muted: bool) {}
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Logs cues at debug level and remembers them (headless runs, tests)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: Vec<SoundEffect>,
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("sfx {:?}", effect);
        self.played.push(effect);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Ramp, SoundEffect, Tone, Waveform};

    /// Gain floor for exponential fades (exponential ramps cannot reach zero)
    const FADE_FLOOR: f32 = 0.01;

    /// Web Audio API backed sink
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
            }
        }

        fn create_osc(
            ctx: &AudioContext,
            waveform: Waveform,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            });
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn voice(&self, ctx: &AudioContext, tone: &Tone, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, tone.waveform) else {
                return;
            };
            let now = ctx.current_time();
            let t = now + tone.delay as f64;
            let end = now + tone.end() as f64;

            osc.frequency().set_value_at_time(tone.freq_hz, t).ok();
            if let Some(sweep) = tone.sweep {
                let from = t + sweep.from as f64;
                let until = t + sweep.until as f64;
                osc.frequency().set_value_at_time(tone.freq_hz, from).ok();
                let _ = match sweep.ramp {
                    Ramp::Linear => osc.frequency().linear_ramp_to_value_at_time(sweep.to_hz, until),
                    Ramp::Exponential => {
                        osc.frequency().exponential_ramp_to_value_at_time(sweep.to_hz, until)
                    }
                };
            }

            gain.gain().set_value_at_time(tone.gain * vol, t).ok();
            let _ = match tone.fade {
                Ramp::Linear => gain.gain().linear_ramp_to_value_at_time(0.0, end),
                Ramp::Exponential => gain.gain().exponential_ramp_to_value_at_time(FADE_FLOOR, end),
            };

            osc.start_with_when(t).ok();
            osc.stop_with_when(end).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) {
            let vol = if self.muted { 0.0 } else { self.volume };
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start contexts suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in effect.tones() {
                self.voice(ctx, &tone, vol);
            }
        }

        fn set_volume(&mut self, volume: f32, muted: bool) {
            self.volume = volume.clamp(0.0, 1.0);
            self.muted = muted;
            if let Some(ctx) = &self.ctx {
                let _ = if muted { ctx.suspend() } else { ctx.resume() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::IngredientKind;

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::from_event(&GameEvent::Jump), Some(SoundEffect::Jump));
        assert_eq!(
            SoundEffect::from_event(&GameEvent::CollectItem(IngredientKind::Steak)),
            Some(SoundEffect::Collect)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::PowerUpAcquired(PowerUpKind::Turbo)),
            Some(SoundEffect::PowerUp(PowerUpKind::Turbo))
        );
        assert_eq!(SoundEffect::from_event(&GameEvent::ShieldBroken), Some(SoundEffect::Clank));
        assert_eq!(SoundEffect::from_event(&GameEvent::RunEnded { final_score: 3 }), None);
        assert_eq!(SoundEffect::from_event(&GameEvent::FuryEnd), None);
    }

    #[test]
    fn test_simple_tones() {
        assert_eq!(
            SoundEffect::Jump.tones(),
            vec![Tone::new(Waveform::Sine, 400.0, 0.2, 0.3)]
        );
        assert_eq!(
            SoundEffect::Crash.tones(),
            vec![Tone::new(Waveform::Sawtooth, 100.0, 0.3, 0.5)]
        );
    }

    #[test]
    fn test_level_up_fanfare_is_staggered() {
        let tones = SoundEffect::LevelUp.tones();
        assert_eq!(tones.len(), 4);
        for pair in tones.windows(2) {
            assert!(pair[1].delay > pair[0].delay);
            assert!(pair[1].freq_hz > pair[0].freq_hz);
        }
    }

    #[test]
    fn test_sweeps_stay_inside_tone() {
        let mut effects = vec![
            SoundEffect::Jump,
            SoundEffect::Collect,
            SoundEffect::LetterCollect,
            SoundEffect::LevelUp,
            SoundEffect::Crash,
            SoundEffect::Slip,
            SoundEffect::Clank,
            SoundEffect::FuryStart,
        ];
        effects.extend(PowerUpKind::ALL.iter().map(|k| SoundEffect::PowerUp(*k)));
        for effect in effects {
            for tone in effect.tones() {
                assert!(tone.gain > 0.0 && tone.gain <= 1.0, "{effect:?}");
                if let Some(sweep) = tone.sweep {
                    assert!(sweep.from <= sweep.until, "{effect:?}");
                    assert!(sweep.until <= tone.duration, "{effect:?}");
                }
            }
        }
    }

    #[test]
    fn test_log_audio_records() {
        let mut sink = LogAudio::default();
        sink.play(SoundEffect::Slip);
        sink.play(SoundEffect::Clank);
        assert_eq!(sink.played, vec![SoundEffect::Slip, SoundEffect::Clank]);
    }
}
