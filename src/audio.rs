//! Audio cues
//!
//! Short procedurally generated tones, no external files. Playback is
//! advisory: a missing or failing audio context is swallowed and never
//! reaches the simulation.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Character left the ground
    Jump,
    /// Run ended on an obstacle
    Hit,
    /// Obstacle passed
    Pass,
    /// Level distance reached
    LevelClear,
    /// Rhythm mode pulse
    Beat,
    /// Rhythm mode downbeat
    AccentBeat,
}

impl SoundEffect {
    /// Cue for a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Collided { .. } => Some(SoundEffect::Hit),
            GameEvent::ObstaclePassed { .. } => Some(SoundEffect::Pass),
            GameEvent::LevelCleared => Some(SoundEffect::LevelClear),
            GameEvent::Beat { accent: true } => Some(SoundEffect::AccentBeat),
            GameEvent::Beat { accent: false } => Some(SoundEffect::Beat),
        }
    }
}

/// Sink for sound cues
pub trait AudioCue {
    fn play(&self, effect: SoundEffect);

    /// Unlock playback after a user gesture
    fn resume(&self) {}

    /// Effective output volume (0.0 - 1.0)
    fn set_volume(&mut self, _volume: f32) {}

    fn play_jump(&self) {
        self.play(SoundEffect::Jump);
    }

    fn play_hit(&self) {
        self.play(SoundEffect::Hit);
    }

    fn play_beat(&self, accent: bool) {
        self.play(if accent {
            SoundEffect::AccentBeat
        } else {
            SoundEffect::Beat
        });
    }
}

/// No-op sink for native builds and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioCue for SilentAudio {
    fn play(&self, effect: SoundEffect) {
        log::trace!("Silent cue {effect:?}");
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, SoundEffect};

    /// Web Audio oscillator cues
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
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
            Self { ctx, volume: 0.8 }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single decaying tone
        fn tone(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            gain_level: f32,
            delay: f64,
            duration: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(gain_level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration + 0.02).ok();
        }

        /// Jump - quick upward chirp
        fn play_jump_chirp(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(400.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(800.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }

        /// Hit - low sawtooth thud
        fn play_hit_thud(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(150.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        /// Level clear - rising fanfare
        fn play_fanfare(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
                self.tone(ctx, *freq, OscillatorType::Triangle, vol * 0.3, i as f64 * 0.1, 0.4);
            }
        }
    }

    impl AudioCue for WebAudio {
        fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Jump => self.play_jump_chirp(ctx, vol),
                SoundEffect::Hit => self.play_hit_thud(ctx, vol),
                SoundEffect::Pass => {
                    self.tone(ctx, 880.0, OscillatorType::Sine, vol * 0.15, 0.0, 0.08)
                }
                SoundEffect::LevelClear => self.play_fanfare(ctx, vol),
                SoundEffect::Beat => {
                    self.tone(ctx, 220.0, OscillatorType::Square, vol * 0.1, 0.0, 0.05)
                }
                SoundEffect::AccentBeat => {
                    self.tone(ctx, 440.0, OscillatorType::Square, vol * 0.18, 0.0, 0.08)
                }
            }
        }

        fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        played: RefCell<Vec<SoundEffect>>,
    }

    impl AudioCue for Recorder {
        fn play(&self, effect: SoundEffect) {
            self.played.borrow_mut().push(effect);
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Collided { id: 3 }),
            Some(SoundEffect::Hit)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Beat { accent: true }),
            Some(SoundEffect::AccentBeat)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Jumped),
            Some(SoundEffect::Jump)
        );
    }

    #[test]
    fn test_named_cues_route_through_play() {
        let audio = Recorder::default();
        audio.play_jump();
        audio.play_hit();
        audio.play_beat(false);
        audio.play_beat(true);
        assert_eq!(
            *audio.played.borrow(),
            vec![
                SoundEffect::Jump,
                SoundEffect::Hit,
                SoundEffect::Beat,
                SoundEffect::AccentBeat
            ]
        );
    }

    #[test]
    fn test_silent_audio_is_inert() {
        let mut audio = SilentAudio;
        audio.set_volume(1.0);
        audio.resume();
        audio.play_hit();
    }
}
