//! Audio system using Web Audio API
//!
//! Sound effects are procedurally generated, no files needed. Background
//! music streams from the page's `<audio id="backgroundMusic">` element.
//! Playback failures (autoplay policy, missing element) are logged and
//! otherwise ignored.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SoundCue;

/// DOM id of the music element
const MUSIC_ELEMENT_ID: &str = "backgroundMusic";

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    /// Set asynchronously once the browser accepts `play()`
    music_playing: Rc<Cell<bool>>,
    sfx_volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - sound effects disabled");
        }

        let music = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(MUSIC_ELEMENT_ID))
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
        if music.is_none() {
            log::warn!("No #{MUSIC_ELEMENT_ID} element - music disabled");
        }

        let manager = Self {
            ctx,
            music,
            music_playing: Rc::new(Cell::new(false)),
            sfx_volume: settings.sfx_gain(),
        };
        manager.set_music_gain(settings.music_gain());
        manager
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Effects gain in 0.0..=1.0
    pub fn set_sfx_gain(&mut self, gain: f32) {
        self.sfx_volume = gain.clamp(0.0, 1.0);
    }

    /// Music gain in 0.0..=1.0
    pub fn set_music_gain(&self, gain: f32) {
        if let Some(music) = &self.music {
            music.set_volume(f64::from(gain.clamp(0.0, 1.0)));
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing.get()
    }

    /// Start the music; the browser may refuse until the user interacts
    pub fn start_music(&self) {
        if self.music_playing.get() {
            return;
        }
        let Some(music) = &self.music else { return };
        music.set_loop(true);

        let promise = match music.play() {
            Ok(promise) => promise,
            Err(e) => {
                log::warn!("Music play failed: {e:?}");
                return;
            }
        };
        let playing = Rc::clone(&self.music_playing);
        let element = music.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(promise).await {
                // Stopped again before the browser answered
                Ok(_) => playing.set(!element.paused()),
                Err(e) => log::info!("Music autoplay blocked by browser: {e:?}"),
            }
        });
    }

    pub fn stop_music(&self) {
        if let Some(music) = &self.music {
            if music.pause().is_err() {
                log::warn!("Music pause failed");
            }
        }
        self.music_playing.set(false);
    }


    /// Play a sound effect
    pub fn play(&self, cue: SoundCue) {
        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Collision => self.play_collision(ctx, vol),
            SoundCue::FuelPickup => self.play_fuel_pickup(ctx, vol),
            SoundCue::CoinPickup => self.play_coin_pickup(ctx, vol),
            SoundCue::MenuClick => self.play_menu_click(ctx, vol),
        }
    }

    // === Sound generators ===

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

    /// Asteroid impact - crunchy boom
    fn play_collision(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.45)
                .ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        // Rock crunch
        if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency().set_value_at_time(300.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(700.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(150.0, t + 0.09).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Fuel canister - rising bubbly chime
    fn play_fuel_pickup(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [500.0, 700.0, 900.0, 1200.0].iter().enumerate() {
            let delay = i as f64 * 0.05;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.22).ok();
            }
        }
    }

    /// Coin - two-tone ding
    fn play_coin_pickup(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [988.0, 1319.0].iter().enumerate() {
            let delay = i as f64 * 0.07;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Menu click - short blip
    fn play_menu_click(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 660.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.05)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.06).ok();
    }
}
