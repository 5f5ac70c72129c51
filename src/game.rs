//! Session controller
//!
//! Owns the active run and everything around it: which screen is showing,
//! the cleared-level set, audio cues, and input routing. The host drives it
//! once per display frame with [`Session::frame`]; a frame carrying a stale
//! run generation is ignored, so a torn-down loop can never tick a newer run.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioCue, SoundEffect};
use crate::persistence::{ProgressStore, is_playable};
use crate::platform::InputRouter;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameMode, LEVEL_COUNT, LEVELS, RunPhase, SimulationState, clue_for, tick,
};

/// Which screen the host should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
    LevelComplete,
    GameOver,
}

/// Everything the menu needs to render itself
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub state: AppState,
    pub current_level: u32,
    /// Score of the most recent run
    pub score: u32,
    /// Cleared levels, ascending
    pub unlocked_levels: Vec<u32>,
    /// One clue per cleared level, in level order
    pub clues: Vec<&'static str>,
}

/// Per-frame HUD data
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub level_name: &'static str,
    pub distance: u32,
    pub level_distance: u32,
    pub score: u32,
    /// 0..=1
    pub progress: f32,
    pub speed: f32,
    pub phase: RunPhase,
}

/// Why a run could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// Previous level not cleared yet
    Locked(u32),
    /// No such level
    UnknownLevel(u32),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::Locked(level) => {
                write!(
                    f,
                    "level {level} is locked until level {} is cleared",
                    level.saturating_sub(1)
                )
            }
            StartError::UnknownLevel(level) => {
                write!(f, "level {level} does not exist (1-{LEVEL_COUNT})")
            }
        }
    }
}

impl std::error::Error for StartError {}

/// One player's session
pub struct Session {
    state: AppState,
    mode: GameMode,
    current_level: u32,
    sim: SimulationState,
    progress: ProgressStore,
    cleared: BTreeSet<u32>,
    audio: Box<dyn AudioCue>,
    input: InputRouter,
    /// Bumped on every run start and teardown
    generation: u64,
    seed_rng: Pcg32,
}

impl Session {
    pub fn new(progress: ProgressStore, audio: Box<dyn AudioCue>, seed: u64) -> Self {
        let cleared = progress.load();
        let mode = GameMode::Story(1);
        Self {
            state: AppState::Menu,
            mode,
            current_level: 1,
            sim: SimulationState::new(mode, LEVELS[0].clone(), seed),
            progress,
            cleared,
            audio,
            input: InputRouter::default(),
            generation: 0,
            seed_rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Push user settings into the input router and audio sink
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.input.set_hold_threshold(settings.hold_to_duck_ms);
        self.audio.set_volume(settings.effective_volume());
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Current run generation; pass it back to [`Session::frame`]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of the run for the presenter
    pub fn sim(&self) -> &SimulationState {
        &self.sim
    }

    pub fn input(&mut self) -> &mut InputRouter {
        &mut self.input
    }

    pub fn audio(&self) -> &dyn AudioCue {
        self.audio.as_ref()
    }

    pub fn is_playable(&self, level: u32) -> bool {
        level <= LEVEL_COUNT && is_playable(&self.cleared, level)
    }

    /// Start a story level
    pub fn start_level(&mut self, level: u32, now_ms: f64) -> Result<(), StartError> {
        if level == 0 || level > LEVEL_COUNT {
            log::warn!("Refusing to start level {level}: unknown");
            return Err(StartError::UnknownLevel(level));
        }
        if !is_playable(&self.cleared, level) {
            log::warn!("Refusing to start level {level}: locked");
            return Err(StartError::Locked(level));
        }
        self.current_level = level;
        self.begin_run(GameMode::Story(level), now_ms);
        Ok(())
    }

    /// Start an alternate mode; a story mode goes through the lock check
    pub fn start_mode(&mut self, mode: GameMode, now_ms: f64) -> Result<(), StartError> {
        match mode {
            GameMode::Story(level) => self.start_level(level, now_ms),
            _ => {
                self.begin_run(mode, now_ms);
                Ok(())
            }
        }
    }

    /// Replay whatever was last played
    pub fn restart(&mut self, now_ms: f64) -> Result<(), StartError> {
        self.start_mode(self.mode, now_ms)
    }

    /// Next story level after a clear, if there is one
    pub fn next_level(&self) -> Option<u32> {
        match (self.state, self.mode) {
            (AppState::LevelComplete, GameMode::Story(level)) if level < LEVEL_COUNT => {
                Some(level + 1)
            }
            _ => None,
        }
    }

    fn begin_run(&mut self, mode: GameMode, now_ms: f64) {
        let Some(config) = mode.config() else {
            return;
        };
        let seed = self.seed_rng.random();
        self.mode = mode;
        self.sim = SimulationState::new(mode, config, seed);
        self.sim.start(now_ms);
        self.input.reset();
        self.generation += 1;
        self.state = AppState::Playing;
        self.audio.resume();
        log::info!(
            "Run started: {} (seed {seed}, generation {})",
            mode.name(),
            self.generation
        );
    }

    /// Tear down the play view
    ///
    /// Invalidates the current generation so any frame already scheduled for
    /// it is dropped, and disarms pending press-and-hold timers.
    pub fn return_to_menu(&mut self) {
        self.generation += 1;
        self.input.reset();
        self.state = AppState::Menu;
    }

    /// Forget every cleared level and go back to level 1
    pub fn reset_progress(&mut self) {
        self.progress.clear();
        self.cleared.clear();
        self.current_level = 1;
        self.mode = GameMode::Story(1);
        self.return_to_menu();
    }

    /// Advance one display frame
    ///
    /// Returns whether the host should schedule another frame for this
    /// generation.
    pub fn frame(&mut self, generation: u64, now_ms: f64) -> bool {
        if generation != self.generation || self.state != AppState::Playing {
            return false;
        }

        let input = self.input.take_tick_input(now_ms);
        tick(&mut self.sim, &input);

        for event in &self.sim.events {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
            if *event == GameEvent::LevelCleared {
                if let Some(level) = self.mode.level_id() {
                    self.cleared = self.progress.record_clear(level);
                }
            }
        }

        match self.sim.phase {
            RunPhase::Running => true,
            RunPhase::Failed => {
                self.state = AppState::GameOver;
                self.input.reset();
                false
            }
            RunPhase::Cleared => {
                self.state = AppState::LevelComplete;
                self.input.reset();
                false
            }
            RunPhase::Idle => false,
        }
    }

    pub fn menu_view(&self) -> MenuView {
        MenuView {
            state: self.state,
            current_level: self.current_level,
            score: self.sim.score,
            unlocked_levels: self.cleared.iter().copied().collect(),
            clues: self.cleared.iter().filter_map(|&l| clue_for(l)).collect(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level_name: self.mode.name(),
            distance: self.sim.distance.floor() as u32,
            level_distance: self.sim.config.level_distance as u32,
            score: self.sim.score,
            progress: self.sim.progress(),
            speed: self.sim.current_speed,
            phase: self.sim.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::persistence::PROGRESS_KEY;
    use crate::platform::{Key, KeyValueStore, MemoryStore};
    use crate::sim::{Obstacle, ObstacleKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store handle the test can keep inspecting after the session owns it
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> bool {
            self.0.borrow_mut().set(key, value)
        }

        fn remove(&mut self, key: &str) {
            self.0.borrow_mut().remove(key);
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<SoundEffect>>>);

    impl AudioCue for Recorder {
        fn play(&self, effect: SoundEffect) {
            self.0.borrow_mut().push(effect);
        }
    }

    fn session_with(store: &SharedStore) -> Session {
        Session::new(
            ProgressStore::new(Box::new(store.clone())),
            Box::new(crate::audio::SilentAudio),
            7,
        )
    }

    /// Drive the current generation until the host would stop
    fn run_to_end(session: &mut Session, mut now: f64) -> f64 {
        let generation = session.generation();
        for _ in 0..100_000 {
            now += FRAME_MS;
            if !session.frame(generation, now) {
                break;
            }
        }
        now
    }

    /// Shorten the active run so it clears in a few frames
    fn shorten(session: &mut Session) {
        session.sim.config.level_distance = 30.0;
    }

    #[test]
    fn test_new_session_shows_menu() {
        let store = SharedStore::default();
        let session = session_with(&store);
        let view = session.menu_view();
        assert_eq!(view.state, AppState::Menu);
        assert_eq!(view.current_level, 1);
        assert!(view.unlocked_levels.is_empty());
        assert!(view.clues.is_empty());
    }

    #[test]
    fn test_locked_and_unknown_levels_rejected() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        assert_eq!(session.start_level(2, 0.0), Err(StartError::Locked(2)));
        assert_eq!(session.start_level(0, 0.0), Err(StartError::UnknownLevel(0)));
        assert_eq!(session.start_level(9, 0.0), Err(StartError::UnknownLevel(9)));
        assert_eq!(session.state(), AppState::Menu);
        assert_eq!(
            StartError::Locked(3).to_string(),
            "level 3 is locked until level 2 is cleared"
        );
    }

    #[test]
    fn test_clearing_twice_stores_level_once() {
        let store = SharedStore::default();
        let mut session = session_with(&store);

        for _ in 0..2 {
            session.start_level(1, 0.0).unwrap();
            shorten(&mut session);
            run_to_end(&mut session, 0.0);
            assert_eq!(session.state(), AppState::LevelComplete);
        }

        assert_eq!(store.get(PROGRESS_KEY).as_deref(), Some("[1]"));
        let view = session.menu_view();
        assert_eq!(view.unlocked_levels, vec![1]);
        assert_eq!(view.clues.len(), 1);
        assert!(session.is_playable(2));
        assert_eq!(session.next_level(), Some(2));
    }

    #[test]
    fn test_progress_survives_new_session() {
        let store = SharedStore::default();
        store.0.borrow_mut().set(PROGRESS_KEY, "[1,2]");
        let mut session = session_with(&store);
        assert!(session.start_level(3, 0.0).is_ok());
        assert!(session.start_level(4, 0.0).is_err());
    }

    #[test]
    fn test_alternate_modes_never_write_progress() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        session.start_mode(GameMode::Marathon, 0.0).unwrap();
        shorten(&mut session);
        run_to_end(&mut session, 0.0);
        assert_eq!(session.state(), AppState::LevelComplete);
        assert_eq!(store.get(PROGRESS_KEY), None);
        assert_eq!(session.next_level(), None);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        session.start_level(1, 0.0).unwrap();
        let old = session.generation();
        assert!(session.frame(old, FRAME_MS));

        session.return_to_menu();
        let frames = session.sim().frame_count;
        assert!(!session.frame(old, 2.0 * FRAME_MS));
        assert_eq!(session.sim().frame_count, frames);

        session.start_level(1, 100.0).unwrap();
        assert_ne!(session.generation(), old);
        assert!(!session.frame(old, 120.0));
        assert_eq!(session.sim().frame_count, 0);
        assert!(session.frame(session.generation(), 120.0));
        assert_eq!(session.sim().frame_count, 1);
    }

    #[test]
    fn test_teardown_drops_pending_input() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        session.start_level(1, 0.0).unwrap();
        session.input().pointer_down(0.0);
        session.return_to_menu();
        session.start_level(1, 1000.0).unwrap();
        session.frame(session.generation(), 1000.0 + FRAME_MS);
        assert!(!session.sim().character.is_ducking());
    }

    #[test]
    fn test_collision_ends_run_and_plays_hit() {
        let store = SharedStore::default();
        let recorder = Recorder::default();
        let mut session = Session::new(
            ProgressStore::new(Box::new(store.clone())),
            Box::new(recorder.clone()),
            7,
        );
        session.start_level(1, 0.0).unwrap();
        let id = session.sim.next_entity_id();
        session
            .sim
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Gift, 120.0, false));

        assert!(!session.frame(session.generation(), FRAME_MS));
        assert_eq!(session.state(), AppState::GameOver);
        assert!(recorder.0.borrow().contains(&SoundEffect::Hit));
        assert_eq!(store.get(PROGRESS_KEY), None);
        // Terminal runs stay put
        assert!(!session.frame(session.generation(), 2.0 * FRAME_MS));
    }

    #[test]
    fn test_jump_key_reaches_sim_and_audio() {
        let store = SharedStore::default();
        let recorder = Recorder::default();
        let mut session = Session::new(
            ProgressStore::new(Box::new(store)),
            Box::new(recorder.clone()),
            7,
        );
        session.start_level(1, 0.0).unwrap();
        assert!(session.input().key_down(Key::Space));
        session.frame(session.generation(), FRAME_MS);
        assert!(session.sim().character.is_jumping());
        assert_eq!(*recorder.0.borrow(), vec![SoundEffect::Jump]);
    }

    #[test]
    fn test_restart_replays_mode_with_fresh_run() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        session.start_mode(GameMode::Rhythm, 0.0).unwrap();
        for i in 1..=10 {
            session.frame(session.generation(), i as f64 * FRAME_MS);
        }
        let first = session.generation();
        session.restart(500.0).unwrap();
        assert_eq!(session.mode(), GameMode::Rhythm);
        assert_eq!(session.sim().distance, 0.0);
        assert_eq!(session.sim().start_time_ms, 500.0);
        assert!(session.generation() > first);
    }

    #[test]
    fn test_reset_progress() {
        let store = SharedStore::default();
        store.0.borrow_mut().set(PROGRESS_KEY, "[1,2,3]");
        let mut session = session_with(&store);
        session.start_level(4, 0.0).unwrap();
        session.reset_progress();

        let view = session.menu_view();
        assert_eq!(view.state, AppState::Menu);
        assert_eq!(view.current_level, 1);
        assert!(view.unlocked_levels.is_empty());
        assert_eq!(store.get(PROGRESS_KEY), None);
        assert_eq!(session.start_level(2, 0.0), Err(StartError::Locked(2)));
    }

    #[test]
    fn test_snapshot_reports_hud() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        session.start_level(1, 0.0).unwrap();
        for i in 1..=4 {
            session.frame(session.generation(), i as f64 * FRAME_MS);
        }
        let hud = session.snapshot();
        assert_eq!(hud.level_name, "Road to Bethlehem");
        assert_eq!(hud.distance, 10);
        assert_eq!(hud.level_distance, 5000);
        assert_eq!(hud.phase, RunPhase::Running);
        assert!((hud.progress - 0.002).abs() < 1e-6);
    }

    #[test]
    fn test_settings_apply_hold_threshold() {
        let store = SharedStore::default();
        let mut session = session_with(&store);
        let settings = Settings {
            hold_to_duck_ms: 50.0,
            ..Settings::default()
        };
        session.apply_settings(&settings);
        session.start_level(1, 0.0).unwrap();
        session.input().pointer_down(0.0);
        session.frame(session.generation(), 60.0);
        assert!(session.sim().character.is_ducking());
    }
}
