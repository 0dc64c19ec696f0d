//! Simulated clip engine.
//!
//! A deterministic stand-in for the rendering engine's clip playback, used by
//! tests and the headless preview. Time only moves when [`SimClock::advance`]
//! is called, and every clip exposes a [`SimClipProbe`] so callers can inspect
//! what the controller asked for after the clip has been boxed away.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::clip::{Clip, ClipKind, ClipSource, PlayMode};

/// Content length reported by `compute_duration` when none was authored.
pub const DEFAULT_CONTENT_DURATION: f32 = 1.0;

/// Shared, manually advanced engine clock.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<f64>>,
}

impl SimClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt.max(0.0));
    }

    pub fn set(&self, time: f64) {
        self.now.set(time);
    }
}

#[derive(Debug, Clone)]
struct SimClipState {
    kind: ClipKind,
    duration: f32,
    content_duration: f32,
    mode: PlayMode,
    weight: f32,
    priority: i32,
    playing: bool,
    start_time: f64,
    play_count: u32,
    stop_count: u32,
    duration_computations: u32,
}

/// Clip handle backed by the simulated clock.
pub struct SimClip {
    name: String,
    clock: SimClock,
    state: Rc<RefCell<SimClipState>>,
}

impl SimClip {
    /// Creates a clip. A `duration` of 0 leaves it unmeasured, with
    /// [`DEFAULT_CONTENT_DURATION`] as its measurable length.
    #[must_use]
    pub fn new(clock: &SimClock, name: &str, kind: ClipKind, duration: f32, mode: PlayMode) -> Self {
        let content_duration = if duration > 0.0 {
            duration
        } else {
            DEFAULT_CONTENT_DURATION
        };
        Self {
            name: name.to_owned(),
            clock: clock.clone(),
            state: Rc::new(RefCell::new(SimClipState {
                kind,
                duration: duration.max(0.0),
                content_duration,
                mode,
                weight: 1.0,
                priority: 0,
                playing: false,
                start_time: 0.0,
                play_count: 0,
                stop_count: 0,
                duration_computations: 0,
            })),
        }
    }

    #[must_use]
    pub fn bone(clock: &SimClock, name: &str, duration: f32, mode: PlayMode) -> Self {
        Self::new(clock, name, ClipKind::Bone, duration, mode)
    }

    #[must_use]
    pub fn morph(clock: &SimClock, name: &str, duration: f32, mode: PlayMode) -> Self {
        Self::new(clock, name, ClipKind::Morph, duration, mode)
    }

    #[must_use]
    pub fn probe(&self) -> SimClipProbe {
        SimClipProbe {
            name: self.name.clone(),
            clock: self.clock.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

fn elapsed(clock: &SimClock, state: &SimClipState) -> f64 {
    clock.now() - state.start_time
}

fn finished(clock: &SimClock, state: &SimClipState) -> bool {
    state.mode == PlayMode::Once
        && state.duration > 0.0
        && elapsed(clock, state) >= f64::from(state.duration)
}

impl Clip for SimClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClipKind {
        self.state.borrow().kind
    }

    fn play(&mut self, weight: f32, priority: i32) {
        let mut state = self.state.borrow_mut();
        state.weight = weight.clamp(0.0, 1.0);
        state.priority = priority;
        state.playing = true;
        state.play_count += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.playing = false;
        state.stop_count += 1;
    }

    fn is_playing(&self) -> bool {
        let state = self.state.borrow();
        state.playing && !finished(&self.clock, &state)
    }

    fn engine_time(&self) -> f64 {
        self.clock.now()
    }

    fn set_start_time(&mut self, time: f64) {
        self.state.borrow_mut().start_time = time;
    }

    fn start_time(&self) -> f64 {
        self.state.borrow().start_time
    }

    fn duration(&self) -> f32 {
        self.state.borrow().duration
    }

    fn set_duration(&mut self, duration: f32) {
        self.state.borrow_mut().duration = duration.max(0.0);
    }

    fn compute_duration(&mut self) -> f32 {
        let mut state = self.state.borrow_mut();
        state.duration_computations += 1;
        state.duration = state.content_duration;
        state.duration
    }

    fn weight(&self) -> f32 {
        self.state.borrow().weight
    }

    fn set_weight(&mut self, weight: f32) {
        self.state.borrow_mut().weight = weight.clamp(0.0, 1.0);
    }

    fn priority(&self) -> i32 {
        self.state.borrow().priority
    }

    fn set_priority(&mut self, priority: i32) {
        self.state.borrow_mut().priority = priority;
    }

    fn play_mode(&self) -> PlayMode {
        self.state.borrow().mode
    }

    fn set_play_mode(&mut self, mode: PlayMode) {
        self.state.borrow_mut().mode = mode;
    }
}

/// Read-only view of a [`SimClip`] that stays valid after the clip is boxed.
#[derive(Clone)]
pub struct SimClipProbe {
    name: String,
    clock: SimClock,
    state: Rc<RefCell<SimClipState>>,
}

impl SimClipProbe {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        let state = self.state.borrow();
        state.playing && !finished(&self.clock, &state)
    }

    #[must_use]
    pub fn weight(&self) -> f32 {
        self.state.borrow().weight
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.state.borrow().duration
    }

    /// Seconds on the clip's own clock.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        elapsed(&self.clock, &self.state.borrow())
    }

    /// Number of `play` requests received.
    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.state.borrow().play_count
    }

    #[must_use]
    pub fn stop_count(&self) -> u32 {
        self.state.borrow().stop_count
    }

    #[must_use]
    pub fn duration_computations(&self) -> u32 {
        self.state.borrow().duration_computations
    }
}

/// Authored description of one clip of a [`SimModel`].
#[derive(Debug, Clone)]
pub struct SimClipSpec {
    pub name: String,
    pub kind: ClipKind,
    pub duration: f32,
    pub mode: PlayMode,
}

/// Simulated model asset: a list of clip specs sharing one clock.
///
/// Each [`enumerate_clips`](ClipSource::enumerate_clips) call builds fresh
/// clip handles and replaces the probes returned by [`probe`](Self::probe).
pub struct SimModel {
    clock: SimClock,
    specs: Vec<SimClipSpec>,
    probes: RefCell<FxHashMap<String, SimClipProbe>>,
}

impl SimModel {
    #[must_use]
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            specs: Vec::new(),
            probes: RefCell::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn with_clip(mut self, name: &str, kind: ClipKind, duration: f32, mode: PlayMode) -> Self {
        self.specs.push(SimClipSpec {
            name: name.to_owned(),
            kind,
            duration,
            mode,
        });
        self
    }

    #[must_use]
    pub fn with_bone(self, name: &str, duration: f32, mode: PlayMode) -> Self {
        self.with_clip(name, ClipKind::Bone, duration, mode)
    }

    #[must_use]
    pub fn with_morph(self, name: &str, duration: f32, mode: PlayMode) -> Self {
        self.with_clip(name, ClipKind::Morph, duration, mode)
    }

    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[must_use]
    pub fn specs(&self) -> &[SimClipSpec] {
        &self.specs
    }

    /// Probe of the most recently enumerated clip with this name.
    #[must_use]
    pub fn probe(&self, name: &str) -> Option<SimClipProbe> {
        self.probes.borrow().get(name).cloned()
    }
}

impl ClipSource for SimModel {
    fn enumerate_clips(&self) -> Vec<Box<dyn Clip>> {
        let mut probes = self.probes.borrow_mut();
        probes.clear();
        self.specs
            .iter()
            .map(|spec| {
                let clip = SimClip::new(&self.clock, &spec.name, spec.kind, spec.duration, spec.mode);
                probes.insert(spec.name.clone(), clip.probe());
                Box::new(clip) as Box<dyn Clip>
            })
            .collect()
    }
}
