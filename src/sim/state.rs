//! Game state and core simulation types
//!
//! Everything the frame loop and the pointer handlers mutate lives in
//! [`GameState`]; the presentation layer only reads it.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::confetti::Confetti;
use super::geom::Rect;
use super::schedule::{Scheduler, TimerHandle};
use crate::consts::*;
use crate::settings::Settings;

/// Global game phase. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamePhase {
    /// Catch and read the five ordinary envelopes
    Phase1,
    /// Boss intro cutscene, nothing moves
    Intro,
    /// Gold envelope on the loose
    Boss,
    /// Confetti, forever
    Finale,
}

impl GamePhase {
    /// The only phase this one may advance to
    pub fn next(self) -> Option<GamePhase> {
        match self {
            GamePhase::Phase1 => Some(GamePhase::Intro),
            GamePhase::Intro => Some(GamePhase::Boss),
            GamePhase::Boss => Some(GamePhase::Finale),
            GamePhase::Finale => None,
        }
    }

    /// Validate a phase change
    pub fn advance_to(self, to: GamePhase) -> Result<GamePhase, TransitionError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(TransitionError::PhaseOrder { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Phase1 => "phase1",
            GamePhase::Intro => "intro",
            GamePhase::Boss => "boss",
            GamePhase::Finale => "finale",
        }
    }
}

/// Envelope identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvelopeId {
    /// One of the ordinary envelopes, by index
    Ordinary(u8),
    /// The boss envelope
    Gold,
}

impl EnvelopeId {
    /// Element id of the envelope in the host page
    pub fn dom_id(&self) -> String {
        match self {
            EnvelopeId::Ordinary(i) => format!("env{}", i + 1),
            EnvelopeId::Gold => "envGold".to_string(),
        }
    }
}

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dom_id())
    }
}

/// Envelope lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeState {
    /// Not on screen (gold before the boss, ordinary after phase1)
    Hidden,
    /// Bouncing around, positioned by the motion engine
    Moving,
    /// Caught and enlarged over the overlay
    Zoomed,
    /// Letter unfolded
    Opened,
}

/// Edges of the envelope state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Hidden -> Moving
    Reveal,
    /// Moving -> Hidden
    Hide,
    /// Moving -> Zoomed
    Zoom,
    /// Zoomed -> Opened
    Open,
    /// Opened -> Zoomed
    Close,
    /// Zoomed -> Moving
    Release,
}

impl EnvelopeState {
    /// Transition function; anything not listed on [`Transition`] is rejected
    pub fn apply(self, transition: Transition) -> Result<EnvelopeState, TransitionError> {
        use EnvelopeState::*;
        use Transition::*;

        match (self, transition) {
            (Hidden, Reveal) => Ok(Moving),
            (Moving, Hide) => Ok(Hidden),
            (Moving, Zoom) => Ok(Zoomed),
            (Zoomed, Open) => Ok(Opened),
            (Opened, Close) => Ok(Zoomed),
            (Zoomed, Release) => Ok(Moving),
            (from, transition) => {
                Err(TransitionError::InvalidEnvelopeTransition { from, transition })
            }
        }
    }

    /// Zoomed or opened: presented on the overlay layer
    pub fn is_focused(&self) -> bool {
        matches!(self, EnvelopeState::Zoomed | EnvelopeState::Opened)
    }
}

/// Rejected state changes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("envelope cannot {transition:?} while {from:?}")]
    InvalidEnvelopeTransition {
        from: EnvelopeState,
        transition: Transition,
    },
    #[error("phase cannot go from {} to {}", from.as_str(), to.as_str())]
    PhaseOrder { from: GamePhase, to: GamePhase },
    #[error("{0} is not the focused envelope")]
    NotFocused(EnvelopeId),
    #[error("{0} is not on screen")]
    NotVisible(EnvelopeId),
}

/// A bouncing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: EnvelopeId,
    /// Top-left corner in px
    pub pos: Vec2,
    /// px per frame
    pub vel: Vec2,
    pub state: EnvelopeState,
    /// Opened at least once during phase1
    pub has_been_read: bool,
}

impl Envelope {
    pub fn new(id: EnvelopeId, state: EnvelopeState) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ONE,
            state,
            has_been_read: false,
        }
    }

    /// Apply a state machine edge in place
    pub fn apply(&mut self, transition: Transition) -> Result<(), TransitionError> {
        self.state = self.state.apply(transition)?;
        Ok(())
    }

    /// On-screen offset, only while the motion engine owns the position
    pub fn transform(&self) -> Option<Vec2> {
        (self.state == EnvelopeState::Moving).then_some(self.pos)
    }

    pub fn is_focused(&self) -> bool {
        self.state.is_focused()
    }

    pub fn is_opened(&self) -> bool {
        self.state == EnvelopeState::Opened
    }

    pub fn is_hidden(&self) -> bool {
        self.state == EnvelopeState::Hidden
    }

    /// Bounding box at the current position
    pub fn rect(&self, size: Vec2) -> Rect {
        Rect::new(self.pos, size)
    }
}

/// Visible area in CSS px
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub viewport: Viewport,
    /// Moving envelope size (scales with the viewport)
    pub envelope_size: Vec2,
    /// Ordinary envelopes in page order (later ones stack on top)
    pub envelopes: Vec<Envelope>,
    pub gold: Envelope,
    pub phase: GamePhase,
    /// Motion frozen without a phase change
    pub paused: bool,
    /// The one envelope currently zoomed or opened
    pub focus: Option<EnvelopeId>,
    /// Distinct envelopes opened during phase1
    pub read_count: u32,
    /// Boss intro panel is fading out
    pub intro_fading: bool,
    /// Latest time seen from the host clock (ms)
    pub now_ms: f64,
    /// Frames simulated
    pub frame: u64,
    pub scheduler: Scheduler,
    pub(crate) pending_zoom_out: Option<TimerHandle>,
    pub(crate) pending_release: Option<TimerHandle>,
    pub(crate) finale_timer: Option<TimerHandle>,
    pub confetti: Confetti,
}

impl GameState {
    /// Create a new game laid out for `viewport`
    pub fn new(settings: Settings, seed: u64, viewport: Viewport) -> Self {
        let envelopes = (0..ENVELOPE_COUNT as u8)
            .map(|i| Envelope::new(EnvelopeId::Ordinary(i), EnvelopeState::Moving))
            .collect();

        let mut state = Self {
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            viewport,
            envelope_size: Vec2::ZERO,
            envelopes,
            gold: Envelope::new(EnvelopeId::Gold, EnvelopeState::Hidden),
            phase: GamePhase::Phase1,
            paused: false,
            focus: None,
            read_count: 0,
            intro_fading: false,
            now_ms: 0.0,
            frame: 0,
            scheduler: Scheduler::new(),
            pending_zoom_out: None,
            pending_release: None,
            finale_timer: None,
            confetti: Confetti::default(),
        };

        super::motion::reinitialize(&mut state, viewport);
        state
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Move the clock forward (never backward)
    pub(crate) fn observe_time(&mut self, now_ms: f64) {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
    }

    pub fn envelope(&self, id: EnvelopeId) -> Option<&Envelope> {
        match id {
            EnvelopeId::Gold => Some(&self.gold),
            EnvelopeId::Ordinary(i) => self.envelopes.get(i as usize),
        }
    }

    pub fn envelope_mut(&mut self, id: EnvelopeId) -> Option<&mut Envelope> {
        match id {
            EnvelopeId::Gold => Some(&mut self.gold),
            EnvelopeId::Ordinary(i) => self.envelopes.get_mut(i as usize),
        }
    }

    /// Ordinary envelopes followed by the gold one
    pub fn all_envelopes(&self) -> impl DoubleEndedIterator<Item = &Envelope> {
        self.envelopes.iter().chain(std::iter::once(&self.gold))
    }

    pub fn focused_envelope(&self) -> Option<&Envelope> {
        self.focus.and_then(|id| self.envelope(id))
    }

    /// Dimming overlay is shown while an envelope is focused
    pub fn overlay_active(&self) -> bool {
        self.focus.is_some()
    }

    /// Whether pointer input reaches this envelope
    pub fn interactive(&self, id: EnvelopeId) -> bool {
        let visible = self.envelope(id).is_some_and(|e| !e.is_hidden());
        visible && self.focus.is_none_or(|f| f == id)
    }

    /// Base speed in px per frame
    pub fn base_speed(&self) -> f32 {
        self.viewport.width * self.settings.speed_scale
    }

    /// Speed for freshly released envelopes in the current phase
    pub fn release_speed(&self) -> f32 {
        if self.phase == GamePhase::Boss {
            self.base_speed() * self.settings.gold_speed_multiplier
        } else {
            self.base_speed()
        }
    }

    /// Screen rect of the focused envelope: enlarged, centered
    pub fn focused_rect(&self) -> Option<Rect> {
        self.focus?;
        let max = self.viewport.size() * MAX_FOCUS_FRACTION;
        let mut size = self.envelope_size * self.settings.zoom_scale;
        // Keep aspect ratio while fitting the viewport
        let fit = (max.x / size.x.max(f32::EPSILON))
            .min(max.y / size.y.max(f32::EPSILON))
            .min(1.0);
        size *= fit;
        Some(Rect::centered(self.viewport.center(), size))
    }

    pub fn intro_visible(&self) -> bool {
        self.phase == GamePhase::Intro
    }

    pub fn finale_visible(&self) -> bool {
        self.phase == GamePhase::Finale
    }

    /// Number of zoomed or opened envelopes (0 or 1)
    pub fn focused_count(&self) -> usize {
        self.all_envelopes().filter(|e| e.is_focused()).count()
    }
}
