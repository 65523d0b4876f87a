//! Per-frame presentation model
//!
//! Flattens `GameState` into plain values the DOM layer copies onto
//! elements. Nothing here touches the browser, so it is tested natively.

use glam::Vec2;

use crate::sim::{Envelope, EnvelopeId, GameState, Rect};

/// Everything one envelope element needs this frame
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeView {
    pub id: EnvelopeId,
    /// `display: none` when false
    pub visible: bool,
    /// Drawn above the overlay at the focus rect
    pub focused: bool,
    pub opened: bool,
    pub has_been_read: bool,
    /// Whether the element accepts pointer events
    pub interactive: bool,
    /// Screen box: live position while moving, the focus rect while focused
    pub rect: Rect,
}

impl EnvelopeView {
    pub fn of(state: &GameState, env: &Envelope) -> Self {
        let focused = env.is_focused();
        let rect = match (focused, state.focused_rect()) {
            (true, Some(r)) => r,
            _ => env.rect(state.envelope_size),
        };

        Self {
            id: env.id,
            visible: !env.is_hidden(),
            focused,
            opened: env.is_opened(),
            has_been_read: env.has_been_read,
            interactive: state.interactive(env.id),
            rect,
        }
    }

    /// CSS `transform` value
    pub fn transform(&self) -> String {
        translate(self.rect.min)
    }

    /// Class list toggles, in DOM order
    pub fn classes(&self) -> [(&'static str, bool); 3] {
        [
            ("zoomed", self.focused),
            ("opened", self.opened),
            ("has-been-read", self.has_been_read),
        ]
    }

    /// CSS `width` and `height` values
    pub fn size(&self) -> (String, String) {
        (format!("{:.2}px", self.rect.size.x), format!("{:.2}px", self.rect.size.y))
    }

    pub fn pointer_events(&self) -> &'static str {
        if self.interactive { "auto" } else { "none" }
    }
}

/// Full-screen panels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayView {
    /// Dimming overlay behind a focused envelope
    pub overlay_active: bool,
    pub intro_visible: bool,
    /// Intro panel opacity (0 while fading out)
    pub intro_opacity: f32,
    pub finale_visible: bool,
}

impl OverlayView {
    pub fn of(state: &GameState) -> Self {
        Self {
            overlay_active: state.overlay_active(),
            intro_visible: state.intro_visible(),
            intro_opacity: if state.intro_fading { 0.0 } else { 1.0 },
            finale_visible: state.finale_visible(),
        }
    }
}

/// A whole frame of DOM state
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub envelopes: Vec<EnvelopeView>,
    pub panels: OverlayView,
}

impl FrameView {
    pub fn of(state: &GameState) -> Self {
        Self {
            envelopes: state.all_envelopes().map(|e| EnvelopeView::of(state, e)).collect(),
            panels: OverlayView::of(state),
        }
    }
}

fn translate(p: Vec2) -> String {
    format!("translate3d({:.2}px, {:.2}px, 0)", p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{EnvelopeState, Viewport, envelope_pointer_up};

    fn new_state() -> GameState {
        GameState::new(Settings::default(), 5, Viewport::new(1200.0, 800.0))
    }

    #[test]
    fn test_moving_envelope_view() {
        let state = new_state();
        let env = &state.envelopes[0];
        let view = EnvelopeView::of(&state, env);

        assert!(view.visible);
        assert!(!view.focused);
        assert!(view.interactive);
        assert_eq!(view.rect.min, env.pos);
        assert_eq!(view.pointer_events(), "auto");
        assert_eq!(
            view.transform(),
            format!("translate3d({:.2}px, {:.2}px, 0)", env.pos.x, env.pos.y)
        );
    }

    #[test]
    fn test_gold_hidden_until_boss() {
        let state = new_state();
        let view = EnvelopeView::of(&state, &state.gold);
        assert!(!view.visible);
        assert!(!view.interactive);
    }

    #[test]
    fn test_focused_envelope_drawn_at_focus_rect() {
        let mut state = new_state();
        let id = EnvelopeId::Ordinary(2);
        envelope_pointer_up(&mut state, id, 0.0);
        envelope_pointer_up(&mut state, id, 0.0);
        assert_eq!(state.envelopes[2].state, EnvelopeState::Opened);

        let frame = FrameView::of(&state);
        let focused = &frame.envelopes[2];
        assert_eq!(Some(focused.rect), state.focused_rect());
        assert_eq!(
            focused.classes(),
            [("zoomed", true), ("opened", true), ("has-been-read", true)]
        );
        assert!(focused.interactive);

        // Everyone else is behind the overlay and inert
        assert!(frame.panels.overlay_active);
        for other in frame.envelopes.iter().filter(|v| v.id != id) {
            assert_eq!(other.pointer_events(), "none");
        }
    }

    #[test]
    fn test_wall_collision_drawn_on_screen() {
        let mut state = new_state();
        let size = state.envelope_size;
        state.envelopes[0].pos = Vec2::new(0.5, 100.0);
        state.envelopes[0].vel = Vec2::new(-1.0, 0.0);
        state.envelopes[1].pos = Vec2::new(0.0, 100.0 + size.y * 0.5);
        state.envelopes[1].vel = Vec2::new(-1.0, 0.0);
        for (i, env) in state.envelopes.iter_mut().enumerate().skip(2) {
            env.pos = Vec2::new(1200.0 - size.x, i as f32 * (size.y + 20.0));
            env.vel = Vec2::new(0.0, 0.0);
        }

        for frame in 1..=5 {
            crate::sim::tick(&mut state, frame as f64 * 16.0);
            for view in FrameView::of(&state).envelopes.iter().filter(|v| v.visible) {
                let max = state.viewport.size() - view.rect.size;
                assert!(view.rect.min.x >= 0.0 && view.rect.min.x <= max.x, "{:?}", view);
                assert!(view.rect.min.y >= 0.0 && view.rect.min.y <= max.y, "{:?}", view);
            }
        }
    }

    #[test]
    fn test_intro_panel_fades() {
        let mut state = new_state();
        crate::sim::phase::start_intro(&mut state).unwrap();
        assert_eq!(OverlayView::of(&state).intro_opacity, 1.0);
        crate::sim::phase::fade_intro(&mut state);
        let panels = OverlayView::of(&state);
        assert!(panels.intro_visible);
        assert_eq!(panels.intro_opacity, 0.0);
        assert!(!panels.finale_visible);
    }
}
