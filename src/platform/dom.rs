//! DOM stage: element lookup and per-frame sync
//!
//! Every element is looked up once at startup. A missing element is a broken
//! page, so lookups fail fast with an `anyhow` error instead of being skipped
//! every frame.

use anyhow::{Result, anyhow};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use crate::renderer::{EnvelopeView, FrameView, OverlayView, draw_confetti};
use crate::sim::{Confetti, GameState, Viewport};

mod ids {
    pub const OVERLAY: &str = "overlay";
    pub const BOSS_INTRO: &str = "boss-intro";
    pub const FINALE: &str = "finale-screen";
    pub const CONFETTI_CANVAS: &str = "confetti-canvas";
    pub const CONTEXT_2D: &str = "2d";
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or_else(|| anyhow!("No document found"))
}

/// Current inner size of the window in CSS px
pub fn viewport() -> Result<Viewport> {
    let window = window()?;
    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>, name: &str| {
        value
            .map_err(|err| anyhow!("Error reading {name}: {err:?}"))?
            .as_f64()
            .ok_or_else(|| anyhow!("{name} is not a number"))
    };
    let width = dimension(window.inner_width(), "innerWidth")?;
    let height = dimension(window.inner_height(), "innerHeight")?;
    Ok(Viewport::new(width as f32, height as f32))
}

/// Host clock in ms
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No element found with id '{id}'"))?
        .dyn_into::<T>()
        .map_err(|element| anyhow!("Error converting {element:#?} for '{id}'"))
}

fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(ids::CONTEXT_2D)
        .map_err(|js_value| anyhow!("Error getting context: {js_value:#?}"))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| anyhow!("Error converting {element:#?} to CanvasRenderingContext2d"))
}

fn set_style(el: &HtmlElement, property: &str, value: &str) -> Result<()> {
    el.style()
        .set_property(property, value)
        .map_err(|err| anyhow!("Error setting {property}: {err:?}"))
}

fn set_class(el: &HtmlElement, class: &str, on: bool) -> Result<()> {
    el.class_list()
        .toggle_with_force(class, on)
        .map(|_| ())
        .map_err(|err| anyhow!("Error toggling class {class}: {err:?}"))
}

fn show(el: &HtmlElement, visible: bool, display: &str) -> Result<()> {
    set_style(el, "display", if visible { display } else { "none" })
}

/// Handles to every element the game drives
pub struct Stage {
    /// Same order as `GameState::all_envelopes`
    envelopes: Vec<HtmlElement>,
    overlay: HtmlElement,
    boss_intro: HtmlElement,
    finale: HtmlElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    canvas_sized: bool,
}

impl Stage {
    pub fn lookup(state: &GameState) -> Result<Self> {
        let document = document()?;
        let envelopes = state
            .all_envelopes()
            .map(|env| element::<HtmlElement>(&document, &env.id.dom_id()))
            .collect::<Result<Vec<_>>>()?;
        let canvas = element::<HtmlCanvasElement>(&document, ids::CONFETTI_CANVAS)?;
        let context = context(&canvas)?;

        log::info!("Stage ready: {} envelopes", envelopes.len());
        Ok(Self {
            envelopes,
            overlay: element(&document, ids::OVERLAY)?,
            boss_intro: element(&document, ids::BOSS_INTRO)?,
            finale: element(&document, ids::FINALE)?,
            canvas,
            context,
            canvas_sized: false,
        })
    }

    /// Copy one frame of game state onto the page
    pub fn sync(&mut self, state: &GameState) -> Result<()> {
        let frame = FrameView::of(state);
        if frame.envelopes.len() != self.envelopes.len() {
            log::warn!(
                "Stage has {} envelope elements, frame has {}",
                self.envelopes.len(),
                frame.envelopes.len()
            );
        }
        for (el, view) in self.envelopes.iter().zip(&frame.envelopes) {
            sync_envelope(el, view)?;
        }
        self.sync_panels(&frame.panels)?;

        if frame.panels.finale_visible {
            self.draw_finale(&state.confetti)?;
        }
        Ok(())
    }

    fn sync_panels(&self, panels: &OverlayView) -> Result<()> {
        set_class(&self.overlay, "active", panels.overlay_active)?;

        show(&self.boss_intro, panels.intro_visible, "flex")?;
        set_style(&self.boss_intro, "opacity", &panels.intro_opacity.to_string())?;

        show(&self.finale, panels.finale_visible, "flex")?;
        set_style(&self.finale, "opacity", if panels.finale_visible { "1" } else { "0" })
    }

    fn draw_finale(&mut self, confetti: &Confetti) -> Result<()> {
        if !self.canvas_sized {
            self.canvas.set_width(confetti.bounds.width as u32);
            self.canvas.set_height(confetti.bounds.height as u32);
            self.canvas_sized = true;
            log::debug!(
                "Confetti canvas sized to {}x{}",
                confetti.bounds.width,
                confetti.bounds.height
            );
        }
        draw_confetti(&mut self.context, confetti)
            .map_err(|err| anyhow!("Error drawing confetti: {err:?}"))
    }
}

fn sync_envelope(el: &HtmlElement, view: &EnvelopeView) -> Result<()> {
    show(el, view.visible, "block")?;
    if !view.visible {
        return Ok(());
    }

    let (width, height) = view.size();
    set_style(el, "transform", &view.transform())?;
    set_style(el, "width", &width)?;
    set_style(el, "height", &height)?;
    set_style(el, "z-index", if view.focused { "1000" } else { "" })?;
    set_style(el, "pointer-events", view.pointer_events())?;
    for (class, on) in view.classes() {
        set_class(el, class, on)?;
    }
    Ok(())
}
