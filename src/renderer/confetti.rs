//! Confetti drawing
//!
//! The finale canvas is cleared and every piece is drawn as a rotated square,
//! once per frame.

use crate::sim::Confetti;

/// The subset of a 2D canvas context the confetti needs
pub trait ConfettiCanvas {
    type Error;

    fn clear(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, angle: f64) -> Result<(), Self::Error>;
    fn set_fill(&mut self, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
}

/// Draw one frame of confetti
pub fn draw_confetti<C: ConfettiCanvas>(
    canvas: &mut C,
    confetti: &Confetti,
) -> Result<(), C::Error> {
    canvas.clear(confetti.bounds.width as f64, confetti.bounds.height as f64);

    for p in &confetti.particles {
        let half = p.size as f64 / 2.0;
        canvas.save();
        let drawn = canvas
            .translate(p.pos.x as f64, p.pos.y as f64)
            .and_then(|_| canvas.rotate(p.angle as f64));
        if drawn.is_ok() {
            canvas.set_fill(&p.color());
            canvas.fill_rect(-half, -half, p.size as f64, p.size as f64);
        }
        // Balanced even when a transform failed
        canvas.restore();
        drawn?;
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
impl ConfettiCanvas for web_sys::CanvasRenderingContext2d {
    type Error = wasm_bindgen::JsValue;

    fn clear(&mut self, width: f64, height: f64) {
        self.clear_rect(0.0, 0.0, width, height);
    }

    fn save(&mut self) {
        web_sys::CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        web_sys::CanvasRenderingContext2d::restore(self);
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error> {
        web_sys::CanvasRenderingContext2d::translate(self, x, y)
    }

    fn rotate(&mut self, angle: f64) -> Result<(), Self::Error> {
        web_sys::CanvasRenderingContext2d::rotate(self, angle)
    }

    fn set_fill(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        web_sys::CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }
}
