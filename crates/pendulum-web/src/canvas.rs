use pendulum_core::{Rgb, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

const LABEL_FONT: &str = "10px sans-serif";

/// [`Surface`] over a canvas 2D context.
pub struct Canvas2dSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        let surface = Self { canvas, ctx };
        surface.reset_context();
        Ok(surface)
    }

    /// Resizing a canvas resets its context state; call after every resize.
    pub fn reset_context(&self) {
        self.ctx.set_line_cap("round");
        self.ctx.set_font(LABEL_FONT);
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    #[allow(deprecated)]
    fn set_stroke_color(&mut self, color: Rgb) {
        self.ctx.set_stroke_style(&JsValue::from_str(&color.to_css()));
    }

    #[allow(deprecated)]
    fn set_fill_color(&mut self, color: Rgb) {
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        let _ = self.ctx.arc(cx, cy, radius, start, end);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.ctx.stroke_text(text, x, y);
    }
}
