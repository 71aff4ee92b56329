use crate::color::Rgb;
use crate::surface::Surface;
use std::f64::consts::TAU;

/// The point riding an arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

impl Marker {
    pub fn new(x: f64, y: f64, color: Rgb) -> Self {
        Self { x, y, color }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, radius: f64) {
        surface.set_fill_color(self.color);
        surface.set_stroke_color(self.color);
        surface.begin_path();
        surface.arc(self.x, self.y, radius, 0.0, TAU);
        surface.fill();
    }
}
