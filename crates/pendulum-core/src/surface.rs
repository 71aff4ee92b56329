//! Drawing contract between the engine and a frontend's 2D canvas.

use crate::color::Rgb;
use crate::config::Geometry;
use crate::constants::*;

/// Minimal path-based 2D drawing surface (the subset of a canvas 2D context the
/// engine uses). Coordinates are surface pixels with y growing downwards; arc
/// angles are radians measured clockwise on screen, as in a canvas context.
pub trait Surface {
    /// Current (width, height), queried every frame.
    fn size(&self) -> (f64, f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_stroke_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);
}

/// Rendering configuration handed to the render loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
    pub line_width: f64,
    pub base_offset_x: f64,
    pub base_offset_y: f64,
    pub max_baseline_width: f64,
    pub center_piece: f64,
    pub marker_radius: f64,
    pub label_offset_y: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stroke_color: Rgb::WHITE,
            fill_color: Rgb::WHITE,
            line_width: LINE_WIDTH,
            base_offset_x: BASE_OFFSET_X,
            base_offset_y: BASE_OFFSET_Y,
            max_baseline_width: MAX_BASELINE_WIDTH,
            center_piece: CENTER_PIECE_RADIUS,
            marker_radius: MARKER_RADIUS,
            label_offset_y: LABEL_OFFSET_Y,
        }
    }
}

impl RenderStyle {
    /// Horizontal inset of the base line; wide surfaces center a capped line.
    pub fn offset_x(&self, width: f64) -> f64 {
        if width > self.max_baseline_width {
            (width - self.max_baseline_width) / 2.0
        } else {
            self.base_offset_x
        }
    }

    pub fn baseline_y(&self, height: f64) -> f64 {
        height - self.base_offset_y
    }

    /// Arc geometry that fits a surface of the given size.
    pub fn geometry_for(&self, width: f64, height: f64) -> Geometry {
        Geometry {
            center_x: width / 2.0,
            center_y: self.baseline_y(height),
            line_from: self.offset_x(width),
            line_to: width / 2.0 - self.center_piece,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_matches_default_surface() {
        let style = RenderStyle::default();
        let g = style.geometry_for(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT);
        assert_eq!(g, Geometry::default());
    }

    #[test]
    fn wide_surfaces_center_the_base_line() {
        let style = RenderStyle::default();
        assert_eq!(style.offset_x(800.0), BASE_OFFSET_X);
        assert_eq!(style.offset_x(1600.0), 300.0);
        let g = style.geometry_for(1600.0, 900.0);
        assert_eq!(g.line_from, 300.0);
        assert_eq!(g.line_to, 795.0);
        assert_eq!(g.center_y, 880.0);
    }
}
