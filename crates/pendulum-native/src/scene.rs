//! Tessellates the engine's canvas-style drawing calls into a triangle list.
//!
//! Strokes become one quad per path segment, fills a triangle fan (the engine
//! only fills convex shapes: the marker disc and the center piece). Text is
//! not rasterised; labels are counted and dropped.

use glam::Vec2;
use pendulum_core::{Rgb, Surface};

// Target length of one arc segment in pixels.
const ARC_SEGMENT_PX: f64 = 3.0;
const MIN_ARC_SEGMENTS: f64 = 8.0;
const MAX_ARC_SEGMENTS: f64 = 256.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

fn rgba(color: Rgb) -> [f32; 4] {
    let [r, g, b] = color.to_f32_array();
    [r, g, b, 1.0]
}

pub struct SceneBuilder {
    width: f64,
    height: f64,
    stroke: [f32; 4],
    fill: [f32; 4],
    line_width: f32,
    path: Vec<Vec<Vec2>>,
    vertices: Vec<Vertex>,
    skipped_labels: usize,
}

impl SceneBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            stroke: rgba(Rgb::WHITE),
            fill: rgba(Rgb::WHITE),
            line_width: 1.0,
            path: Vec::new(),
            vertices: Vec::new(),
            skipped_labels: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Labels dropped since the last full clear.
    pub fn skipped_labels(&self) -> usize {
        self.skipped_labels
    }

    fn push_point(&mut self, p: Vec2) {
        match self.path.last_mut() {
            Some(sub) => sub.push(p),
            None => self.path.push(vec![p]),
        }
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        for p in [a, b, c] {
            self.vertices.push(Vertex {
                pos: p.to_array(),
                color,
            });
        }
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2) {
        let d = b - a;
        if d.length_squared() < 1e-12 {
            return;
        }
        let n = d.perp().normalize() * (self.line_width.max(1.0) * 0.5);
        let color = self.stroke;
        self.triangle(a + n, a - n, b - n, color);
        self.triangle(a + n, b - n, b + n, color);
    }
}

impl Surface for SceneBuilder {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        // Only full clears occur; they start a new scene.
        if x <= 0.0 && y <= 0.0 && width >= self.width && height >= self.height {
            self.vertices.clear();
            self.skipped_labels = 0;
        }
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke = rgba(color);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill = rgba(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width as f32;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(vec![Vec2::new(x as f32, y as f32)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_point(Vec2::new(x as f32, y as f32));
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        let sweep = end - start;
        let segments = (sweep.abs() * radius / ARC_SEGMENT_PX)
            .ceil()
            .clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS) as usize;
        for k in 0..=segments {
            let theta = start + sweep * k as f64 / segments as f64;
            self.push_point(Vec2::new(
                (cx + radius * theta.cos()) as f32,
                (cy + radius * theta.sin()) as f32,
            ));
        }
    }

    fn stroke(&mut self) {
        let path = std::mem::take(&mut self.path);
        for sub in &path {
            for pair in sub.windows(2) {
                self.stroke_segment(pair[0], pair[1]);
            }
        }
        self.path = path;
    }

    fn fill(&mut self) {
        let path = std::mem::take(&mut self.path);
        let color = self.fill;
        for sub in path.iter().filter(|s| s.len() >= 3) {
            for pair in sub[1..].windows(2) {
                self.triangle(sub[0], pair[0], pair[1], color);
            }
        }
        self.path = path;
    }

    fn stroke_text(&mut self, _text: &str, _x: f64, _y: f64) {
        self.skipped_labels += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn stroked_line_is_one_quad() {
        let mut scene = SceneBuilder::new(100.0, 100.0);
        scene.set_line_width(2.0);
        scene.begin_path();
        scene.move_to(10.0, 50.0);
        scene.line_to(90.0, 50.0);
        scene.stroke();
        let v = scene.vertices();
        assert_eq!(v.len(), 6);
        for vert in v {
            assert!((vert.pos[1] - 50.0).abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn arc_points_lie_on_the_circle() {
        let mut scene = SceneBuilder::new(1000.0, 600.0);
        scene.begin_path();
        scene.arc(500.0, 580.0, 200.0, PI, TAU);
        let sub = &scene.path[0];
        assert!(sub.len() > 9);
        for p in sub {
            let d = (*p - Vec2::new(500.0, 580.0)).length();
            assert!((d - 200.0).abs() < 1e-3);
            // upper half only (y grows downwards)
            assert!(p.y <= 580.0 + 1e-3);
        }
    }

    #[test]
    fn filled_disc_is_a_fan() {
        let mut scene = SceneBuilder::new(100.0, 100.0);
        scene.set_fill_color(Rgb::new(255, 0, 0));
        scene.begin_path();
        scene.arc(50.0, 50.0, 3.0, 0.0, TAU);
        scene.fill();
        let points = scene.path[0].len();
        assert_eq!(scene.vertices().len(), (points - 2) * 3);
        assert!(scene.vertices().iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn full_clear_starts_a_new_scene() {
        let mut scene = SceneBuilder::new(100.0, 100.0);
        scene.begin_path();
        scene.move_to(0.0, 0.0);
        scene.line_to(10.0, 10.0);
        scene.stroke();
        scene.stroke_text("220", 0.0, 0.0);
        assert_eq!(scene.skipped_labels(), 1);

        scene.clear_rect(10.0, 10.0, 5.0, 5.0);
        assert_eq!(scene.vertices().len(), 6);
        scene.clear_rect(0.0, 0.0, 100.0, 100.0);
        assert!(scene.vertices().is_empty());
        assert_eq!(scene.skipped_labels(), 0);
    }
}
