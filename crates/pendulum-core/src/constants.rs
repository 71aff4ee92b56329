// Shared timing/layout constants used by the engine and both frontends.

// Ticks per second the angular velocities are expressed against
pub const FRAME_RATE: f64 = 60.0;

// Phases this close to 0 or PI snap onto the boundary
pub const PHASE_EPSILON: f64 = 1e-9;

// Base line layout (surface pixels)
pub const BASE_OFFSET_X: f64 = 20.0; // left/right inset of the base line
pub const BASE_OFFSET_Y: f64 = 20.0; // distance of the base line from the bottom edge
pub const MAX_BASELINE_WIDTH: f64 = 1000.0; // wider surfaces center a 1000px base line
pub const CENTER_PIECE_RADIUS: f64 = 5.0; // filled half-disc at the shared arc center

// Arc decoration
pub const MARKER_RADIUS: f64 = 3.0;
pub const LINE_WIDTH: f64 = 1.0;
pub const LABEL_OFFSET_Y: f64 = 10.0; // frequency label sits below the base line

// Geometry of the default configuration (a 1000x600 surface)
pub const DEFAULT_SURFACE_WIDTH: f64 = 1000.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 600.0;
