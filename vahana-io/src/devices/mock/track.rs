//! Vector track geometry
//!
//! Walls are line segments, zones are axis-aligned rectangles. Ray casts are
//! analytic (ray/segment intersection), so distances are exact regardless of
//! arena size.

use super::config::{TrackConfig, ZoneConfig};

const PARALLEL_EPSILON: f32 = 1e-9;

/// Wall segment in world frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: (f32, f32),
    pub b: (f32, f32),
}

impl Segment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            a: (x1, y1),
            b: (x2, y2),
        }
    }

    /// Distance along a unit ray to this segment, if the ray hits it.
    fn intersect(&self, ox: f32, oy: f32, dx: f32, dy: f32) -> Option<f32> {
        let (sx, sy) = (self.b.0 - self.a.0, self.b.1 - self.a.1);
        let denom = cross(dx, dy, sx, sy);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let (qx, qy) = (self.a.0 - ox, self.a.1 - oy);
        let t = cross(qx, qy, sx, sy) / denom;
        let u = cross(qx, qy, dx, dy) / denom;
        (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
    }

    /// Shortest distance from a point to this segment.
    fn distance_to(&self, x: f32, y: f32) -> f32 {
        let (sx, sy) = (self.b.0 - self.a.0, self.b.1 - self.a.1);
        let len_sq = sx * sx + sy * sy;
        let t = if len_sq > 0.0 {
            (((x - self.a.0) * sx + (y - self.a.1) * sy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (px, py) = (self.a.0 + t * sx, self.a.1 + t * sy);
        ((x - px).powi(2) + (y - py).powi(2)).sqrt()
    }
}

#[inline]
fn cross(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    ax * by - ay * bx
}

/// Ground type under a point, used for floor shading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Road,
    Infield,
    Checkpoint,
}

/// Walls plus trigger zones
pub struct Track {
    segments: Vec<Segment>,
    disqualification: Vec<ZoneConfig>,
    milestones: Vec<ZoneConfig>,
}

impl Track {
    pub fn new(config: &TrackConfig) -> Self {
        let mut segments = Vec::with_capacity(config.walls.len() + 4);
        if config.boundary_walls {
            let (w, h) = (config.width, config.height);
            segments.push(Segment::new(0.0, 0.0, w, 0.0));
            segments.push(Segment::new(w, 0.0, w, h));
            segments.push(Segment::new(w, h, 0.0, h));
            segments.push(Segment::new(0.0, h, 0.0, 0.0));
        }
        segments.extend(
            config
                .walls
                .iter()
                .map(|w| Segment::new(w.x1, w.y1, w.x2, w.y2)),
        );

        log::debug!(
            "Track: {}x{} m, {} walls, {} disqualification zones, {} milestones",
            config.width,
            config.height,
            segments.len(),
            config.disqualification_zones.len(),
            config.milestones.len()
        );

        Self {
            segments,
            disqualification: config.disqualification_zones.clone(),
            milestones: config.milestones.clone(),
        }
    }

    /// Distance to the nearest wall along `angle`, or `None` if nothing is
    /// hit within `max_range`.
    pub fn ray_cast(&self, ox: f32, oy: f32, angle: f32, max_range: f32) -> Option<f32> {
        let (dy, dx) = angle.sin_cos();
        self.segments
            .iter()
            .filter_map(|s| s.intersect(ox, oy, dx, dy))
            .filter(|d| *d <= max_range)
            .min_by(f32::total_cmp)
    }

    /// Whether a disc of `radius` at (x, y) overlaps a wall.
    pub fn collides(&self, x: f32, y: f32, radius: f32) -> bool {
        self.segments.iter().any(|s| s.distance_to(x, y) < radius)
    }

    pub fn disqualification_zones(&self) -> &[ZoneConfig] {
        &self.disqualification
    }

    pub fn milestones(&self) -> &[ZoneConfig] {
        &self.milestones
    }

    pub fn surface_at(&self, x: f32, y: f32) -> Surface {
        if self.disqualification.iter().any(|z| z.contains(x, y)) {
            Surface::Infield
        } else if self.milestones.iter().any(|z| z.contains(x, y)) {
            Surface::Checkpoint
        } else {
            Surface::Road
        }
    }
}
