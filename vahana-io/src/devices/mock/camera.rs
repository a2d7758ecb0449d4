//! Forward camera for the mock environment
//!
//! Column ray-caster over the track geometry: one ray per image column finds
//! the nearest wall, rows above it are sky, rows below it are floor shaded by
//! the surface under each projected ground point. Frames are JPEG encoded.

use super::track::{Surface, Track};
use crate::core::types::Pose;
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

/// Camera height above the floor (meters)
const EYE_HEIGHT: f32 = 0.5;
/// Wall height (meters)
const WALL_HEIGHT: f32 = 1.0;
/// Nothing beyond this is drawn as wall
const FAR_PLANE: f32 = 100.0;

const SKY: Rgb<u8> = Rgb([135, 190, 235]);
const WALL: [f32; 3] = [180.0, 70.0, 50.0];
const ROAD: Rgb<u8> = Rgb([90, 90, 90]);
const INFIELD: Rgb<u8> = Rgb([40, 140, 50]);
const CHECKPOINT: Rgb<u8> = Rgb([230, 200, 40]);

/// Per-column ray result
struct Column {
    /// First and one-past-last wall rows
    wall_rows: (f32, f32),
    wall_color: Rgb<u8>,
    /// World-frame unit ray direction
    dir: (f32, f32),
    /// cos of the angle between ray and optical axis
    cos_offset: f32,
}

/// Pinhole column renderer
pub struct Renderer {
    half_fov_tan: f32,
    jpeg_quality: u8,
}

impl Renderer {
    pub fn new(field_of_view_deg: f32, jpeg_quality: u8) -> Self {
        Self {
            half_fov_tan: (field_of_view_deg.to_radians() / 2.0).tan(),
            jpeg_quality,
        }
    }

    /// Render the view from `pose`.
    pub fn render(&self, track: &Track, pose: Pose, width: u32, height: u32) -> RgbImage {
        let focal = width as f32 / 2.0 / self.half_fov_tan;
        let horizon = height as f32 / 2.0;

        let columns: Vec<Column> = (0..width)
            .map(|c| {
                let offset = ((width as f32 / 2.0 - c as f32 - 0.5) / focal).atan();
                let angle = pose.heading + offset;
                let cos_offset = offset.cos();
                let (sin, cos) = angle.sin_cos();
                let (wall_rows, wall_color) = match track.ray_cast(pose.x, pose.y, angle, FAR_PLANE)
                {
                    Some(dist) => {
                        let depth = (dist * cos_offset).max(1e-3);
                        let top = horizon - (WALL_HEIGHT - EYE_HEIGHT) * focal / depth;
                        let bottom = horizon + EYE_HEIGHT * focal / depth;
                        ((top, bottom), shade(WALL, depth))
                    }
                    None => ((horizon, horizon), SKY),
                };
                Column {
                    wall_rows,
                    wall_color,
                    dir: (cos, sin),
                    cos_offset,
                }
            })
            .collect();

        RgbImage::from_fn(width, height, |x, y| {
            let col = &columns[x as usize];
            let row = y as f32 + 0.5;
            if row >= col.wall_rows.0 && row < col.wall_rows.1 {
                col.wall_color
            } else if row < horizon {
                SKY
            } else {
                let depth = EYE_HEIGHT * focal / (row - horizon);
                let ground = depth / col.cos_offset;
                let gx = pose.x + col.dir.0 * ground;
                let gy = pose.y + col.dir.1 * ground;
                match track.surface_at(gx, gy) {
                    Surface::Road => ROAD,
                    Surface::Infield => INFIELD,
                    Surface::Checkpoint => CHECKPOINT,
                }
            }
        })
    }

    /// Render and JPEG-encode the view from `pose`.
    pub fn capture(&self, track: &Track, pose: Pose, width: u32, height: u32) -> Result<Vec<u8>> {
        let image = self.render(track, pose, width, height);
        encode_jpeg(&image, self.jpeg_quality)
    }
}

/// Darken with distance
fn shade(base: [f32; 3], depth: f32) -> Rgb<u8> {
    let k = 1.0 / (1.0 + 0.08 * depth);
    Rgb(base.map(|c| (c * k).clamp(0.0, 255.0) as u8))
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .map_err(|e| Error::Capture(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}
