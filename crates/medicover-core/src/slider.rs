//! Cluster range slider.
//!
//! The slider runs linearly from 0 to 100, but the radius it selects grows
//! exponentially so the low end has fine resolution in meters while the top
//! end still reaches 10 km:
//!
//! ```text
//! radius = (MAX_RADIUS_M + 1) ^ (position / 100) - 1
//! ```

use crate::fmt::format_radius;

/// Largest slider position.
pub const MAX_POSITION: u8 = 100;

/// Radius selected at `MAX_POSITION`, in meters.
pub const MAX_RADIUS_M: f64 = 10_000.0;

/// Maps a slider position (clamped to `0..=100`) to a radius in meters.
pub fn position_to_radius(position: u8) -> f64 {
    let t = f64::from(position.min(MAX_POSITION)) / f64::from(MAX_POSITION);
    let radius = (MAX_RADIUS_M + 1.0).powf(t) - 1.0;
    radius.clamp(0.0, MAX_RADIUS_M)
}

/// Inverse of [`position_to_radius`], rounded to the nearest position.
pub fn radius_to_position(radius_m: f64) -> u8 {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return 0;
    }
    let r = radius_m.min(MAX_RADIUS_M);
    let t = (r + 1.0).ln() / (MAX_RADIUS_M + 1.0).ln();
    (t * f64::from(MAX_POSITION)).round() as u8
}

/// Slider state as shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClusterSlider {
    position: u8,
}

impl ClusterSlider {
    pub fn new(position: u8) -> Self {
        ClusterSlider {
            position: position.min(MAX_POSITION),
        }
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn set_position(&mut self, position: u8) {
        self.position = position.min(MAX_POSITION);
    }

    /// Radius in meters for the current position.
    pub fn radius(&self) -> f64 {
        position_to_radius(self.position)
    }

    /// Label shown above the slider, e.g. `"Cluster range: 2.5 km"`.
    pub fn label(&self) -> String {
        format!("Cluster range: {}", format_radius(self.radius()))
    }
}
