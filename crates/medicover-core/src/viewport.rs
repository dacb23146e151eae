//! Pan/zoom model for the generated map image.
//!
//! The image is drawn with its transform origin at the top-left corner, so a
//! point `p` of the image lands on screen at `translate + scale * p`. All
//! coordinates are CSS pixels relative to the viewport.

use serde::Serialize;

/// How the image is kept inside the viewport while panning and zooming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum Contain {
    /// No clamping.
    None,
    /// The image never leaves the viewport.
    Inside,
    /// The image always covers the viewport on axes where it is larger;
    /// smaller axes are centered.
    #[default]
    Outside,
}

/// Zoom limits and wheel step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        ZoomLimits {
            min_scale: 0.1,
            max_scale: 10.0,
            step: 0.1,
        }
    }
}

/// Current image transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    image: (f64, f64),
    view: (f64, f64),
    limits: ZoomLimits,
    contain: Contain,
    start: Transform,
    current: Transform,
}

impl Viewport {
    /// Creates a viewport showing the whole image (fit scale), constrained by
    /// `limits` and `contain`. Zero or negative sizes are treated as 1px.
    pub fn new(
        image_size: (f64, f64),
        view_size: (f64, f64),
        limits: ZoomLimits,
        contain: Contain,
    ) -> Self {
        let image = (image_size.0.max(1.0), image_size.1.max(1.0));
        let view = (view_size.0.max(1.0), view_size.1.max(1.0));
        let fit = (view.0 / image.0).min(view.1 / image.1);
        let mut vp = Viewport {
            image,
            view,
            limits,
            contain,
            start: Transform {
                x: 0.0,
                y: 0.0,
                scale: fit,
            },
            current: Transform {
                x: 0.0,
                y: 0.0,
                scale: fit,
            },
        };
        vp.current.scale = vp.constrain_scale(fit);
        vp.constrain_pan();
        vp.start = vp.current;
        vp
    }

    /// Scale that shows the whole image inside the viewport.
    pub fn fit_scale(&self) -> f64 {
        (self.view.0 / self.image.0).min(self.view.1 / self.image.1)
    }

    pub fn transform(&self) -> Transform {
        self.current
    }

    pub fn start_transform(&self) -> Transform {
        self.start
    }

    pub fn scale(&self) -> f64 {
        self.current.scale
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Moves the image by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.current.x += dx;
        self.current.y += dy;
        self.constrain_pan();
    }

    /// Zooms to `scale`, keeping the screen point `focal` fixed.
    pub fn zoom_to_point(&mut self, scale: f64, focal: (f64, f64)) {
        let new_scale = self.constrain_scale(scale);
        // Image-space point currently under the focal point.
        let px = (focal.0 - self.current.x) / self.current.scale;
        let py = (focal.1 - self.current.y) / self.current.scale;
        self.current.scale = new_scale;
        self.current.x = focal.0 - new_scale * px;
        self.current.y = focal.1 - new_scale * py;
        self.constrain_pan();
    }

    /// Mouse wheel zoom. Negative `delta_y` (wheel up) zooms in.
    /// A purely horizontal wheel uses `delta_x` instead.
    pub fn zoom_with_wheel(&mut self, delta_x: f64, delta_y: f64, focal: (f64, f64)) {
        let delta = if delta_y == 0.0 { delta_x } else { delta_y };
        if delta == 0.0 {
            return;
        }
        let direction = if delta < 0.0 { 1.0 } else { -1.0 };
        let target = self.current.scale * (direction * self.limits.step / 3.0).exp();
        self.zoom_to_point(target, focal);
    }

    /// Back to the start transform.
    pub fn reset(&mut self) {
        self.current = self.start;
    }

    /// Resizes the viewport and re-clamps the current transform.
    pub fn resize(&mut self, view_size: (f64, f64)) {
        self.view = (view_size.0.max(1.0), view_size.1.max(1.0));
        self.current.scale = self.constrain_scale(self.current.scale);
        self.constrain_pan();
    }

    fn constrain_scale(&self, scale: f64) -> f64 {
        let mut min = self.limits.min_scale;
        let max = self.limits.max_scale;
        if self.contain == Contain::Inside {
            min = min.min(self.fit_scale());
        }
        if !scale.is_finite() {
            return min;
        }
        scale.clamp(min, max.max(min))
    }

    fn constrain_pan(&mut self) {
        let w = self.image.0 * self.current.scale;
        let h = self.image.1 * self.current.scale;
        match self.contain {
            Contain::None => {}
            Contain::Outside => {
                self.current.x = clamp_outside(self.current.x, w, self.view.0);
                self.current.y = clamp_outside(self.current.y, h, self.view.1);
            }
            Contain::Inside => {
                self.current.x = clamp_inside(self.current.x, w, self.view.0);
                self.current.y = clamp_inside(self.current.y, h, self.view.1);
            }
        }
    }
}

/// Image edge stays outside the viewport; a smaller image is centered.
fn clamp_outside(pos: f64, size: f64, view: f64) -> f64 {
    if size <= view {
        (view - size) / 2.0
    } else {
        pos.clamp(view - size, 0.0)
    }
}

/// Image stays within the viewport; a larger image behaves like `Outside`.
fn clamp_inside(pos: f64, size: f64, view: f64) -> f64 {
    if size <= view {
        pos.clamp(0.0, view - size)
    } else {
        pos.clamp(view - size, 0.0)
    }
}
