//! Map generation: requests, the image cache, and the renderer abstraction.
//!
//! The tessellation itself happens in an external script. This module only
//! knows how to name the resulting image, whether it already exists, and how
//! to invoke a renderer when it does not.

mod cache;
mod script;

pub use cache::{IMAGE_URL_PREFIX, ImageCache};
pub use script::{ScriptConfig, ScriptRenderer};

use std::path::Path;

use crate::slider::MAX_RADIUS_M;

/// Error types for an invalid map request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No profession code was given.
    NoProfessions,
    /// A code contains characters that cannot appear in a file name.
    InvalidCode(String),
    /// Radius is not a number in `0..=10000`.
    InvalidRadius(String),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::NoProfessions => write!(f, "no profession selected"),
            RequestError::InvalidCode(code) => write!(f, "invalid profession code: {:?}", code),
            RequestError::InvalidRadius(r) => write!(f, "invalid cluster radius: {}", r),
        }
    }
}

impl std::error::Error for RequestError {}

/// Error types that can occur while rendering a map.
#[derive(Debug, Clone)]
pub enum RenderError {
    /// The renderer process could not be started.
    Spawn(String),
    /// The renderer exited unsuccessfully. `stderr` is passed through verbatim.
    Failed { status: Option<i32>, stderr: String },
    /// Moving the output into the cache failed.
    Io(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Spawn(msg) => write!(f, "failed to start renderer: {}", msg),
            RenderError::Failed { status, stderr } => match status {
                Some(code) => write!(f, "renderer exited with status {}: {}", code, stderr),
                None => write!(f, "renderer terminated by signal: {}", stderr),
            },
            RenderError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// A request for one coverage map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapRequest {
    professions: Vec<String>,
    radius_m: Option<u32>,
}

impl MapRequest {
    /// Builds a request from already separated codes.
    pub fn new(professions: Vec<String>, radius_m: Option<f64>) -> Result<Self, RequestError> {
        let professions: Vec<String> = professions
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if professions.is_empty() {
            return Err(RequestError::NoProfessions);
        }
        if let Some(bad) = professions.iter().find(|c| !is_valid_code(c)) {
            return Err(RequestError::InvalidCode(bad.clone()));
        }
        let radius_m = match radius_m {
            None => None,
            Some(r) if r.is_finite() && (0.0..=MAX_RADIUS_M).contains(&r) => Some(r.round() as u32),
            Some(r) => return Err(RequestError::InvalidRadius(r.to_string())),
        };
        Ok(MapRequest {
            professions,
            radius_m,
        })
    }

    /// Parses the `professions=a,b,c` query value.
    pub fn parse(professions: &str, radius_m: Option<f64>) -> Result<Self, RequestError> {
        Self::new(
            professions.split(',').map(str::to_string).collect(),
            radius_m,
        )
    }

    pub fn professions(&self) -> &[String] {
        &self.professions
    }

    pub fn radius_m(&self) -> Option<u32> {
        self.radius_m
    }

    /// File stem: comma-joined codes, plus `@<radius>m` when a radius is set.
    pub fn image_stem(&self) -> String {
        let joined = self.professions.join(",");
        match self.radius_m {
            Some(r) => format!("{}@{}m", joined, r),
            None => joined,
        }
    }

    /// Image file name, e.g. `"10,21.png"` or `"10,21@850m.png"`.
    pub fn image_name(&self) -> String {
        format!("{}.png", self.image_stem())
    }
}

fn is_valid_code(code: &str) -> bool {
    code.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Captured output of a successful render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Produces the map image for a request at `dest`.
///
/// Implementations block until the image is written; callers on an async
/// runtime should run them on a blocking thread.
pub trait MapRenderer: Send + Sync {
    fn render(&self, request: &MapRequest, dest: &Path) -> Result<RenderOutput, RenderError>;
}
