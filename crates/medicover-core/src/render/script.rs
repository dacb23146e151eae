//! Renderer backed by the external region computation script.
//!
//! Command contract:
//!
//! ```text
//! <python> <script> --db <db> --regions <regions.zip> --metier <code>... --out <gpkg> [--buffer <m>]
//! ```
//!
//! On success the script leaves its plot at `plot_path` (and optionally an
//! areas JSON at `areas_path`); both are moved into the cache directory.
//! Those paths are fixed, so one renderer runs at most one script at a time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::{info, warn};

use super::{MapRenderer, MapRequest, RenderError, RenderOutput};

#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Interpreter used to run the script.
    pub python: PathBuf,
    pub script: PathBuf,
    /// Practitioner database.
    pub db: PathBuf,
    /// Zipped administrative regions shapefile.
    pub regions: PathBuf,
    /// Clipped polygons output (GeoPackage).
    pub gpkg_out: PathBuf,
    /// Where the script writes its plot image.
    pub plot_path: PathBuf,
    /// Where the script writes region areas, if it does.
    pub areas_path: Option<PathBuf>,
    /// Working directory for the script. Defaults to the server's.
    pub workdir: Option<PathBuf>,
}

pub struct ScriptRenderer {
    config: ScriptConfig,
    // Held from spawn until the outputs are moved out of the shared paths.
    run_lock: Mutex<()>,
}

impl ScriptRenderer {
    pub fn new(config: ScriptConfig) -> Self {
        ScriptRenderer {
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    /// Builds the command line for `request` without running it.
    pub fn command(&self, request: &MapRequest) -> Command {
        let c = &self.config;
        let mut cmd = Command::new(&c.python);
        cmd.arg(&c.script)
            .arg("--db")
            .arg(&c.db)
            .arg("--regions")
            .arg(&c.regions)
            .arg("--metier")
            .args(request.professions())
            .arg("--out")
            .arg(&c.gpkg_out);
        if let Some(radius) = request.radius_m() {
            cmd.arg("--buffer").arg(radius.to_string());
        }
        if let Some(ref dir) = c.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Resolves a script-relative output path against the working directory.
    fn output_path(&self, path: &Path) -> PathBuf {
        match self.config.workdir {
            Some(ref dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl MapRenderer for ScriptRenderer {
    fn render(&self, request: &MapRequest, dest: &Path) -> Result<RenderOutput, RenderError> {
        let mut cmd = self.command(request);
        let _running = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        info!(
            professions = %request.professions().join(","),
            radius_m = ?request.radius_m(),
            script = %self.config.script.display(),
            "running region script"
        );
        let t0 = Instant::now();
        let output = cmd
            .output()
            .map_err(|e| RenderError::Spawn(format!("{}: {}", self.config.python.display(), e)))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !output.status.success() {
            warn!(status = ?output.status.code(), elapsed_ms, "region script failed");
            return Err(RenderError::Failed {
                status: output.status.code(),
                stderr,
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RenderError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        let plot = self.output_path(&self.config.plot_path);
        move_file(&plot, dest).map_err(|e| RenderError::Io(format!("{}: {}", plot.display(), e)))?;

        if let Some(ref areas) = self.config.areas_path {
            let areas = self.output_path(areas);
            if areas.is_file() {
                let stem = dest.file_stem().map(|s| s.to_string_lossy().into_owned());
                if let Some(stem) = stem {
                    let target = dest.with_file_name(format!("{}.areas.json", stem));
                    if let Err(e) = move_file(&areas, &target) {
                        warn!(path = %areas.display(), error = %e, "failed to move areas file");
                    }
                }
            }
        }

        info!(dest = %dest.display(), elapsed_ms, "map image generated");
        Ok(RenderOutput { stdout, stderr })
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_into_place(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Copies to a hidden sibling of `to`, then renames it over `to`, so readers
/// of `to` never see a partial file.
fn copy_into_place(from: &Path, to: &Path) -> io::Result<()> {
    let name = to
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
    let partial = to.with_file_name(format!(".{}.part", name.to_string_lossy()));
    if let Err(e) = fs::copy(from, &partial).and_then(|_| fs::rename(&partial, to)) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> ScriptConfig {
        ScriptConfig {
            python: PathBuf::from("python3"),
            script: PathBuf::from("backend/compute_regions.py"),
            db: PathBuf::from("data_extraction/GrandEst.db"),
            regions: PathBuf::from("data/regions.zip"),
            gpkg_out: PathBuf::from("data/voronoi_clipped.gpkg"),
            plot_path: PathBuf::from("data/voronoi_plot.png"),
            areas_path: None,
            workdir: Some(dir.to_path_buf()),
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ScriptRenderer::new(config(dir.path()));
        let req = MapRequest::parse("10,21", None).unwrap();
        let cmd = renderer.command(&req);
        assert_eq!(cmd.get_program(), "python3");
        assert_eq!(
            args(&cmd),
            vec![
                "backend/compute_regions.py",
                "--db",
                "data_extraction/GrandEst.db",
                "--regions",
                "data/regions.zip",
                "--metier",
                "10",
                "21",
                "--out",
                "data/voronoi_clipped.gpkg",
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(dir.path()));
    }

    #[test]
    fn test_command_line_with_radius() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ScriptRenderer::new(config(dir.path()));
        let req = MapRequest::parse("60", Some(2500.0)).unwrap();
        let a = args(&renderer.command(&req));
        assert_eq!(&a[a.len() - 2..], &["--buffer", "2500"]);
    }

    #[test]
    fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.python = dir.path().join("no-such-interpreter");
        let renderer = ScriptRenderer::new(cfg);
        let req = MapRequest::parse("10", None).unwrap();
        let err = renderer
            .render(&req, &dir.path().join("out/10.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn(_)));
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake.sh");
        fs::write(&path, body).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_render_moves_plot_into_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let script = write_script(
            dir.path(),
            "echo \"args: $*\"\nprintf 'PNG' > data/voronoi_plot.png\nprintf '[1.0,2.0]' > data/areas.json\n",
        );
        let mut cfg = config(dir.path());
        cfg.python = PathBuf::from("sh");
        cfg.script = script;
        cfg.areas_path = Some(PathBuf::from("data/areas.json"));
        let renderer = ScriptRenderer::new(cfg);

        let req = MapRequest::parse("10,21", None).unwrap();
        let dest = dir.path().join("public/generatedImages/10,21.png");
        let out = renderer.render(&req, &dest).unwrap();

        assert!(out.stdout.contains("--metier 10 21"));
        assert_eq!(fs::read(&dest).unwrap(), b"PNG");
        assert!(!dir.path().join("data/voronoi_plot.png").exists());
        assert!(dir
            .path()
            .join("public/generatedImages/10,21.areas.json")
            .is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_render_failure_passes_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo 'No praticien found' >&2\nexit 3\n");
        let mut cfg = config(dir.path());
        cfg.python = PathBuf::from("sh");
        cfg.script = script;
        let renderer = ScriptRenderer::new(cfg);

        let req = MapRequest::parse("99", None).unwrap();
        let err = renderer
            .render(&req, &dir.path().join("99.png"))
            .unwrap_err();
        match err {
            RenderError::Failed { status, stderr } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr.trim(), "No praticien found");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_copy_into_place_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("plot.png");
        let to = dir.path().join("cache/10.png");
        fs::create_dir(dir.path().join("cache")).unwrap();
        fs::write(&from, b"PNG").unwrap();
        fs::write(&to, b"old").unwrap();

        copy_into_place(&from, &to).unwrap();

        assert_eq!(fs::read(&to).unwrap(), b"PNG");
        assert!(from.is_file());
        let names: Vec<_> = fs::read_dir(dir.path().join("cache"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["10.png"]);
    }

    #[test]
    fn test_copy_into_place_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let to = dir.path().join("10.png");
        assert!(copy_into_place(&dir.path().join("missing.png"), &to).is_err());
        assert!(!to.exists());
        assert!(!dir.path().join(".10.png.part").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_concurrent_renders_keep_their_own_plot() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        // $6 is the first --metier code.
        let script = write_script(
            dir.path(),
            "printf \"plot-for-$6\" > data/voronoi_plot.png\nsleep 0.3\n",
        );
        let mut cfg = config(dir.path());
        cfg.python = PathBuf::from("sh");
        cfg.script = script;
        let renderer = std::sync::Arc::new(ScriptRenderer::new(cfg));
        let cache = dir.path().join("generatedImages");

        let handles: Vec<_> = ["10", "21"]
            .into_iter()
            .map(|code| {
                let renderer = renderer.clone();
                let dest = cache.join(format!("{}.png", code));
                std::thread::spawn(move || {
                    let req = MapRequest::parse(code, None).unwrap();
                    renderer.render(&req, &dest)
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        assert_eq!(fs::read_to_string(cache.join("10.png")).unwrap(), "plot-for-10");
        assert_eq!(fs::read_to_string(cache.join("21.png")).unwrap(), "plot-for-21");
    }

    #[cfg(unix)]
    #[test]
    fn test_render_missing_plot_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "exit 0\n");
        let mut cfg = config(dir.path());
        cfg.python = PathBuf::from("sh");
        cfg.script = script;
        let renderer = ScriptRenderer::new(cfg);

        let req = MapRequest::parse("10", None).unwrap();
        let err = renderer
            .render(&req, &dir.path().join("10.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
