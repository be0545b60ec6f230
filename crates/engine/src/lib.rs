use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;
pub mod camera;
pub mod geometry;
pub mod mask;
pub mod storage;

pub use app::{
    run_app, AppError, Canvas, InputAction, InputSnapshot, LoopConfig, LoopMetricsSnapshot,
    RenderError, Renderer, Scene, SceneCommand, SLOW_FRAME_ENV_VAR,
};
pub use assets::{AssetError, AssetSource, DiskAssets, Sprite};
pub use camera::EdgeScrollCamera;
pub use geometry::{GridDir, IsoProjection, Rect, Vec2};
pub use mask::{masks_overlap, FloorMask, Mask};

pub const ROOT_ENV_VAR: &str = "ISO_PRINCE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub levels_dir: PathBuf,
    pub config_dir: PathBuf,
    pub saves_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "{env_var} is set but does not point to a game root: {path}\n\
A game root must contain an assets/levels directory."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not find the game root by walking upward from {start_dir} or the working directory.\n\
Expected a directory containing assets/levels.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/iso-prince\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Locates the game root and creates the writable `config/` and `saves/` directories.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = AppPaths::under(&root);

    for dir in [&paths.config_dir, &paths.saves_dir] {
        fs::create_dir_all(dir).map_err(|source| StartupError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    Ok(paths)
}

impl AppPaths {
    pub fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            images_dir: root.join("assets").join("images"),
            levels_dir: root.join("assets").join("levels"),
            config_dir: root.join("config"),
            saves_dir: root.join("saves"),
        }
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_game_root(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            if let Some(found) = exe_dir.ancestors().find(|candidate| is_game_root(candidate)) {
                return Ok(normalize_path(found));
            }
            if let Ok(cwd) = env::current_dir() {
                if let Some(found) = cwd.ancestors().find(|candidate| is_game_root(candidate)) {
                    return Ok(normalize_path(found));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_game_root(path: &Path) -> bool {
    path.join("assets").join("levels").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
