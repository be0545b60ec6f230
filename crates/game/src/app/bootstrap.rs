use iso_engine::{
    resolve_app_paths, AppPaths, AssetError, AssetSource, DiskAssets, LoopConfig, Scene,
    StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::audio::TracingAudio;
use super::gameplay::art::{LevelArt, ProceduralArt};
use super::gameplay::catalog::{CatalogError, LevelCatalog};
use super::gameplay::level::LevelError;
use super::gameplay::{VIEW_HEIGHT, VIEW_WIDTH};
use super::scores::ScoreBoard;
use super::session::{GameSession, SessionOptions};
use super::settings::{ArtSource, Settings};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to load level art: {0}")]
    Art(#[from] AssetError),
    #[error("level failed validation: {0}")]
    Level(#[from] LevelError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Iso Prince Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "game_root_resolved");
    let settings = Settings::load_or_default(&paths.config_dir);
    let catalog = LevelCatalog::load_from_dir(&paths.levels_dir)?;
    let art = load_art(&paths, settings.art)?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        nick = %settings.nick,
        volume = settings.volume,
        chase_dead_zone = settings.chase_dead_zone,
        "session_options"
    );
    let scores = ScoreBoard::in_dir(&paths.saves_dir);
    info!(path = %scores.path().display(), "score_file");
    let session = GameSession::new(
        catalog,
        art,
        scores,
        TracingAudio::new(settings.volume),
        SessionOptions {
            nick: settings.nick,
            seed,
            chase_dead_zone: settings.chase_dead_zone,
            volume: settings.volume,
        },
    );
    session.validate_levels()?;

    let config = LoopConfig {
        buffer_width: VIEW_WIDTH,
        buffer_height: VIEW_HEIGHT,
        ..LoopConfig::default()
    };
    Ok(AppWiring {
        config,
        scene: Box::new(session),
    })
}

fn load_art(paths: &AppPaths, source: ArtSource) -> Result<LevelArt, AssetError> {
    let use_disk = match source {
        ArtSource::Disk => true,
        ArtSource::Procedural => false,
        ArtSource::Auto => paths.images_dir.is_dir(),
    };
    let mut assets: Box<dyn AssetSource> = if use_disk {
        Box::new(DiskAssets::new(paths.images_dir.clone()))
    } else {
        Box::new(ProceduralArt)
    };
    let art = LevelArt::load(assets.as_mut())?;
    info!(
        source = if use_disk { "disk" } else { "procedural" },
        "level_art_loaded"
    );
    Ok(art)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
