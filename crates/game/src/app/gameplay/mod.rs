pub(crate) mod ai;
pub(crate) mod art;
pub(crate) mod catalog;
pub(crate) mod enemy;
pub(crate) mod entity;
pub(crate) mod hazard;
pub(crate) mod level;
pub(crate) mod player;
pub(crate) mod tilemap;

/// Edge length of a floor plate sprite in pixels; the iso grid steps derive from it.
pub(crate) const TILE: u32 = 128;
pub(crate) const VIEW_WIDTH: u32 = 960;
pub(crate) const VIEW_HEIGHT: u32 = 540;
