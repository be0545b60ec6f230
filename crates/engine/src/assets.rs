use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::mask::Mask;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image not found: {path}")]
    Missing { path: PathBuf },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("animation {folder} requested with zero frames")]
    EmptyAnimation { folder: String },
    #[error("pixel buffer for {width}x{height} sprite has {actual} bytes, expected {expected}")]
    BadPixelBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Immutable RGBA8 image plus its collision mask. Clones share pixel storage.
#[derive(Debug, Clone)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Arc<[u8]>,
    mask: Arc<Mask>,
}

impl Sprite {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::BadPixelBuffer {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let mask = Mask::from_rgba(width, height, &rgba);
        Ok(Self {
            width,
            height,
            rgba: rgba.into(),
            mask: Arc::new(mask),
        })
    }

    pub fn from_fn(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&pixel(x, y));
            }
        }
        let mask = Mask::from_rgba(width, height, &rgba);
        Self {
            width,
            height,
            rgba: rgba.into(),
            mask: Arc::new(mask),
        }
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    /// Nearest-neighbour resize. Target dimensions truncate and never drop below one pixel.
    pub fn scaled(&self, factor: f32) -> Self {
        let target_w = ((self.width as f32 * factor) as u32).max(1);
        let target_h = ((self.height as f32 * factor) as u32).max(1);
        if (target_w, target_h) == self.size() {
            return self.clone();
        }
        Self::from_fn(target_w, target_h, |x, y| {
            let src_x = (x as u64 * self.width as u64 / target_w as u64) as u32;
            let src_y = (y as u64 * self.height as u64 / target_h as u64) as u32;
            self.pixel(src_x, src_y)
        })
    }

    /// Alpha-composites layers, in order, onto a transparent image of the given size.
    pub fn composite<'a>(
        width: u32,
        height: u32,
        layers: impl IntoIterator<Item = (&'a Sprite, (i32, i32))>,
    ) -> Self {
        let mut rgba = vec![0u8; width as usize * height as usize * 4];
        for (layer, (left, top)) in layers {
            for sy in 0..layer.height {
                let dy = top + sy as i32;
                if dy < 0 || dy >= height as i32 {
                    continue;
                }
                for sx in 0..layer.width {
                    let dx = left + sx as i32;
                    if dx < 0 || dx >= width as i32 {
                        continue;
                    }
                    let src = layer.pixel(sx, sy);
                    if src[3] == 0 {
                        continue;
                    }
                    let offset = (dy as usize * width as usize + dx as usize) * 4;
                    let dst = &mut rgba[offset..offset + 4];
                    blend_over(dst, src, 255);
                }
            }
        }
        let mask = Mask::from_rgba(width, height, &rgba);
        Self {
            width,
            height,
            rgba: rgba.into(),
            mask: Arc::new(mask),
        }
    }
}

/// Source-over blend of `src` (scaled by `opacity`) onto an RGBA8 destination pixel.
pub fn blend_over(dst: &mut [u8], src: [u8; 4], opacity: u8) {
    let src_alpha = src[3] as u32 * opacity as u32 / 255;
    if src_alpha == 0 {
        return;
    }
    if src_alpha == 255 {
        dst[..4].copy_from_slice(&src);
        return;
    }
    let inv = 255 - src_alpha;
    for channel in 0..3 {
        dst[channel] = ((src[channel] as u32 * src_alpha + dst[channel] as u32 * inv) / 255) as u8;
    }
    dst[3] = (src_alpha + dst[3] as u32 * inv / 255).min(255) as u8;
}

/// Where sprites come from. Implementations own their caches.
pub trait AssetSource {
    /// Loads a single image by path relative to the image root.
    fn load_image(&mut self, path: &str) -> Result<Sprite, AssetError>;

    /// Loads `folder/folder_1.png ..= folder/folder_{count}.png`. The first frame must exist;
    /// a later gap repeats the previous frame so the sequence keeps its length.
    fn load_animation(&mut self, folder: &str, count: usize) -> Result<Vec<Sprite>, AssetError> {
        if count == 0 {
            return Err(AssetError::EmptyAnimation {
                folder: folder.to_string(),
            });
        }
        let mut frames: Vec<Sprite> = Vec::with_capacity(count);
        for index in 1..=count {
            let path = animation_frame_path(folder, index);
            match self.load_image(&path) {
                Ok(sprite) => frames.push(sprite),
                Err(AssetError::Missing { path }) if !frames.is_empty() => {
                    warn!(path = %path.display(), "animation_frame_missing_repeating_previous");
                    let previous = frames[frames.len() - 1].clone();
                    frames.push(previous);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(frames)
    }
}

pub fn animation_frame_path(folder: &str, index: usize) -> String {
    format!("{folder}/{folder}_{index}.png")
}

/// PNG images under a root directory, decoded once per path.
#[derive(Debug)]
pub struct DiskAssets {
    root: PathBuf,
    cache: HashMap<String, Sprite>,
}

impl DiskAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl AssetSource for DiskAssets {
    fn load_image(&mut self, path: &str) -> Result<Sprite, AssetError> {
        if let Some(sprite) = self.cache.get(path) {
            return Ok(sprite.clone());
        }
        let full_path = self.root.join(path);
        let sprite = decode_png(&full_path)?;
        debug!(
            path = %full_path.display(),
            width = sprite.width(),
            height = sprite.height(),
            "image_loaded"
        );
        self.cache.insert(path.to_string(), sprite.clone());
        Ok(sprite)
    }
}

fn decode_png(path: &Path) -> Result<Sprite, AssetError> {
    if !path.is_file() {
        return Err(AssetError::Missing {
            path: path.to_path_buf(),
        });
    }
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Sprite::from_rgba(image.width(), image.height(), image.into_raw())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};

    use super::*;

    fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        image.save(path).expect("save png");
    }

    #[test]
    fn scaled_halves_dimensions_and_keeps_mask() {
        let sprite = Sprite::solid(128, 128, [10, 20, 30, 255]);
        let half = sprite.scaled(0.5);
        assert_eq!(half.size(), (64, 64));
        assert_eq!(half.mask().count(), 64 * 64);
        assert_eq!(half.pixel(63, 63), [10, 20, 30, 255]);
    }

    #[test]
    fn composite_builds_union_mask() {
        let block = Sprite::solid(4, 4, [255, 255, 255, 255]);
        let surface = Sprite::composite(10, 4, [(&block, (0, 0)), (&block, (6, 0))]);
        assert_eq!(surface.mask().count(), 32);
        assert!(!surface.mask().get(5, 1));
        assert!(surface.mask().get(6, 1));
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        let error = Sprite::from_rgba(2, 2, vec![0; 12]).expect_err("short buffer");
        assert!(matches!(error, AssetError::BadPixelBuffer { expected: 16, .. }));
    }

    #[test]
    fn blend_over_mixes_by_alpha_and_opacity() {
        let mut dst = [0u8, 0, 0, 255];
        blend_over(&mut dst, [255, 255, 255, 255], 128);
        assert_eq!(dst[0], 128);

        let mut untouched = [9u8, 9, 9, 255];
        blend_over(&mut untouched, [255, 0, 0, 255], 0);
        assert_eq!(untouched, [9, 9, 9, 255]);
    }

    #[test]
    fn disk_assets_cache_decoded_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("ladder/ladder.png"), 8, 6, [1, 2, 3, 255]);

        let mut assets = DiskAssets::new(dir.path());
        let first = assets.load_image("ladder/ladder.png").expect("load");
        let second = assets.load_image("ladder/ladder.png").expect("cached");
        assert_eq!(first.size(), (8, 6));
        assert_eq!(second.size(), (8, 6));
        assert_eq!(assets.cached_count(), 1);
    }

    #[test]
    fn missing_first_frame_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut assets = DiskAssets::new(dir.path());
        let error = assets.load_animation("bat", 3).expect_err("missing");
        assert!(matches!(error, AssetError::Missing { .. }));
    }

    #[test]
    fn missing_later_frames_repeat_previous() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(&dir.path().join("bat/bat_1.png"), 4, 4, [255, 0, 0, 255]);
        write_png(&dir.path().join("bat/bat_2.png"), 4, 4, [0, 255, 0, 255]);

        let mut assets = DiskAssets::new(dir.path());
        let frames = assets.load_animation("bat", 4).expect("frames");
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[2].pixel(0, 0), [0, 255, 0, 255]);
        assert_eq!(frames[3].pixel(0, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn zero_frame_animation_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut assets = DiskAssets::new(dir.path());
        assert!(matches!(
            assets.load_animation("bat", 0),
            Err(AssetError::EmptyAnimation { .. })
        ));
    }
}
