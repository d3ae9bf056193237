/// Colour atlas baking for triangle billboards
use crate::chunker::{GeometryChunk, total_vertices};
use crate::error::{GeneratorError, GeneratorResult};
use crate::math::{inverse_lerp, square_grid_side};
use crate::point_cloud::Rgba;
use constants::baking::{
    DEFAULT_CELL_SIZE, DEFAULT_QUANTIZATION_LEVELS, SWATCH_ANCHOR, SWATCH_FALLOFF_INNER,
    SWATCH_FALLOFF_OUTER,
};
use glam::{Vec2, Vec4};
use image::{Rgba as Pixel, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration parameters for atlas baking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeParams {
    /// Buckets per colour channel (the quantisation level D).
    pub quantization_levels: u32,
    /// Swatch cell edge length in pixels.
    pub cell_size: u32,
}

impl Default for BakeParams {
    fn default() -> Self {
        Self {
            quantization_levels: DEFAULT_QUANTIZATION_LEVELS,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl BakeParams {
    pub fn validate(&self) -> GeneratorResult<()> {
        if self.quantization_levels == 0 {
            return Err(GeneratorError::InvalidConfig(
                "quantization_levels must be positive".into(),
            ));
        }
        if self.cell_size == 0 {
            return Err(GeneratorError::InvalidConfig(
                "cell_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Integer bucket per colour channel; equal keys mean equal quantised colours.
/// Alpha is not part of the key.
type QuantizedKey = [i64; 3];

fn bucket_key(colour: Rgba, levels: u32) -> QuantizedKey {
    let d = levels as f32;
    colour.truncate().to_array().map(|c| (c * d).floor() as i64)
}

/// Snaps RGB down to the nearest multiple of `1 / levels`. Swatches are always opaque.
pub fn quantize(colour: Rgba, levels: u32) -> Rgba {
    let d = levels as f32;
    let [r, g, b] = bucket_key(colour, levels).map(|bucket| bucket as f32 / d);
    Vec4::new(r, g, b, 1.0)
}

/// Unique quantised triangle colours in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    /// Quantised colours; position is the atlas placement order.
    colours: Vec<Rgba>,
    /// Exact-match lookup from bucket key to palette index.
    lookup: HashMap<QuantizedKey, usize>,
    /// Palette index of each triangle, in chunk order.
    colour_index_of: Vec<usize>,
}

impl Palette {
    /// Records a triangle colour and returns its palette index.
    fn insert(&mut self, colour: Rgba, levels: u32) -> usize {
        let key = bucket_key(colour, levels);
        let next_index = self.colours.len();
        let index = *self.lookup.entry(key).or_insert(next_index);
        if index == next_index {
            self.colours.push(quantize(colour, levels));
        }
        self.colour_index_of.push(index);
        index
    }

    pub fn colours(&self) -> &[Rgba] {
        &self.colours
    }

    pub fn colour_index_of(&self) -> &[usize] {
        &self.colour_index_of
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}

/// Baked atlas image with the palette it was painted from.
#[derive(Debug, Clone)]
pub struct ColorAtlas {
    /// RGBA8 pixels, top row first.
    pub image: RgbaImage,
    /// Unique quantised colours in placement order.
    pub palette: Vec<Rgba>,
    /// Palette index of each triangle across all baked chunks.
    pub colour_index_of: Vec<usize>,
    /// Swatch cells per atlas row (and column).
    pub columns: usize,
    /// Swatch cell edge length in pixels.
    pub cell_size: u32,
}

impl ColorAtlas {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn triangle_count(&self) -> usize {
        self.colour_index_of.len()
    }

    /// Half a cell in UV units along each axis.
    pub fn half_cell(&self) -> Vec2 {
        Vec2::new(
            0.5 * self.cell_size as f32 / self.width() as f32,
            0.5 * self.cell_size as f32 / self.height() as f32,
        )
    }

    /// UV centre of a palette entry's swatch, with v growing upward.
    pub fn cell_centre(&self, colour_index: usize) -> Vec2 {
        let cell = self.cell_size as f32;
        let x = (colour_index % self.columns) as f32 * cell / self.width() as f32;
        let y = (colour_index / self.columns) as f32 * cell / self.height() as f32;
        Vec2::new(x, y) + self.half_cell()
    }

    /// UVs for the three vertices of a triangle using this swatch.
    pub fn triangle_uvs(&self, colour_index: usize) -> [Vec2; 3] {
        let centre = self.cell_centre(colour_index);
        let half = self.half_cell();
        let right = Vec2::new(half.x, 0.0);
        let up = Vec2::new(0.0, half.y);

        [centre + right - up, centre + up, centre - right - up]
    }
}

/// Bakes per-triangle colours of triangle chunks into a swatch atlas.
#[derive(Debug, Clone)]
pub struct ColorAtlasBaker {
    params: BakeParams,
}

impl ColorAtlasBaker {
    pub fn new(params: BakeParams) -> GeneratorResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BakeParams {
        &self.params
    }

    /// Runs all three passes and writes atlas UVs into every chunk.
    /// Chunks are left untouched when the palette would be empty.
    pub fn bake(&self, chunks: &mut [GeometryChunk]) -> GeneratorResult<ColorAtlas> {
        let palette = self.build_palette(chunks)?;
        let atlas = self.paint(palette)?;
        remap_uvs(&atlas, chunks)?;

        log::info!(
            "Baked {} triangles into {} swatches ({}x{} atlas)",
            atlas.triangle_count(),
            atlas.palette.len(),
            atlas.width(),
            atlas.height()
        );

        Ok(atlas)
    }

    /// Pass 1: quantise each triangle's first vertex colour and deduplicate.
    pub fn build_palette(&self, chunks: &[GeometryChunk]) -> GeneratorResult<Palette> {
        check_whole_triangles(chunks)?;

        let levels = self.params.quantization_levels;
        let mut palette = Palette {
            colour_index_of: Vec::with_capacity(total_vertices(chunks) / 3),
            ..Default::default()
        };

        for chunk in chunks {
            for colour in chunk.colours.iter().step_by(3) {
                palette.insert(*colour, levels);
            }
        }

        Ok(palette)
    }

    /// Pass 2: size the atlas from the finished palette and stamp one swatch per entry.
    pub fn paint(&self, palette: Palette) -> GeneratorResult<ColorAtlas> {
        if palette.is_empty() {
            return Err(GeneratorError::DegenerateInput(
                "no triangles to bake into a colour atlas",
            ));
        }

        let cell = self.params.cell_size;
        let columns = square_grid_side(palette.len());
        let side = cell * columns as u32;
        let mut image = RgbaImage::new(side, side);

        let stamp = swatch_alpha_mask(cell);
        for (index, colour) in palette.colours.iter().enumerate() {
            let cell_x = (index % columns) as u32 * cell;
            let cell_y = (index / columns) as u32 * cell;

            for iy in 0..cell {
                for ix in 0..cell {
                    let alpha = stamp[(iy * cell + ix) as usize];
                    let pixel = to_pixel(*colour * alpha);
                    // Stamp rows count up from the bottom of the image.
                    image.put_pixel(cell_x + ix, side - 1 - (cell_y + iy), pixel);
                }
            }
        }

        Ok(ColorAtlas {
            image,
            palette: palette.colours,
            colour_index_of: palette.colour_index_of,
            columns,
            cell_size: cell,
        })
    }
}

/// Pass 3: point every triangle's vertices at its swatch.
pub fn remap_uvs(atlas: &ColorAtlas, chunks: &mut [GeometryChunk]) -> GeneratorResult<()> {
    check_whole_triangles(chunks)?;
    let triangles = total_vertices(chunks) / 3;
    if triangles != atlas.triangle_count() {
        return Err(GeneratorError::ChunkCountMismatch {
            chunk_vertices: triangles * 3,
            cloud_vertices: atlas.triangle_count() * 3,
        });
    }

    let mut colour_indices = atlas.colour_index_of.iter();
    for chunk in chunks.iter_mut() {
        chunk.uvs = Vec::with_capacity(chunk.len());
        for _ in 0..chunk.len() / 3 {
            // Lengths were checked above.
            let Some(&colour_index) = colour_indices.next() else {
                break;
            };
            chunk.uvs.extend(atlas.triangle_uvs(colour_index));
        }
    }

    Ok(())
}

/// Soft disc opacity for each pixel of a cell, rows counted from the bottom.
fn swatch_alpha_mask(cell: u32) -> Vec<f32> {
    let anchor = Vec2::from_array(SWATCH_ANCHOR);
    let size = cell as f32;

    (0..cell * cell)
        .map(|c| {
            let pos = Vec2::new((c % cell) as f32 / size, (c / cell) as f32 / size);
            let dist = anchor.distance(pos).clamp(0.0, 1.0);
            1.0 - inverse_lerp(SWATCH_FALLOFF_INNER, SWATCH_FALLOFF_OUTER, dist)
        })
        .collect()
}

fn to_pixel(colour: Rgba) -> Pixel<u8> {
    Pixel(colour.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

fn check_whole_triangles(chunks: &[GeometryChunk]) -> GeneratorResult<()> {
    match chunks.iter().position(|chunk| chunk.len() % 3 != 0) {
        Some(chunk) => Err(GeneratorError::IncompleteTriangles { chunk }),
        None => Ok(()),
    }
}
