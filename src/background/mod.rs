//! Sky background estimation and subtraction.
//!
//! The valid region is divided into a coarse grid of tiles whose medians act as
//! control points at the tile centres. A Catmull-Rom bicubic surface through
//! those points is evaluated at every region pixel and subtracted in place.
//!
//! # Tile geometry
//!
//! `tiles_x = region_width / min_tile_size` and the tile width is
//! `region_width / tiles_x`, so tiles are never smaller than requested. The
//! few pixels left over by the integer division are folded into the last tile
//! of each row/column when taking medians.
//!
//! Because control points sit at tile centres, the surface is evaluated over
//! tile-sized spans offset by half a tile. One virtual span before the first
//! tile and as many as needed after the last cover the region edges; their
//! control points are clamped to the nearest real tile.

pub mod interp;

use crate::image::{Image, Region};
use crate::trace::{trace_event, trace_span};
use crate::util::error::try_zeroed;
use crate::util::math::median_in_place;
use crate::util::{PixelShiftError, PixelShiftResult};
use interp::bicubic_interpolate;

/// Grid of tile medians over an image's valid region.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    medians: Vec<f64>,
    tiles_x: usize,
    tiles_y: usize,
    tile_width: usize,
    tile_height: usize,
    region: Region,
}

impl TileGrid {
    /// Computes tile medians for `image` with tiles at least `min_tile_size`
    /// pixels on each side.
    ///
    /// Fails with [`PixelShiftError::DegenerateTiling`] when the region is
    /// smaller than one tile, and with [`PixelShiftError::AllocationFailure`]
    /// when scratch buffers cannot be reserved.
    pub fn compute(image: &Image, min_tile_size: usize) -> PixelShiftResult<Self> {
        let region = image.region();
        let degenerate = PixelShiftError::DegenerateTiling {
            region_width: region.width,
            region_height: region.height,
            min_tile_size,
        };
        if min_tile_size == 0 {
            return Err(degenerate);
        }
        let tiles_x = region.width / min_tile_size;
        let tiles_y = region.height / min_tile_size;
        if tiles_x == 0 || tiles_y == 0 {
            return Err(degenerate);
        }
        let tile_width = region.width / tiles_x;
        let tile_height = region.height / tiles_y;

        let max_tile_w = region.width - (tiles_x - 1) * tile_width;
        let max_tile_h = region.height - (tiles_y - 1) * tile_height;
        let mut scratch = try_zeroed(max_tile_w * max_tile_h, "tile scratch")?;
        let mut medians = try_zeroed(tiles_x * tiles_y, "tile medians")?;

        let width = image.width();
        let data = image.data();
        for ty in 0..tiles_y {
            let y0 = region.y + ty * tile_height;
            let y1 = if ty + 1 == tiles_y {
                region.y_end()
            } else {
                y0 + tile_height
            };
            for tx in 0..tiles_x {
                let x0 = region.x + tx * tile_width;
                let x1 = if tx + 1 == tiles_x {
                    region.x_end()
                } else {
                    x0 + tile_width
                };

                let mut n = 0;
                for y in y0..y1 {
                    let row = &data[y * width + x0..y * width + x1];
                    scratch[n..n + row.len()].copy_from_slice(row);
                    n += row.len();
                }
                medians[ty * tiles_x + tx] = median_in_place(&mut scratch[..n])
                    .ok_or(PixelShiftError::InvalidInput("empty background tile"))?;
            }
        }

        trace_event!(
            "background_tiles",
            tiles_x = tiles_x,
            tiles_y = tiles_y,
            tile_width = tile_width,
            tile_height = tile_height
        );

        Ok(Self {
            medians,
            tiles_x,
            tiles_y,
            tile_width,
            tile_height,
            region,
        })
    }

    /// Number of tiles along x.
    pub fn tiles_x(&self) -> usize {
        self.tiles_x
    }

    /// Number of tiles along y.
    pub fn tiles_y(&self) -> usize {
        self.tiles_y
    }

    /// Nominal tile size `(width, height)`.
    pub fn tile_size(&self) -> (usize, usize) {
        (self.tile_width, self.tile_height)
    }

    /// Region the grid was computed over.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Median of tile `(tx, ty)`.
    pub fn median(&self, tx: usize, ty: usize) -> Option<f64> {
        if tx >= self.tiles_x || ty >= self.tiles_y {
            return None;
        }
        Some(self.medians[ty * self.tiles_x + tx])
    }

    /// Row-major tile medians.
    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    fn clamped_median(&self, tx: isize, ty: isize) -> f64 {
        let tx = tx.clamp(0, self.tiles_x as isize - 1) as usize;
        let ty = ty.clamp(0, self.tiles_y as isize - 1) as usize;
        self.medians[ty * self.tiles_x + tx]
    }

    fn control_points(&self, tx: isize, ty: isize) -> [[f64; 4]; 4] {
        let mut p = [[0.0; 4]; 4];
        for (j, row) in p.iter_mut().enumerate() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = self.clamped_median(tx - 1 + i as isize, ty - 1 + j as isize);
            }
        }
        p
    }

    /// Calls `f(x, y, background)` once for every pixel of the region.
    ///
    /// Coordinates are absolute frame coordinates.
    fn for_each_pixel<F>(&self, mut f: F)
    where
        F: FnMut(usize, usize, f64),
    {
        let region = self.region;
        let (tw, th) = (self.tile_width as isize, self.tile_height as isize);
        let (rw, rh) = (region.width as isize, region.height as isize);

        let mut ty = -1isize;
        while ty * th + th / 2 < rh {
            let mut tx = -1isize;
            while tx * tw + tw / 2 < rw {
                let p = self.control_points(tx, ty);
                for dy in 0..th {
                    let y = ty * th + th / 2 + dy;
                    if y < 0 || y >= rh {
                        continue;
                    }
                    let fy = dy as f64 / th as f64;
                    for dx in 0..tw {
                        let x = tx * tw + tw / 2 + dx;
                        if x < 0 || x >= rw {
                            continue;
                        }
                        let fx = dx as f64 / tw as f64;
                        f(
                            region.x + x as usize,
                            region.y + y as usize,
                            bicubic_interpolate(&p, fx, fy),
                        );
                    }
                }
                tx += 1;
            }
            ty += 1;
        }
    }

    /// Evaluates the background surface into a frame-sized map.
    ///
    /// Pixels outside the region are zero in the returned map.
    pub fn background_map(&self, width: usize, height: usize) -> PixelShiftResult<BackgroundMap> {
        let region = self.region;
        if region.x_end() > width || region.y_end() > height {
            return Err(PixelShiftError::RegionOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                img_width: width,
                img_height: height,
            });
        }
        let mut data = try_zeroed(width * height, "background map")?;
        self.for_each_pixel(|x, y, bg| data[y * width + x] = bg);
        Ok(BackgroundMap {
            data,
            width,
            height,
        })
    }

    /// Subtracts the background surface from `image` in place.
    ///
    /// `image` must have the frame size and region the grid was built from.
    pub fn subtract_from(&self, image: &mut Image) -> PixelShiftResult<()> {
        if image.region() != self.region {
            return Err(PixelShiftError::InvalidInput(
                "image region differs from the tile grid region",
            ));
        }
        let width = image.width();
        let data = image.data_mut();
        self.for_each_pixel(|x, y, bg| data[y * width + x] -= bg);
        Ok(())
    }
}

/// Per-pixel background surface for a whole frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundMap {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl BackgroundMap {
    /// Background value at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Row-major background values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Map width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }
}

/// Removes the smooth sky background from `image` in place.
///
/// Tile medians are taken with tiles at least `min_tile_size` pixels on a
/// side; the interpolated surface is subtracted inside the valid region and
/// every pixel outside it is set to zero. On error the image is untouched.
pub fn subtract_background(image: &mut Image, min_tile_size: usize) -> PixelShiftResult<()> {
    let _span = trace_span!(
        "subtract_background",
        width = image.width(),
        height = image.height(),
        min_tile_size = min_tile_size
    )
    .entered();

    let grid = TileGrid::compute(image, min_tile_size)?;
    grid.subtract_from(image)?;
    image.zero_outside_region();
    Ok(())
}
