//! Valid-area rectangles and their text form.

use crate::util::{PixelShiftError, PixelShiftResult};

/// Sub-rectangle of a frame holding valid (non-overscan) pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Left column (0-based).
    pub x: usize,
    /// Top row (0-based).
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Region {
    /// Creates a region from its origin and size.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width x height` frame.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    pub fn x_end(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn y_end(&self) -> usize {
        self.y + self.height
    }

    /// Returns true if `(x, y)` lies inside the region.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x_end() && y >= self.y && y < self.y_end()
    }

    /// Parses the acquisition software's `[x1:x2,y1:y2]` keyword format.
    ///
    /// Coordinates are 1-based. The origin becomes `(x1 - 1, y1 - 1)` and the
    /// size `(x2 - x1, y2 - y1)`, matching how the camera control software
    /// writes the image-region header.
    pub fn parse(spec: &str) -> PixelShiftResult<Self> {
        let invalid = |reason| PixelShiftError::InvalidRegionSpec {
            spec: spec.to_string(),
            reason,
        };

        let inner = spec
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| invalid("expected surrounding brackets"))?;
        let (xs, ys) = inner
            .split_once(',')
            .ok_or_else(|| invalid("expected a comma between axes"))?;

        let parse_range = |range: &str| -> PixelShiftResult<(usize, usize)> {
            let (lo, hi) = range
                .split_once(':')
                .ok_or_else(|| invalid("expected lo:hi range"))?;
            let lo: usize = lo
                .trim()
                .parse()
                .map_err(|_| invalid("range bound is not an integer"))?;
            let hi: usize = hi
                .trim()
                .parse()
                .map_err(|_| invalid("range bound is not an integer"))?;
            if lo == 0 {
                return Err(invalid("coordinates are 1-based"));
            }
            if hi <= lo {
                return Err(invalid("range end must exceed start"));
            }
            Ok((lo - 1, hi - lo))
        };

        let (x, width) = parse_range(xs)?;
        let (y, height) = parse_range(ys)?;
        Ok(Self::new(x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::Region;
    use crate::util::PixelShiftError;

    #[test]
    fn parse_matches_header_convention() {
        let region = Region::parse("[64:1984,32:1000]").unwrap();
        assert_eq!(region, Region::new(63, 31, 1920, 968));
        assert_eq!(region.x_end(), 1983);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let region = Region::parse(" [ 1:10 , 2:5 ] ").unwrap();
        assert_eq!(region, Region::new(0, 1, 9, 3));
    }

    #[test]
    fn parse_rejects_malformed_specs() {
        for spec in ["1:10,1:10", "[1:10]", "[a:10,1:10]", "[0:10,1:10]", "[5:5,1:10]"] {
            let err = Region::parse(spec).unwrap_err();
            assert!(matches!(err, PixelShiftError::InvalidRegionSpec { .. }), "{spec}");
        }
    }

    #[test]
    fn contains_is_half_open() {
        let region = Region::new(2, 3, 4, 5);
        assert!(region.contains(2, 3));
        assert!(region.contains(5, 7));
        assert!(!region.contains(6, 7));
        assert!(!region.contains(5, 8));
        assert!(!region.contains(1, 3));
    }
}
