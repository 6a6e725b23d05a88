//! Cube-coordinate hex math
//!
//! Flat-top layout: `q` runs along the x axis, `r` down the diagonal, and
//! `s = -q - r`. All functions are pure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HexworldError;

pub const SQRT3: f64 = 1.732_050_807_568_877_2;

/// A hex cell in cube coordinates. Always satisfies `q + r + s == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawCoord")]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

#[derive(Deserialize)]
struct RawCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl TryFrom<RawCoord> for HexCoord {
    type Error = HexworldError;

    fn try_from(raw: RawCoord) -> Result<Self, Self::Error> {
        HexCoord::try_new(raw.q, raw.r, raw.s)
    }
}

/// The six unit directions. Consecutive entries are 60 degrees apart.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord { q: 1, r: -1, s: 0 },
    HexCoord { q: 1, r: 0, s: -1 },
    HexCoord { q: 0, r: 1, s: -1 },
    HexCoord { q: -1, r: 1, s: 0 },
    HexCoord { q: -1, r: 0, s: 1 },
    HexCoord { q: 0, r: -1, s: 1 },
];

/// Offsets of the twelve cells exactly two steps away.
pub const RING2_OFFSETS: [HexCoord; 12] = [
    HexCoord { q: 2, r: -2, s: 0 },
    HexCoord { q: 2, r: -1, s: -1 },
    HexCoord { q: 2, r: 0, s: -2 },
    HexCoord { q: 1, r: 1, s: -2 },
    HexCoord { q: 0, r: 2, s: -2 },
    HexCoord { q: -1, r: 2, s: -1 },
    HexCoord { q: -2, r: 2, s: 0 },
    HexCoord { q: -2, r: 1, s: 1 },
    HexCoord { q: -2, r: 0, s: 2 },
    HexCoord { q: -1, r: -1, s: 2 },
    HexCoord { q: 0, r: -2, s: 2 },
    HexCoord { q: 1, r: -2, s: 1 },
];

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0, s: 0 };

    /// Build from axial `(q, r)`; `s` is derived.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Build from a full cube triple, rejecting triples off the `q+r+s=0` plane.
    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, HexworldError> {
        if !cube_sum_is_zero(q, r, s) {
            return Err(HexworldError::InvalidCoordinate(format!("{},{},{}", q, r, s)));
        }
        Ok(Self { q, r, s })
    }

    /// Canonical `"q,r,s"` identifier.
    pub fn id(&self) -> String {
        format!("{},{},{}", self.q, self.r, self.s)
    }

    /// True when the triple lies on the `q+r+s=0` plane.
    pub fn is_valid(&self) -> bool {
        cube_sum_is_zero(self.q, self.r, self.s)
    }

    /// Distance from the origin in hex steps, saturating at `i32::MAX`.
    pub fn length(&self) -> i32 {
        self.q
            .saturating_abs()
            .max(self.r.saturating_abs())
            .max(self.s.saturating_abs())
    }

    pub fn offset(&self, delta: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q + delta.q,
            r: self.r + delta.r,
            s: self.s + delta.s,
        }
    }

    pub fn within_radius(&self, radius: u32) -> bool {
        let longest = (self.q as i64)
            .abs()
            .max((self.r as i64).abs())
            .max((self.s as i64).abs());
        longest <= radius as i64
    }
}

fn cube_sum_is_zero(q: i32, r: i32, s: i32) -> bool {
    q as i64 + r as i64 + s as i64 == 0
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.s)
    }
}

impl FromStr for HexCoord {
    type Err = HexworldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || HexworldError::InvalidCoordinate(s.to_string());
        let mut parts = s.split(',').map(|p| p.trim().parse::<i32>());
        let (q, r, cube_s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(q)), Some(Ok(r)), Some(Ok(cube_s)), None) => (q, r, cube_s),
            _ => return Err(malformed()),
        };
        HexCoord::try_new(q, r, cube_s).map_err(|_| malformed())
    }
}

/// Project a hex center to 2D world space.
pub fn hex_to_pixel(coord: HexCoord, hex_size: f64) -> (f64, f64) {
    let q = coord.q as f64;
    let r = coord.r as f64;
    let x = hex_size * (1.5 * q);
    let y = hex_size * (SQRT3 / 2.0 * q + SQRT3 * r);
    (x, y)
}

/// Find the hex containing a world-space point.
pub fn pixel_to_hex(x: f64, y: f64, hex_size: f64) -> HexCoord {
    let q = (2.0 / 3.0 * x) / hex_size;
    let r = (-1.0 / 3.0 * x + SQRT3 / 3.0 * y) / hex_size;
    hex_round(q, r, -q - r)
}

/// Round fractional cube coordinates to the nearest hex.
///
/// The axis with the largest rounding error is rebuilt from the other two so
/// the result stays on the `q+r+s=0` plane.
pub fn hex_round(q: f64, r: f64, s: f64) -> HexCoord {
    let mut rq = q.round();
    let mut rr = r.round();
    let mut rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    } else {
        rs = -rq - rr;
    }

    HexCoord {
        q: rq as i32,
        r: rr as i32,
        s: rs as i32,
    }
}

/// Number of cells in a hexagon of the given radius: `3r² + 3r + 1`.
pub fn hex_count(radius: u32) -> usize {
    let r = radius as usize;
    3 * r * r + 3 * r + 1
}

/// Every coordinate within `radius` of the origin, ordered by `q` then `r`.
pub fn hexes_in_radius(radius: u32) -> Vec<HexCoord> {
    let radius = radius as i32;
    let mut results = Vec::with_capacity(hex_count(radius as u32));

    for q in -radius..=radius {
        let r1 = (-radius).max(-q - radius);
        let r2 = radius.min(-q + radius);
        for r in r1..=r2 {
            results.push(HexCoord::new(q, r));
        }
    }

    results
}

/// Hex steps between two cells, saturating at `i32::MAX`.
pub fn distance(a: HexCoord, b: HexCoord) -> i32 {
    let dq = (a.q as i64 - b.q as i64).abs();
    let dr = (a.r as i64 - b.r as i64).abs();
    let ds = (a.s as i64 - b.s as i64).abs();
    dq.max(dr).max(ds).min(i32::MAX as i64) as i32
}

/// Neighbor in direction `0..6` (wraps modulo 6).
pub fn neighbor(coord: HexCoord, direction: usize) -> HexCoord {
    coord.offset(DIRECTIONS[direction % 6])
}

pub fn neighbors(coord: HexCoord) -> [HexCoord; 6] {
    DIRECTIONS.map(|d| coord.offset(d))
}

/// Cells exactly `radius` steps from `coord`.
///
/// Ring 2 follows the fixed [`RING2_OFFSETS`] order; other radii walk the ring
/// starting from the `DIRECTIONS[4]` corner.
pub fn ring(coord: HexCoord, radius: u32) -> Vec<HexCoord> {
    match radius {
        0 => vec![coord],
        1 => neighbors(coord).to_vec(),
        2 => RING2_OFFSETS.iter().map(|&d| coord.offset(d)).collect(),
        _ => {
            let n = radius as i32;
            let mut results = Vec::with_capacity(6 * radius as usize);
            let start = DIRECTIONS[4];
            let mut current = coord.offset(HexCoord {
                q: start.q * n,
                r: start.r * n,
                s: start.s * n,
            });
            for direction in 0..6 {
                for _ in 0..n {
                    results.push(current);
                    current = neighbor(current, direction);
                }
            }
            results
        }
    }
}
