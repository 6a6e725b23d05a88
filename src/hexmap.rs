use crate::hex::{self, HexCoord};

/// Dense storage for one value per cell of a hexagon-shaped grid.
///
/// Cells are laid out row-major by `q` then `r`, the same order as
/// [`hex::hexes_in_radius`], so `index_of(coords[i]) == Some(i)`.
#[derive(Clone, Debug)]
pub struct HexMap<T> {
    pub radius: u32,
    data: Vec<T>,
}

impl<T: Clone + Default> HexMap<T> {
    pub fn new(radius: u32) -> Self {
        Self::new_with(radius, T::default())
    }
}

impl<T: Clone> HexMap<T> {
    pub fn new_with(radius: u32, value: T) -> Self {
        Self::from_fn(radius, |_| value.clone())
    }
}

impl<T> HexMap<T> {
    /// Build a map by evaluating `f` once per cell, in storage order.
    pub fn from_fn(radius: u32, f: impl FnMut(HexCoord) -> T) -> Self {
        let data = hex::hexes_in_radius(radius).into_iter().map(f).collect();
        Self { radius, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.is_valid() && coord.within_radius(self.radius)
    }

    /// Storage index of `coord`, or `None` if it lies outside the grid.
    pub fn index_of(&self, coord: HexCoord) -> Option<usize> {
        index_in_radius(self.radius, coord)
    }

    pub fn get(&self, coord: HexCoord) -> Option<&T> {
        self.index_of(coord).map(|idx| &self.data[idx])
    }

    pub fn get_mut(&mut self, coord: HexCoord) -> Option<&mut T> {
        let idx = self.index_of(coord)?;
        Some(&mut self.data[idx])
    }

    /// Store `value` at `coord`. Returns false if the cell is outside the grid.
    pub fn set(&mut self, coord: HexCoord, value: T) -> bool {
        match self.index_of(coord) {
            Some(idx) => {
                self.data[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn coords(&self) -> Vec<HexCoord> {
        hex::hexes_in_radius(self.radius)
    }

    /// In-grid cells adjacent to `coord`.
    pub fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        hex::neighbors(coord)
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// In-grid cells exactly `distance` steps from `coord`.
    pub fn ring_neighbors(&self, coord: HexCoord, distance: u32) -> Vec<HexCoord> {
        hex::ring(coord, distance)
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    /// Iterate over all cells with their coordinates, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, &T)> {
        hex::hexes_in_radius(self.radius).into_iter().zip(self.data.iter())
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }
}

/// Position of `coord` in [`hex::hexes_in_radius`] order, without allocating.
pub fn index_in_radius(radius: u32, coord: HexCoord) -> Option<usize> {
    if !coord.is_valid() || !coord.within_radius(radius) {
        return None;
    }
    let radius = radius as i64;
    let q = coord.q as i64;
    let r_min = (-radius).max(-q - radius);
    Some((row_start(radius, q) + coord.r as i64 - r_min) as usize)
}

/// Number of cells in all rows before row `q`. Row `q` holds `2R + 1 - |q|` cells.
fn row_start(radius: i64, q: i64) -> i64 {
    let width = 2 * radius + 1;
    if q <= 0 {
        let rows = q + radius;
        rows * width + rows * (q - 1 - radius) / 2
    } else {
        let left_half = (radius + 1) * width - radius * (radius + 1) / 2;
        let rows = q - 1;
        left_half + rows * width - rows * (rows + 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_enumeration_order() {
        for radius in [0, 1, 3, 9] {
            let map: HexMap<u8> = HexMap::new(radius);
            let coords = hex::hexes_in_radius(radius);
            assert_eq!(map.len(), coords.len());
            for (i, c) in coords.iter().enumerate() {
                assert_eq!(map.index_of(*c), Some(i));
            }
        }
    }

    #[test]
    fn test_index_in_radius_without_map() {
        let coords = hex::hexes_in_radius(7);
        for (i, c) in coords.iter().enumerate() {
            assert_eq!(index_in_radius(7, *c), Some(i));
        }
        assert_eq!(index_in_radius(7, HexCoord::new(8, 0)), None);
    }

    #[test]
    fn test_outside_radius_is_absent() {
        let mut map = HexMap::new_with(2, 0i32);
        assert_eq!(map.index_of(HexCoord::new(3, 0)), None);
        assert_eq!(map.get(HexCoord::new(-2, -1)), None);
        assert!(!map.set(HexCoord::new(0, 3), 5));
        assert!(map.set(HexCoord::new(0, 2), 5));
        assert_eq!(map.get(HexCoord::new(0, 2)), Some(&5));
    }

    #[test]
    fn test_off_plane_coordinate_is_absent() {
        let map: HexMap<u8> = HexMap::new(4);
        let bogus = HexCoord { q: 1, r: 1, s: 1 };
        assert_eq!(map.index_of(bogus), None);

        let overflowing = HexCoord { q: i32::MAX, r: i32::MAX, s: i32::MIN };
        assert!(!map.contains(overflowing));
        assert_eq!(index_in_radius(4, overflowing), None);
        assert_eq!(index_in_radius(4, HexCoord { q: i32::MIN, r: i32::MAX, s: 1 }), None);
    }

    #[test]
    fn test_from_fn_and_iter() {
        let map = HexMap::from_fn(3, |c| c.q * 100 + c.r);
        for (coord, value) in map.iter() {
            assert_eq!(*value, coord.q * 100 + coord.r);
        }
    }

    #[test]
    fn test_neighbors_clipped_at_border() {
        let map: HexMap<u8> = HexMap::new(2);
        assert_eq!(map.neighbors(HexCoord::ORIGIN).len(), 6);
        assert_eq!(map.neighbors(HexCoord::new(2, 0)).len(), 3);
        assert_eq!(map.ring_neighbors(HexCoord::ORIGIN, 2).len(), 12);

        let single: HexMap<u8> = HexMap::new(0);
        assert!(single.neighbors(HexCoord::ORIGIN).is_empty());
        assert!(single.ring_neighbors(HexCoord::ORIGIN, 2).is_empty());
    }
}
