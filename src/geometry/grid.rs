use std::collections::HashMap;

use crate::domain::{GeoPoint, StreetSegment};

/// Offsets visited around the query cell, in this order
const NEIGHBOR_OFFSETS: [i64; 3] = [0, 1, -1];

/// Integer coordinates of a lat/lon grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: i64,
    pub col: i64,
}

impl CellKey {
    /// Cell containing `point` for a grid of `cell_size` degrees
    pub fn of(point: GeoPoint, cell_size: f64) -> Self {
        Self {
            row: (point.lat / cell_size).floor() as i64,
            col: (point.lon / cell_size).floor() as i64,
        }
    }

    /// Neighboring cell, or `None` past the edge of the key space
    fn offset(self, d_row: i64, d_col: i64) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add(d_row)?,
            col: self.col.checked_add(d_col)?,
        })
    }
}

/// Fixed-size lat/lon bucket index over street segments
///
/// # Algorithm
/// Each segment is bucketed by the cell of its first vertex only. A query
/// returns the contents of the 3x3 block of cells around the query point, so
/// a long segment whose first vertex lies outside that block is never returned
/// even when its body passes right by the point.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f64,
    segments: Vec<StreetSegment>,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl GridIndex {
    /// Build the index; `cell_size` is in degrees and must be positive
    pub fn build(segments: Vec<StreetSegment>, cell_size: f64) -> Self {
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();

        for (idx, segment) in segments.iter().enumerate() {
            let Some(first) = segment.first_vertex() else {
                continue;
            };
            cells
                .entry(CellKey::of(first, cell_size))
                .or_default()
                .push(idx);
        }

        Self {
            cell_size,
            segments,
            cells,
        }
    }

    /// Number of indexed segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Candidate segments near `point`, unranked
    ///
    /// Order is deterministic: cells in `NEIGHBOR_OFFSETS` order (row-major),
    /// then segments in insertion order within each cell.
    pub fn query(&self, point: GeoPoint) -> Vec<&StreetSegment> {
        let center = CellKey::of(point, self.cell_size);
        let mut candidates = Vec::new();

        for d_row in NEIGHBOR_OFFSETS {
            for d_col in NEIGHBOR_OFFSETS {
                let Some(key) = center.offset(d_row, d_col) else {
                    continue;
                };
                if let Some(bucket) = self.cells.get(&key) {
                    candidates.extend(bucket.iter().map(|&idx| &self.segments[idx]));
                }
            }
        }

        candidates
    }
}
