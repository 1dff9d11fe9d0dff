//! Leftover-space filler for the small kiln.
//!
//! After the main product grid is laid out, strips of shelf deeper or wider
//! than [`MIN_SPACE_TO_FILL`] are packed with 10×10 cm accessory tiles stood on
//! edge in back-to-back pairs. The depth strip and the width strip are
//! counted independently and summed, so their shared corner is counted
//! twice; the flat [`FILLER_DAMPING`] factor is the only correction.

use crate::flat::{ShelfGrid, working_rect};
use crate::geometry::{CM2_PER_M2, Footprint, PackingProfile, TILE_GAP, grid_count};
use crate::types::{FillerResult, Kiln};

pub const FILLER_SIZE: f64 = 10.0;
pub const FILLER_THICKNESS: f64 = 1.0;
pub const MIN_SPACE_TO_FILL: f64 = 21.0;
pub const FILLER_DAMPING: f64 = 0.5;
pub const MAX_FILLER_AREA: f64 = 2.0;

const FILLER_PIECE_AREA: f64 = FILLER_SIZE * FILLER_SIZE / CM2_PER_M2;

pub(crate) fn filler_pass(
    kiln: &Kiln,
    footprint: &Footprint,
    profile: &PackingProfile,
    grid: ShelfGrid,
) -> Option<FillerResult> {
    if !kiln.is_small() {
        return None;
    }

    let (width, depth) = working_rect(kiln, footprint, profile);
    let gap = profile.gap;
    let occupied_depth = occupied_span(grid.across_depth, footprint.length, gap);
    let occupied_width = occupied_span(grid.across_width, footprint.width, gap);
    let remaining_depth = depth - occupied_depth;
    let remaining_width = width - occupied_width;

    let pair_width = FILLER_THICKNESS * 2.0;
    let mut raw_pieces = 0;
    let mut lanes = Vec::new();

    if remaining_depth > MIN_SPACE_TO_FILL {
        let pairs = grid_count(width, pair_width, TILE_GAP);
        let rows = grid_count(remaining_depth, FILLER_SIZE, TILE_GAP);
        let pieces = pairs * 2 * rows;
        raw_pieces += pieces;
        lanes.push(format!("depth lane: {pieces} pcs"));
    }

    if remaining_width > MIN_SPACE_TO_FILL {
        let pairs = grid_count(remaining_width, pair_width, TILE_GAP);
        let rows = grid_count(footprint.length, FILLER_SIZE, TILE_GAP);
        let pieces = pairs * 2 * rows;
        raw_pieces += pieces;
        lanes.push(format!("width lane: {pieces} pcs"));
    }

    if raw_pieces == 0 {
        return None;
    }

    let pieces = (raw_pieces as f64 * FILLER_DAMPING).ceil() as u32;
    let area = pieces as f64 * FILLER_PIECE_AREA;
    let details = lanes.join(", ");

    if area > MAX_FILLER_AREA {
        let capped = (MAX_FILLER_AREA * CM2_PER_M2 / (FILLER_SIZE * FILLER_SIZE)).floor() as u32;
        return Some(FillerResult {
            pieces: capped,
            area: MAX_FILLER_AREA,
            details: format!("{details} (capped at {MAX_FILLER_AREA} m²)"),
        });
    }

    Some(FillerResult {
        pieces,
        area,
        details,
    })
}

/// Length taken by `count` items with gaps only between them.
fn occupied_span(count: u32, item: f64, gap: f64) -> f64 {
    count as f64 * item + (count as f64 - 1.0) * gap
}
