use tracing::debug;

use crate::filler::filler_pass;
use crate::geometry::{
    AIR_GAP, Footprint, MAX_SMALL_KILN_HEIGHT, PackingProfile, SHELF_THICKNESS, apply_coefficient,
    grid_count, stacked_levels,
};
use crate::types::{Kiln, LoadingMethod, LoadingResult, Product};

/// Shelf rectangle the operator can fill by hand-placing near the walls of
/// the small kiln.
const MANUAL_SHELF_WIDTH: f64 = 100.0;
const MANUAL_SHELF_DEPTH: f64 = 150.0;
const MAX_GENERIC_MANUAL_SIDE: f64 = 100.0;
const MAX_MANUAL_LONG_SIDE: f64 = 150.0;
const MAX_MANUAL_SHORT_SIDE: f64 = 100.0;

/// Width and depth actually used for flat packing of `footprint`.
pub(crate) fn working_rect(kiln: &Kiln, footprint: &Footprint, profile: &PackingProfile) -> (f64, f64) {
    let plain = (kiln.working.width, kiln.working.depth);
    if !kiln.is_small() {
        return plain;
    }
    let substitute = if profile.is_manual_placement() {
        footprint.max_side() <= MAX_MANUAL_LONG_SIDE && footprint.min_side() <= MAX_MANUAL_SHORT_SIDE
    } else {
        footprint.max_side() <= MAX_GENERIC_MANUAL_SIDE
    };
    if substitute {
        (MANUAL_SHELF_WIDTH, MANUAL_SHELF_DEPTH)
    } else {
        plain
    }
}

/// Grid of footprints on one shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShelfGrid {
    pub across_width: u32,
    pub across_depth: u32,
}

impl ShelfGrid {
    pub fn slots(&self) -> u32 {
        self.across_width * self.across_depth
    }
}

fn shelf_grid(kiln: &Kiln, footprint: &Footprint, profile: &PackingProfile) -> ShelfGrid {
    let (width, depth) = working_rect(kiln, footprint, profile);
    let gap = profile.gap;
    let as_given = ShelfGrid {
        across_width: grid_count(width, footprint.width, gap),
        across_depth: grid_count(depth, footprint.length, gap),
    };
    if !(kiln.is_small() && profile.is_manual_placement()) {
        return as_given;
    }
    let turned = ShelfGrid {
        across_width: grid_count(width, footprint.length, gap),
        across_depth: grid_count(depth, footprint.width, gap),
    };
    if turned.slots() > as_given.slots() {
        turned
    } else {
        as_given
    }
}

/// Pieces laid face-up on the shelves. Returns `None` when nothing fits.
pub fn flat_loading(kiln: &Kiln, product: &Product, profile: &PackingProfile) -> Option<LoadingResult> {
    if kiln.is_small() && product.thickness > MAX_SMALL_KILN_HEIGHT {
        return None;
    }

    let footprint = profile.footprint;
    let grid = shelf_grid(kiln, &footprint, profile);
    let per_level = grid.slots() * footprint.pieces_per_slot();
    if per_level == 0 {
        return None;
    }

    let level_height = product.thickness + AIR_GAP + SHELF_THICKNESS;
    // back glaze would mark the piece below, so such pieces never stack;
    // the small kiln has a single shelf regardless
    let levels = match kiln.working.height {
        Some(h) if kiln.multi_level && !profile.back_glazed && !kiln.is_small() => {
            stacked_levels(h, level_height)
        }
        _ => 1,
    };
    if levels == 0 {
        return None;
    }

    let coefficient = if profile.is_manual_placement() {
        1.0
    } else {
        kiln.coefficient
    };
    let total_pieces = apply_coefficient(per_level * levels, coefficient);

    let filler = if kiln.is_small() {
        filler_pass(kiln, &footprint, profile, grid)
    } else {
        None
    };

    debug!(
        kiln = %kiln.kind,
        across_width = grid.across_width,
        across_depth = grid.across_depth,
        per_level,
        levels,
        total_pieces,
        filler_pieces = filler.as_ref().map_or(0, |f| f.pieces),
        "flat loading"
    );

    Some(LoadingResult {
        method: LoadingMethod::Flat,
        method_name: "Flat (face up)".to_string(),
        total_pieces,
        total_area: profile.area_of(total_pieces),
        levels,
        breakdown: None,
        filler,
    })
}
