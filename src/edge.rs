use tracing::debug;

use crate::geometry::{
    AIR_GAP, FLAT_ON_EDGE_FRACTION, MAX_EDGE_HEIGHT, MAX_SMALL_KILN_HEIGHT, PackingProfile,
    SHELF_THICKNESS, TILE_GAP, apply_coefficient, grid_count, stacked_levels,
};
use crate::types::{EdgeBreakdown, Kiln, LoadingMethod, LoadingResult, Product};

/// Pieces stood on edge back-to-back in pairs, with a share of flat pieces
/// laid on top. Returns `None` when the product may not stand on edge here.
pub fn edge_loading(kiln: &Kiln, product: &Product, profile: &PackingProfile) -> Option<LoadingResult> {
    if !profile.edge_allowed {
        return None;
    }
    // standing on its length, the length becomes the height
    let height = product.length;
    if height > MAX_EDGE_HEIGHT {
        return None;
    }
    // never reached while MAX_EDGE_HEIGHT is the tighter ceiling
    if kiln.is_small() && height > MAX_SMALL_KILN_HEIGHT {
        return None;
    }

    let working = kiln.working;
    let pair_width = product.thickness * 2.0;
    let pairs_across_width = grid_count(working.width, pair_width, TILE_GAP);
    let rows_across_depth = grid_count(working.depth, product.width, TILE_GAP);
    let edge_per_level = pairs_across_width * 2 * rows_across_depth;
    if edge_per_level == 0 {
        return None;
    }

    let flat_area_available = working.area_m2() * FLAT_ON_EDGE_FRACTION;
    let flat_per_level = ((flat_area_available / profile.piece_area).floor() as u32)
        .min(edge_per_level * 2);

    let level_height = height + AIR_GAP + SHELF_THICKNESS + product.thickness;
    let levels = match working.height {
        Some(h) if kiln.multi_level => stacked_levels(h, level_height),
        _ => 1,
    };
    if levels == 0 {
        return None;
    }

    let edge_pieces = apply_coefficient(edge_per_level * levels, kiln.coefficient);
    let flat_pieces = apply_coefficient(flat_per_level * levels, kiln.coefficient);
    let total_pieces = edge_pieces + flat_pieces;

    debug!(
        kiln = %kiln.kind,
        pairs_across_width,
        rows_across_depth,
        edge_per_level,
        flat_per_level,
        levels,
        total_pieces,
        "edge loading"
    );

    Some(LoadingResult {
        method: LoadingMethod::Combined,
        method_name: "On edge + flat".to_string(),
        total_pieces,
        total_area: profile.area_of(total_pieces),
        levels,
        breakdown: Some(EdgeBreakdown {
            edge_pieces,
            flat_pieces,
            edge_area: profile.area_of(edge_pieces),
            flat_area: profile.area_of(flat_pieces),
        }),
        filler: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GlazePlacement, Product, ProductType, Shape};

    fn run(kiln: &Kiln, product: &Product) -> Option<LoadingResult> {
        edge_loading(kiln, product, &PackingProfile::resolve(product))
    }

    #[test]
    fn test_big_kiln_small_tile() {
        let product = Product::tile(10.0, 10.0, 1.5)
            .with_shape(Shape::Rectangle)
            .with_glaze(GlazePlacement::FaceOnly);
        let res = run(&Kiln::big(), &product).unwrap();
        // 13 pairs x 7 rows = 182 on edge, 13 flat, 4 levels of 16.5 cm
        assert_eq!(res.levels, 4);
        let breakdown = res.breakdown.unwrap();
        assert_eq!(breakdown.edge_pieces, 583);
        assert_eq!(breakdown.flat_pieces, 42);
        assert_eq!(res.total_pieces, 625);
        assert!((res.total_area - 6.25).abs() < 1e-9);
        assert_eq!(res.method, LoadingMethod::Combined);
    }

    #[test]
    fn test_too_tall_for_edge() {
        let product = Product::tile(16.0, 10.0, 1.5);
        assert!(run(&Kiln::big(), &product).is_none());
        assert!(run(&Kiln::small(), &product).is_none());
        let product = Product::tile(15.0, 10.0, 1.5);
        assert!(run(&Kiln::big(), &product).is_some());
    }

    #[test]
    fn test_excluded_types() {
        for t in [ProductType::Countertop, ProductType::Sink, ProductType::Freeform3d] {
            let product = Product::new(10.0, 10.0, 1.5, t);
            assert!(run(&Kiln::big(), &product).is_none(), "{t} must not stand on edge");
        }
    }

    #[test]
    fn test_glaze_blocks_edge() {
        for glaze in [GlazePlacement::FaceThreeFourEdges, GlazePlacement::FaceWithBack] {
            let product = Product::tile(10.0, 10.0, 1.5).with_glaze(glaze);
            assert!(run(&Kiln::small(), &product).is_none());
        }
        let product = Product::tile(10.0, 10.0, 1.5).with_glaze(GlazePlacement::FaceOneTwoEdges);
        assert!(run(&Kiln::small(), &product).is_some());
    }

    #[test]
    fn test_round_never_on_edge() {
        let product = Product::tile(10.0, 10.0, 1.5).with_shape(Shape::Round);
        assert!(run(&Kiln::big(), &product).is_none());
    }

    #[test]
    fn test_flat_on_top_capped_by_edge_count() {
        // one 40 cm pair across 54 cm, 20 rows: 40 on edge per level,
        // while 30% of the shelf would hold 151 flat pieces
        let product = Product::tile(3.0, 3.0, 20.0);
        let res = run(&Kiln::big(), &product).unwrap();
        assert_eq!(res.levels, 2);
        let b = res.breakdown.unwrap();
        assert_eq!(b.edge_pieces, 64);
        assert_eq!(b.flat_pieces, 128);
    }

    #[test]
    fn test_single_level_in_small_kiln() {
        let product = Product::tile(10.0, 10.0, 1.5);
        let res = run(&Kiln::small(), &product).unwrap();
        assert_eq!(res.levels, 1);
        let b = res.breakdown.unwrap();
        assert_eq!(res.total_pieces, b.edge_pieces + b.flat_pieces);
        assert!((res.total_area - res.total_pieces as f64 * 0.01).abs() < 1e-9);
    }
}
