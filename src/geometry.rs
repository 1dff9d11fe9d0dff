use crate::types::{GlazePlacement, Product, ProductType, Shape};

pub const CM2_PER_M2: f64 = 10_000.0;

/// Spacing between tiles on a shelf, cm.
pub const TILE_GAP: f64 = 1.2;
/// Air gap above the pieces of a level, cm.
pub const AIR_GAP: f64 = 2.0;
pub const SHELF_THICKNESS: f64 = 3.0;
/// Share of shelf area usable for flat pieces laid on top of edge-standing ones.
pub const FLAT_ON_EDGE_FRACTION: f64 = 0.3;
/// Gap between two triangles laid back-to-back as a rectangle.
pub const TRIANGLE_PAIR_GAP: f64 = 1.5;
/// Minimum gap for hand-placed countertops and sinks, cm.
pub const MANUAL_PLACEMENT_GAP: f64 = 10.0;

pub const MAX_EDGE_HEIGHT: f64 = 15.0;
pub const MAX_SMALL_KILN_HEIGHT: f64 = 30.0;

pub const MIN_PRODUCT_SIZE: f64 = 3.0;
pub const MIN_THICKNESS: f64 = 0.8;

/// Rectangle a product occupies when packed flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub length: f64,
    pub width: f64,
    /// One footprint slot holds two physical pieces.
    pub paired: bool,
}

impl Footprint {
    pub fn max_side(&self) -> f64 {
        self.length.max(self.width)
    }

    pub fn min_side(&self) -> f64 {
        self.length.min(self.width)
    }

    pub fn pieces_per_slot(&self) -> u32 {
        if self.paired { 2 } else { 1 }
    }
}

pub fn effective_footprint(product: &Product) -> Footprint {
    match product.shape {
        // producers enter width == length for round pieces; the diameter is the length
        Some(Shape::Round) => Footprint {
            length: product.length,
            width: product.length,
            paired: false,
        },
        Some(Shape::Triangle) => Footprint {
            length: product.length + TRIANGLE_PAIR_GAP,
            width: product.width + TRIANGLE_PAIR_GAP,
            paired: true,
        },
        _ => Footprint {
            length: product.length,
            width: product.width,
            paired: false,
        },
    }
}

/// Surface area of one piece in m².
pub fn true_area(product: &Product) -> f64 {
    match product.shape {
        Some(Shape::Round) => {
            let radius = product.length / 2.0;
            std::f64::consts::PI * radius * radius / CM2_PER_M2
        }
        Some(Shape::Triangle) => product.length * product.width / 2.0 / CM2_PER_M2,
        _ => product.length * product.width / CM2_PER_M2,
    }
}

/// Number of items of `item` span that fit in `available` with `gap` between
/// neighbours. Never rounds up: a partial piece does not exist.
pub fn grid_count(available: f64, item: f64, gap: f64) -> u32 {
    let n = ((available + gap) / (item + gap)).floor();
    if n.is_finite() && n > 0.0 {
        n as u32
    } else {
        0
    }
}

pub fn product_gap(product: &Product) -> f64 {
    if product.product_type.is_manual_placement() {
        MANUAL_PLACEMENT_GAP.max(product.thickness / 2.0)
    } else {
        TILE_GAP
    }
}

/// Applies a kiln coefficient to an idealized count. Rounds up.
pub fn apply_coefficient(pieces: u32, coefficient: f64) -> u32 {
    (pieces as f64 * coefficient).ceil() as u32
}

/// Levels of `level_height` that fit under `kiln_height`.
pub fn stacked_levels(kiln_height: f64, level_height: f64) -> u32 {
    grid_count(kiln_height, level_height, 0.0)
}

/// Shape/type decisions resolved once per product and shared by both
/// loading strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackingProfile {
    pub product_type: ProductType,
    pub footprint: Footprint,
    pub gap: f64,
    /// True area of one piece, m².
    pub piece_area: f64,
    pub edge_allowed: bool,
    pub back_glazed: bool,
}

impl PackingProfile {
    pub fn resolve(product: &Product) -> Self {
        let shape_stands = product.shape != Some(Shape::Round);
        let glaze_stands = product.glaze.is_none_or(GlazePlacement::allows_edge);
        Self {
            product_type: product.product_type,
            footprint: effective_footprint(product),
            gap: product_gap(product),
            piece_area: true_area(product),
            edge_allowed: product.product_type.can_stand_on_edge() && shape_stands && glaze_stands,
            back_glazed: product.glaze_reaches_back(),
        }
    }

    pub fn is_manual_placement(&self) -> bool {
        self.product_type.is_manual_placement()
    }

    /// Area of `pieces` pieces, m².
    pub fn area_of(&self, pieces: u32) -> f64 {
        pieces as f64 * self.piece_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_count_basic() {
        // (54 + 1.2) / (10 + 1.2) = 4.93
        assert_eq!(grid_count(54.0, 10.0, 1.2), 4);
        assert_eq!(grid_count(100.0, 50.0, 0.0), 2);
        // exact fit with gap: 10 + 1 + 10 + 1 + 10 = 32
        assert_eq!(grid_count(32.0, 10.0, 1.0), 3);
    }

    #[test]
    fn test_grid_count_item_larger_than_span() {
        assert_eq!(grid_count(9.9, 10.0, 1.2), 0);
        assert_eq!(grid_count(0.0, 10.0, 0.0), 0);
        assert_eq!(grid_count(-5.0, 10.0, 1.2), 0);
        assert_eq!(grid_count(10.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_round_footprint_is_bounding_square() {
        let p = Product::tile(20.0, 20.0, 1.5).with_shape(Shape::Round);
        let fp = effective_footprint(&p);
        assert_eq!((fp.length, fp.width, fp.paired), (20.0, 20.0, false));
        let expected = std::f64::consts::PI * 100.0 / 10_000.0;
        assert!((true_area(&p) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_pair_footprint() {
        let p = Product::tile(20.0, 10.0, 1.5).with_shape(Shape::Triangle);
        let fp = effective_footprint(&p);
        assert_eq!((fp.length, fp.width), (21.5, 11.5));
        assert!(fp.paired);
        assert_eq!(fp.pieces_per_slot(), 2);
        assert!((true_area(&p) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_freeform_and_rectangle_unchanged() {
        for shape in [Shape::Freeform, Shape::Rectangle, Shape::Square] {
            let p = Product::tile(30.0, 12.0, 2.0).with_shape(shape);
            let fp = effective_footprint(&p);
            assert_eq!((fp.length, fp.width, fp.paired), (30.0, 12.0, false));
            assert!((true_area(&p) - 0.036).abs() < 1e-12);
        }
    }

    #[test]
    fn test_product_gap_tile() {
        assert_eq!(product_gap(&Product::tile(10.0, 10.0, 1.5)), TILE_GAP);
        let p3d = Product::new(10.0, 10.0, 40.0, ProductType::Freeform3d);
        assert_eq!(product_gap(&p3d), TILE_GAP);
    }

    #[test]
    fn test_product_gap_countertop_and_sink() {
        let thin = Product::new(60.0, 40.0, 2.0, ProductType::Countertop);
        assert_eq!(product_gap(&thin), 10.0);
        let deep = Product::new(60.0, 40.0, 26.0, ProductType::Sink);
        assert_eq!(product_gap(&deep), 13.0);
    }

    #[test]
    fn test_coefficient_rounds_up() {
        assert_eq!(apply_coefficient(336, 0.8), 269);
        assert_eq!(apply_coefficient(100, 0.8), 80);
        assert_eq!(apply_coefficient(0, 0.92), 0);
    }

    #[test]
    fn test_profile_edge_rules() {
        let round = Product::tile(20.0, 20.0, 1.5).with_shape(Shape::Round);
        assert!(!PackingProfile::resolve(&round).edge_allowed);

        let glazed = Product::tile(10.0, 10.0, 1.5).with_glaze(GlazePlacement::FaceThreeFourEdges);
        assert!(!PackingProfile::resolve(&glazed).edge_allowed);

        let sink = Product::new(10.0, 10.0, 5.0, ProductType::Sink);
        assert!(!PackingProfile::resolve(&sink).edge_allowed);

        let plain = Product::tile(10.0, 10.0, 1.5).with_glaze(GlazePlacement::FaceOneTwoEdges);
        let profile = PackingProfile::resolve(&plain);
        assert!(profile.edge_allowed);
        assert!(!profile.back_glazed);
    }
}
