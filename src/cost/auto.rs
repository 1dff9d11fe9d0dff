use serde::Serialize;

use crate::types::{GlazePlacement, Product, ProductType, Shape};

const BASE_PACKING_COST: f64 = 0.10;
/// mil Rp per m² per cm of thickness: 30 kg × 0.003 mil Rp/kg.
const DELIVERY_COST_PER_CM: f64 = 0.09;
const SPECIAL_SHAPE_GLAZE_FACTOR: f64 = 1.2;
const THICK_TILE_CM: f64 = 5.0;

const SALES_EXPENSES_PERCENT: f64 = 10.0;
const OTHER_EXPENSES_PERCENT: f64 = 5.0;

/// Parameters derived from the product alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoParameters {
    pub packing: f64,
    pub stone_defect_percent: f64,
    pub angobe_coefficient: f64,
    pub defect_expenses_percent: f64,
    pub sales_expenses_percent: f64,
    pub other_expenses_percent: f64,
    pub delivery_cost: f64,
    pub shape: Option<Shape>,
}

/// Packing cost per m², grows with the piece size.
pub fn packing_cost(product: &Product) -> f64 {
    let area = product.length * product.width / crate::geometry::CM2_PER_M2;
    if area < 0.01 {
        BASE_PACKING_COST * 0.5
    } else if area < 0.05 {
        BASE_PACKING_COST
    } else if area < 0.1 {
        BASE_PACKING_COST * 1.5
    } else if area < 0.32 {
        BASE_PACKING_COST * 2.0
    } else {
        BASE_PACKING_COST * 3.0
    }
}

/// Size-banded defect rate shared by stone breakage and production defects.
fn size_band_percent(product: &Product) -> f64 {
    let (max, min) = (product.max_side(), product.min_side());
    match product.product_type {
        ProductType::Sink | ProductType::Freeform3d => {
            if max <= 35.0 && min <= 25.0 {
                20.0
            } else if max <= 60.0 && min <= 40.0 {
                25.0
            } else {
                30.0
            }
        }
        ProductType::Tile | ProductType::Countertop => {
            const BANDS: [(f64, f64, f64); 5] = [
                (40.0, 20.0, 7.0),
                (60.0, 30.0, 10.0),
                (80.0, 40.0, 13.0),
                (100.0, 50.0, 17.0),
                (120.0, 90.0, 20.0),
            ];
            BANDS
                .iter()
                .find(|(long, short, _)| max <= *long && min <= *short)
                .map_or(25.0, |(_, _, pct)| *pct)
        }
    }
}

pub fn stone_defect_percent(product: &Product) -> f64 {
    size_band_percent(product)
}

pub fn defect_expenses_percent(product: &Product) -> f64 {
    size_band_percent(product)
}

/// One spare piece is always cut, so small orders carry a higher defect share.
pub fn stone_defect_by_quantity(base_percent: f64, order_quantity: u32) -> f64 {
    if order_quantity == 0 {
        return base_percent;
    }
    base_percent.max(100.0 / order_quantity as f64)
}

/// Glaze consumption multiplier.
pub fn angobe_coefficient(product: &Product, glaze: GlazePlacement, shape: Option<Shape>) -> f64 {
    use GlazePlacement::*;

    let base = match product.product_type {
        ProductType::Tile if product.thickness <= THICK_TILE_CM => match glaze {
            FaceOnly => 1.0,
            FaceOneTwoEdges => 1.1,
            FaceThreeFourEdges => 1.2,
            FaceWithBack => 1.25,
        },
        ProductType::Tile => 1.0,
        ProductType::Sink => match glaze {
            FaceThreeFourEdges => 1.8,
            _ => 1.5,
        },
        ProductType::Countertop => match glaze {
            FaceThreeFourEdges => 1.6,
            FaceWithBack => 1.8,
            _ => 1.5,
        },
        ProductType::Freeform3d => match glaze {
            FaceThreeFourEdges => 1.5,
            _ => 1.3,
        },
    };

    if shape.is_some_and(Shape::is_special) {
        base * SPECIAL_SHAPE_GLAZE_FACTOR
    } else {
        base
    }
}

pub fn delivery_cost(thickness: f64) -> f64 {
    thickness * DELIVERY_COST_PER_CM
}

pub fn infer_shape(product: &Product) -> Shape {
    Shape::infer(product.length, product.width)
}

pub fn auto_parameters(product: &Product) -> AutoParameters {
    let shape = product.resolved_shape();
    let quantity = product.order_quantity.unwrap_or(1);

    AutoParameters {
        packing: packing_cost(product),
        stone_defect_percent: stone_defect_by_quantity(stone_defect_percent(product), quantity),
        angobe_coefficient: product
            .glaze
            .map_or(1.0, |glaze| angobe_coefficient(product, glaze, shape)),
        defect_expenses_percent: defect_expenses_percent(product),
        sales_expenses_percent: SALES_EXPENSES_PERCENT,
        other_expenses_percent: OTHER_EXPENSES_PERCENT,
        delivery_cost: delivery_cost(product.thickness),
        shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_bands() {
        assert_eq!(packing_cost(&Product::tile(5.0, 5.0, 1.0)), 0.05);
        assert_eq!(packing_cost(&Product::tile(10.0, 10.0, 1.0)), 0.10);
        assert_eq!(packing_cost(&Product::tile(40.0, 40.0, 1.0)), 0.20);
        assert_eq!(packing_cost(&Product::tile(60.0, 60.0, 1.0)), 0.30000000000000004);
    }

    #[test]
    fn test_size_bands() {
        assert_eq!(stone_defect_percent(&Product::tile(40.0, 20.0, 1.0)), 7.0);
        assert_eq!(stone_defect_percent(&Product::tile(60.0, 30.0, 1.0)), 10.0);
        assert_eq!(stone_defect_percent(&Product::tile(130.0, 50.0, 1.0)), 25.0);
        let sink = Product::new(50.0, 40.0, 10.0, ProductType::Sink);
        assert_eq!(defect_expenses_percent(&sink), 25.0);
    }

    #[test]
    fn test_spare_piece_rule() {
        assert_eq!(stone_defect_by_quantity(7.0, 1), 100.0);
        assert_eq!(stone_defect_by_quantity(7.0, 10), 10.0);
        assert_eq!(stone_defect_by_quantity(7.0, 100), 7.0);
        assert_eq!(stone_defect_by_quantity(7.0, 0), 7.0);
    }

    #[test]
    fn test_angobe_coefficients() {
        let tile = Product::tile(10.0, 10.0, 1.0);
        assert_eq!(angobe_coefficient(&tile, GlazePlacement::FaceWithBack, None), 1.25);
        let thick = Product::tile(10.0, 10.0, 6.0);
        assert_eq!(angobe_coefficient(&thick, GlazePlacement::FaceWithBack, None), 1.0);
        let top = Product::new(60.0, 40.0, 3.0, ProductType::Countertop);
        assert_eq!(angobe_coefficient(&top, GlazePlacement::FaceOneTwoEdges, None), 1.5);
        let round = angobe_coefficient(&tile, GlazePlacement::FaceOnly, Some(Shape::Round));
        assert!((round - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_auto_shape_for_tiles_only() {
        let tile = Product::tile(10.5, 10.0, 1.0);
        assert_eq!(auto_parameters(&tile).shape, Some(Shape::Square));
        let long = Product::tile(20.0, 10.0, 1.0);
        assert_eq!(auto_parameters(&long).shape, Some(Shape::Rectangle));
        let sink = Product::new(40.0, 30.0, 10.0, ProductType::Sink);
        assert_eq!(auto_parameters(&sink).shape, None);
    }

    #[test]
    fn test_missing_glaze_uses_neutral_coefficient() {
        let p = Product::new(40.0, 30.0, 10.0, ProductType::Sink);
        assert_eq!(auto_parameters(&p).angobe_coefficient, 1.0);
    }
}
