use tracing::debug;

use crate::edge::edge_loading;
use crate::error::Result;
use crate::flat::flat_loading;
use crate::geometry::{MIN_PRODUCT_SIZE, MIN_THICKNESS, PackingProfile};
use crate::types::{CalculationResult, Kiln, KilnKind, Product, Shape};

pub const BIG_KILN_MANUAL_MAX: (f64, f64) = (40.0, 20.0);
pub const BIG_KILN_TILE_MAX: (f64, f64) = (40.0, 30.0);
pub const SMALL_KILN_MANUAL_MAX: (f64, f64) = (150.0, 100.0);
pub const SMALL_KILN_MAX_SIDE: f64 = 100.0;

/// Whether `product` passes the minimum-size gate.
pub fn meets_minimums(product: &Product) -> bool {
    product.length > 0.0
        && product.width > 0.0
        && product.thickness > 0.0
        && product.length >= MIN_PRODUCT_SIZE
        && product.width >= MIN_PRODUCT_SIZE
        && product.thickness >= MIN_THICKNESS
}

fn within(product: &Product, (long, short): (f64, f64)) -> bool {
    product.max_side() <= long && product.min_side() <= short
}

/// Kiln-specific maximum sizes, checked before any strategy runs.
pub fn fits_kiln_envelope(kind: KilnKind, product: &Product) -> bool {
    let manual = product.product_type.is_manual_placement();
    match kind {
        KilnKind::Big if manual => within(product, BIG_KILN_MANUAL_MAX),
        KilnKind::Big => match product.resolved_shape() {
            Some(Shape::Square | Shape::Rectangle) => within(product, BIG_KILN_TILE_MAX),
            _ => true,
        },
        KilnKind::Small if manual => within(product, SMALL_KILN_MANUAL_MAX),
        KilnKind::Small => product.max_side() <= SMALL_KILN_MAX_SIDE,
    }
}

/// Best loading of `product` in `kiln` in the given orientation.
///
/// `Ok(None)` means the product cannot be loaded; `Err` is reserved for a
/// malformed kiln or product.
pub fn evaluate_kiln_loading(kiln: &Kiln, product: &Product) -> Result<Option<CalculationResult>> {
    kiln.validate()?;
    product.validate()?;

    if !meets_minimums(product) {
        debug!(kiln = %kiln.kind, %product, "below minimum size");
        return Ok(None);
    }
    if !fits_kiln_envelope(kiln.kind, product) {
        debug!(kiln = %kiln.kind, %product, "exceeds kiln envelope");
        return Ok(None);
    }

    let profile = PackingProfile::resolve(product);
    let edge = edge_loading(kiln, product, &profile);
    let flat = flat_loading(kiln, product, &profile);

    let (optimal, alternative) = match (edge, flat) {
        (None, None) => return Ok(None),
        (Some(only), None) | (None, Some(only)) => (only, None),
        (Some(edge), Some(flat)) => {
            if edge.total_area >= flat.total_area {
                (edge, Some(flat))
            } else {
                (flat, Some(edge))
            }
        }
    };

    Ok(Some(CalculationResult {
        kiln: kiln.clone(),
        product: product.clone(),
        optimal,
        alternative,
    }))
}
