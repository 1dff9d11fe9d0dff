//! Explains why no kiln could take a product.

use serde::Serialize;
use thiserror::Error;

use crate::geometry::{MAX_EDGE_HEIGHT, MAX_SMALL_KILN_HEIGHT, MIN_PRODUCT_SIZE, MIN_THICKNESS};
use crate::loading::{BIG_KILN_MANUAL_MAX, SMALL_KILN_MANUAL_MAX, SMALL_KILN_MAX_SIDE};
use crate::types::{GlazePlacement, Product, ProductType};

/// Most specific violated constraint, checked in a fixed priority order.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Infeasibility {
    #[error("Dimensions too small: {length}×{width} cm. Minimum size: 3×3 cm")]
    TooSmall { length: f64, width: f64 },

    #[error("Thickness too small: {thickness} cm. Minimum thickness: 0.8 cm")]
    TooThin { thickness: f64 },

    #[error(
        "Dimensions too large for sinks/countertops: {length}×{width} cm. Maximum for large kiln: 40×20 cm, for small kiln: 150×100 cm"
    )]
    ManualTooLarge { length: f64, width: f64 },

    #[error(
        "Dimensions too large: {length}×{width} cm. Maximum for small kiln: 100 cm (for tile/3D products)"
    )]
    TooLarge { length: f64, width: f64 },

    #[error("Thickness too large for small kiln: {thickness} cm. Maximum: 30 cm")]
    TooThick { thickness: f64 },

    #[error(
        "Product too tall for edge placement: {length} cm. Maximum: 15 cm. Try changing glaze placement to \"Face with back\""
    )]
    TooTallForEdge { length: f64 },

    #[error(
        "Current glaze placement (\"{}\") does not allow placing the product in the kiln. Try another placement",
        .glaze.label()
    )]
    GlazeBlocksLoading { glaze: GlazePlacement },

    #[error(
        "Product {length}×{width}×{thickness} cm cannot be placed in the kiln with current parameters. Check dimensions and glaze placement"
    )]
    Unplaceable {
        length: f64,
        width: f64,
        thickness: f64,
    },
}

/// Inspects the product as entered (before any rotation).
pub fn diagnose(product: &Product) -> Infeasibility {
    let Product {
        length,
        width,
        thickness,
        ..
    } = *product;

    if length < MIN_PRODUCT_SIZE || width < MIN_PRODUCT_SIZE {
        return Infeasibility::TooSmall { length, width };
    }
    if thickness < MIN_THICKNESS {
        return Infeasibility::TooThin { thickness };
    }

    let (max_side, min_side) = (product.max_side(), product.min_side());
    let is_tile = product.product_type == ProductType::Tile;

    if product.product_type.is_manual_placement() {
        let fits_big = max_side <= BIG_KILN_MANUAL_MAX.0 && min_side <= BIG_KILN_MANUAL_MAX.1;
        let fits_small = max_side <= SMALL_KILN_MANUAL_MAX.0 && min_side <= SMALL_KILN_MANUAL_MAX.1;
        if !fits_big && !fits_small {
            return Infeasibility::ManualTooLarge { length, width };
        }
    } else if max_side > SMALL_KILN_MAX_SIDE {
        return Infeasibility::TooLarge { length, width };
    }

    if thickness > MAX_SMALL_KILN_HEIGHT {
        return Infeasibility::TooThick { thickness };
    }

    if is_tile && length > MAX_EDGE_HEIGHT && !product.glaze_reaches_back() {
        return Infeasibility::TooTallForEdge { length };
    }

    if is_tile
        && let Some(glaze) = product.glaze
        && !glaze.allows_edge()
    {
        return Infeasibility::GlazeBlocksLoading { glaze };
    }

    Infeasibility::Unplaceable {
        length,
        width,
        thickness,
    }
}
