//! Sale price derived from a kiln loading.
//!
//! Amounts inside the pipeline are in millions of rupiah (mil Rp) per m²;
//! the final market prices are converted to whole rupiah (IDR).

mod auto;
mod pricing;

pub use auto::{
    AutoParameters, angobe_coefficient, auto_parameters, defect_expenses_percent, delivery_cost,
    infer_shape, packing_cost, stone_defect_by_quantity, stone_defect_percent,
};
pub use pricing::StandardPricing;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::solver::{KilnChoice, Solution, average_loading};
use crate::types::{Kiln, KilnKind, LoadingResult, Product};

/// Fixed economic inputs of the workshop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConstants {
    /// mil Rp
    pub capex: f64,
    /// mil Rp per month
    pub opex: f64,
    pub capex_amortization_months: f64,
    pub firings_per_month: f64,
    /// Firing overhead is split between this many kilns.
    pub kilns_sharing_overhead: f64,
    /// mil Rp per firing
    pub electricity_per_firing: f64,
    /// mil Rp per firing
    pub salary_per_firing: f64,
    pub vat_rate: f64,
    /// mil Rp per m²
    pub angobe_glazes_standard: f64,
    pub custom_glaze_color_cost: f64,
    pub brush_cost: f64,
    /// Firing cost credited back per m² of filler tiles.
    pub filler_cost_per_m2: f64,
    pub margin_domestic: f64,
    pub margin_export: f64,
    pub min_price_per_m2_idr: f64,
}

impl Default for PricingConstants {
    fn default() -> Self {
        Self {
            capex: 405.0,
            opex: 235.0,
            capex_amortization_months: 24.0,
            firings_per_month: 22.0,
            kilns_sharing_overhead: 2.0,
            electricity_per_firing: 0.36,
            salary_per_firing: 0.93,
            vat_rate: 0.12,
            angobe_glazes_standard: 0.2,
            custom_glaze_color_cost: 0.15,
            brush_cost: 0.1,
            filler_cost_per_m2: 2.5 / 1.3,
            margin_domestic: 30.0,
            margin_export: 50.0,
            min_price_per_m2_idr: 2_500_000.0,
        }
    }
}

/// Manual overrides for the auto-derived parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostOverrides {
    pub packing: Option<f64>,
    pub stone_defect_percent: Option<f64>,
    pub angobe_coefficient: Option<f64>,
    pub defect_expenses_percent: Option<f64>,
    pub sales_expenses_percent: Option<f64>,
    pub other_expenses_percent: Option<f64>,
    pub margin_percent: Option<f64>,
}

/// Parameters the price was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    pub stone_cost: f64,
    pub vat_on_stone: f64,
    pub packing: f64,
    pub delivery_cost: f64,
    pub stone_defect_percent: f64,
    pub stone_defect_cost: f64,
    pub total_stone: f64,
    pub angobe_coefficient: f64,
    pub angobe_glazes_total: f64,
    pub defect_expenses_percent: f64,
    pub sales_expenses_percent: f64,
    pub other_expenses_percent: f64,
    pub total_expenses: f64,
    pub vat_on_expenses: f64,
    pub margin_percent: f64,
    pub margin_value: f64,
}

/// Per-m² cost build-up, mil Rp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub stone_cost: f64,
    pub stone_with_defect: f64,
    pub angobe_glazes_total: f64,
    pub electricity: f64,
    pub salary: f64,
    pub firing_cost: f64,
    pub base_cost: f64,
    pub defect_cost: f64,
    pub sales_cost: f64,
    pub other_cost: f64,
    pub total_expenses: f64,
    pub vat_amount: f64,
    pub price_with_vat: f64,
    pub final_price: f64,
}

impl CostBreakdown {
    fn mean(a: &Self, b: &Self) -> Self {
        let m = |x: f64, y: f64| (x + y) / 2.0;
        Self {
            stone_cost: a.stone_cost,
            stone_with_defect: a.stone_with_defect,
            angobe_glazes_total: a.angobe_glazes_total,
            electricity: m(a.electricity, b.electricity),
            salary: m(a.salary, b.salary),
            firing_cost: m(a.firing_cost, b.firing_cost),
            base_cost: m(a.base_cost, b.base_cost),
            defect_cost: m(a.defect_cost, b.defect_cost),
            sales_cost: m(a.sales_cost, b.sales_cost),
            other_cost: m(a.other_cost, b.other_cost),
            total_expenses: m(a.total_expenses, b.total_expenses),
            vat_amount: m(a.vat_amount, b.vat_amount),
            price_with_vat: m(a.price_with_vat, b.price_with_vat),
            final_price: m(a.final_price, b.final_price),
        }
    }
}

/// Price for one market, IDR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub price_per_m2: f64,
    pub price_per_piece: f64,
    pub margin: f64,
    pub margin_percent: f64,
}

impl MarketPrice {
    fn mean(a: &Self, b: &Self) -> Self {
        Self {
            price_per_m2: (a.price_per_m2 + b.price_per_m2) / 2.0,
            price_per_piece: (a.price_per_piece + b.price_per_piece) / 2.0,
            margin: (a.margin + b.margin) / 2.0,
            margin_percent: (a.margin_percent + b.margin_percent) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub product: Product,
    pub kiln: Kiln,
    pub loading: LoadingResult,
    pub order_quantity: u32,
    /// True area of one piece, m².
    pub product_area: f64,
    pub parameters: CostParameters,
    pub breakdown: CostBreakdown,
    pub domestic: MarketPrice,
    pub export: MarketPrice,
}

/// Turns a winning loading into a sale price.
pub trait PricingModel {
    fn price(
        &self,
        kiln: &Kiln,
        product: &Product,
        loading: &LoadingResult,
        stone_price_per_m2: f64,
        overrides: &CostOverrides,
    ) -> Result<CostResult>;
}

/// Mean of the big and small kiln prices for the same product.
pub fn average_cost(big: &CostResult, small: &CostResult) -> CostResult {
    let mut kiln = big.kiln.clone();
    kiln.name = "Average (both kilns)".to_string();
    CostResult {
        product: big.product.clone(),
        kiln,
        loading: average_loading(&big.loading, &small.loading),
        order_quantity: big.order_quantity,
        product_area: big.product_area,
        parameters: big.parameters.clone(),
        breakdown: CostBreakdown::mean(&big.breakdown, &small.breakdown),
        domestic: MarketPrice::mean(&big.domestic, &small.domestic),
        export: MarketPrice::mean(&big.export, &small.export),
    }
}

/// Prices the kiln (or kiln average) the solver selected. `None` when no
/// kiln fits.
pub fn price_selection(
    model: &impl PricingModel,
    solution: &Solution,
    stone_price_per_m2: f64,
    overrides: &CostOverrides,
) -> Result<Option<CostResult>> {
    let price_kind = |kind: KilnKind| -> Result<Option<CostResult>> {
        solution
            .result_for(kind)
            .map(|r| model.price(&r.kiln, &r.product, &r.optimal, stone_price_per_m2, overrides))
            .transpose()
    };

    let Some(selection) = &solution.selection else {
        return Ok(None);
    };
    match selection.choice {
        KilnChoice::Single(kind) => price_kind(kind),
        KilnChoice::Average => {
            match (price_kind(KilnKind::Big)?, price_kind(KilnKind::Small)?) {
                (Some(big), Some(small)) => Ok(Some(average_cost(&big, &small))),
                (big, small) => Ok(big.or(small)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::evaluate_kiln_loading;
    use crate::solver::Solver;
    use crate::types::{GlazePlacement, Product, ProductType};

    #[test]
    fn test_average_cost_means_prices() {
        let product = Product::tile(10.0, 10.0, 1.5)
            .with_glaze(GlazePlacement::FaceOnly)
            .with_quantity(500);
        let pricing = StandardPricing::default();
        let overrides = CostOverrides::default();

        let big_kiln = Kiln::big();
        let small_kiln = Kiln::small();
        let big_loading = evaluate_kiln_loading(&big_kiln, &product).unwrap().unwrap().optimal;
        let small_loading = evaluate_kiln_loading(&small_kiln, &product).unwrap().unwrap().optimal;

        let big = pricing.price(&big_kiln, &product, &big_loading, 1.5, &overrides).unwrap();
        let small = pricing.price(&small_kiln, &product, &small_loading, 1.5, &overrides).unwrap();
        let avg = average_cost(&big, &small);

        assert_eq!(avg.kiln.name, "Average (both kilns)");
        let expected = (big.domestic.price_per_m2 + small.domestic.price_per_m2) / 2.0;
        assert!((avg.domestic.price_per_m2 - expected).abs() < 1e-6);
        let expected_area = (big.loading.total_area + small.loading.total_area) / 2.0;
        assert!((avg.loading.total_area - expected_area).abs() < 1e-12);
    }

    #[test]
    fn test_price_selection_follows_choice() {
        let pricing = StandardPricing::default();
        let overrides = CostOverrides::default();

        let close = Product::tile(10.0, 10.0, 1.5).with_glaze(GlazePlacement::FaceOnly);
        let sol = Solver::new(vec![Kiln::big(), Kiln::small()], close).solve().unwrap();
        let cost = price_selection(&pricing, &sol, 1.5, &overrides).unwrap().unwrap();
        assert_eq!(cost.kiln.name, "Average (both kilns)");

        let top = Product::new(120.0, 80.0, 3.0, ProductType::Countertop);
        let sol = Solver::new(vec![Kiln::big(), Kiln::small()], top).solve().unwrap();
        let cost = price_selection(&pricing, &sol, 1.5, &overrides).unwrap().unwrap();
        assert_eq!(cost.kiln.kind, KilnKind::Small);

        let tiny = Product::tile(2.0, 2.0, 1.0);
        let sol = Solver::new(vec![Kiln::big(), Kiln::small()], tiny).solve().unwrap();
        assert!(price_selection(&pricing, &sol, 1.5, &overrides).unwrap().is_none());
    }
}
