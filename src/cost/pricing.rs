use tracing::{debug, warn};

use super::auto::auto_parameters;
use super::{
    CostBreakdown, CostOverrides, CostParameters, CostResult, MarketPrice, PricingConstants,
    PricingModel,
};
use crate::error::{Error, Result};
use crate::geometry::true_area;
use crate::types::{Kiln, LoadingResult, Product};

const IDR_PER_MIL_RP: f64 = 1_000_000.0;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Domestic margin falls as the stone gets more expensive.
fn domestic_margin(stone_price: f64, base: f64) -> f64 {
    if stone_price > 4.0 {
        20.0
    } else if stone_price > 3.0 {
        22.0
    } else if stone_price > 2.0 {
        25.0
    } else {
        base
    }
}

fn check_finite(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(Error::invalid_pricing(format!("{name} must be a non-negative number, got {v}")))
        }
        _ => Ok(()),
    }
}

/// The workshop's cost sheet: stone, glaze, firing share, overheads, VAT
/// and margin.
#[derive(Debug, Clone, Default)]
pub struct StandardPricing {
    pub constants: PricingConstants,
}

impl StandardPricing {
    pub fn new(constants: PricingConstants) -> Self {
        Self { constants }
    }

    /// Overhead of one firing before it is spread over the loaded area, mil Rp.
    pub fn firing_cost(&self) -> f64 {
        let c = &self.constants;
        let capex = c.capex / c.capex_amortization_months / c.firings_per_month / c.kilns_sharing_overhead;
        let opex = c.opex / c.firings_per_month / c.kilns_sharing_overhead;
        capex + opex + c.electricity_per_firing + c.salary_per_firing
    }

    fn market_price(&self, price_with_vat: f64, margin_percent: f64, piece_area: f64) -> MarketPrice {
        let per_m2 = round_cents(price_with_vat * (1.0 + margin_percent / 100.0) * IDR_PER_MIL_RP)
            .max(self.constants.min_price_per_m2_idr);
        MarketPrice {
            price_per_m2: per_m2,
            price_per_piece: round_cents(per_m2 * piece_area),
            margin: round_cents(price_with_vat * margin_percent / 100.0 * IDR_PER_MIL_RP),
            margin_percent,
        }
    }
}

impl PricingModel for StandardPricing {
    fn price(
        &self,
        kiln: &Kiln,
        product: &Product,
        loading: &LoadingResult,
        stone_price_per_m2: f64,
        overrides: &CostOverrides,
    ) -> Result<CostResult> {
        if !stone_price_per_m2.is_finite() || stone_price_per_m2 < 0.0 {
            return Err(Error::invalid_pricing(format!(
                "stone price must be a non-negative number, got {stone_price_per_m2}"
            )));
        }
        check_finite("packing", overrides.packing)?;
        check_finite("stone defect percent", overrides.stone_defect_percent)?;
        check_finite("angobe coefficient", overrides.angobe_coefficient)?;
        check_finite("defect expenses percent", overrides.defect_expenses_percent)?;
        check_finite("sales expenses percent", overrides.sales_expenses_percent)?;
        check_finite("other expenses percent", overrides.other_expenses_percent)?;
        check_finite("margin percent", overrides.margin_percent)?;

        let c = &self.constants;
        let auto = auto_parameters(product);
        let stone = stone_price_per_m2;
        let piece_area = true_area(product);

        let packing = overrides.packing.unwrap_or(auto.packing);
        let vat_on_stone = stone * c.vat_rate;
        let stone_defect_percent = overrides
            .stone_defect_percent
            .unwrap_or(auto.stone_defect_percent);
        let stone_defect_cost = stone * stone_defect_percent / 100.0;
        let vat_on_defect = stone_defect_cost * c.vat_rate;
        let total_stone =
            stone + vat_on_stone + packing + auto.delivery_cost + stone_defect_cost + vat_on_defect;

        let angobe_coefficient = overrides
            .angobe_coefficient
            .unwrap_or(auto.angobe_coefficient);
        let mut angobe_glazes_total = c.angobe_glazes_standard * angobe_coefficient;
        if product.custom_glaze_color {
            angobe_glazes_total += c.custom_glaze_color_cost;
        }
        if product.use_brush {
            angobe_glazes_total += c.brush_cost;
        }

        // filler tiles carry their own share of the firing
        let volume = loading.total_area;
        let filler_area = loading.filler.as_ref().map_or(0.0, |f| f.area);
        let mut firing_for_product = self.firing_cost() - filler_area * c.filler_cost_per_m2;
        if firing_for_product < 0.0 {
            warn!(filler_area, "filler credit exceeds firing cost, clamped to zero");
            firing_for_product = 0.0;
        }
        let per_m2 = |cost: f64| if volume > 0.0 { cost / volume } else { 0.0 };
        let firing_cost_per_m2 = per_m2(firing_for_product);

        let base_cost = firing_cost_per_m2 + total_stone + angobe_glazes_total;

        let defect_expenses_percent = overrides
            .defect_expenses_percent
            .unwrap_or(auto.defect_expenses_percent);
        let sales_expenses_percent = overrides
            .sales_expenses_percent
            .unwrap_or(auto.sales_expenses_percent);
        let other_expenses_percent = overrides
            .other_expenses_percent
            .unwrap_or(auto.other_expenses_percent);
        let defect_cost = base_cost * defect_expenses_percent / 100.0;
        let sales_cost = base_cost * sales_expenses_percent / 100.0;
        let other_cost = base_cost * other_expenses_percent / 100.0;
        let total_expenses = base_cost + defect_cost + sales_cost + other_cost;
        let vat_amount = total_expenses * c.vat_rate;
        let price_with_vat = total_expenses + vat_amount;

        let margin_percent = overrides
            .margin_percent
            .unwrap_or_else(|| domestic_margin(stone, c.margin_domestic));
        let domestic = self.market_price(price_with_vat, margin_percent, piece_area);
        let export = self.market_price(price_with_vat, c.margin_export, piece_area);

        debug!(
            kiln = %kiln.kind,
            %product,
            base_cost,
            price_with_vat,
            domestic = domestic.price_per_m2,
            "priced loading"
        );

        Ok(CostResult {
            product: product.clone(),
            kiln: kiln.clone(),
            loading: loading.clone(),
            order_quantity: product.order_quantity.unwrap_or(0),
            product_area: piece_area,
            parameters: CostParameters {
                stone_cost: stone,
                vat_on_stone,
                packing,
                delivery_cost: auto.delivery_cost,
                stone_defect_percent,
                stone_defect_cost,
                total_stone,
                angobe_coefficient,
                angobe_glazes_total,
                defect_expenses_percent,
                sales_expenses_percent,
                other_expenses_percent,
                total_expenses: defect_cost + sales_cost + other_cost,
                vat_on_expenses: vat_amount,
                margin_percent,
                margin_value: price_with_vat * margin_percent / 100.0,
            },
            breakdown: CostBreakdown {
                stone_cost: stone,
                stone_with_defect: stone + stone_defect_cost + vat_on_defect,
                angobe_glazes_total,
                electricity: per_m2(c.electricity_per_firing),
                salary: per_m2(c.salary_per_firing),
                firing_cost: firing_cost_per_m2,
                base_cost,
                defect_cost,
                sales_cost,
                other_cost,
                total_expenses,
                vat_amount,
                price_with_vat,
                final_price: price_with_vat * (1.0 + margin_percent / 100.0),
            },
            domestic,
            export,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FillerResult, GlazePlacement, LoadingMethod};

    fn flat_loading(area: f64, filler: Option<FillerResult>) -> LoadingResult {
        LoadingResult {
            method: LoadingMethod::Flat,
            method_name: "Flat (face up)".to_string(),
            total_pieces: 100,
            total_area: area,
            levels: 1,
            breakdown: None,
            filler,
        }
    }

    fn product() -> Product {
        Product::tile(30.0, 30.0, 2.0)
            .with_glaze(GlazePlacement::FaceOnly)
            .with_quantity(1000)
    }

    #[test]
    fn test_firing_cost() {
        let pricing = StandardPricing::default();
        // 405/24/22/2 + 235/22/2 + 0.36 + 0.93
        let expected = 0.383_522_727 + 5.340_909_090 + 1.29;
        assert!((pricing.firing_cost() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_price_build_up() {
        let pricing = StandardPricing::default();
        let loading = flat_loading(5.0, None);
        let res = pricing
            .price(&Kiln::big(), &product(), &loading, 1.5, &CostOverrides::default())
            .unwrap();

        // 30×30 tile: packing 0.15, defect 10%, delivery 0.18
        let p = &res.parameters;
        assert!((p.packing - 0.15).abs() < 1e-12);
        assert_eq!(p.stone_defect_percent, 10.0);
        assert_eq!(p.defect_expenses_percent, 10.0);
        assert!((p.delivery_cost - 0.18).abs() < 1e-12);
        assert_eq!(p.margin_percent, 30.0);

        let b = &res.breakdown;
        assert!((b.firing_cost - pricing.firing_cost() / 5.0).abs() < 1e-12);
        let expected_with_vat = b.base_cost * 1.25 * 1.12;
        assert!((b.price_with_vat - expected_with_vat).abs() < 1e-9);
        assert!((b.final_price - b.price_with_vat * 1.3).abs() < 1e-9);

        let expected_m2 = round_cents(b.final_price * IDR_PER_MIL_RP);
        assert_eq!(res.domestic.price_per_m2, expected_m2.max(2_500_000.0));
        assert_eq!(res.export.margin_percent, 50.0);
        assert!(res.export.price_per_m2 > res.domestic.price_per_m2);
        assert!((res.product_area - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_margin_by_stone_price() {
        assert_eq!(domestic_margin(4.5, 30.0), 20.0);
        assert_eq!(domestic_margin(3.5, 30.0), 22.0);
        assert_eq!(domestic_margin(2.5, 30.0), 25.0);
        assert_eq!(domestic_margin(2.0, 30.0), 30.0);
    }

    #[test]
    fn test_minimum_price_floor() {
        let pricing = StandardPricing::default();
        let loading = flat_loading(1000.0, None);
        let res = pricing
            .price(&Kiln::big(), &product(), &loading, 0.0, &CostOverrides::default())
            .unwrap();
        assert_eq!(res.domestic.price_per_m2, 2_500_000.0);
        assert_eq!(res.domestic.price_per_piece, 225_000.0);
    }

    #[test]
    fn test_filler_reduces_firing_share() {
        let pricing = StandardPricing::default();
        let plain = pricing
            .price(&Kiln::small(), &product(), &flat_loading(5.0, None), 1.5, &CostOverrides::default())
            .unwrap();
        let filler = FillerResult {
            pieces: 100,
            area: 1.0,
            details: "depth lane: 100 pcs".to_string(),
        };
        let filled = pricing
            .price(
                &Kiln::small(),
                &product(),
                &flat_loading(5.0, Some(filler)),
                1.5,
                &CostOverrides::default(),
            )
            .unwrap();
        assert!(filled.breakdown.firing_cost < plain.breakdown.firing_cost);
    }

    #[test]
    fn test_overrides_win() {
        let pricing = StandardPricing::default();
        let overrides = CostOverrides {
            packing: Some(0.5),
            margin_percent: Some(40.0),
            ..Default::default()
        };
        let res = pricing
            .price(&Kiln::big(), &product(), &flat_loading(5.0, None), 1.5, &overrides)
            .unwrap();
        assert_eq!(res.parameters.packing, 0.5);
        assert_eq!(res.domestic.margin_percent, 40.0);
    }

    #[test]
    fn test_extras_add_to_glaze_cost() {
        let pricing = StandardPricing::default();
        let mut p = product();
        p.custom_glaze_color = true;
        p.use_brush = true;
        let res = pricing
            .price(&Kiln::big(), &p, &flat_loading(5.0, None), 1.5, &CostOverrides::default())
            .unwrap();
        assert!((res.parameters.angobe_glazes_total - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_does_not_divide() {
        let pricing = StandardPricing::default();
        let res = pricing
            .price(&Kiln::big(), &product(), &flat_loading(0.0, None), 1.5, &CostOverrides::default())
            .unwrap();
        assert_eq!(res.breakdown.firing_cost, 0.0);
        assert_eq!(res.breakdown.electricity, 0.0);
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let pricing = StandardPricing::default();
        let loading = flat_loading(5.0, None);
        assert!(
            pricing
                .price(&Kiln::big(), &product(), &loading, f64::NAN, &CostOverrides::default())
                .is_err()
        );
        let bad = CostOverrides {
            margin_percent: Some(-5.0),
            ..Default::default()
        };
        assert!(pricing.price(&Kiln::big(), &product(), &loading, 1.5, &bad).is_err());
    }
}
