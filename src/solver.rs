use serde::Serialize;
use tracing::{debug, info};

use crate::diagnosis::{Infeasibility, diagnose};
use crate::error::Result;
use crate::loading::evaluate_kiln_loading;
use crate::types::{CalculationResult, Kiln, KilnKind, LoadingResult, Product};

/// Above this spread in loaded area the better kiln is used alone instead of
/// the average of both.
pub const AVERAGE_MAX_DIFFERENCE_PERCENT: f64 = 30.0;

/// Evaluates `product` as given and turned 90°, keeping the larger optimal
/// area. Square products are evaluated once.
pub fn best_orientation(kiln: &Kiln, product: &Product) -> Result<Option<CalculationResult>> {
    let original = evaluate_kiln_loading(kiln, product)?;
    if product.is_square() {
        return Ok(original);
    }
    let rotated = evaluate_kiln_loading(kiln, &product.rotated())?;

    Ok(match (original, rotated) {
        (Some(o), Some(r)) => {
            if o.optimal.total_area >= r.optimal.total_area {
                Some(o)
            } else {
                debug!(kiln = %kiln.kind, "rotated orientation wins");
                Some(r)
            }
        }
        (o, r) => o.or(r),
    })
}

/// Result for one kiln after orientation search.
#[derive(Debug, Clone, Serialize)]
pub struct KilnOutcome {
    pub kind: KilnKind,
    pub result: Option<CalculationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KilnChoice {
    Single(KilnKind),
    Average,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KilnSelection {
    pub choice: KilnChoice,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_percent: Option<f64>,
}

/// Picks which kiln (or the average of both) prices the product.
pub fn select_kiln(outcomes: &[KilnOutcome]) -> Option<KilnSelection> {
    let loaded: Vec<(&Kiln, f64)> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref())
        .map(|r| (&r.kiln, r.optimal.total_area))
        .collect();

    match loaded.as_slice() {
        [] => None,
        [(kiln, _)] => Some(KilnSelection {
            choice: KilnChoice::Single(kiln.kind),
            reason: if outcomes.len() == 1 {
                format!("Only {} kiln was evaluated", kiln.name)
            } else {
                format!("Only {} kiln fits this product", kiln.name)
            },
            difference_percent: None,
        }),
        [(first, first_area), (second, second_area), ..] => {
            let max = first_area.max(*second_area);
            let min = first_area.min(*second_area);
            let difference = (max - min) / min * 100.0;
            if difference <= AVERAGE_MAX_DIFFERENCE_PERCENT {
                Some(KilnSelection {
                    choice: KilnChoice::Average,
                    reason: format!(
                        "Using average loading (difference: {difference:.1}% ≤ {AVERAGE_MAX_DIFFERENCE_PERCENT}%)"
                    ),
                    difference_percent: Some(difference),
                })
            } else {
                let best = if first_area > second_area { first } else { second };
                Some(KilnSelection {
                    choice: KilnChoice::Single(best.kind),
                    reason: format!(
                        "Using {} only (difference: {difference:.1}% > {AVERAGE_MAX_DIFFERENCE_PERCENT}%)",
                        best.name
                    ),
                    difference_percent: Some(difference),
                })
            }
        }
    }
}

/// Mean of two loadings. Counts are rounded to the nearest whole number.
pub fn average_loading(a: &LoadingResult, b: &LoadingResult) -> LoadingResult {
    LoadingResult {
        total_pieces: ((a.total_pieces + b.total_pieces) as f64 / 2.0).round() as u32,
        total_area: (a.total_area + b.total_area) / 2.0,
        levels: ((a.levels + b.levels) as f64 / 2.0).round() as u32,
        ..a.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub product: Product,
    pub outcomes: Vec<KilnOutcome>,
    pub selection: Option<KilnSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Infeasibility>,
}

impl Solution {
    pub fn result_for(&self, kind: KilnKind) -> Option<&CalculationResult> {
        self.outcomes
            .iter()
            .find(|o| o.kind == kind)
            .and_then(|o| o.result.as_ref())
    }

    pub fn is_feasible(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_some())
    }
}

/// Evaluates one product against a set of kilns.
pub struct Solver {
    kilns: Vec<Kiln>,
    product: Product,
}

impl Solver {
    pub fn new(kilns: Vec<Kiln>, product: Product) -> Self {
        Self { kilns, product }
    }

    pub fn solve(&self) -> Result<Solution> {
        let outcomes = self
            .kilns
            .iter()
            .map(|kiln| {
                Ok(KilnOutcome {
                    kind: kiln.kind,
                    result: best_orientation(kiln, &self.product)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let selection = select_kiln(&outcomes);
        let diagnosis = if outcomes.iter().all(|o| o.result.is_none()) {
            Some(diagnose(&self.product))
        } else {
            None
        };

        match (&selection, &diagnosis) {
            (Some(sel), _) => info!(product = %self.product, reason = %sel.reason, "kiln selected"),
            (None, Some(reason)) => info!(product = %self.product, %reason, "no kiln fits"),
            (None, None) => {}
        }

        Ok(Solution {
            product: self.product.clone(),
            outcomes,
            selection,
            diagnosis,
        })
    }
}
