//! Kiln table and pricing constants, loadable from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cost::PricingConstants;
use crate::error::{Error, Result};
use crate::types::{Kiln, KilnKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnTable {
    pub big: Kiln,
    pub small: Kiln,
}

impl Default for KilnTable {
    fn default() -> Self {
        Self {
            big: Kiln::big(),
            small: Kiln::small(),
        }
    }
}

impl KilnTable {
    pub fn get(&self, kind: KilnKind) -> &Kiln {
        match kind {
            KilnKind::Big => &self.big,
            KilnKind::Small => &self.small,
        }
    }

    /// Kilns in `kinds`, in the order given.
    pub fn select(&self, kinds: &[KilnKind]) -> Vec<Kiln> {
        kinds.iter().map(|k| self.get(*k).clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub kilns: KilnTable,
    pub pricing: PricingConstants,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Reads `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn validate(&self) -> Result<()> {
        for kind in KilnKind::ALL {
            let kiln = self.kilns.get(kind);
            if kiln.kind != kind {
                return Err(Error::invalid_config(format!(
                    "kiln '{}' is listed as {kind} but declares kind {}",
                    kiln.name, kiln.kind
                )));
            }
            kiln.validate()?;
        }

        let p = &self.pricing;
        let positive = [
            ("capex_amortization_months", p.capex_amortization_months),
            ("firings_per_month", p.firings_per_month),
            ("kilns_sharing_overhead", p.kilns_sharing_overhead),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(Error::invalid_config(format!(
                "pricing.{name} must be positive, got {value}"
            )));
        }
        Ok(())
    }
}
