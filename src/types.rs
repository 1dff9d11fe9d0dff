use serde::{Deserialize, Deserializer, Serialize};

/// Identifies one of the two physical kilns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KilnKind {
    /// Legacy multi-level kiln with a modest footprint.
    Big,
    /// Newer single-level kiln with a large shelf.
    Small,
}

impl KilnKind {
    pub const ALL: [KilnKind; 2] = [KilnKind::Big, KilnKind::Small];
}

impl std::fmt::Display for KilnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KilnKind::Big => write!(f, "big"),
            KilnKind::Small => write!(f, "small"),
        }
    }
}

/// Width × depth (× optional height) in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    pub width: f64,
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Dims {
    pub fn new(width: f64, depth: f64, height: Option<f64>) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// Floor area in m².
    pub fn area_m2(&self) -> f64 {
        self.width * self.depth / crate::geometry::CM2_PER_M2
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.height {
            Some(h) => write!(f, "{}x{}x{}", self.width, self.depth, h),
            None => write!(f, "{}x{}", self.width, self.depth),
        }
    }
}

/// Largest working span a kiln may declare, cm. Keeps piece counts well
/// inside `u32`.
pub const MAX_WORKING_SPAN: f64 = 1000.0;

/// Immutable kiln configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kiln {
    pub kind: KilnKind,
    pub name: String,
    pub dimensions: Dims,
    pub offset: f64,
    pub working: Dims,
    /// Loading-efficiency coefficient applied to idealized grid counts.
    pub coefficient: f64,
    pub multi_level: bool,
}

impl Kiln {
    pub fn big() -> Self {
        Self {
            kind: KilnKind::Big,
            name: "Large (old)".to_string(),
            dimensions: Dims::new(60.0, 90.0, Some(80.0)),
            offset: 3.0,
            working: Dims::new(54.0, 84.0, Some(80.0)),
            coefficient: 0.8,
            multi_level: true,
        }
    }

    pub fn small() -> Self {
        Self {
            kind: KilnKind::Small,
            name: "Small (new)".to_string(),
            dimensions: Dims::new(100.0, 160.0, None),
            offset: 0.0,
            working: Dims::new(100.0, 160.0, None),
            coefficient: 0.92,
            multi_level: false,
        }
    }

    pub fn is_small(&self) -> bool {
        self.kind == KilnKind::Small
    }

    /// Checks the configuration contract. A malformed kiln is a caller defect,
    /// not an infeasible loading.
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |reason: String| crate::error::Error::InvalidKiln {
            name: self.name.clone(),
            reason,
        };
        for (label, value) in [
            ("working width", self.working.width),
            ("working depth", self.working.depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{label} must be positive, got {value}")));
            }
            if value > MAX_WORKING_SPAN {
                return Err(invalid(format!(
                    "{label} must be at most {MAX_WORKING_SPAN} cm, got {value}"
                )));
            }
        }
        if let Some(h) = self.working.height {
            if !h.is_finite() || h <= 0.0 {
                return Err(invalid(format!("working height must be positive, got {h}")));
            }
            if h > MAX_WORKING_SPAN {
                return Err(invalid(format!(
                    "working height must be at most {MAX_WORKING_SPAN} cm, got {h}"
                )));
            }
        }
        if self.multi_level && self.working.height.is_none() {
            return Err(invalid("multi-level kiln requires a working height".to_string()));
        }
        if !self.coefficient.is_finite() || self.coefficient <= 0.0 || self.coefficient > 1.5 {
            return Err(invalid(format!(
                "coefficient must be in (0, 1.5], got {}",
                self.coefficient
            )));
        }
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(invalid(format!("offset must be non-negative, got {}", self.offset)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Tile,
    Countertop,
    Sink,
    #[serde(rename = "3d")]
    Freeform3d,
}

impl ProductType {
    /// Countertops and sinks are placed by hand with wide spacing.
    pub fn is_manual_placement(self) -> bool {
        matches!(self, ProductType::Countertop | ProductType::Sink)
    }

    pub fn can_stand_on_edge(self) -> bool {
        self == ProductType::Tile
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductType::Tile => "tile",
            ProductType::Countertop => "countertop",
            ProductType::Sink => "sink",
            ProductType::Freeform3d => "3d",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Rectangle,
    Round,
    Freeform,
    Triangle,
}

impl Shape {
    /// Shapes that cost extra glaze work.
    pub fn is_special(self) -> bool {
        matches!(self, Shape::Round | Shape::Freeform | Shape::Triangle)
    }

    /// Square when the sides are within 10% of each other.
    pub fn infer(length: f64, width: f64) -> Self {
        if (0.9..=1.1).contains(&(length / width)) {
            Shape::Square
        } else {
            Shape::Rectangle
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Shape::Square => "square",
            Shape::Rectangle => "rectangle",
            Shape::Round => "round",
            Shape::Freeform => "freeform",
            Shape::Triangle => "triangle",
        };
        f.write_str(s)
    }
}

/// Which surfaces of the piece carry glaze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlazePlacement {
    #[serde(rename = "face-only")]
    FaceOnly,
    #[serde(rename = "face-1-2-edges")]
    FaceOneTwoEdges,
    #[serde(rename = "face-3-4-edges")]
    FaceThreeFourEdges,
    #[serde(rename = "face-with-back")]
    FaceWithBack,
}

impl GlazePlacement {
    /// Glaze on the back or on 3-4 edges would touch the shelf or the
    /// neighbouring piece when standing on edge.
    pub fn allows_edge(self) -> bool {
        matches!(self, GlazePlacement::FaceOnly | GlazePlacement::FaceOneTwoEdges)
    }

    pub fn reaches_back(self) -> bool {
        self == GlazePlacement::FaceWithBack
    }

    pub fn label(self) -> &'static str {
        match self {
            GlazePlacement::FaceOnly => "Face only",
            GlazePlacement::FaceOneTwoEdges => "Face + 1-2 edges",
            GlazePlacement::FaceThreeFourEdges => "Face + 3-4 edges",
            GlazePlacement::FaceWithBack => "Face with back",
        }
    }
}

impl std::fmt::Display for GlazePlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GlazePlacement::FaceOnly => "face-only",
            GlazePlacement::FaceOneTwoEdges => "face-1-2-edges",
            GlazePlacement::FaceThreeFourEdges => "face-3-4-edges",
            GlazePlacement::FaceWithBack => "face-with-back",
        };
        f.write_str(s)
    }
}

/// A product to be fired. Dimensions are in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub length: f64,
    pub width: f64,
    pub thickness: f64,
    #[serde(default, rename = "type")]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glaze: Option<GlazePlacement>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_opt_u32_from_number"
    )]
    pub order_quantity: Option<u32>,
    #[serde(default)]
    pub custom_glaze_color: bool,
    #[serde(default)]
    pub use_brush: bool,
}

impl Product {
    pub fn new(length: f64, width: f64, thickness: f64, product_type: ProductType) -> Self {
        Self {
            length,
            width,
            thickness,
            product_type,
            shape: None,
            glaze: None,
            order_quantity: None,
            custom_glaze_color: false,
            use_brush: false,
        }
    }

    pub fn tile(length: f64, width: f64, thickness: f64) -> Self {
        Self::new(length, width, thickness, ProductType::Tile)
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_glaze(mut self, glaze: GlazePlacement) -> Self {
        self.glaze = Some(glaze);
        self
    }

    pub fn with_quantity(mut self, qty: u32) -> Self {
        self.order_quantity = Some(qty);
        self
    }

    /// The same product turned 90° on the shelf.
    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
            ..self.clone()
        }
    }

    pub fn is_square(&self) -> bool {
        self.length == self.width
    }

    pub fn max_side(&self) -> f64 {
        self.length.max(self.width)
    }

    pub fn min_side(&self) -> f64 {
        self.length.min(self.width)
    }

    /// Shape as given, or inferred from the sides for a tile without one.
    pub fn resolved_shape(&self) -> Option<Shape> {
        self.shape.or_else(|| {
            (self.product_type == ProductType::Tile).then(|| Shape::infer(self.length, self.width))
        })
    }

    pub fn glaze_reaches_back(&self) -> bool {
        self.glaze.is_some_and(GlazePlacement::reaches_back)
    }

    /// Finite dimensions are part of the caller contract; values that are
    /// merely too small are an ordinary infeasibility.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (label, value) in [
            ("length", self.length),
            ("width", self.width),
            ("thickness", self.thickness),
        ] {
            if !value.is_finite() {
                return Err(crate::error::Error::InvalidProduct(format!(
                    "{label} is not a finite number"
                )));
            }
        }
        if self.order_quantity == Some(0) {
            return Err(crate::error::Error::InvalidProduct(
                "order quantity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.length, self.width, self.thickness)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingMethod {
    Edge,
    Flat,
    Combined,
}

/// Edge/flat split of a combined loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeBreakdown {
    pub edge_pieces: u32,
    pub flat_pieces: u32,
    pub edge_area: f64,
    pub flat_area: f64,
}

/// 10×10 accessory tiles packed into leftover shelf space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerResult {
    pub pieces: u32,
    pub area: f64,
    pub details: String,
}

/// Output of one loading strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingResult {
    pub method: LoadingMethod,
    pub method_name: String,
    pub total_pieces: u32,
    /// Always `total_pieces × true per-piece area`, in m².
    pub total_area: f64,
    pub levels: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<EdgeBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler: Option<FillerResult>,
}

/// Best loading of one product in one kiln.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub kiln: Kiln,
    pub product: Product,
    pub optimal: LoadingResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<LoadingResult>,
}

/// Accepts JSON numbers like `3` or `3.0` for whole-number fields.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {value}"
        )));
    }
    Ok(value as u32)
}

fn deserialize_opt_u32_from_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_u32_from_number")] u32);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(v)| v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kilns_are_valid() {
        assert!(Kiln::big().validate().is_ok());
        assert!(Kiln::small().validate().is_ok());
    }

    #[test]
    fn test_kiln_contract_violations() {
        let mut kiln = Kiln::big();
        kiln.working.height = None;
        assert!(kiln.validate().is_err());

        let mut kiln = Kiln::small();
        kiln.coefficient = 0.0;
        assert!(kiln.validate().is_err());

        let mut kiln = Kiln::small();
        kiln.working.width = f64::NAN;
        assert!(kiln.validate().is_err());
    }

    #[test]
    fn test_kiln_working_span_is_bounded() {
        let mut kiln = Kiln::small();
        kiln.working = Dims::new(1_000_000.0, 1_000_000.0, None);
        assert!(matches!(
            kiln.validate(),
            Err(crate::error::Error::InvalidKiln { .. })
        ));

        let mut kiln = Kiln::big();
        kiln.working.height = Some(5000.0);
        assert!(kiln.validate().is_err());

        let mut kiln = Kiln::big();
        kiln.working = Dims::new(MAX_WORKING_SPAN, MAX_WORKING_SPAN, Some(MAX_WORKING_SPAN));
        assert!(kiln.validate().is_ok());
    }

    #[test]
    fn test_missing_tile_shape_is_inferred() {
        assert_eq!(Product::tile(45.0, 10.0, 1.0).resolved_shape(), Some(Shape::Rectangle));
        assert_eq!(Product::tile(10.5, 10.0, 1.0).resolved_shape(), Some(Shape::Square));
        let round = Product::tile(20.0, 20.0, 1.0).with_shape(Shape::Round);
        assert_eq!(round.resolved_shape(), Some(Shape::Round));
        let sink = Product::new(40.0, 30.0, 10.0, ProductType::Sink);
        assert_eq!(sink.resolved_shape(), None);
    }

    #[test]
    fn test_rotated_swaps_length_and_width() {
        let p = Product::tile(30.0, 10.0, 2.0).with_shape(Shape::Rectangle);
        let r = p.rotated();
        assert_eq!(r.length, 10.0);
        assert_eq!(r.width, 30.0);
        assert_eq!(r.thickness, 2.0);
        assert_eq!(r.shape, Some(Shape::Rectangle));
    }

    #[test]
    fn test_glaze_edge_compatibility() {
        assert!(GlazePlacement::FaceOnly.allows_edge());
        assert!(GlazePlacement::FaceOneTwoEdges.allows_edge());
        assert!(!GlazePlacement::FaceThreeFourEdges.allows_edge());
        assert!(!GlazePlacement::FaceWithBack.allows_edge());
    }

    #[test]
    fn test_product_json_names() {
        let json = r#"{
            "length": 20, "width": 10, "thickness": 1.5,
            "type": "3d", "shape": "triangle", "glaze": "face-1-2-edges",
            "order_quantity": 12.0
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.product_type, ProductType::Freeform3d);
        assert_eq!(p.shape, Some(Shape::Triangle));
        assert_eq!(p.glaze, Some(GlazePlacement::FaceOneTwoEdges));
        assert_eq!(p.order_quantity, Some(12));
        assert!(!p.use_brush);
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let json = r#"{"length": 20, "width": 10, "thickness": 1.5, "order_quantity": 2.5}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }
}
