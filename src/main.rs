use std::path::PathBuf;

use clap::Parser;
use kiln_loader::config::Config;
use kiln_loader::cost::{CostOverrides, CostResult, StandardPricing, price_selection};
use kiln_loader::logging;
use kiln_loader::solver::{Solution, Solver};
use kiln_loader::types::{GlazePlacement, KilnKind, LoadingResult, Product, ProductType, Shape};

#[derive(Parser)]
#[command(
    name = "kiln_loader",
    about = "Kiln loading calculator for ceramic products"
)]
struct Cli {
    /// Product size in cm as LxWxT (e.g. 30x15x1.5)
    #[arg(long, value_parser = parse_size)]
    size: (f64, f64, f64),

    /// Product type: tile, countertop, sink, or 3d
    #[arg(long = "type", default_value = "tile", value_parser = parse_product_type)]
    product_type: ProductType,

    /// Shape: square, rectangle, round, triangle, or freeform
    #[arg(long, value_parser = parse_shape)]
    shape: Option<Shape>,

    /// Glaze placement: face-only, face-1-2-edges, face-3-4-edges, or face-with-back
    #[arg(long, value_parser = parse_glaze)]
    glaze: Option<GlazePlacement>,

    /// Kiln to evaluate: big, small, or all
    #[arg(long, default_value = "all", value_parser = parse_kiln_choice)]
    kiln: KilnArg,

    /// Number of pieces in the order
    #[arg(long)]
    quantity: Option<u32>,

    /// Stone price in mil Rp per m²; enables price output
    #[arg(long)]
    stone_price: Option<f64>,

    /// Glaze is mixed to a custom color
    #[arg(long)]
    custom_color: bool,

    /// Glaze is applied by brush
    #[arg(long)]
    brush: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// JSON file overriding kilns and pricing constants
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("invalid size '{}', expected LxWxT", s));
    }
    let mut dims = [0.0; 3];
    for (dim, (part, name)) in dims
        .iter_mut()
        .zip(parts.iter().zip(["length", "width", "thickness"]))
    {
        *dim = part
            .parse::<f64>()
            .map_err(|_| format!("invalid {} in '{}'", name, s))?;
        if !dim.is_finite() || *dim <= 0.0 {
            return Err(format!("{} must be positive in '{}'", name, s));
        }
    }
    Ok((dims[0], dims[1], dims[2]))
}

fn parse_product_type(s: &str) -> Result<ProductType, String> {
    match s {
        "tile" => Ok(ProductType::Tile),
        "countertop" => Ok(ProductType::Countertop),
        "sink" => Ok(ProductType::Sink),
        "3d" => Ok(ProductType::Freeform3d),
        _ => Err(format!(
            "invalid product type '{}', expected: tile, countertop, sink, or 3d",
            s
        )),
    }
}

fn parse_shape(s: &str) -> Result<Shape, String> {
    match s {
        "square" => Ok(Shape::Square),
        "rectangle" => Ok(Shape::Rectangle),
        "round" => Ok(Shape::Round),
        "triangle" => Ok(Shape::Triangle),
        "freeform" => Ok(Shape::Freeform),
        _ => Err(format!(
            "invalid shape '{}', expected: square, rectangle, round, triangle, or freeform",
            s
        )),
    }
}

fn parse_glaze(s: &str) -> Result<GlazePlacement, String> {
    match s {
        "face-only" => Ok(GlazePlacement::FaceOnly),
        "face-1-2-edges" => Ok(GlazePlacement::FaceOneTwoEdges),
        "face-3-4-edges" => Ok(GlazePlacement::FaceThreeFourEdges),
        "face-with-back" => Ok(GlazePlacement::FaceWithBack),
        _ => Err(format!(
            "invalid glaze placement '{}', expected: face-only, face-1-2-edges, face-3-4-edges, or face-with-back",
            s
        )),
    }
}

#[derive(Clone, Copy)]
enum KilnArg {
    One(KilnKind),
    All,
}

impl KilnArg {
    fn kinds(self) -> Vec<KilnKind> {
        match self {
            KilnArg::One(kind) => vec![kind],
            KilnArg::All => KilnKind::ALL.to_vec(),
        }
    }
}

fn parse_kiln_choice(s: &str) -> Result<KilnArg, String> {
    match s {
        "big" => Ok(KilnArg::One(KilnKind::Big)),
        "small" => Ok(KilnArg::One(KilnKind::Small)),
        "all" => Ok(KilnArg::All),
        _ => Err(format!("invalid kiln '{}', expected: big, small, or all", s)),
    }
}

fn print_loading(label: &str, loading: &LoadingResult) {
    println!(
        "  {}: {} - {} pcs, {:.2} m², {} level{}",
        label,
        loading.method_name,
        loading.total_pieces,
        loading.total_area,
        loading.levels,
        if loading.levels == 1 { "" } else { "s" },
    );
    if let Some(b) = &loading.breakdown {
        println!(
            "    on edge: {} pcs ({:.2} m²), flat on top: {} pcs ({:.2} m²)",
            b.edge_pieces, b.edge_area, b.flat_pieces, b.flat_area
        );
    }
    if let Some(f) = &loading.filler {
        println!("    filler 10x10: {} pcs, {:.2} m² ({})", f.pieces, f.area, f.details);
    }
}

fn print_solution(solution: &Solution) {
    for outcome in &solution.outcomes {
        match &outcome.result {
            Some(r) => {
                println!("{} kiln ({}):", outcome.kind, r.kiln.name);
                if r.product != solution.product {
                    println!("  placed as {}", r.product);
                }
                print_loading("optimal", &r.optimal);
                if let Some(alt) = &r.alternative {
                    print_loading("alternative", alt);
                }
            }
            None => println!("{} kiln: does not fit", outcome.kind),
        }
        println!();
    }

    if let Some(sel) = &solution.selection {
        println!("Selection: {}", sel.reason);
    }
    if let Some(reason) = &solution.diagnosis {
        println!("Cannot load: {}", reason);
    }
}

fn print_cost(cost: &CostResult) {
    println!();
    println!("Price ({}):", cost.kiln.name);
    println!(
        "  base cost: {:.3} mil Rp/m², with VAT: {:.3} mil Rp/m²",
        cost.breakdown.base_cost, cost.breakdown.price_with_vat
    );
    for (label, market) in [("domestic", &cost.domestic), ("export", &cost.export)] {
        println!(
            "  {}: {:.0} IDR/m², {:.0} IDR/pc (margin {}%)",
            label, market.price_per_m2, market.price_per_piece, market.margin_percent
        );
    }
}

fn main() {
    logging::init_stderr();
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let (length, width, thickness) = cli.size;
    let mut product = Product::new(length, width, thickness, cli.product_type);
    product.shape = cli.shape;
    product.glaze = cli.glaze;
    product.order_quantity = cli.quantity;
    product.custom_glaze_color = cli.custom_color;
    product.use_brush = cli.brush;

    let solver = Solver::new(config.kilns.select(&cli.kiln.kinds()), product);
    let solution = solver.solve().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let cost = cli.stone_price.map(|stone_price| {
        let pricing = StandardPricing::new(config.pricing.clone());
        price_selection(&pricing, &solution, stone_price, &CostOverrides::default())
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            })
    });

    if cli.json {
        let output = serde_json::json!({
            "solution": solution,
            "cost": cost.flatten(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_solution(&solution);
        if let Some(Some(cost)) = &cost {
            print_cost(cost);
        }
    }

    if !solution.is_feasible() {
        std::process::exit(2);
    }
}
