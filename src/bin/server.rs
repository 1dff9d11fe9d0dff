use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kiln_loader::config::Config;
use kiln_loader::cost::{CostOverrides, CostResult, StandardPricing, price_selection};
use kiln_loader::diagnosis::Infeasibility;
use kiln_loader::logging;
use kiln_loader::solver::{Solution, Solver};
use kiln_loader::types::{KilnKind, Product};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

struct AppState {
    config: Config,
    pricing: StandardPricing,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum KilnSelector {
    Big,
    Small,
    #[default]
    All,
}

impl KilnSelector {
    fn kinds(self) -> Vec<KilnKind> {
        match self {
            KilnSelector::Big => vec![KilnKind::Big],
            KilnSelector::Small => vec![KilnKind::Small],
            KilnSelector::All => KilnKind::ALL.to_vec(),
        }
    }
}

#[derive(Deserialize, Serialize)]
struct EvaluateRequest {
    product: Product,
    #[serde(default)]
    kiln: KilnSelector,
}

#[derive(Deserialize, Serialize)]
struct PriceRequest {
    product: Product,
    #[serde(default)]
    kiln: KilnSelector,
    /// mil Rp per m²
    stone_price: f64,
    #[serde(default)]
    overrides: CostOverrides,
}

#[derive(Serialize)]
struct Unloadable {
    error: String,
    diagnosis: Option<Infeasibility>,
}

fn unloadable(solution: &Solution) -> Response {
    let body = Unloadable {
        error: solution
            .diagnosis
            .as_ref()
            .map_or_else(|| "no kiln fits this product".to_string(), |d| d.to_string()),
        diagnosis: solution.diagnosis.clone(),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

fn solve(state: &AppState, product: Product, kiln: KilnSelector) -> Result<Solution, (StatusCode, String)> {
    let kilns = state.config.kilns.select(&kiln.kinds());
    Solver::new(kilns, product)
        .solve()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Response, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /evaluate"
    );

    let solution = solve(&state, req.product, req.kiln)?;
    if !solution.is_feasible() {
        return Ok(unloadable(&solution));
    }
    Ok(Json(solution).into_response())
}

async fn price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PriceRequest>,
) -> Result<Response, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /price"
    );

    let solution = solve(&state, req.product, req.kiln)?;
    let cost: Option<CostResult> =
        price_selection(&state.pricing, &solution, req.stone_price, &req.overrides)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match cost {
        Some(cost) => Ok(Json(cost).into_response()),
        None => Ok(unloadable(&solution)),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init_file("development.log") {
        eprintln!("Error: failed to open development.log: {}", e);
        std::process::exit(1);
    }

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let config_path = std::env::var_os("KILN_CONFIG").map(std::path::PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let state = Arc::new(AppState {
        pricing: StandardPricing::new(config.pricing.clone()),
        config,
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/evaluate", post(evaluate))
        .route("/price", post(price))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
