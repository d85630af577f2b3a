use crate::atlas::Atlas;
use crate::config::AppConfig;
use crate::selector::{DetailPanels, Selection};
use crate::types::CountryAggregate;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

pub struct AppState {
    pub atlas: Atlas,
    pub world_svg: String,
    /// Clicks are applied one at a time; the lock covers the whole clear-then-draw.
    pub panels: Mutex<DetailPanels>,
}

impl AppState {
    pub fn new(config: &AppConfig, atlas: Atlas) -> Result<Self> {
        let world_svg = atlas
            .render_world(&config.map)
            .context("Failed to render world map")?
            .to_svg();
        Ok(Self {
            atlas,
            world_svg,
            panels: Mutex::new(DetailPanels::new(&config.detail)),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    #[serde(flatten)]
    pub selection: Selection,
    pub svg: String,
}

pub fn router(state: Arc<AppState>, config: &AppConfig) -> Router {
    Router::new()
        .route("/api/world", get(world_handler))
        .route("/api/totals", get(totals_handler))
        .route("/api/countries/:index/select", post(select_handler))
        .route("/api/panels/:name", get(panel_handler))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, atlas: Atlas) -> Result<()> {
    let state = Arc::new(AppState::new(&config, atlas)?);

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("Starting server on http://{}", addr);

    let app = router(state, &config);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn world_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], state.world_svg.clone())
}

async fn totals_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CountryAggregate>> {
    Json(state.atlas.totals.as_slice().to_vec())
}

async fn select_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<SelectResponse>, (StatusCode, String)> {
    let country = state
        .atlas
        .country(index)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No country at index {}", index)))?;

    let mut panels = state.panels.lock().await;
    let selection = panels.show(country, &state.atlas.stores);
    let svg = panels.panel(selection.slot).to_svg();

    Ok(Json(SelectResponse { selection, svg }))
}

async fn panel_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let panels = state.panels.lock().await;
    let panel = panels
        .panel_by_name(&name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No detail panel named '{}'", name)))?;

    if panel.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], panel.to_svg()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Datasets;
    use crate::selector::Slot;
    use crate::types::{CountryFeature, StoreRecord};
    use geo::{polygon, MultiPolygon};

    const CONFIG: &str = r#"
        [input]
        countries = "data/countries.geojson"
        stores_csv = "data/starbucks.csv"

        [output]
        dir = "output"

        [server]
        port = 3000
    "#;

    fn state() -> Arc<AppState> {
        let config = AppConfig::from_toml(CONFIG).unwrap();
        let square = |lon: f64, lat: f64| {
            MultiPolygon::new(vec![polygon![
                (x: lon, y: lat),
                (x: lon + 4.0, y: lat),
                (x: lon + 4.0, y: lat + 4.0),
                (x: lon, y: lat + 4.0),
                (x: lon, y: lat),
            ]])
        };
        let store = |code: &str, lon: f64, lat: f64| StoreRecord {
            country_code: code.to_string(),
            latitude: lat,
            longitude: lon,
        };
        let datasets = Datasets {
            countries: vec![
                CountryFeature { code: "US".into(), name: "United States".into(), geometry: square(-100.0, 35.0) },
                CountryFeature { code: "FR".into(), name: "France".into(), geometry: square(0.0, 45.0) },
                CountryFeature { code: "IS".into(), name: "Iceland".into(), geometry: square(-20.0, 63.0) },
            ],
            stores: vec![
                store("US", -98.0, 36.0),
                store("US", -97.0, 37.0),
                store("FR", 2.0, 47.0),
            ],
        };
        let atlas = Atlas::build(&config.map, datasets).unwrap();
        Arc::new(AppState::new(&config, atlas).unwrap())
    }

    #[tokio::test]
    async fn clicks_alternate_between_detail_panels() {
        let state = state();

        let Json(first) = select_handler(State(state.clone()), Path(0)).await.unwrap();
        let Json(second) = select_handler(State(state.clone()), Path(1)).await.unwrap();
        let Json(third) = select_handler(State(state.clone()), Path(2)).await.unwrap();

        assert_eq!((first.selection.slot, first.selection.panel.as_str()), (Slot::A, "vis2"));
        assert_eq!((second.selection.slot, second.selection.panel.as_str()), (Slot::B, "vis3"));
        assert_eq!((third.selection.slot, third.selection.panel.as_str()), (Slot::A, "vis2"));
        assert_eq!(first.selection.points, 2);
        assert_eq!(third.selection.points, 0);
        assert!(third.svg.contains(r#"data-code="IS""#));
        assert!(!third.svg.contains(r#"data-code="US""#));
    }

    #[tokio::test]
    async fn unknown_country_index_is_not_found() {
        let state = state();
        let err = select_handler(State(state), Path(42)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn panels_report_their_drawing_state() {
        let state = state();

        let empty = panel_handler(State(state.clone()), Path("vis2".to_string())).await.unwrap();
        assert_eq!(empty.status(), StatusCode::NO_CONTENT);

        select_handler(State(state.clone()), Path(1)).await.unwrap();
        let drawn = panel_handler(State(state.clone()), Path("vis2".to_string())).await.unwrap();
        assert_eq!(drawn.status(), StatusCode::OK);

        let missing = panel_handler(State(state), Path("vis1".to_string())).await;
        assert_eq!(missing.err().map(|(status, _)| status), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn totals_are_served_in_first_seen_order() {
        let state = state();
        let Json(totals) = totals_handler(State(state)).await;
        let codes: Vec<(&str, u32)> = totals.iter().map(|a| (a.country_code.as_str(), a.total)).collect();
        assert_eq!(codes, [("US", 2), ("FR", 1)]);
    }

    #[test]
    fn selection_serializes_with_svg() {
        let response = SelectResponse {
            selection: Selection {
                slot: Slot::B,
                panel: "vis3".to_string(),
                code: "FR".to_string(),
                name: "France".to_string(),
                points: 1,
            },
            svg: "<svg/>".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["slot"], "B");
        assert_eq!(json["panel"], "vis3");
        assert_eq!(json["svg"], "<svg/>");
    }
}
