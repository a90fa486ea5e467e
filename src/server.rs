//! HTTP surface: `GET /fetch` and `GET /health`.

use crate::config::AppConfig;
use crate::date;
use crate::models::FetchReport;
use crate::pipeline::{self, PipelineSettings};
use crate::scrapers::SessionLauncher;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub const MISSING_DATE: &str = "Missing ?date=DD-MM-YYYY";

/// Shared by every handler. Each request still launches its own browser.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<PipelineSettings>,
    launcher: Arc<dyn SessionLauncher>,
}

impl AppState {
    pub fn new(config: &AppConfig, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            settings: Arc::new(PipelineSettings {
                listing_url_template: config.listing_url_template.clone(),
                settle_delay: config.settle_delay,
            }),
            launcher,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", MISSING_DATE)]
    MissingDate,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingDate => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_DATE }))).into_response()
            }
            ApiError::Internal(err) => {
                error!("Fetch failed: {:#}", err);
                let body = json!({
                    "error": format!("{:#}", err),
                    "stack": format!("{:?}", err),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthRes {
    ok: bool,
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/fetch", get(fetch))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `0.0.0.0:<port>` and serve until the process stops
pub async fn serve(config: &AppConfig, launcher: Arc<dyn SessionLauncher>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, launcher));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fetcher running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn fetch(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<FetchReport>, ApiError> {
    let raw = date_param(params).ok_or(ApiError::MissingDate)?;

    let search_date = date::normalize(Some(&raw));
    info!("Fetching naturalizations for {}", search_date);

    let report = pipeline::run(state.launcher.as_ref(), &state.settings, search_date).await?;
    Ok(Json(report))
}

/// Raw `date` value, or `None` when it is absent or a lone empty value.
///
/// Repeated keys are joined with commas, which never has the `DD-MM-YYYY`
/// shape, so such requests fall back to today instead of being rejected.
fn date_param(params: Vec<(String, String)>) -> Option<String> {
    let mut values: Vec<String> = params
        .into_iter()
        .filter(|(key, _)| key == "date")
        .map(|(_, value)| value)
        .collect();

    match values.len() {
        0 => None,
        1 => values.pop().filter(|v| !v.is_empty()),
        _ => Some(values.join(",")),
    }
}

async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "DOU naturalization fetcher is alive".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fake::FakeLauncher;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    const LISTING: &str = "https://dou.test/leiturajornal?data=07-03-2024";
    const DETAIL_1: &str = "https://dou.test/web/dou/-/portaria-n-1";
    const DETAIL_2: &str = "https://dou.test/web/dou/-/portaria-n-2";
    const CERT_1: &str = "https://dou.test/cert/1";

    fn app(launcher: &FakeLauncher) -> Router {
        let config = AppConfig {
            listing_url_template: "https://dou.test/leiturajornal?data={date}".into(),
            settle_delay: Duration::ZERO,
            ..Default::default()
        };
        router(AppState::new(&config, Arc::new(launcher.clone())))
    }

    fn gazette() -> FakeLauncher {
        FakeLauncher::new()
            .page(
                LISTING,
                r#"<a href="/web/dou/-/portaria-n-1">PORTARIA Nº 1</a>
                   <a href="/web/dou/-/portaria-n-2">PORTARIA Nº 2</a>"#,
            )
            .page(DETAIL_1, r#"<a href="/cert/1">Versão certificada</a>"#)
            .page(
                CERT_1,
                "CONCEDER a nacionalidade brasileira a: LUCAS PAZ - P77, natural da Assunção, \
                 nascido em 9 de julho de 1988, filho de JORGE PAZ e ELENA PAZ, \
                 Processo nº 08000.1/2024-5 PORTARIA Nº 2",
            )
    }

    async fn request(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_date_is_bad_request_without_browser() {
        let launcher = gazette();

        for uri in ["/fetch", "/fetch?date="] {
            let (status, body) = request(app(&launcher), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Missing ?date=DD-MM-YYYY" }));
        }
        assert_eq!(launcher.launched(), 0);
        assert_eq!(ApiError::MissingDate.to_string(), MISSING_DATE);
    }

    #[tokio::test]
    async fn fetch_returns_entries_for_the_day() {
        let launcher = gazette().page(DETAIL_2, "<p>sem link</p>");

        let (status, body) = request(app(&launcher), "/fetch?date=07-03-2024").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "07-03-2024");
        assert_eq!(
            body["results"][0],
            json!({
                "portaria": {
                    "title": "PORTARIA Nº 1",
                    "detailUrl": DETAIL_1,
                    "certifiedUrl": CERT_1
                },
                "naturalizados": [{
                    "name": "LUCAS PAZ",
                    "id": "P77",
                    "origin": "Assunção",
                    "birthDate": "9 de julho de 1988",
                    "parent1": "JORGE PAZ",
                    "parent2": "ELENA PAZ",
                    "process": "08000.1/2024"
                }]
            })
        );
        assert_eq!(body["results"][1]["portaria"]["certifiedUrl"], Value::Null);
        assert_eq!(body["results"][1]["naturalizados"], json!([]));
        assert_eq!(body["results"][1]["warning"], "Certified version not found");
        assert_eq!(launcher.closed(), 1);
    }

    #[tokio::test]
    async fn navigation_failure_on_second_item_aborts_request() {
        let launcher = gazette().failing(DETAIL_2);

        let (status, body) = request(app(&launcher), "/fetch?date=07-03-2024").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("results").is_none());
        let error = body["error"].as_str().unwrap();
        assert!(error.contains(DETAIL_2));
        assert!(error.contains("Navigation timed out"));
        assert!(body["stack"].as_str().unwrap().contains("Navigation timed out"));
        assert_eq!(launcher.closed(), 1);
    }

    #[tokio::test]
    async fn launch_failure_is_internal_error() {
        let launcher = FakeLauncher::new().failing_launch();

        let (status, body) = request(app(&launcher), "/fetch?date=07-03-2024").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to launch Chrome browser");
    }

    #[tokio::test]
    async fn repeated_date_falls_back_to_today() {
        let today = date::normalize(None);
        let listing = format!("https://dou.test/leiturajornal?data={}", today);
        let launcher = FakeLauncher::new().page(&listing, "<html><body></body></html>");

        let (status, body) =
            request(app(&launcher), "/fetch?date=07-03-2024&date=08-03-2024").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], today.as_str());
        assert_eq!(body["results"], json!([]));
        assert_eq!(launcher.visited(), [listing]);
    }

    #[test]
    fn date_param_picks_single_value_and_joins_repeats() {
        let pair = |k: &str, v: &str| (k.to_string(), v.to_string());

        assert_eq!(date_param(vec![]), None);
        assert_eq!(date_param(vec![pair("other", "1")]), None);
        assert_eq!(date_param(vec![pair("date", "")]), None);
        assert_eq!(
            date_param(vec![pair("date", "07-03-2024"), pair("x", "y")]).as_deref(),
            Some("07-03-2024")
        );
        assert_eq!(
            date_param(vec![pair("date", "07-03-2024"), pair("date", "08-03-2024")]).as_deref(),
            Some("07-03-2024,08-03-2024")
        );
        assert_eq!(date_param(vec![pair("date", ""), pair("date", "")]).as_deref(), Some(","));
    }

    #[tokio::test]
    async fn health_does_not_launch_browser() {
        let launcher = gazette();

        let (status, body) = request(app(&launcher), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(launcher.launched(), 0);
    }
}
