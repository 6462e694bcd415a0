use askama::Template;
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::flash;
use crate::models::views::ProductView;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub flashes: Vec<String>,
    pub total_products: u64,
    pub new_arrivals: u64,
    pub recent_items: Vec<ProductView>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Dashboard with product counts and the five newest products", content_type = "text/html"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let summary = state.catalog().summary().await?;

    let page = DashboardTemplate {
        flashes: flash::take(&session).await?,
        total_products: summary.total_count,
        new_arrivals: summary.new_arrival_count,
        recent_items: summary.recent.iter().map(ProductView::from).collect(),
    };
    Ok(Html(page.render()?))
}
