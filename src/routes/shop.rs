use askama::Template;
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::flash;
use crate::models::views::ShopProductView;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub flashes: Vec<String>,
    pub shop_name: String,
    pub products: Vec<ShopProductView>,
}

#[utoipa::path(
    get,
    path = "/shop",
    responses(
        (status = 200, description = "Public shop with a WhatsApp order link per product", content_type = "text/html"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Shop"
)]
#[instrument(skip_all)]
pub async fn shop(State(state): State<AppState>, session: Session) -> Result<Html<String>, AppError> {
    let contact = state.contact();
    let products = state
        .catalog()
        .list_all()
        .await?
        .iter()
        .map(|product| ShopProductView::new(product, contact))
        .collect();

    let page = ShopTemplate {
        flashes: flash::take(&session).await?,
        shop_name: contact.shop_name.clone(),
        products,
    };
    Ok(Html(page.render()?))
}
