mod dashboard;
mod health;
mod products;
mod shop;
mod uploads;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::create_session_layer;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Management pages
        dashboard::dashboard,
        products::add_product_form,
        products::add_product,
        products::product_list,
        products::delete_product,
        // Public pages
        shop::shop,
        uploads::serve_upload,
        // General
        health::health,
    ),
    components(
        schemas(
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Catalog", description = "Internal catalog management pages"),
        (name = "Shop", description = "Public shop page and product images"),
        (name = "General", description = "Service health")
    ),
    info(
        title = "Boutique Catalog",
        version = "0.1.0",
        description = "Server-rendered catalog manager with a public shop and WhatsApp ordering",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState, max_upload_bytes: usize) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let app_routes = Router::new()
        .route("/", get(dashboard::dashboard))
        .route(
            "/add-product",
            get(products::add_product_form)
                .post(products::add_product)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/product-list", get(products::product_list))
        .route("/delete-product/{id}", post(products::delete_product))
        .route("/shop", get(shop::shop))
        .route("/uploads/{filename}", get(uploads::serve_upload))
        .route("/health", get(health::health))
        .layer(create_session_layer())
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
}
