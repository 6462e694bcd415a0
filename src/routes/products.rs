use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::config::CatalogOptions;
use crate::error::AppError;
use crate::middleware::flash;
use crate::models::views::ProductView;
use crate::services::catalog::{CatalogError, ProductSubmission, RemoveOutcome, UploadedImage};
use crate::state::AppState;

const PRODUCT_LIST_PATH: &str = "/product-list";

#[derive(Template)]
#[template(path = "add_product.html")]
pub struct AddProductTemplate {
    pub flashes: Vec<String>,
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    /// Value for the file input's `accept` attribute, e.g. `.png,.jpg`.
    pub accept: String,
}

impl AddProductTemplate {
    fn new(options: &CatalogOptions, flashes: Vec<String>) -> Self {
        Self {
            flashes,
            categories: options.categories.clone(),
            sizes: options.sizes.clone(),
            accept: options
                .image_extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[derive(Template)]
#[template(path = "product_list.html")]
pub struct ProductListTemplate {
    pub flashes: Vec<String>,
    pub products: Vec<ProductView>,
}

#[utoipa::path(
    get,
    path = "/add-product",
    responses(
        (status = 200, description = "Empty add-product form", content_type = "text/html")
    ),
    tag = "Catalog"
)]
#[instrument(skip_all)]
pub async fn add_product_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let page = AddProductTemplate::new(state.catalog().options(), flash::take(&session).await?);
    Ok(Html(page.render()?))
}

#[utoipa::path(
    post,
    path = "/add-product",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Product created, redirect to the product list"),
        (status = 200, description = "Validation failed, form re-rendered with a message", content_type = "text/html"),
        (status = 400, description = "Malformed multipart body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
#[instrument(skip_all)]
pub async fn add_product(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;

    match state.catalog().submit(submission).await {
        Ok(_) => {
            flash::push(&session, "Product added").await?;
            Ok(Redirect::to(PRODUCT_LIST_PATH).into_response())
        }
        Err(CatalogError::Validation(e)) => {
            tracing::info!(reason = %e, "Product submission rejected");
            let mut flashes = flash::take(&session).await?;
            flashes.push(e.to_string());
            let page = AddProductTemplate::new(state.catalog().options(), flashes);
            Ok(Html(page.render()?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/product-list",
    responses(
        (status = 200, description = "Every product, newest first, with delete actions", content_type = "text/html"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
#[instrument(skip_all)]
pub async fn product_list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let products = state.catalog().list_all().await?;

    let page = ProductListTemplate {
        flashes: flash::take(&session).await?,
        products: products.iter().map(ProductView::from).collect(),
    };
    Ok(Html(page.render()?))
}

#[utoipa::path(
    post,
    path = "/delete-product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID to delete")
    ),
    responses(
        (status = 303, description = "Redirect to the product list, whether or not the product existed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Catalog"
)]
#[instrument(skip(state, session))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<i32>,
) -> Result<Redirect, AppError> {
    if state.catalog().remove(product_id).await? == RemoveOutcome::Deleted {
        flash::push(&session, "Deleted").await?;
    }
    Ok(Redirect::to(PRODUCT_LIST_PATH))
}

/// Collect the add-product form fields. Unknown fields are ignored and a
/// file input submitted without a file counts as no image.
async fn read_submission(mut multipart: Multipart) -> Result<ProductSubmission, AppError> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                if !filename.is_empty() {
                    submission.image = Some(UploadedImage {
                        filename,
                        content: content.to_vec(),
                    });
                }
            }
            "name" => submission.name = field.text().await.map_err(multipart_error)?,
            "category" => submission.category = field.text().await.map_err(multipart_error)?,
            "size" => submission.size = field.text().await.map_err(multipart_error)?,
            "price" => submission.price = field.text().await.map_err(multipart_error)?,
            "is_new_arrival" => {
                submission.is_new_arrival = field.text().await.map_err(multipart_error)? == "on";
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!(status = %err.status(), "Invalid multipart data: {}", err.body_text());
    AppError::BadRequest("Invalid multipart data".to_string())
}
