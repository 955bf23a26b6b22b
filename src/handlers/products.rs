use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::domain::catalog::Product;
use crate::domain::ports::StoreRepository;
use crate::errors::{AppError, ErrorResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal price as a string, e.g. "9.99"
    pub price: String,
    pub stock_quantity: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            stock_quantity: p.stock_quantity,
        }
    }
}

/// GET /api/products
///
/// Lists the whole catalog, ordered by name.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Product catalog", body = [ProductResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "products"
)]
pub async fn list_products<R: StoreRepository>(
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || service.list_products()).await??;

    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "products"
)]
pub async fn get_product<R: StoreRepository>(
    service: web::Data<CartService<R>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || service.get_product(product_id)).await??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound(format!("Product {} not found", product_id))),
    }
}
