use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::auth::{AuthenticatedUser, MaybeUser};
use crate::domain::cart::{CartLine, LineItem};
use crate::domain::checkout::{CheckoutReceipt, StockRequest};
use crate::domain::ports::StoreRepository;
use crate::errors::{AppError, ErrorResponse};

use super::products::ProductResponse;

pub const CHECKOUT_SUCCESS_MESSAGE: &str = "Cart successfully checked out!";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestCartItemRequest {
    /// Product UUID
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GuestCheckoutRequest {
    #[serde(default)]
    pub cart: Vec<GuestCartItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price frozen at checkout; null while the item sits in a cart.
    pub historical_price: Option<String>,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        LineItemResponse {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            historical_price: item.historical_price.map(|p| p.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub historical_price: Option<String>,
    pub product: ProductResponse,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        let item = LineItemResponse::from(line.item);
        CartLineResponse {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            historical_price: item.historical_price,
            product: line.product.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_id: Uuid,
    pub purchase_date: String,
    pub lines: Vec<LineItemResponse>,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        CheckoutResponse {
            message: CHECKOUT_SUCCESS_MESSAGE.to_string(),
            order_id: receipt.order_id,
            purchase_date: receipt.purchase_date.to_rfc3339(),
            lines: receipt.lines.into_iter().map(LineItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/users/{user_id}/cart
///
/// Returns the line-items of the user's open cart, each with its product.
/// The cart is created on first access.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/cart",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Cart contents", body = [CartLineResponse]),
        (status = 401, description = "Not signed in as this user"),
    ),
    tag = "cart"
)]
pub async fn get_cart<R: StoreRepository>(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.owns(path.into_inner())?;

    let lines = web::block(move || service.get_cart(user_id)).await??;

    let body: Vec<CartLineResponse> = lines.into_iter().map(CartLineResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/users/{user_id}/cart/products/{product_id}
///
/// Adds `quantity` units to the cart, on top of any already there.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/cart/products/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 201, description = "Item added", body = LineItemResponse),
        (status = 400, description = "Invalid quantity, unknown product or not enough stock", body = ErrorResponse),
        (status = 401, description = "Not signed in as this user"),
    ),
    tag = "cart"
)]
pub async fn add_cart_product<R: StoreRepository>(
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<QuantityRequest>,
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let (path_user_id, product_id) = path.into_inner();
    let user_id = user.owns(path_user_id)?;
    let quantity = body.into_inner().quantity;

    let item = web::block(move || service.add_to_cart(user_id, product_id, quantity)).await??;

    Ok(HttpResponse::Created().json(LineItemResponse::from(item)))
}

/// PUT /api/users/{user_id}/cart/products/{product_id}
///
/// Replaces the quantity of an item already in the cart.
#[utoipa::path(
    put,
    path = "/api/users/{user_id}/cart/products/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Item updated", body = LineItemResponse),
        (status = 400, description = "Invalid quantity or not enough stock", body = ErrorResponse),
        (status = 401, description = "Not signed in as this user"),
        (status = 404, description = "Product is not in the cart", body = ErrorResponse),
    ),
    tag = "cart"
)]
pub async fn update_cart_product<R: StoreRepository>(
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<QuantityRequest>,
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let (path_user_id, product_id) = path.into_inner();
    let user_id = user.owns(path_user_id)?;
    let quantity = body.into_inner().quantity;

    let item =
        web::block(move || service.update_cart_item(user_id, product_id, quantity)).await??;

    Ok(HttpResponse::Ok().json(LineItemResponse::from(item)))
}

/// DELETE /api/users/{user_id}/cart/products/{product_id}
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/cart/products/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 401, description = "Not signed in as this user"),
        (status = 404, description = "Product is not in the cart", body = ErrorResponse),
    ),
    tag = "cart"
)]
pub async fn remove_cart_product<R: StoreRepository>(
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let (path_user_id, product_id) = path.into_inner();
    let user_id = user.owns(path_user_id)?;

    web::block(move || service.remove_from_cart(user_id, product_id)).await??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/users/{user_id}/cart
///
/// Checks out the signed-in user's cart, or, without a session, the cart
/// carried in the request body. Guests may use any `user_id` segment.
#[utoipa::path(
    put,
    path = "/api/users/{user_id}/cart",
    params(
        ("user_id" = String, Path, description = "User UUID, or any placeholder for guests"),
    ),
    request_body(content = GuestCheckoutRequest, description = "Guest cart; ignored for signed-in users"),
    responses(
        (status = 201, description = "Cart checked out", body = CheckoutResponse),
        (status = 400, description = "Cart empty, malformed or products unavailable", body = ErrorResponse),
        (status = 401, description = "Signed in as a different user"),
        (status = 409, description = "Cart was checked out concurrently", body = ErrorResponse),
    ),
    tag = "cart"
)]
pub async fn checkout<R: StoreRepository>(
    user: MaybeUser,
    path: web::Path<String>,
    body: web::Bytes,
    service: web::Data<CartService<R>>,
) -> Result<HttpResponse, AppError> {
    let receipt = match user.0 {
        Some(user_id) => {
            let path_user_id: Uuid = path
                .into_inner()
                .parse()
                .map_err(|_| AppError::Unauthorized)?;
            let user_id = AuthenticatedUser(user_id).owns(path_user_id)?;
            web::block(move || service.checkout_user(user_id)).await??
        }
        None => {
            let items: Vec<StockRequest> = parse_guest_cart(&body)?
                .cart
                .into_iter()
                .map(|item| StockRequest {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect();
            web::block(move || service.checkout_guest(items)).await??
        }
    };

    Ok(HttpResponse::Created().json(CheckoutResponse::from(receipt)))
}

/// An absent body is an empty guest cart; anything else must parse.
fn parse_guest_cart(body: &[u8]) -> Result<GuestCheckoutRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GuestCheckoutRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("Validation Error: Malformed cart: {}", e)))
}
