use utoipa::OpenApi;

use crate::errors::{ErrorResponse, StockFailureResponse};
use crate::handlers::{cart, products};

#[derive(OpenApi)]
#[openapi(
    paths(
        products::list_products,
        products::get_product,
        cart::get_cart,
        cart::add_cart_product,
        cart::update_cart_product,
        cart::remove_cart_product,
        cart::checkout,
    ),
    components(schemas(
        products::ProductResponse,
        cart::QuantityRequest,
        cart::GuestCartItemRequest,
        cart::GuestCheckoutRequest,
        cart::LineItemResponse,
        cart::CartLineResponse,
        cart::CheckoutResponse,
        ErrorResponse,
        StockFailureResponse,
    )),
    tags(
        (name = "products", description = "Product catalog"),
        (name = "cart", description = "Cart manipulation and checkout"),
    )
)]
pub struct ApiDoc;
