pub mod cart;
pub mod products;

use actix_web::web;

use crate::domain::ports::StoreRepository;

/// Register the `/api` routes for a service backed by `R`.
pub fn configure<R: StoreRepository>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/products")
                    .route("", web::get().to(products::list_products::<R>))
                    .route("/{id}", web::get().to(products::get_product::<R>)),
            )
            .service(
                web::scope("/users/{user_id}/cart")
                    .route("", web::get().to(cart::get_cart::<R>))
                    .route("", web::put().to(cart::checkout::<R>))
                    .route(
                        "/products/{product_id}",
                        web::post().to(cart::add_cart_product::<R>),
                    )
                    .route(
                        "/products/{product_id}",
                        web::put().to(cart::update_cart_product::<R>),
                    )
                    .route(
                        "/products/{product_id}",
                        web::delete().to(cart::remove_cart_product::<R>),
                    ),
            ),
    );
}
