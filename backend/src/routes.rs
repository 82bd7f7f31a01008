use actix_web::{web, HttpResponse};

use crate::auth::middleware::AuthMiddleware;
use crate::auth::routes as user;
use crate::cart::routes as cart;
use crate::catalog::routes as product;
use crate::order::routes as order;
use crate::recommend::routes as fashion;

pub fn configure_routes(cfg: &mut web::ServiceConfig, auth: AuthMiddleware) {
    cfg.service(web::resource("/").route(web::get().to(health)))
        .service(
            web::scope("/api/user")
                .service(web::resource("/register").route(web::post().to(user::register)))
                .service(web::resource("/login").route(web::post().to(user::login)))
                .service(web::resource("/admin").route(web::post().to(user::admin_login)))
                .service(
                    web::resource("/profile")
                        .wrap(auth.clone())
                        .route(web::get().to(user::profile)),
                )
                .service(
                    web::resource("/admin/dashboard")
                        .wrap(auth.admin_only())
                        .route(web::get().to(user::admin_dashboard)),
                )
                .service(
                    web::resource("/customer/dashboard")
                        .wrap(auth.customer_only())
                        .route(web::get().to(user::customer_dashboard)),
                ),
        )
        // Listed ahead of the guarded product scope so it stays public.
        .service(web::resource("/api/product/list").route(web::get().to(product::list_products)))
        .service(
            web::scope("/api/product")
                .wrap(auth.clone())
                .service(web::resource("/single").route(web::post().to(product::single_product)))
                .service(
                    web::resource("/add")
                        .wrap(auth.admin_only())
                        .route(web::post().to(product::add_product)),
                )
                .service(
                    web::resource("/remove")
                        .wrap(auth.admin_only())
                        .route(web::post().to(product::remove_product)),
                ),
        )
        .service(
            web::scope("/api/cart")
                .wrap(auth.clone())
                .service(web::resource("/add").route(web::post().to(cart::add_to_cart)))
                .service(web::resource("/update").route(web::post().to(cart::update_cart)))
                .service(web::resource("/get").route(web::post().to(cart::get_cart))),
        )
        .service(
            web::scope("/api/order")
                .wrap(auth.clone())
                .service(web::resource("/place").route(web::post().to(order::place_order)))
                .service(web::resource("/userorders").route(web::post().to(order::user_orders)))
                .service(
                    web::resource("/list")
                        .wrap(auth.admin_only())
                        .route(web::post().to(order::all_orders)),
                )
                .service(
                    web::resource("/status")
                        .wrap(auth.admin_only())
                        .route(web::post().to(order::update_status)),
                ),
        )
        .service(
            web::scope("/api/fashion")
                .wrap(auth)
                .service(
                    web::resource("/uploadImageAndPredict")
                        .route(web::post().to(fashion::upload_image_and_predict)),
                )
                .service(
                    web::resource("/recommendations/{productId}")
                        .route(web::get().to(fashion::recommendations_by_product_id)),
                )
                .service(
                    web::resource("/recommendationsByImageUrl")
                        .route(web::post().to(fashion::recommendations_by_image_url)),
                ),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("API working")
}
