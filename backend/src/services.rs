use actix_web::web;
use std::sync::Arc;

use crate::auth::{AuthMiddleware, AuthService, JwtService, PasswordHasher};
use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::json_error_handler;
use crate::order::OrderService;
use crate::recommend::{PredictionClient, RecommendationService, UpstreamError, UploadSettings};

/// Everything a request handler can pull out of app data.
#[derive(Clone)]
pub struct Services {
    pub jwt: JwtService,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub orders: OrderService,
    pub recommender: RecommendationService,
    pub uploads: UploadSettings,
}

impl Services {
    /// Wires the services over a single store implementing every repository.
    pub fn new<S>(config: &AppConfig, store: Arc<S>) -> Result<Self, UpstreamError>
    where
        S: UserRepository + ProductRepository + OrderRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let products: Arc<dyn ProductRepository> = store.clone();
        let orders: Arc<dyn OrderRepository> = store;
        Self::from_repositories(config, users, products, orders)
    }

    pub fn from_repositories(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Result<Self, UpstreamError> {
        let jwt = JwtService::new(&config.jwt_secret, config.token_ttl_hours);
        let auth = AuthService::new(
            users.clone(),
            jwt.clone(),
            PasswordHasher::new(config.bcrypt_cost),
            config.admin_app_url.clone(),
        );
        let catalog = CatalogService::new(products.clone());
        let cart = CartService::new(users);
        let orders = OrderService::new(orders, products, cart.clone(), config.delivery_fee);

        let client = PredictionClient::new(
            config.prediction_url.clone(),
            config.recommendation_url.clone(),
            config.num_recommendations,
            config.upstream_timeout,
        )?;
        let recommender = RecommendationService::new(client, catalog.clone());

        Ok(Self {
            jwt,
            auth,
            catalog,
            cart,
            orders,
            recommender,
            uploads: UploadSettings {
                dir: config.upload_dir.clone(),
                max_bytes: config.max_upload_bytes,
            },
        })
    }

    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.jwt.clone())
    }

    /// Registers the services as app data along with the JSON body config.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.cart.clone()))
            .app_data(web::Data::new(self.orders.clone()))
            .app_data(web::Data::new(self.recommender.clone()))
            .app_data(web::Data::new(self.uploads.clone()));
    }
}
