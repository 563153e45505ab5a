use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use prodchain::{config::Policy, database::create_database_pool, handlers, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url).await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    let policy = Policy::from_env()
        .expect("Invalid policy configuration");

    let app = create_router(AppState { db, policy });

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("prodchain server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(state: AppState) -> Router {
    Router::new()
        // Public routes (no authentication required)
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))

        // Manufacturer routes
        .route("/manufacturer/dashboard", get(handlers::manufacturer::dashboard))
        .route("/manufacturer/products", get(handlers::manufacturer::products_list))
        .route("/manufacturer/products", post(handlers::manufacturer::add_product))
        .route("/manufacturer/inventory", get(handlers::manufacturer::inventory))
        .route("/manufacturer/allocate", post(handlers::manufacturer::allocate))
        .route("/manufacturer/allocations", get(handlers::manufacturer::allocations))

        // Distributor routes
        .route("/distributor/dashboard", get(handlers::distributor::dashboard))
        .route("/distributor/inventory", get(handlers::distributor::inventory))
        .route("/distributor/price", post(handlers::distributor::update_price))
        .route("/distributor/allocations", get(handlers::distributor::allocations))
        .route("/distributor/orders", get(handlers::distributor::customer_orders))

        // Customer routes
        .route("/customer/dashboard", get(handlers::customer::dashboard))
        .route("/customer/products", get(handlers::customer::browse_products))
        .route("/customer/orders", get(handlers::customer::orders_list))
        .route("/customer/orders", post(handlers::customer::place_order))
        .route("/customer/orders/:id", get(handlers::customer::order_details))
        .route("/customer/orders/:id/payment", post(handlers::customer::process_payment))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
