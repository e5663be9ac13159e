//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        consult_llm::OpenAiConsultAdapter, db::DbAdapter, disabled::DisabledAiAdapter,
        meal_llm::OpenAiMealPlanAdapter, pdf::PdfTextAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        consultations, medicines,
        middleware::require_auth,
        nutrition,
        rest::ApiDoc,
        screenings,
        state::{AppState, Transcripts},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, post},
    Router,
};
use health_advisor_core::ports::{ConsultationService, MealPlanService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    // The pool is lazy: a missing database is surfaced once as a warning and
    // the server still starts; storage errors then show up inline per request.
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.database_url)?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));

    match db_adapter.ping().await {
        Ok(()) => {
            info!("Database reachable. Running migrations...");
            if let Err(e) = db_adapter.run_migrations().await {
                warn!("Database migrations failed: {}. Storage operations may fail.", e);
            }
        }
        Err(e) => {
            warn!("Database unreachable at startup: {}. Storage operations will fail until it comes back.", e);
        }
    }

    // --- 3. Initialize Service Adapters ---
    // A missing AI credential disables the AI features instead of aborting.
    let ai_timeout = Duration::from_secs(config.ai_timeout_secs);
    let (consult_adapter, meal_adapter): (
        Arc<dyn ConsultationService>,
        Arc<dyn MealPlanService>,
    ) = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let openai_client = Client::with_config(openai_config);
            (
                Arc::new(OpenAiConsultAdapter::new(
                    openai_client.clone(),
                    config.consult_model.clone(),
                    ai_timeout,
                )),
                Arc::new(OpenAiMealPlanAdapter::new(
                    openai_client,
                    config.meal_model.clone(),
                    ai_timeout,
                )),
            )
        }
        None => {
            warn!("OPENAI_API_KEY is not set. AI features are disabled.");
            (Arc::new(DisabledAiAdapter), Arc::new(DisabledAiAdapter))
        }
    };

    let document_adapter = Arc::new(PdfTextAdapter::new(config.document_char_budget));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        consult_adapter,
        meal_adapter,
        document_adapter,
        transcripts: Arc::new(Transcripts::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/calculators/bmi", post(nutrition::bmi_handler))
        .route("/calculators/bmr", post(nutrition::bmr_handler))
        .route("/meal-plans", post(nutrition::meal_plan_handler))
        .route(
            "/consultations",
            post(consultations::ask_handler).get(consultations::history_handler),
        )
        .route("/lab-reports", post(consultations::lab_report_handler))
        .route(
            "/screenings",
            post(screenings::submit_handler).get(screenings::history_handler),
        )
        .route(
            "/medicines",
            post(medicines::add_handler).get(medicines::list_handler),
        )
        .route("/medicines/{id}", delete(medicines::delete_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
