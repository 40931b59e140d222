//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use users_api::config::AppConfig;
#[cfg(debug_assertions)]
use users_api::doc::ApiDoc;
use users_api::inbound::http::fallback::{method_not_allowed, not_found};
use users_api::inbound::http::health::{HealthState, health, health_config, live, ready};
use users_api::inbound::http::hello::hello;
use users_api::inbound::http::state::HttpState;
use users_api::inbound::http::users::{
    create_user, delete_user, get_user, list_users, update_user,
};
use users_api::middleware::{Cors, MAX_BODY_BYTES, RequestValidation, SecurityHeaders, Trace};
use users_api::outbound::persistence::{DieselConnectivityProbe, DieselUserRepository};

#[derive(Clone)]
struct AppDependencies {
    app_config: web::Data<AppConfig>,
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

/// Register every route as a resource so unsupported methods on a known
/// path answer 405 instead of falling through to 404.
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(health))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/health/config")
            .route(web::get().to(health_config))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/health/ready")
            .route(web::get().to(ready))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/health/live")
            .route(web::get().to(live))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/hello")
            .route(web::get().to(hello))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/users")
            .route(web::get().to(list_users))
            .route(web::post().to(create_user))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/users/{id}")
            .route(web::get().to(get_user))
            .route(web::put().to(update_user))
            .route(web::delete().to(delete_user))
            .default_service(web::to(method_not_allowed)),
    );
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + 'static>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        app_config,
        health_state,
        http_state,
    } = deps;

    let enforce_https = app_config.is_production();
    let cors = Cors::new(app_config.frontend_url());

    let app = App::new()
        .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .app_data(app_config)
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure_routes);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    // Registered innermost first; `Trace` ends up outermost.
    app.default_service(web::to(not_found))
        .wrap(RequestValidation)
        .wrap(cors)
        .wrap(SecurityHeaders::new(enforce_https))
        .wrap(Trace)
}

/// Construct an Actix HTTP server backed by the Diesel adapters.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        app,
        bind_addr,
        db_pool,
    } = config;

    let http_state = web::Data::new(HttpState::new(
        Arc::new(DieselUserRepository::new(db_pool.clone())),
        Arc::new(DieselConnectivityProbe::new(db_pool)),
    ));
    let app_config = web::Data::new(app);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            app_config: app_config.clone(),
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    tracing::info!(%bind_addr, "server listening");
    Ok(server)
}
