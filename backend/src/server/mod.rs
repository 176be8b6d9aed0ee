//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use patrimony::Trace;
#[cfg(debug_assertions)]
use patrimony::doc::ApiDoc;
use patrimony::inbound::http::api_routes;
use patrimony::inbound::http::health::{HealthState, live, ready};
use patrimony::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(api_routes))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when a configured adapter cannot be built,
/// or when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    use super::*;
    use patrimony::settings::AppSettings;

    fn deps() -> AppDependencies {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("valid address"),
            AppSettings::default(),
        );
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: build_http_state(&config).expect("fixture state builds"),
        }
    }

    #[rstest]
    #[case("/api/v1/assets", StatusCode::UNAUTHORIZED)]
    #[case("/api/v1/cron/plaid-sync", StatusCode::UNAUTHORIZED)]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] uri: &str, #[case] expected: StatusCode) {
        let app = actix_test::init_service(build_app(deps())).await;
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn responses_carry_a_trace_id() {
        let app = actix_test::init_service(build_app(deps())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/assets").to_request(),
        )
        .await;
        assert!(res.headers().contains_key("trace-id"));
    }
}
