use crate::{
    api::{employee, payroll, project, task},
    config::Config,
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::Condition, web};

// Helper to build the per-peer limiter; rates below one request a minute
// are clamped so the builder always yields a config.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Malformed bodies and query strings answer in the same JSON shape as
    // every other error.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    );

    let rate_limited = config.rate_limit_per_min > 0;

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Condition::new(
                rate_limited,
                build_limiter(config.rate_limit_per_min),
            ))
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            // /payroll?month=
            .service(
                web::resource("/payroll")
                    .route(web::get().to(payroll::get_payroll))
                    .route(web::put().to(payroll::update_salary)),
            )
            .service(
                web::scope("/projects")
                    // /projects
                    .service(
                        web::resource("")
                            .route(web::get().to(project::list_projects))
                            .route(web::post().to(project::create_project)),
                    )
                    // /projects/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(project::get_project))
                            .route(web::put().to(project::update_project))
                            .route(web::delete().to(project::delete_project)),
                    )
                    // /projects/{id}/tasks
                    .service(
                        web::resource("/{id}/tasks")
                            .route(web::get().to(project::list_project_tasks)),
                    )
                    // /projects/{id}/board
                    .service(
                        web::resource("/{id}/board").route(web::get().to(project::project_board)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(web::resource("").route(web::post().to(task::create_task)))
                    // /tasks/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::patch().to(task::update_task))
                            .route(web::delete().to(task::delete_task)),
                    ),
            ),
    );
}
