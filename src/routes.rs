use crate::{
    api::{
        attendance, category, company, daily_log, leave_request, product, public, roster, team,
        user,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Unauthenticated read-only mirror
    cfg.service(
        web::scope("/public")
            .wrap(public_limiter)
            .service(web::resource("/roster").route(web::get().to(public::public_roster)))
            .service(web::resource("/logs").route(web::get().to(public::public_logs))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/roster")
                    .service(
                        web::resource("")
                            .route(web::get().to(roster::get_roster))
                            .route(web::post().to(roster::save_roster)),
                    )
                    .service(
                        web::resource("/special")
                            .route(web::post().to(roster::save_special_range)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::upsert_attendance)),
                    )
                    .service(
                        web::resource("/batch").route(web::post().to(attendance::batch_upsert)),
                    ),
            )
            .service(
                web::scope("/leaves")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave))
                            .route(web::put().to(leave_request::update_leave_status)),
                    )
                    .service(
                        web::resource("/cancel")
                            .route(web::patch().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(leave_request::delete_leave)),
                    ),
            )
            .service(
                web::scope("/logs")
                    .service(
                        web::resource("")
                            .route(web::get().to(daily_log::list_logs))
                            .route(web::post().to(daily_log::create_log))
                            .route(web::put().to(daily_log::update_log)),
                    )
                    .service(
                        web::resource("/calendar")
                            .route(web::get().to(daily_log::month_calendar)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(daily_log::delete_log)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/teams")
                    .service(
                        web::resource("")
                            .route(web::get().to(team::list_teams))
                            .route(web::post().to(team::create_team)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(team::update_team))
                            .route(web::delete().to(team::delete_team)),
                    ),
            )
            .service(
                web::scope("/companies")
                    .service(
                        web::resource("")
                            .route(web::get().to(company::list_companies))
                            .route(web::post().to(company::create_company)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(company::update_company))
                            .route(web::delete().to(company::delete_company)),
                    ),
            )
            .service(
                web::scope("/products")
                    .service(
                        web::resource("")
                            .route(web::get().to(product::list_products))
                            .route(web::post().to(product::create_product)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(product::update_product))
                            .route(web::delete().to(product::delete_product)),
                    ),
            )
            .service(
                web::scope("/categories")
                    .service(
                        web::resource("")
                            .route(web::get().to(category::list_categories))
                            .route(web::post().to(category::create_category)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(category::update_category))
                            .route(web::delete().to(category::delete_category)),
                    ),
            ),
    );
}
