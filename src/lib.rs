pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod routes;
pub mod visibility;

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::AppConfig;

/// Console logging; `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .is_err()
    {
        eprintln!("tracing subscriber already installed");
    }
}

pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::config::<AppConfig>())
        .attach(AdHoc::on_liftoff("Startup", |rocket| {
            Box::pin(async move {
                if let Some(config) = rocket.state::<AppConfig>() {
                    tracing::info!(db_path = %config.db_path, "visibility service ready");
                }
            })
        }))
        .mount("/", routes::index_routes())
        .mount("/api", routes::api_routes())
        .register("/", routes::catchers())
}
