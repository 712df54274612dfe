use crate::inference::detector::LocalDetector;
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::web::api::{config, default, inference};
use actix_web::web::{route, Data};
use actix_web::{App, HttpServer};
use common::web::log;
use std::process::ExitCode;
use std::time::Duration;
use tokio::time::sleep;

pub struct Viewer;

impl Viewer {
    pub async fn run() -> ExitCode {
        logging_information!(SystemEntry::Initializing);
        let config = Config::now().await;
        let detector = match LocalDetector::load(&config).await {
            Ok(detector) => Data::new(detector),
            Err(entry) => {
                logging_emergency!(entry);
                return ExitCode::FAILURE;
            },
        };
        logging_information!(SystemEntry::ModelReady(detector.source().to_string()));
        let http_server = loop {
            let config = Config::now().await;
            let detector = detector.clone();
            let http_server = HttpServer::new(move || {
                let cors = actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600);
                App::new()
                    .wrap(cors)
                    .app_data(detector.clone())
                    .service(config::initialize())
                    .service(inference::initialize())
                    .service(log::initialize())
                    .default_service(route().to(default::default_route))
            })
            .bind(format!("0.0.0.0:{}", config.http_server_bind_port));
            match http_server {
                Ok(http_server) => break http_server,
                Err(err) => {
                    logging_critical!(NetworkEntry::BindPortError(err));
                    sleep(Duration::from_secs(config.bind_retry_duration)).await;
                    continue;
                }
            }
        };
        logging_information!(SystemEntry::WebReady);
        logging_information!(SystemEntry::InitializeComplete);
        logging_information!(SystemEntry::Online);
        if let Err(err) = http_server.run().await {
            logging_emergency!(SystemEntry::WebPanic(err));
            return ExitCode::FAILURE;
        }
        ExitCode::SUCCESS
    }

    pub async fn terminate() {
        logging_information!(SystemEntry::Terminating);
        logging_information!(SystemEntry::TerminateComplete);
    }
}
