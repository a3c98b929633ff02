//! src/startup.rs
use crate::configuration::{ConfigurationError, Settings};
use crate::email::{EmailSender, SmtpMailer};
use crate::report::ReportSource;
use crate::routes::{health_check, json_error_handler, preflight, send_report};
use actix_web::dev::Server;
use actix_web::http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.server.await
    }
}

/// Build the application with the SMTP relay described by `config.email`.
pub fn build(config: Settings) -> Result<Application, anyhow::Error> {
    let email_settings = config
        .email
        .clone()
        .ok_or(ConfigurationError::MissingEmailSettings)?;
    let email_client =
        SmtpMailer::new(email_settings).context("Failed to set up the mail relay")?;

    let application = build_with_sender(config, email_client)?;
    Ok(application)
}

pub fn build_with_sender<S: EmailSender>(
    config: Settings,
    email_sender: S,
) -> Result<Application, std::io::Error> {
    let address = format!("{}:{}", config.application.host, config.application.port);
    let tcp_listener = TcpListener::bind(address)?;
    let port = tcp_listener.local_addr()?.port();

    let allowed_origin = HeaderValue::from_str(&config.application.allowed_origin)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let report_source = ReportSource::from(config.report);

    let server = run(tcp_listener, report_source, allowed_origin, email_sender)?;

    Ok(Application { port, server })
}

pub fn run<S: EmailSender>(
    listener: TcpListener,
    report_source: ReportSource,
    allowed_origin: HeaderValue,
    email_sender: S,
) -> Result<Server, std::io::Error> {
    let report_source = web::Data::new(report_source);
    let email_sender = web::Data::new(email_sender);

    let server = HttpServer::new(move || {
        let cors = DefaultHeaders::new()
            .add((ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin.clone()))
            .add((ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
            .add((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"));

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health", web::get().to(health_check))
            .route("/send-report", web::post().to(send_report::<S>))
            .route("/send-report", web::method(Method::OPTIONS).to(preflight))
            .app_data(report_source.clone())
            .app_data(email_sender.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
