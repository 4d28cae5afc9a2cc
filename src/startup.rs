use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::otp::OtpVerifier;
use crate::routes::health_check;
use crate::routes::home;
use crate::routes::send_otp;
use crate::routes::status;
use crate::routes::unsubscribe;
use crate::routes::verify_otp;
use crate::store::build_stores;
use crate::store::Stores;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `port` to access
    port: u16,
    server: Server,
    /// Shared with the expiry worker, which must see the same store
    verifier: OtpVerifier,
}

impl Application {
    /// Bind the listener, build the store backend, email client and verifier,
    /// and wire them into a `Server` (which is not yet running).
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // port 0 -> the OS picks a free port; tests rely on this
        let port = listener.local_addr()?.port();

        let stores = build_stores(&cfg).await?;
        let verifier = OtpVerifier::new(stores.clone(), cfg.otp.expiry());
        let email_client = cfg.email_client.client()?;

        let server = run(
            listener,
            stores,
            verifier.clone(),
            email_client,
            cfg.application.frontend_url,
        )?;

        Ok(Self {
            port,
            server,
            verifier,
        })
    }

    pub fn port(&self) -> u16 { self.port }

    pub fn verifier(&self) -> OtpVerifier { self.verifier.clone() }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// Wrapper for the subscribe page url (raw `String`s may conflict with one
/// another when passed around by `Data`)
pub struct FrontendUrl(pub String);

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    stores: Stores,
    verifier: OtpVerifier,
    email_client: EmailClient,
    frontend_url: String,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc`; every worker's copy of `App` shares the same stores
    let stores = Data::new(stores);
    let verifier = Data::new(verifier);
    let email_client = Data::new(email_client);
    let frontend_url = Data::new(FrontendUrl(frontend_url));

    // actix-web spins up one worker per core, each running this closure
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/send-otp", web::post().to(send_otp))
                    .route("/verify-otp", web::post().to(verify_otp))
                    .route("/unsubscribe", web::post().to(unsubscribe))
                    .route("/status", web::get().to(status)),
            )
            .app_data(stores.clone())
            .app_data(verifier.clone())
            .app_data(email_client.clone())
            .app_data(frontend_url.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
