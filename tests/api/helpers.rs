use mangabyte::configuration::get_configuration;
use mangabyte::configuration::Settings;
use mangabyte::configuration::StoreBackend;
use mangabyte::otp::OtpVerifier;
use mangabyte::startup::Application;
use mangabyte::telemetry::get_subscriber;
use mangabyte::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use serde_json::json;
use serde_json::Value;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Init the tracing subscriber once for the whole test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the duplicated arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber);
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber);
        }
    };
});

pub struct TestApp {
    pub addr: String,
    pub email_server: MockServer,
    /// Same handle the server uses, for driving the expiry sweep directly
    pub verifier: OtpVerifier,
    pub api_client: reqwest::Client,
}

impl TestApp {
    async fn post_json(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/{endpoint}", self.addr))
            .json(body)
            .send()
            .await
            .expect("execute request")
    }

    pub async fn post_send_otp(
        &self,
        email: &str,
    ) -> reqwest::Response {
        self.post_json("send-otp", &json!({ "email": email })).await
    }

    pub async fn post_verify_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> reqwest::Response {
        self.post_json("verify-otp", &json!({ "email": email, "otp": otp }))
            .await
    }

    pub async fn post_unsubscribe(
        &self,
        email: &str,
    ) -> reqwest::Response {
        self.post_json("unsubscribe", &json!({ "email": email }))
            .await
    }

    pub async fn get_status(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/status", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    /// Every request the mock email API has received so far, as JSON bodies
    pub async fn sent_emails(&self) -> Vec<Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|req| serde_json::from_slice(&req.body).unwrap())
            .collect()
    }

    /// Pull the 6-digit code out of an OTP email's text body
    pub fn get_otp(
        &self,
        email: &Value,
    ) -> String {
        let text = email["TextBody"].as_str().unwrap();
        let codes: Vec<&str> = text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| s.len() == 6)
            .collect();
        assert_eq!(codes.len(), 1, "expected exactly one code in: {text}");
        codes[0].to_string()
    }

    /// Request a code for `email` and read it back from the mock email API
    pub async fn request_otp(
        &self,
        email: &str,
    ) -> String {
        let _mock = Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .named("Send OTP")
            .expect(1)
            .mount_as_scoped(&self.email_server)
            .await;

        self.post_send_otp(email)
            .await
            .error_for_status()
            .unwrap();

        let sent = self.sent_emails().await;
        self.get_otp(sent.last().unwrap())
    }

    /// Walk `email` through send-otp and verify-otp
    pub async fn create_subscriber(
        &self,
        email: &str,
    ) {
        let otp = self.request_otp(email).await;

        let _mock = Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .named("Send welcome email")
            .mount_as_scoped(&self.email_server)
            .await;

        self.post_verify_otp(email, &otp)
            .await
            .error_for_status()
            .unwrap();
    }
}

/// Spawn the app on a random port, with the in-memory store and the email API
/// pointed at a fresh `MockServer`.
pub async fn spawn_app() -> TestApp { spawn_app_with(|_| {}).await }

/// `spawn_app`, with `customise` applied to the config before the app is built
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("failed to read configuration");
        // port 0: the OS picks a free port, so tests can run in parallel
        cfg.application.port = 0;
        cfg.email_client.base_url = email_server.uri();
        cfg.store.backend = StoreBackend::Memory;
        customise(&mut cfg);
        cfg
    };

    let app = Application::build(cfg).await.expect("failed to build app");
    let addr = format!("http://127.0.0.1:{}", app.port());
    let verifier = app.verifier();
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        email_server,
        verifier,
        api_client: reqwest::Client::new(),
    }
}
