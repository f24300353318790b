//! Shared harness: a mock portal API plus a session context wired to
//! in-memory storage, cookie jar and navigator.

#![allow(dead_code)]

use hostelcare_session::config::{DeploymentEnvironment, Settings};
use hostelcare_session::cookies::MemoryCookieJar;
use hostelcare_session::navigation::{Navigation, RecordingNavigator};
use hostelcare_session::storage::MemoryStorage;
use hostelcare_session::{SessionContext, SessionParts};
use once_cell::sync::Lazy;
use std::sync::Arc;
use wiremock::MockServer;

// Set TEST_LOG=1 to see logs from a failing test.
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let mut settings = Settings::development("http://localhost:8000");
        settings.logging.level = "debug".to_string();
        hostelcare_session::context::init_tracing(&settings)
            .expect("Failed to install test subscriber");
    }
});

pub struct TestApp {
    pub server: MockServer,
    pub ctx: SessionContext,
    pub navigator: Arc<RecordingNavigator>,
    pub local: Arc<MemoryStorage>,
    pub session: Arc<MemoryStorage>,
    pub cookies: Arc<MemoryCookieJar>,
}

impl TestApp {
    pub fn redirects(&self) -> Vec<Navigation> {
        self.navigator.history()
    }
}

pub async fn spawn_app() -> TestApp {
    let server = MockServer::start().await;
    let settings = Settings::development(server.uri());
    build(server, settings)
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let server = MockServer::start().await;
    let mut settings = Settings::development(server.uri());
    configure(&mut settings);
    build(server, settings)
}

/// Production deployment on `domain`, served from `hostname`, with the API
/// pointed at the mock server.
pub async fn spawn_production_app(domain: &str, hostname: &str) -> TestApp {
    let server = MockServer::start().await;
    let mut settings = Settings::development(server.uri());
    settings.environment = DeploymentEnvironment::Production;
    settings.api.production_base_url = Some(server.uri());
    settings.site.production_domain = domain.to_string();
    settings.site.hostname = hostname.to_string();
    build(server, settings)
}

fn build(server: MockServer, settings: Settings) -> TestApp {
    Lazy::force(&TRACING);

    let navigator = Arc::new(RecordingNavigator::new());
    let local = Arc::new(MemoryStorage::new());
    let session = Arc::new(MemoryStorage::new());
    let cookies = Arc::new(MemoryCookieJar::new());

    let ctx = SessionContext::with_parts(
        &settings,
        SessionParts {
            local: local.clone(),
            session: session.clone(),
            cookies: Some(cookies.clone()),
            navigator: navigator.clone(),
        },
    )
    .expect("Failed to build session context");

    TestApp {
        server,
        ctx,
        navigator,
        local,
        session,
        cookies,
    }
}
