use gateway_service::config::GatewayConfig;
use gateway_service::services::providers::mock::MockProvider;
use gateway_service::startup::Application;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub upload_dir: String,
    pub provider: Arc<MockProvider>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockProvider::new()).await
    }

    pub async fn spawn_with(provider: MockProvider) -> Self {
        std::env::set_var("GOOGLE_API_KEY", "test-api-key");

        let mut config = GatewayConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port
        config.upload.dir = format!("target/test-uploads-{}", Uuid::new_v4());
        let upload_dir = config.upload.dir.clone();

        let provider = Arc::new(provider);
        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            upload_dir,
            provider,
        }
    }

    /// Files currently present in this app's staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Cleanup test resources (staging directory).
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}
