use club_waitlist::config::{StorageBackend, WaitlistConfig};
use club_waitlist::error::AppError;
use club_waitlist::waitlist::{
    FileWaitlistStore, MemoryWaitlistStore, RedisWaitlistStore, WaitlistStore,
    WaitlistSubmissionService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedStore = dyn WaitlistStore;
pub(crate) type SharedService = Arc<WaitlistSubmissionService<SharedStore>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the configured backend once; the handle lives for the whole process.
pub(crate) async fn open_store(config: &WaitlistConfig) -> Result<Arc<SharedStore>, AppError> {
    let store: Arc<SharedStore> = match &config.backend {
        StorageBackend::File { path } => {
            info!(path = %path.display(), "waitlist file store selected");
            Arc::new(FileWaitlistStore::new(path.clone()))
        }
        StorageBackend::Redis { url } => {
            info!(namespace = %config.namespace, "waitlist redis store selected");
            Arc::new(RedisWaitlistStore::connect(url, &config.namespace).await?)
        }
        StorageBackend::Memory => {
            info!("waitlist memory store selected; entries are lost on exit");
            Arc::new(MemoryWaitlistStore::new())
        }
    };
    Ok(store)
}

pub(crate) fn build_service(config: &WaitlistConfig, store: Arc<SharedStore>) -> SharedService {
    Arc::new(
        WaitlistSubmissionService::new(store)
            .with_namespace(config.namespace.clone())
            .with_validation(config.validation),
    )
}

pub(crate) async fn service_from_config(config: &WaitlistConfig) -> Result<SharedService, AppError> {
    let store = open_store(config).await?;
    Ok(build_service(config, store))
}
