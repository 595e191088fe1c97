//! Composition root wiring one transport into every client.

use std::sync::Arc;

use crate::api::{NotesClient, UsersClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{CredentialContext, KeyValueStore, Navigator, Session};
use crate::sync::SyncScheduler;
use crate::transport::{DirectorySink, HttpBackend, ReqwestBackend, Transport};

/// Notes, users, session and sync sharing one transport and credential store
#[derive(Clone)]
pub struct NoteTreeClient {
    transport: Transport,
    notes: NotesClient,
    users: UsersClient,
    session: Session,
}

impl NoteTreeClient {
    /// Build a client over the production HTTP backend.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let config = config.validate()?;
        let backend = ReqwestBackend::new(config.request_timeout())?;
        Self::with_backend(config, Arc::new(backend), store, navigator)
    }

    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn HttpBackend>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let config = config.validate()?;
        let credentials = CredentialContext::init(store);
        let download_dir = config.download_dir.clone();
        let login_path = config.login_path.clone();

        let mut transport = Transport::new(config, backend, credentials.clone(), Arc::clone(&navigator));
        if let Some(dir) = download_dir {
            tracing::debug!("Saving downloads to {}", dir.display());
            transport = transport.with_download_sink(Arc::new(DirectorySink::new(dir)));
        }

        let notes = NotesClient::new(transport.clone());
        let users = UsersClient::new(transport.clone());
        let session = Session::new(users.clone(), credentials, navigator, login_path);

        Ok(Self {
            transport,
            notes,
            users,
            session,
        })
    }

    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    pub const fn notes(&self) -> &NotesClient {
        &self.notes
    }

    pub const fn users(&self) -> &UsersClient {
        &self.users
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// A content-sync scheduler saving through this client's notes endpoint.
    pub fn sync_scheduler(&self) -> SyncScheduler<NotesClient> {
        SyncScheduler::new(self.notes.clone(), self.transport.config().sync_interval())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::models::{ListNotesParams, NoteId};
    use crate::session::{MemoryNavigator, MemoryStore, TOKEN_KEY};
    use crate::test_support::{json_response, FakeBackend, TEST_BASE_URL};

    fn client(config: ClientConfig, backend: &FakeBackend, store: &MemoryStore) -> NoteTreeClient {
        NoteTreeClient::with_backend(
            config,
            Arc::new(backend.clone()),
            Arc::new(store.clone()),
            Arc::new(MemoryNavigator::default()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn clients_share_the_credential_store() {
        let backend = FakeBackend::default();
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "tok").unwrap();
        backend.push(json_response(200, &json!([])));

        let client = client(ClientConfig::new(TEST_BASE_URL), &backend, &store);
        client.notes().list(&ListNotesParams::default()).await.unwrap();

        assert_eq!(backend.last_request().headers["authorization"], "tok");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = NoteTreeClient::with_backend(
            ClientConfig::new("ftp://nope"),
            Arc::new(FakeBackend::default()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryNavigator::default()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scheduler_uses_configured_interval() {
        let config = ClientConfig {
            sync_interval_ms: 750,
            ..ClientConfig::new(TEST_BASE_URL)
        };
        let client = client(config, &FakeBackend::default(), &MemoryStore::new());

        let scheduler = client.sync_scheduler();

        assert_eq!(scheduler.interval(), Duration::from_millis(750));
        assert_eq!(scheduler.open_note(), None::<NoteId>);
    }

    #[tokio::test]
    async fn download_dir_enables_saving() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::default();
        backend.push(crate::test_support::response(200, Some("application/zip"), "PK"));
        let config = ClientConfig {
            download_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::new(TEST_BASE_URL)
        };
        let client = client(config, &backend, &MemoryStore::new());

        let payload = client
            .transport()
            .request(reqwest::Method::GET, "/v1/export/all.zip", crate::transport::RequestOptions::new())
            .await
            .unwrap();

        let crate::transport::Payload::File(file) = payload else {
            panic!("expected file payload");
        };
        assert_eq!(file.saved_to, Some(dir.path().join("all.zip")));
    }
}
