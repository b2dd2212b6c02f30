use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use shopfront_common::query::{CatalogPage, PageLimits};
use shopfront_common::response::Envelope;
use shopfront_node::store::{CatalogStore, MemoryStore};

/// A catalog server running in-process on an ephemeral port.
pub struct TestShop<S> {
    pub base_url: String,
    pub store: Arc<S>,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl TestShop<MemoryStore> {
    /// Start a shop backed by an empty in-memory store.
    pub async fn memory() -> Self {
        Self::start(Arc::new(MemoryStore::new()), PageLimits::default()).await
    }
}

impl<S: CatalogStore> TestShop<S> {
    pub async fn start(store: Arc<S>, limits: PageLimits) -> Self {
        tracing_subscriber::fmt::try_init().ok();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();
        tracing::debug!(%addr, backend = store.backend(), "starting test shop");

        let task = tokio::spawn(shopfront_node::serve(
            listener,
            store.clone(),
            limits,
            async move {
                rx.await.ok();
            },
        ));

        Self {
            base_url: format!("http://{addr}"),
            store,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            task,
        }
    }

    /// GET `path` and decode the body as `T`. Returns the HTTP status too.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> (u16, T) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path} failed: {e}"));
        let status = resp.status().as_u16();
        let body = resp
            .json::<T>()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: undecodable body: {e}"));
        (status, body)
    }

    /// GET the product listing and unwrap the page from a successful envelope.
    pub async fn list(&self, query: &[(&str, &str)]) -> CatalogPage {
        let (status, env): (u16, Envelope<CatalogPage>) =
            self.get("/api/shop/products", query).await;
        assert_eq!(status, 200, "listing failed: {}", env.message);
        assert!(env.success);
        assert_eq!(env.status_code, 200);
        env.data.expect("listing envelope carries data")
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .expect("server task panicked")
            .expect("server exited with error");
    }
}
