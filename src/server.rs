/// HTTP server setup and routing
use crate::{api, context::AppContext};
use axum::Router;
use std::{io, net::SocketAddr};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Build the main application router
///
/// Static assets live under `/assets` so they never shadow `/:did`.
pub fn build_router(ctx: AppContext) -> Router {
    let assets = ServeDir::new(&ctx.config.public_dir);

    Router::new()
        .merge(api::routes(ctx.clone()))
        .nest_service("/assets", assets)
        .fallback(api::home::not_found)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}

/// A listener serving the router on a background task
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Bind `addr` and start serving
    pub async fn bind(addr: &str, app: Router) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(self) -> io::Result<()> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        }
    }
}
