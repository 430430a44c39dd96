//! HTTP surface over the [`Solver`](crate::solve::Solver).
//!
//! Handlers only translate: request in, flow call, [`reply::Failure`] or JSON
//! out. The same flows back the CLI's `solve` and `health` subcommands.

pub mod handlers;
pub mod reply;
pub mod router;
pub mod state;

use std::net::SocketAddr;

pub use router::build_routes;
pub use state::AppState;

/// Serve until the listener fails or ctrl+c is received.
pub async fn listen(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    tokio::select! {
        r = axum::serve(listener, build_routes(state)) => {
            tracing::warn!("server ended unexpectedly: {:?}", &r);
            r?;
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl+c interrupt, closing server");
        }
    }
    Ok(())
}
