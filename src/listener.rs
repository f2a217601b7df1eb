// Accepts TCP connections and runs one server session per connection. Each
// session owns its own state; only the group and credential are shared.

use crate::group::GroupParameters;
use crate::session::{Credential, SrpServer};
use crate::transport::LineTransport;

use rand::rngs::OsRng;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

/// Bind `address` and serve connections on a background task. Returns the
/// bound address, useful with port 0.
pub async fn spawn_server(
    address: impl ToSocketAddrs,
    group: Arc<GroupParameters>,
    credential: Arc<Credential>,
) -> io::Result<SocketAddr> {
    let listener = TcpListener::bind(address).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(accept_loop(listener, group, credential));
    Ok(addr)
}

/// Accept connections forever, one handshake task per connection.
pub async fn accept_loop(
    listener: TcpListener,
    group: Arc<GroupParameters>,
    credential: Arc<Credential>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "connection accepted");
                let group = Arc::clone(&group);
                let credential = Arc::clone(&credential);
                tokio::spawn(handle_connection(stream, peer, group, credential));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    group: Arc<GroupParameters>,
    credential: Arc<Credential>,
) {
    let mut transport = LineTransport::new(stream);
    let mut server = SrpServer::new(group, credential, OsRng);
    match server.run_session(&mut transport).await {
        Ok(outcome) => tracing::info!(%peer, ?outcome, "session finished"),
        Err(e) => tracing::warn!(%peer, error = %e, "session aborted"),
    }
    tracing::info!(%peer, "connection closed");
}
