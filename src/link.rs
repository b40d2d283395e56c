//! Network-link establishment: block until connectivity is up.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wait until a TCP connect to `probe_addr` succeeds.
///
/// Polls once a second, indefinitely; the agent has nothing useful to do
/// without a link, so there is no timeout.
pub async fn wait_for_link(probe_addr: &str) {
    info!("waiting for network link (probing {probe_addr})");
    loop {
        match timeout(PROBE_TIMEOUT, TcpStream::connect(probe_addr)).await {
            Ok(Ok(_)) => {
                info!("network link is up");
                return;
            }
            Ok(Err(err)) => debug!("link probe failed: {err}"),
            Err(_) => debug!("link probe timed out"),
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn returns_once_the_probe_target_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        wait_for_link(&addr).await;
    }
}
