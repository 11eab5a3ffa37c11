//! Network reachability checks

use std::time::Duration;

const PROBE_URL: &str = "https://github.com";

pub trait Connectivity: Send + Sync {
    fn check_connection(&self) -> bool;
}

/// Probes a well-known host with a short HEAD request
pub struct HttpConnectivity {
    force_offline: bool,
    timeout: Duration,
}

impl HttpConnectivity {
    pub fn new(force_offline: bool) -> Self {
        Self {
            force_offline,
            timeout: Duration::from_secs(5),
        }
    }
}

impl Connectivity for HttpConnectivity {
    fn check_connection(&self) -> bool {
        if self.force_offline {
            tracing::info!("connection - forced offline");
            return false;
        }

        let client = match reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("connection - cannot build client: {}", e);
                return false;
            }
        };

        match client.head(PROBE_URL).send() {
            Ok(res) => !res.status().is_server_error(),
            Err(e) => {
                tracing::warn!("connection - {} unreachable: {}", PROBE_URL, e);
                false
            }
        }
    }
}

/// Fixed answer, for offline runs and tests
pub struct StaticConnectivity(pub bool);

impl Connectivity for StaticConnectivity {
    fn check_connection(&self) -> bool {
        self.0
    }
}
