use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use shelf_core::Connectivity;
use shelf_logging::{shelf_debug, shelf_warn};

const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Online when a TCP connection to the probe address succeeds.
pub struct ProbeConnectivity {
    addr: Option<SocketAddr>,
}

impl ProbeConnectivity {
    pub fn new(probe: &str) -> Self {
        let addr = probe.parse().ok();
        if addr.is_none() {
            shelf_warn!("Connectivity probe '{}' is not a socket address; assuming online", probe);
        }
        Self { addr }
    }
}

impl Connectivity for ProbeConnectivity {
    fn is_online(&self) -> bool {
        let Some(addr) = self.addr else {
            return true;
        };
        let online = TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok();
        shelf_debug!("Connectivity probe {} -> online={}", addr, online);
        online
    }
}
