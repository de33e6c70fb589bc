//! Raw network printer adapter
//!
//! Label printers with a network interface accept raw jobs on TCP port 9100.

use crate::error::{PrintError, PrintResult};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Default raw printing port
pub const RAW_PORT: u16 = 9100;

const ONLINE_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw job data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (TCP port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid host: {}", host)))?;

        Ok(Self::with_addr(SocketAddr::new(ip, port)))
    }

    /// Create from a connection target, `host` or `host:port`
    ///
    /// Port 9100 is used when none is given.
    pub fn from_target(target: &str) -> PrintResult<Self> {
        let target = target.trim();
        if let Ok(addr) = target.parse::<SocketAddr>() {
            return Ok(Self::with_addr(addr));
        }
        Self::new(target, RAW_PORT)
    }

    fn with_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: Duration::from_secs(5),
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl NetworkPrinter {
    async fn connect(&self, limit: Duration) -> PrintResult<TcpStream> {
        tokio::time::timeout(limit, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout {
                program: format!("tcp://{}", self.addr),
                timeout: limit,
            })?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(printer = %self.addr, bytes = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = self.connect(self.timeout).await?;

        stream.write_all(data).await?;
        // raw-port printers start the job once the sender closes
        stream.shutdown().await?;

        info!("Label sent");
        Ok(())
    }

    #[instrument(skip(self), fields(printer = %self.addr))]
    async fn is_online(&self) -> bool {
        match self.connect(ONLINE_CHECK_TIMEOUT).await {
            Ok(_) => {
                info!("Printer reachable");
                true
            }
            Err(e) => {
                warn!(error = %e, "Printer unreachable");
                false
            }
        }
    }
}
