//! Asynchronous CNAME chain resolution.
//!
//! [`CnameResolver`] follows CNAME records from a host name to its canonical
//! name and then looks up the canonical host's addresses. It is a helper for
//! checks like "is this host resolvable" and is never called from the
//! synchronous [`Rule`](crate::Rule) contract.
//!
//! ```no_run
//! # async fn demo() {
//! use request_validator::resolver::{CnameResolver, SystemLookup};
//!
//! let resolver = CnameResolver::new(SystemLookup);
//! match resolver.resolve("www.example.org").await {
//!     Ok(resolution) => println!("{:?}", resolution.addresses),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

/// Maximum number of CNAME records followed before giving up.
pub const MAX_HOPS: usize = 5;

/// Time allowed for each single lookup.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// A lookup did not answer within the timeout.
    Timeout(String),
    /// The CNAME chain is longer than the hop limit.
    TooManyHops(String),
    /// The canonical host has no address records.
    NotFound(String),
    /// The lookup itself failed.
    Lookup(String),
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(name) => write!(f, "DNS lookup for {} timed out", name),
            Self::TooManyHops(name) => {
                write!(f, "more than {} CNAME records while resolving {}", MAX_HOPS, name)
            }
            Self::NotFound(name) => write!(f, "no address records for {}", name),
            Self::Lookup(reason) => write!(f, "DNS lookup failed: {}", reason),
        }
    }
}

impl std::error::Error for DnsError {}

/// A source of DNS answers.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Returns the CNAME target of `name`, or `None` if it has no CNAME record.
    async fn cname(&self, name: &str) -> Result<Option<String>, DnsError>;

    /// Returns the addresses of `name`.
    async fn addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError>;
}

/// Lookup through the operating system resolver.
///
/// The system resolver follows CNAME chains internally and does not report
/// them, so [`cname`](DnsLookup::cname) always answers `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

#[async_trait]
impl DnsLookup for SystemLookup {
    async fn cname(&self, _name: &str) -> Result<Option<String>, DnsError> {
        Ok(None)
    }

    async fn addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
        let addrs = tokio::net::lookup_host((name, 0))
            .await
            .map_err(|e| DnsError::Lookup(e.to_string()))?;
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        Ok(ips)
    }
}

/// The result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The name the addresses belong to, after following CNAME records.
    pub canonical_name: String,
    /// The CNAME targets followed, in order.
    pub chain: Vec<String>,
    /// The addresses of the canonical name.
    pub addresses: Vec<IpAddr>,
}

/// Follows CNAME chains with a hop limit and a per-lookup timeout.
#[derive(Debug, Clone)]
pub struct CnameResolver<L> {
    lookup: L,
    max_hops: usize,
    timeout: Duration,
}

impl<L: DnsLookup> CnameResolver<L> {
    /// Creates a resolver with [`MAX_HOPS`] and [`LOOKUP_TIMEOUT`].
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            max_hops: MAX_HOPS,
            timeout: LOOKUP_TIMEOUT,
        }
    }

    /// Resolves `name` to its canonical name and addresses.
    ///
    /// # Errors
    ///
    /// Returns a [`DnsError`] when a lookup fails or times out, when the
    /// chain is longer than the hop limit, or when the canonical name has no
    /// addresses.
    pub async fn resolve(&self, name: &str) -> Result<Resolution, DnsError> {
        let mut current = name.to_string();
        let mut chain = Vec::new();

        loop {
            let target = self.bounded(&current, self.lookup.cname(&current)).await?;
            let Some(target) = target else {
                break;
            };
            if chain.len() == self.max_hops {
                tracing::debug!(name, hops = chain.len(), "CNAME chain too long");
                return Err(DnsError::TooManyHops(name.to_string()));
            }
            tracing::debug!(from = %current, to = %target, "following CNAME");
            chain.push(target.clone());
            current = target;
        }

        let addresses = self.bounded(&current, self.lookup.addresses(&current)).await?;
        if addresses.is_empty() {
            return Err(DnsError::NotFound(current));
        }

        Ok(Resolution {
            canonical_name: current,
            chain,
            addresses,
        })
    }

    async fn bounded<T>(
        &self,
        name: &str,
        lookup: impl std::future::Future<Output = Result<T, DnsError>>,
    ) -> Result<T, DnsError> {
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(name, timeout_secs = self.timeout.as_secs(), "DNS lookup timed out");
                Err(DnsError::Timeout(name.to_string()))
            }
        }
    }
}

impl<L: DnsLookup + 'static> CnameResolver<L> {
    /// Resolves `name` in a background task and reports the result to
    /// `on_finished` exactly once.
    pub fn start<F>(self: Arc<Self>, name: impl Into<String>, on_finished: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Resolution, DnsError>) + Send + 'static,
    {
        let name = name.into();
        tokio::spawn(async move {
            let result = self.resolve(&name).await;
            on_finished(result);
        })
    }
}
