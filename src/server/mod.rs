//! HTTP server for the public site and the admin API.
//!
//! Built on `tiny_http` with a single request loop:
//!
//! - `/admin/api/*` goes to the bearer-authenticated admin handlers,
//!   which mutate the content store and drive the revalidation
//!   dispatcher.
//! - Everything else resolves through the public route table,
//!   cache-first: a hit is served as-is, a miss renders from the store
//!   and fills the cache.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   mutation    ┌───────────────┐
//! │  admin API   │──────────────▶│ content store │
//! └──────┬───────┘               └───────┬───────┘
//!        │ revalidate                    │ render on miss
//!        ▼                               ▼
//! ┌──────────────┐    lookup     ┌───────────────┐
//! │  page cache  │◀──────────────│ public routes │
//! └──────────────┘               └───────────────┘
//! ```

pub mod admin;
pub mod public;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::Server;

use crate::cache::MemoryPageCache;
use crate::config::{SiteConfig, cfg};
use crate::content::ContentStore;
use crate::log;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Shared request-handling state.
pub struct AppState {
    pub store: ContentStore,
    pub cache: MemoryPageCache,
}

impl AppState {
    pub fn new(store: ContentStore, cache: MemoryPageCache) -> Self {
        Self { store, cache }
    }
}

/// Start the site server.
///
/// This function:
/// 1. Opens the content store from `[server].data`
/// 2. Binds to the configured interface and port (with auto-retry)
/// 3. Sets up Ctrl+C handler for graceful shutdown
/// 4. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let store = ContentStore::open(&config.data_path())?;
    if store.is_empty() {
        log!("serve"; "content store is empty, seed it via the admin API");
    }
    let cache = MemoryPageCache::new(config.cache.ttl());
    let state = Arc::new(AppState::new(store, cache));

    let interface: std::net::IpAddr = config.server.interface.parse()?;
    let (server, addr) = try_bind_port(interface, config.server.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");
    if config.server.admin_token.is_empty() {
        log!("serve"; "admin API disabled ([server.admin_token] is empty)");
    }

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        // Re-load config per request so a future reload path applies
        // without restarting the loop.
        let config = cfg();
        let result = if request.url().starts_with("/admin/api/") {
            admin::handle(request, &config, &state)
        } else {
            public::handle(request, &config, &state)
        };

        if let Err(e) = result {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                // Will retry silently
                continue;
            }
            Err(e) => {
                // Last attempt failed
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}
