use std::net::ToSocketAddrs;

use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, error, info};

use crate::api::{Api, ApiResponse};
use crate::backend::KvBackend;
use crate::chart::ChartRenderer;
use crate::thread_pool::ThreadPool;
use crate::{Result, TrendsError};

/// An HTTP server exposing an [`Api`].
///
/// It accepts requests on a [`tiny_http`] listener and services each one on a thread of its
/// [`ThreadPool`]. Every job receives its own clone of the [`Api`], so all of them share the
/// same backend handle.
///
/// # Example
/// Serve an in-memory dataset on "127.0.0.1:5000" with 4 threads of a shared queue pool
/// ```rust,no_run
/// use autotrends::{Api, MemoryBackend, SvgRenderer, TrendsServer};
/// use autotrends::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// # fn main() -> autotrends::Result<()> {
/// let api = Api::new(MemoryBackend::new(), SvgRenderer::new(), "autoTrendsData.csv");
/// let server = TrendsServer::new(api, SharedQueueThreadPool::new(4)?);
/// server.run("127.0.0.1:5000")?;
/// # Ok(())
/// # }
/// ```
///
/// [`tiny_http`]: https://docs.rs/tiny_http/latest/tiny_http/
pub struct TrendsServer<B: KvBackend, R: ChartRenderer, P: ThreadPool> {
    api: Api<B, R>,
    pool: P,
}

impl<B: KvBackend, R: ChartRenderer, P: ThreadPool> TrendsServer<B, R, P> {
    /// Create a new `TrendsServer` using the given [`Api`] and [`ThreadPool`] implementation.
    pub fn new(api: Api<B, R>, pool: P) -> Self {
        TrendsServer { api, pool }
    }

    /// binds a listener on the given address and serves requests until the process exits
    ///
    /// # Errors
    /// returns [`TrendsError::StringErr`] if the address could not be bound
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let server = Server::http(addr)
            .map_err(|e| TrendsError::StringErr(format!("could not start server: {}", e)))?;
        self.serve(server)
    }

    /// serves requests arriving on an already bound `server`.
    ///
    /// Returns once the listener is unblocked or closed.
    pub fn serve(self, server: Server) -> Result<()> {
        info!("Listening on {:?}", server.server_addr());
        for request in server.incoming_requests() {
            let api = self.api.clone();
            self.pool.spawn(move || {
                if let Err(e) = respond(&api, request) {
                    error!("Error on serving client: {}", e);
                }
            });
        }
        Ok(())
    }
}

/// reads the body of `request`, routes it through `api` and writes the response back
fn respond<B: KvBackend, R: ChartRenderer>(api: &Api<B, R>, mut request: Request) -> Result<()> {
    let peer = request.remote_addr().copied();
    let mut body = Vec::new();
    request.as_reader().read_to_end(&mut body)?;
    debug!(
        "Receive request from {:?}: {} {}",
        peer,
        request.method(),
        request.url()
    );

    let resp: ApiResponse = api.handle(request.method(), request.url(), &body);
    let status = resp.status;
    let content_type = Header::from_bytes(&b"Content-Type"[..], resp.content_type.as_bytes())
        .map_err(|_| TrendsError::StringErr(format!("bad content type {}", resp.content_type)))?;
    request.respond(
        Response::from_data(resp.body)
            .with_status_code(status)
            .with_header(content_type),
    )?;
    debug!("Response sent to {:?}: {}", peer, status);
    Ok(())
}
