//! The HTTP route table of the autotrends service.
//!
//! [`Api::handle`] maps a method, a url and a request body onto the dataset loader, the query
//! engine and the chart service, and turns the outcome into an [`ApiResponse`]. It knows
//! nothing about sockets, which is left to [`TrendsServer`](crate::TrendsServer).
use std::path::{Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tiny_http::Method;
use tracing::{debug, error};

use crate::backend::KvBackend;
use crate::chart::{ChartRenderer, ChartRequest, ChartService};
use crate::loader::DatasetLoader;
use crate::query::QueryEngine;
use crate::{Result, TrendsError};

/// the body sent when a query finds no records at all
pub const NO_DATA: &str = "No data in db. Post data to get info\n";
/// the body sent for a method a route does not support
pub const BAD_METHOD: &str = "The method you tried does not work\n";
/// the body sent when a chart was never rendered
pub const PLOT_NOT_FOUND: &str = "Plot not found\n";

/// content type of plain text bodies, including advisories
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
/// content type of JSON bodies
pub const APPLICATION_JSON: &str = "application/json";

/// A fully formed response, ready to be written to the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// value of the `Content-Type` header
    pub content_type: &'static str,
    /// response body
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// a plain text response
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            content_type: TEXT_PLAIN,
            body: body.into().into_bytes(),
        }
    }

    /// a `200` response holding `value` serialized as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(ApiResponse {
            status: 200,
            content_type: APPLICATION_JSON,
            body: serde_json::to_vec(value)?,
        })
    }

    /// the `200` advisory sent when the store holds no records
    pub fn no_data() -> Self {
        ApiResponse::text(200, NO_DATA)
    }

    /// returns `true` if this is a success response carrying an advisory message instead of data
    pub fn is_advisory(&self) -> bool {
        self.status == 200 && self.content_type == TEXT_PLAIN && self.body == NO_DATA.as_bytes()
    }

    /// the body as text, with invalid utf-8 replaced
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Routes requests to the dataset, query and chart components sharing one backend.
pub struct Api<B: KvBackend, R: ChartRenderer> {
    loader: DatasetLoader<B>,
    query: QueryEngine<B>,
    charts: ChartService<B, R>,
    csv_path: Arc<PathBuf>,
}

impl<B: KvBackend, R: ChartRenderer> Clone for Api<B, R> {
    fn clone(&self) -> Self {
        Api {
            loader: self.loader.clone(),
            query: self.query.clone(),
            charts: self.charts.clone(),
            csv_path: Arc::clone(&self.csv_path),
        }
    }
}

impl<B: KvBackend, R: ChartRenderer> Api<B, R> {
    /// creates the route table over `backend`.
    ///
    /// `csv_path` is the source loaded by a `POST /data` that carries no body.
    pub fn new(backend: B, renderer: R, csv_path: impl Into<PathBuf>) -> Self {
        Api {
            loader: DatasetLoader::new(backend.clone()),
            query: QueryEngine::new(backend.clone()),
            charts: ChartService::new(backend, renderer),
            csv_path: Arc::new(csv_path.into()),
        }
    }

    /// the CSV file loaded by a body-less `POST /data`
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// handles a single request and always produces a response.
    ///
    /// `url` is the request target, path plus optional query string.
    pub fn handle(&self, method: &Method, url: &str, body: &[u8]) -> ApiResponse {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        debug!(%method, ?segments, query, "routing request");

        let outcome = match segments.as_slice() {
            ["data"] => self.data(method, body),
            ["years"] => self.years(method),
            ["years", year] => self.year(method, year),
            ["image"] => self.image(method, query),
            _ => Ok(ApiResponse::text(404, format!("no route for {}\n", path))),
        };

        outcome.unwrap_or_else(error_response)
    }

    fn data(&self, method: &Method, body: &[u8]) -> Result<ApiResponse> {
        match method {
            Method::Post => {
                let loaded = if body.is_empty() {
                    self.loader.load_csv_path(&self.csv_path)?
                } else {
                    self.loader.load_csv(body).map_err(|e| match e {
                        TrendsError::Csv(e) => TrendsError::BadUpload(e),
                        e => e,
                    })?
                };
                Ok(ApiResponse::text(200, format!("loaded {} records\n", loaded)))
            }
            Method::Get => ApiResponse::json(&self.query.all_records()?),
            Method::Delete => {
                let remaining = self.loader.clear()?;
                Ok(ApiResponse::text(
                    200,
                    format!("data deleted, there are {} keys in the db\n", remaining),
                ))
            }
            _ => Ok(ApiResponse::text(405, BAD_METHOD)),
        }
    }

    fn years(&self, method: &Method) -> Result<ApiResponse> {
        match method {
            Method::Get => ApiResponse::json(&self.query.distinct_years()?),
            _ => Ok(ApiResponse::text(405, BAD_METHOD)),
        }
    }

    fn year(&self, method: &Method, year: &str) -> Result<ApiResponse> {
        match method {
            Method::Get => ApiResponse::json(&self.query.records_for_year(&decode_component(year)?)?),
            _ => Ok(ApiResponse::text(405, BAD_METHOD)),
        }
    }

    fn image(&self, method: &Method, query: &str) -> Result<ApiResponse> {
        match method {
            Method::Post => ApiResponse::json(&self.charts.render(&chart_request(query)?)?),
            Method::Get => Ok(ApiResponse {
                status: 200,
                content_type: self.charts.content_type(),
                body: self.charts.fetch(&chart_request(query)?)?,
            }),
            Method::Delete => {
                self.charts.clear()?;
                Ok(ApiResponse::text(200, "Plots have been deleted\n"))
            }
            _ => Ok(ApiResponse::text(405, BAD_METHOD)),
        }
    }
}

fn error_response(e: TrendsError) -> ApiResponse {
    match e {
        TrendsError::EmptyStore => ApiResponse::no_data(),
        TrendsError::ArtifactNotFound(name) => {
            debug!("no artifact named {}", name);
            ApiResponse::text(404, PLOT_NOT_FOUND)
        }
        e @ TrendsError::MalformedRow { .. }
        | e @ TrendsError::FieldParse { .. }
        | e @ TrendsError::BadUpload(_)
        | e @ TrendsError::Parsing(_) => ApiResponse::text(400, format!("{}\n", e)),
        e => {
            error!("request failed: {}", e);
            ApiResponse::text(500, format!("{}\n", e))
        }
    }
}

/// builds a [`ChartRequest`] from a query string such as `year=2020&kind=line`.
///
/// Recognized parameters are `year`, `kind`, `x` and `y`; anything missing keeps the default
/// chart's value and unknown parameters are ignored.
pub fn chart_request(query: &str) -> Result<ChartRequest> {
    let mut request = ChartRequest::default();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode_component(value)?;
        match name {
            "year" => request.year = value,
            "kind" => request.kind = value.parse()?,
            "x" => request.x_field = value,
            "y" => request.y_field = value,
            _ => debug!("ignoring query parameter {}", name),
        }
    }
    Ok(request)
}

// percent-decodes one url component, treating `+` as a space
fn decode_component(raw: &str) -> Result<String> {
    let bad_escape = || TrendsError::Parsing(format!("bad percent escape in `{}`", raw));
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(bad_escape());
        }
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| TrendsError::Parsing(format!("`{}` does not decode to utf-8", raw)))
}
