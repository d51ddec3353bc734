use std::io::Read;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

use crate::chart::{ChartRequest, RenderedChart};
use crate::record::Record;
use crate::{Result, TrendsError};

/// The outcome of a read against the API: either data, or the advisory message the server
/// sends when it holds no records.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    /// the request returned data
    Data(T),
    /// the server answered with an informational message instead of data
    Advisory(String),
}

impl<T> ApiReply<T> {
    /// returns the data, or `None` for an advisory
    pub fn data(self) -> Option<T> {
        match self {
            ApiReply::Data(data) => Some(data),
            ApiReply::Advisory(_) => None,
        }
    }
}

// a response of any status, read in full
struct Reply {
    status: u16,
    content_type: String,
    body: Vec<u8>,
}

impl Reply {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn into_error(self, path: &str) -> TrendsError {
        TrendsError::StringErr(format!("{} {}: {}", self.status, path, self.text().trim_end()))
    }
}

/// `TrendsClient` contains the functionality for communication with a [`TrendsServer`]
///
/// [`TrendsServer`]: crate::TrendsServer
pub struct TrendsClient {
    agent: Agent,
    base_url: String,
}

impl TrendsClient {
    /// creates a client for the server at `base_url`, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: &str) -> Self {
        TrendsClient {
            agent: AgentBuilder::new().timeout(Duration::from_secs(60)).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// asks the server to load its configured CSV file, or the given CSV `data` if present.
    /// # Returns
    /// the server's status message
    pub fn load_data(&self, data: Option<&[u8]>) -> Result<String> {
        self.expect_text("POST", "/data", data)
    }

    /// gets every record held by the server
    pub fn data(&self) -> Result<ApiReply<Vec<Record>>> {
        self.expect_json("/data")
    }

    /// deletes every record held by the server
    pub fn delete_data(&self) -> Result<String> {
        self.expect_text("DELETE", "/data", None)
    }

    /// gets the distinct model years of the dataset
    pub fn years(&self) -> Result<ApiReply<Vec<String>>> {
        self.expect_json("/years")
    }

    /// gets the records of the given model `year`
    pub fn year(&self, year: &str) -> Result<ApiReply<Vec<Record>>> {
        let year = utf8_percent_encode(year, NON_ALPHANUMERIC).to_string();
        self.expect_json(&format!("/years/{}", year))
    }

    /// asks the server to render and cache the chart described by `request`
    pub fn render_image(&self, request: &ChartRequest) -> Result<ApiReply<RenderedChart>> {
        let reply = self.send_query("POST", "/image", &chart_query(request), None)?;
        self.decode(reply, "/image")
    }

    /// fetches the cached chart described by `request`
    /// # Returns
    /// `Ok(None)` if the chart has not been rendered
    pub fn fetch_image(&self, request: &ChartRequest) -> Result<Option<Vec<u8>>> {
        let reply = self.send_query("GET", "/image", &chart_query(request), None)?;
        match reply.status {
            200 => Ok(Some(reply.body)),
            404 => Ok(None),
            _ => Err(reply.into_error("/image")),
        }
    }

    /// deletes every cached chart
    pub fn delete_image(&self) -> Result<String> {
        self.expect_text("DELETE", "/image", None)
    }

    fn expect_text(&self, method: &str, path: &str, body: Option<&[u8]>) -> Result<String> {
        let reply = self.send(method, path, body)?;
        if reply.status == 200 {
            Ok(reply.text())
        } else {
            Err(reply.into_error(path))
        }
    }

    fn expect_json<T: DeserializeOwned>(&self, path: &str) -> Result<ApiReply<T>> {
        let reply = self.send("GET", path, None)?;
        self.decode(reply, path)
    }

    fn decode<T: DeserializeOwned>(&self, reply: Reply, path: &str) -> Result<ApiReply<T>> {
        match reply.status {
            200 if reply.content_type == "text/plain" => Ok(ApiReply::Advisory(reply.text())),
            200 => Ok(ApiReply::Data(serde_json::from_slice(&reply.body)?)),
            _ => Err(reply.into_error(path)),
        }
    }

    fn send(&self, method: &str, path: &str, body: Option<&[u8]>) -> Result<Reply> {
        self.send_query(method, path, &[], body)
    }

    fn send_query(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&[u8]>,
    ) -> Result<Reply> {
        let url = format!("{}{}", self.base_url, path);
        let request = query
            .iter()
            .fold(self.agent.request(method, &url), |request, (name, value)| {
                request.query(name, value)
            });
        let result = match body {
            Some(body) => request.send_bytes(body),
            None => request.call(),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                return Err(TrendsError::StringErr(format!("could not reach {}: {}", url, e)))
            }
        };

        let status = response.status();
        let content_type = response.content_type().to_string();
        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;
        debug!("{} {} -> {} ({} bytes)", method, path, status, body.len());
        Ok(Reply {
            status,
            content_type,
            body,
        })
    }
}

// the query parameters selecting `request` on the `/image` route
fn chart_query(request: &ChartRequest) -> Vec<(&'static str, String)> {
    vec![
        ("year", request.year.clone()),
        ("kind", request.kind.to_string()),
        ("x", request.x_field.clone()),
        ("y", request.y_field.clone()),
    ]
}
