use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{plot_points, ArtifactCache, ChartRenderer, ChartRequest};
use crate::backend::KvBackend;
use crate::query::QueryEngine;
use crate::Result;

/// Summary of a chart that was rendered and cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedChart {
    /// the name the chart is cached under
    pub name: String,
    /// number of points drawn
    pub points: usize,
    /// size of the rendered artifact in bytes
    pub bytes: usize,
}

/// Renders charts from query results and keeps them in an [`ArtifactCache`].
///
/// Rendering runs to completion on the calling thread.
#[derive(Debug)]
pub struct ChartService<B: KvBackend, R: ChartRenderer> {
    query: QueryEngine<B>,
    cache: ArtifactCache<B>,
    renderer: Arc<R>,
}

impl<B: KvBackend, R: ChartRenderer> Clone for ChartService<B, R> {
    fn clone(&self) -> Self {
        ChartService {
            query: self.query.clone(),
            cache: self.cache.clone(),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<B: KvBackend, R: ChartRenderer> ChartService<B, R> {
    /// creates a service reading records from, and caching charts into, `backend`
    pub fn new(backend: B, renderer: R) -> Self {
        ChartService {
            query: QueryEngine::new(backend.clone()),
            cache: ArtifactCache::new(backend),
            renderer: Arc::new(renderer),
        }
    }

    /// renders the chart described by `request` and caches it under
    /// [`request.artifact_name()`](ChartRequest::artifact_name), overwriting any earlier render.
    ///
    /// A year without records renders an empty chart.
    ///
    /// # Errors
    /// [`TrendsError::EmptyStore`] if no records are loaded,
    /// [`TrendsError::FieldParse`] if a plotted value is not numeric
    ///
    /// [`TrendsError::EmptyStore`]: crate::TrendsError::EmptyStore
    /// [`TrendsError::FieldParse`]: crate::TrendsError::FieldParse
    #[instrument(skip(self))]
    pub fn render(&self, request: &ChartRequest) -> Result<RenderedChart> {
        let records = self.query.records_for_year(&request.year)?;
        let points = plot_points(&records, &request.x_field, &request.y_field)?;
        let bytes = self.renderer.render(&points, &request.style())?;

        let name = request.artifact_name();
        self.cache.store(&name, &bytes)?;
        info!(
            "rendered {} from {} of {} records",
            name,
            points.len(),
            records.len()
        );

        Ok(RenderedChart {
            name,
            points: points.len(),
            bytes: bytes.len(),
        })
    }

    /// fetches the cached chart for `request`
    ///
    /// # Errors
    /// [`TrendsError::ArtifactNotFound`] if the chart was never rendered
    ///
    /// [`TrendsError::ArtifactNotFound`]: crate::TrendsError::ArtifactNotFound
    pub fn fetch(&self, request: &ChartRequest) -> Result<Vec<u8>> {
        self.cache.fetch(&request.artifact_name())
    }

    /// returns `true` if a chart is cached for `request`
    pub fn exists(&self, request: &ChartRequest) -> Result<bool> {
        self.cache.exists(&request.artifact_name())
    }

    /// removes every cached chart
    pub fn clear(&self) -> Result<()> {
        self.cache.clear()
    }

    /// the MIME type of the charts this service renders
    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }
}
