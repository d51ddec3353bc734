use std::collections::BTreeSet;

use tracing::debug;

use crate::backend::KvBackend;
use crate::record::Record;
use crate::{Result, TrendsError};

/// Computes views over the records currently held by a [`KvBackend`].
///
/// No index is kept: every call lists all keys and reads every record, so a view can never be
/// stale, at the price of a full scan per query. Every query reports
/// [`TrendsError::EmptyStore`] when the structured namespace has no keys.
#[derive(Debug, Clone)]
pub struct QueryEngine<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> QueryEngine<B> {
    /// creates a query engine reading from `backend`
    pub fn new(backend: B) -> Self {
        QueryEngine { backend }
    }

    /// returns every stored record, in backend iteration order
    pub fn all_records(&self) -> Result<Vec<Record>> {
        self.scan(|_| true)
    }

    /// returns the set of distinct `Model Year` values across all records
    pub fn distinct_years(&self) -> Result<BTreeSet<String>> {
        let years = self
            .scan(|_| true)?
            .into_iter()
            .filter_map(|record| record.model_year().map(String::from))
            .collect::<BTreeSet<_>>();
        debug!(?years);
        Ok(years)
    }

    /// returns all records whose `Model Year` equals `year`.
    ///
    /// A year absent from the dataset yields an empty list, not an error.
    pub fn records_for_year(&self, year: &str) -> Result<Vec<Record>> {
        self.scan(|record| record.model_year() == Some(year))
    }

    // reads every record, keeping those accepted by `keep`
    fn scan<F>(&self, keep: F) -> Result<Vec<Record>>
    where
        F: Fn(&Record) -> bool,
    {
        let keys = self.backend.list_keys()?;
        if keys.is_empty() {
            return Err(TrendsError::EmptyStore);
        }

        let mut records = Vec::new();
        for key in keys {
            // the key may have been removed by a concurrent clear since it was listed
            if let Some(fields) = self.backend.get_fields(&key)? {
                let record = Record::new(fields);
                if keep(&record) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}
