use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::backend::KvBackend;
use crate::record::{composite_key, FieldMap};
use crate::Result;

/// Writes source rows into the structured namespace of a [`KvBackend`], one record per row.
///
/// Each row is stored under its composite key, replacing whatever was there before. Loading is
/// not transactional: if row `k` is malformed, rows `0..k` stay committed and the remaining
/// rows are not written.
#[derive(Debug, Clone)]
pub struct DatasetLoader<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> DatasetLoader<B> {
    /// creates a loader writing into `backend`
    pub fn new(backend: B) -> Self {
        DatasetLoader { backend }
    }

    /// writes every row of `rows` and returns the number of rows written.
    ///
    /// Rows sharing a composite key overwrite each other, the last one wins.
    ///
    /// # Errors
    /// returns [`TrendsError::MalformedRow`] for the first row lacking a key field,
    /// or any backend error
    ///
    /// [`TrendsError::MalformedRow`]: crate::TrendsError::MalformedRow
    pub fn load<I>(&self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = FieldMap>,
    {
        let mut written = 0;
        for (idx, row) in rows.into_iter().enumerate() {
            self.write_row(idx, &row)?;
            written += 1;
        }
        info!("loaded {} records", written);
        Ok(written)
    }

    /// loads CSV data from `reader`. The first line must be a header naming the fields.
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<usize> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut written = 0;
        for (idx, row) in csv.deserialize::<FieldMap>().enumerate() {
            self.write_row(idx, &row?)?;
            written += 1;
        }
        info!("loaded {} records from csv", written);
        Ok(written)
    }

    /// opens the CSV file at `path` and loads it
    #[instrument(skip(self))]
    pub fn load_csv_path(&self, path: &Path) -> Result<usize> {
        let file = File::open(path)?;
        self.load_csv(file)
    }

    fn write_row(&self, idx: usize, row: &FieldMap) -> Result<()> {
        let key = composite_key(idx, row)?;
        debug!(%key, "writing record");
        self.backend.set_fields(&key, row)
    }

    /// deletes every record and returns the number of keys left afterwards
    pub fn clear(&self) -> Result<usize> {
        self.backend.delete_all_keys()?;
        let remaining = self.backend.list_keys()?.len();
        info!("records deleted, {} keys remain", remaining);
        Ok(remaining)
    }
}
