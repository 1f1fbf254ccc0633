use crate::domain::model::IndexSeries;
use crate::domain::ports::Storage;
use crate::utils::error::{IndicesError, Result};

/// Reads and writes one series file through a [`Storage`].
///
/// The file is a JSON object of `"YYYY-MM-DD": number` pairs, keys ascending,
/// two-space indentation, non-ASCII left unescaped and no trailing newline.
/// Downstream consumers depend on that layout.
pub struct SeriesStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> SeriesStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns an empty series when the file does not exist yet.
    pub async fn load(&self) -> Result<IndexSeries> {
        let data = match self.storage.read_file(&self.path).await {
            Ok(data) => data,
            Err(IndicesError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("📄 {} does not exist yet, starting an empty series", self.path);
                return Ok(IndexSeries::new());
            }
            Err(e) => return Err(e),
        };

        let series = decode(&data).map_err(|message| IndicesError::CorruptStateError {
            path: self.path.clone(),
            message,
        })?;

        tracing::debug!("Loaded {} entries from {}", series.len(), self.path);
        Ok(series)
    }

    /// Overwrites the whole file and returns the bytes written.
    pub async fn save(&self, series: &IndexSeries) -> Result<Vec<u8>> {
        let data = encode(series)?;
        self.storage.write_file(&self.path, &data).await?;
        tracing::debug!("Wrote {} entries ({} bytes) to {}", series.len(), data.len(), self.path);
        Ok(data)
    }
}

pub fn encode(series: &IndexSeries) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(series)?)
}

fn decode(data: &[u8]) -> std::result::Result<IndexSeries, String> {
    let text = std::str::from_utf8(data).map_err(|e| format!("not UTF-8: {}", e))?;
    serde_json::from_str(text).map_err(|e| e.to_string())
}
