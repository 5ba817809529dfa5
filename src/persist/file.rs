//! JSON file backend for persisted params.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistError;
use crate::params::{ParamsPatch, QueryParams};

use super::ParamsStore;

/// Stores params as a JSON document on disk.
///
/// A missing file loads as "nothing saved". Parent directories are created
/// on first save.
pub struct JsonFileParamsStore<F> {
    path: PathBuf,
    _filter: PhantomData<fn() -> F>,
}

impl<F> JsonFileParamsStore<F> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _filter: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl<F> ParamsStore<F> for JsonFileParamsStore<F>
where
    F: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Option<ParamsPatch<F>>, PersistError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let patch: ParamsPatch<F> = serde_json::from_str(&content)?;
        Ok(Some(patch))
    }

    async fn save(&self, params: QueryParams<F>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        let content = serde_json::to_string_pretty(&params)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.io_error(e))
    }
}
