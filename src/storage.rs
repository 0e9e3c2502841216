use crate::errors::StoreError;
use crate::models::{HabitRecord, StoreData};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Where habit records live, addressed by period id.
pub trait HabitStore: Send + Sync {
    fn list_records(
        &self,
        period: &str,
    ) -> impl Future<Output = Result<Vec<HabitRecord>, StoreError>> + Send;

    fn delete_records(&self, period: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends to whatever the period already holds.
    fn insert_records(
        &self,
        period: &str,
        records: Vec<HabitRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Swaps the period's records for `records`.
    ///
    /// The default runs delete then insert, which leaves the period empty if
    /// the insert fails. Stores that can replace atomically should override it.
    fn replace_records(
        &self,
        period: &str,
        records: Vec<HabitRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            self.delete_records(period).await?;
            self.insert_records(period, records).await
        }
    }
}

/// JSON file store. The whole file is rewritten on every change.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    data: Arc<Mutex<StoreData>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that exists but cannot be read or parsed is an error and is left as is.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = load_data(&path).await?;
        info!(path = %path.display(), periods = data.periods.len(), "opened habit store");
        Ok(Self {
            path,
            data: Arc::new(Mutex::new(data)),
        })
    }

    pub(crate) async fn read<T>(&self, view: impl FnOnce(&StoreData) -> T) -> T {
        let data = self.data.lock().await;
        view(&data)
    }

    /// Applies `change` to a copy, writes it out, then commits it in memory.
    ///
    /// The write and the commit run on a spawned task that owns the lock, so a
    /// caller that stops waiting (a timeout) cannot leave the file and the
    /// in-memory copy disagreeing.
    pub(crate) async fn update<T>(
        &self,
        change: impl FnOnce(&mut StoreData) -> T,
    ) -> Result<T, StoreError> {
        let mut data = Arc::clone(&self.data).lock_owned().await;
        let mut next = data.clone();
        let output = change(&mut next);
        let path = self.path.clone();
        tokio::spawn(async move {
            persist_data(&path, &next).await?;
            *data = next;
            Ok::<_, StoreError>(())
        })
        .await??;
        Ok(output)
    }
}

impl HabitStore for FileStore {
    async fn list_records(&self, period: &str) -> Result<Vec<HabitRecord>, StoreError> {
        Ok(self
            .read(|data| data.periods.get(period).cloned())
            .await
            .unwrap_or_default())
    }

    async fn delete_records(&self, period: &str) -> Result<(), StoreError> {
        self.update(|data| {
            data.periods.remove(period);
        })
        .await
    }

    async fn insert_records(&self, period: &str, records: Vec<HabitRecord>) -> Result<(), StoreError> {
        self.update(|data| {
            data.periods
                .entry(period.to_string())
                .or_default()
                .extend(records);
        })
        .await
    }

    async fn replace_records(&self, period: &str, records: Vec<HabitRecord>) -> Result<(), StoreError> {
        self.update(|data| {
            if records.is_empty() {
                data.periods.remove(period);
            } else {
                data.periods.insert(period.to_string(), records);
            }
        })
        .await
    }
}

pub async fn load_data(path: &Path) -> Result<StoreData, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!(path = %path.display(), "failed to parse data file: {err}");
            StoreError::Json(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            Err(StoreError::Io(err))
        }
    }
}

/// Writes to a sibling temp file and renames it over the target.
pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await.inspect_err(|err| {
        error!(path = %tmp.display(), "failed to write data file: {err}");
    })?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
