//! Async wrapper around [`Store`]
//!
//! Each operation runs the blocking store call (lock polling included) on
//! tokio's blocking pool, so waiting for the lock never stalls the async
//! runtime. Values passed in are converted to JSON before the task starts.

use serde::Serialize;
use serde_json::Value;
use tokio::task;

use crate::codec;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::path::{IntoKeyPath, KeyPath};
use crate::store::Store;

/// A [`Store`] for use from async code
#[derive(Debug, Clone)]
pub struct AsyncStore {
    inner: Store,
}

impl AsyncStore {
    pub fn new(store: Store) -> Self {
        Self { inner: store }
    }

    /// The wrapped blocking store
    pub fn blocking(&self) -> &Store {
        &self.inner
    }

    /// An async store with call-level options layered on top
    pub fn with_overrides(&self, overrides: &Options) -> AsyncStore {
        Self::new(self.inner.with_overrides(overrides))
    }

    pub async fn read(&self) -> Result<Value> {
        self.run(|store| store.read()).await
    }

    pub async fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        let value = self.to_document(value)?;
        self.run(move |store| store.write(&value)).await
    }

    pub async fn get(&self, key_path: impl IntoKeyPath, default: Option<Value>) -> Result<Value> {
        let key_path: KeyPath = key_path.into_key_path()?;
        self.run(move |store| store.get(key_path, default)).await
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key_path: impl IntoKeyPath,
        value: &T,
    ) -> Result<Value> {
        let key_path: KeyPath = key_path.into_key_path()?;
        let value = self.to_document(value)?;
        self.run(move |store| store.set(key_path, &value)).await
    }

    #[deprecated(note = "use `AsyncStore::set`")]
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        key_path: impl IntoKeyPath,
        value: &T,
    ) -> Result<Value> {
        self.set(key_path, value).await
    }

    pub async fn merge<T: Serialize + ?Sized>(&self, partial: &T) -> Result<Value> {
        let partial = self.to_document(partial)?;
        self.run(move |store| store.merge(&partial)).await
    }

    pub async fn delete_key(&self, key: &str) -> Result<Value> {
        self.delete_keys(&[key]).await
    }

    pub async fn delete_keys<S: AsRef<str>>(&self, keys: &[S]) -> Result<Value> {
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        self.run(move |store| store.delete_keys(keys.as_slice())).await
    }

    pub async fn rewrite(&self) -> Result<Value> {
        self.run(|store| store.rewrite()).await
    }

    async fn run<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&Store) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        task::spawn_blocking(move || op(&store)).await?
    }

    fn to_document<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        codec::to_document(value).map_err(|source| Error::Serialize {
            path: self.inner.path().to_path_buf(),
            source,
        })
    }
}

impl From<Store> for AsyncStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}
