mod height;
mod skiplist;

pub use height::HeightSource;
pub use skiplist::{SkipListMap, DEFAULT_CAPACITY};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("key is absent")]
    InvalidKey,
    #[error("key is already present")]
    DuplicateKey,
    #[error("key not found")]
    KeyNotFound,
}

type Res<T> = Result<T, MapError>;

// Keys come in as `Option` so callers that carry nullable keys get
// `InvalidKey` back instead of having to filter them first.
pub trait MemTable<K: Ord, V> {
    fn new(size: Option<usize>) -> Self;
    fn create(&mut self, key: Option<K>, val: V) -> Res<()>;
    fn read(&self, key: Option<&K>) -> Res<&V>;
    fn update(&mut self, key: Option<&K>, new_val: V) -> Res<V>;
    fn delete(&mut self, key: Option<&K>) -> Res<V>;
}
