pub mod store;

pub use store::memtable::{HeightSource, MapError, MemTable, SkipListMap, DEFAULT_CAPACITY};
