pub mod memtable;
