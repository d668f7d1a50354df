pub mod read_cache;
