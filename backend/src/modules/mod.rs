pub mod database;
pub mod extractors;
pub mod flash;
pub mod storage;
pub mod timestamp;
