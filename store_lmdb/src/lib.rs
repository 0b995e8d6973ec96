//! LMDB storage backend for the referendum.
//!
//! Implements the `referendum-store` traits using the `heed` LMDB bindings.
//! Configuration and state share one `singletons` database; ballots live in
//! a `ballots` database keyed by voter account name.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod referendum;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use integrity::{check_data_dir, IntegrityReport};
pub use referendum::LmdbReferendumStore;
