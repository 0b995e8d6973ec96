//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::integrity::{check_integrity, IntegrityReport};
use crate::referendum::LmdbReferendumStore;
use crate::LmdbError;

/// Name of the database holding the configuration and state singletons.
pub const SINGLETONS_DB: &str = "singletons";
/// Name of the database holding ballots keyed by voter account.
pub const BALLOTS_DB: &str = "ballots";

/// Default map size: 64 MiB is far more than a ballot table ever needs.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) singletons_db: Database<Bytes, Bytes>,
    pub(crate) ballots_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The directory is created if it does not exist, and both referendum
    /// databases are created on first open.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the memory map is never resized or truncated while open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let singletons_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(SINGLETONS_DB))?;
        let ballots_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(BALLOTS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            singletons_db,
            ballots_db,
        })
    }

    /// The underlying heed environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// A referendum store backed by this environment.
    pub fn referendum_store(&self) -> LmdbReferendumStore {
        LmdbReferendumStore {
            env: Arc::clone(&self.env),
            singletons_db: self.singletons_db,
            ballots_db: self.ballots_db,
        }
    }

    /// Run the startup integrity check over this environment's databases.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        check_integrity(&self.env)
    }
}
