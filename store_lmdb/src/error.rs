use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transient environment pressure. The caller may retry.
    #[error("storage busy: {0}")]
    Busy(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),

    #[error("schema version mismatch: found {found}, expected {expected}")]
    SchemaVersion { found: u32, expected: u32 },
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(heed::MdbError::MapFull) => {
                LmdbError::Busy("LMDB map is full".to_string())
            }
            heed::Error::Mdb(heed::MdbError::ReadersFull) => {
                LmdbError::Busy("too many concurrent readers".to_string())
            }
            heed::Error::Mdb(heed::MdbError::TxnFull) => {
                LmdbError::Busy("write transaction is full".to_string())
            }
            heed::Error::Mdb(heed::MdbError::Corrupted) => {
                LmdbError::Corruption("LMDB reports a corrupted database".to_string())
            }
            heed::Error::Io(e) => LmdbError::Io(e.to_string()),
            other => LmdbError::Heed(other.to_string()),
        }
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for LmdbError {
    fn from(e: std::io::Error) -> Self {
        LmdbError::Io(e.to_string())
    }
}

impl From<LmdbError> for agora_store::StoreError {
    fn from(e: LmdbError) -> Self {
        use agora_store::StoreError;
        match e {
            LmdbError::NotFound(msg) => StoreError::NotFound(msg),
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            LmdbError::Busy(msg) => StoreError::Busy(msg),
            LmdbError::Corruption(msg) => StoreError::Corruption(msg),
            LmdbError::SchemaVersion { found, expected } => StoreError::Corruption(format!(
                "schema version mismatch: found {found}, expected {expected}"
            )),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
