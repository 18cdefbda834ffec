use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] agora_store::StoreError),

    #[error("storage error: {0}")]
    Lmdb(#[from] agora_store_lmdb::LmdbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(#[from] agora_rpc::ServerError),
}
