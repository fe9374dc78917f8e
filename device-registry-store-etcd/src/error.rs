use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("etcd error: {0}")]
    Etcd(#[from] etcd_client::Error),

    #[error("stored value for key {key:?} is not valid utf-8")]
    InvalidUtf8 { key: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for device_registry_core::StoreError {
    fn from(err: Error) -> Self {
        device_registry_core::StoreError::new(err)
    }
}
