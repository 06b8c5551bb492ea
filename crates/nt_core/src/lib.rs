pub mod dates;
pub mod error;
pub mod http;
pub mod models;
pub mod storage;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::Error;
pub use http::{FetchError, FetchRequest, FetchResponse, HttpClient, ReqwestClient};
pub use models::InferenceModel;
pub use storage::ArticleStorage;
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
