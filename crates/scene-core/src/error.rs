use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("could not decode {kind}: {reason}")]
    Decode { kind: &'static str, reason: String },
    #[error("model contains no triangle geometry")]
    EmptyModel,
}
