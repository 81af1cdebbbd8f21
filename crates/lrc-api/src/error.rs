use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned http {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("response has no {0}")]
    MissingData(&'static str),
    #[error("pagination cursor did not advance past {0}")]
    StalledCursor(String),
    #[error("failed to decode {what}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response cache io on {path}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
