use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("no API key found for {0}; set {1} in the environment or .env")] MissingCredential(&'static str, &'static str),
    #[error("provider error: {0}")] Provider(String),
    #[error("model returned no text")] EmptyResponse,
    #[error("config error: {0}")] Config(String),
    #[error("export failed: {0}")] Export(String),
}
