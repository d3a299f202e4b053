use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store '{screen}' read before initialize()")]
    NotInitialized { screen: &'static str },
}
