use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderBookError {
    #[error("Invalid Order: {0}")]
    InvalidOrder(String),
}
