pub mod error;

pub use error::SubError;
