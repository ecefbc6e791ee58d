pub mod aggregate;
pub mod codec;
pub mod common;
pub mod config;
pub mod detect;
pub mod fetch;
pub mod node;
pub mod render;

pub use aggregate::{aggregate_subscriptions, Source};
pub use node::Node;
pub use render::OutputFormat;
