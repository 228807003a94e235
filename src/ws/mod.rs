pub mod handler;
pub mod router;
pub mod types;

pub use router::router;
