//! One collection in, one ranked digest out; plus the HTTP and batch surfaces around it.

pub mod batch;
pub mod handlers;
pub mod runner;

pub use runner::{CollectionError, CollectionRunner, PipelineSettings};
