pub mod chunk;
pub mod batch;
