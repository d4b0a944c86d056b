pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;
pub mod sink;

pub use sink::{current_sink, with_scoped_sink, OutputSink};

use ctx::LogCtx;

pub fn chunk() -> LogCtx<ops::chunk::Chunk> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn batch() -> LogCtx<ops::batch::Batch> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
