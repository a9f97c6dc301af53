//! Inference IR (graph definition + weights)
//!
//! The graph is handled as text: this layer only needs to detect
//! quantization nodes, read the input shape, and read or rewrite the
//! `rt_info/model_info` section that carries deployment metadata.

mod graph;
mod rt_info;
mod scoped;


pub use graph::{IrGraph, IrModel};
pub use rt_info::{format_float, ModelInfo, RtValue};
pub use scoped::ScopedIrDir;
