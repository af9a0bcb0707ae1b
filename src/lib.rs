//! vxshader - annotated shader preprocessing
//!
//! The binary is a thin front end. The work lives in:
//! - `vx-preprocess` - directive parsing and stage splitting
//! - `vx-gl` - compile and link against a GL backend
//! - `vx-config` - `vxshader.toml` loading

pub mod cli;

pub use cli::{Args, Command, Emitted, Input, USAGE, output_paths, run, split_input};
