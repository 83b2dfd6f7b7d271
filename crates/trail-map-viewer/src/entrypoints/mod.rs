//! Platform entry points: native window and wasm `WebHandle`

pub(crate) mod cli;
mod logging;
mod metadata;
pub(crate) mod run;

#[cfg(target_arch = "wasm32")]
pub mod web;
