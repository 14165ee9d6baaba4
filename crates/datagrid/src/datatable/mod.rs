pub mod api;
pub mod codec;
pub mod config;
pub mod env;
pub mod events;
pub mod gate;
pub mod source;
pub mod state;
pub mod storage;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(test)]
pub(crate) mod testing;
