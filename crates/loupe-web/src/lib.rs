#![forbid(unsafe_code)]

//! Browser binding for Loupe.
//!
//! - [`WebDom`](dom::WebDom) implements the `Dom` seam over `web-sys`.
//! - [`WebEventHost`](host::WebEventHost) installs document listeners with
//!   `gloo`; dropping a scope's guard detaches them.
//! - [`WebClipboard`](host::WebClipboard) writes through `navigator.clipboard`.
//! - `LoupeWeb` is the `wasm-bindgen` export pages script against.
//!
//! On native targets only a stub and the host-independent [`table`] are
//! compiled, so the workspace checks and tests everywhere.

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod host;
pub mod table;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::LoupeWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct LoupeWeb;

#[cfg(not(target_arch = "wasm32"))]
impl LoupeWeb {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
