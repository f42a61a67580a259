#![forbid(unsafe_code)]

//! WASM host for pageflow.
//!
//! This crate provides [`SiteRunner`], a `wasm-bindgen`-exported struct that
//! scans the live page into a `PageLayout`, wraps
//! `pageflow_runtime::StepProgram<SiteModel>`, and applies the resulting
//! DOM patches and host effects with `web-sys`.
//!
//! The host loop is plain JavaScript: DOM listeners call `pushEvent` with
//! the canonical event JSON, then `step()` and `applyToDom()`. Each pump
//! first calls `setTime` with the elapsed page time; a single timeout is
//! re-armed from `nextTimerDelayMs`, and `frame()` runs from
//! `requestAnimationFrame` while `hasPendingFrame`.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::SiteRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
