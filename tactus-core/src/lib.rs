//! # Tactus Core
//!
//! WASM-compatible timing kernel for the tactus musical transport.
//! Provides tempo/meter configuration, musical position arithmetic, and the
//! lookahead step engine without any audio, thread, or wall-clock
//! dependencies.
//!
//! ## Features
//!
//! - **serde**: Enable JSON serialization for web interop
//! - **wasm**: Enable WASM bindings via wasm-bindgen

pub mod engine;
pub mod types;
pub mod wasm;

// Re-export commonly used types
pub use engine::{StepEngine, StepFiring, LOOKAHEAD_SECS};
pub use types::{SeekTarget, TempoConfig, TempoUpdate, TimePosition, TransportEvent};
