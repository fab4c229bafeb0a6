//! Mock decoder implementations for testing and development.
//!
//! This module provides a simulated decoder that can be controlled
//! programmatically without a camera.

pub mod decoder;

pub use decoder::{MockDecoder, MockDecoderHandle};
