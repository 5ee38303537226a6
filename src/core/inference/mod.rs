//! Structures and helpers for ONNX Runtime inference.
//!
//! [`OrtInfer`] owns a small pool of ONNX Runtime sessions for one model file
//! and implements the [`InferenceEngine`](crate::core::traits::InferenceEngine)
//! trait used by the segmentation pipeline.

pub mod ort_infer;

pub use ort_infer::OrtInfer;
