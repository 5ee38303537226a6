//! Tensor aliases shared by the preprocessing, inference, and vectorization stages.

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
///
/// Network inputs and raster outputs both use the `batch × channels × height × width` layout.
pub type Tensor4D = ndarray::Array4<f32>;
