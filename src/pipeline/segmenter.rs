//! Page segmentation pipeline.
//!
//! Runs the stages of baseline segmentation in order:
//!
//! 1. validate the page and mask, resize and normalize the page
//! 2. run the network
//! 3. zero the raster where the mask excludes the page
//! 4. vectorize baselines
//! 5. estimate boundary polygons
//! 6. rescale from raster to image coordinates
//! 7. assign reading order
//!
//! Validation failures abort before inference. No stage returns partial
//! results.

use crate::core::config::{ConfigValidator, ConfigValidatorExt};
use crate::core::errors::SimpleError;
use crate::core::{CancellationToken, OCRError, OcrResult, ProcessingStage, ReadingOrder};
use crate::domain::{LineRecord, SegmentationResult, TextDirection};
use crate::models::SegmentationModel;
use crate::pipeline::SegmenterConfig;
use crate::processors::{BaselineVectorizer, BoundaryEstimator, Point, Scale2D, scale_lines};
use image::DynamicImage;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Segments one page with default post-processing settings.
///
/// `text_direction` must be one of `horizontal-lr`, `horizontal-rl`,
/// `vertical-lr` or `vertical-rl`. The mask, when given, must have the size of
/// `image` and contain at most two distinct values; zero marks regions where
/// no line may be found.
///
/// # Errors
///
/// * `OCRError::InvalidInput` for an unknown text direction, an empty image or
///   an invalid mask. These are raised before the model is called.
/// * Inference and tensor errors from the model.
///
/// # Example
///
/// ```rust,no_run
/// use oar_blla::core::config::ModelInferenceConfig;
/// use oar_blla::models::SegmentationModel;
/// use oar_blla::pipeline::segment;
/// use oar_blla::processors::PolygonalReadingOrder;
///
/// let model = SegmentationModel::load("blla.onnx", &ModelInferenceConfig::default())?;
/// let page = image::open("page.png")?;
/// let result = segment(&page, "horizontal-lr", None, &PolygonalReadingOrder, &model)?;
/// println!("{}", result.to_json_pretty()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn segment(
    image: &DynamicImage,
    text_direction: &str,
    mask: Option<&DynamicImage>,
    reading_order: &dyn ReadingOrder,
    model: &SegmentationModel,
) -> OcrResult<SegmentationResult> {
    let direction: TextDirection = text_direction.parse()?;
    let stages = Stages::new(model, &SegmenterConfig::default(), None);
    stages.run(image, direction, mask, reading_order)
}

/// The post-processing stages bound to one model and configuration.
struct Stages<'a> {
    model: &'a SegmentationModel,
    vectorizer: BaselineVectorizer,
    boundaries: BoundaryEstimator,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Stages<'a> {
    fn new(
        model: &'a SegmentationModel,
        config: &SegmenterConfig,
        cancel: Option<&'a CancellationToken>,
    ) -> Self {
        // channel roles declared by the model win over configured ones
        let channels = model.raster_channels().unwrap_or(config.channels);
        Self {
            model,
            vectorizer: BaselineVectorizer::new(config.vectorizer.clone(), channels),
            boundaries: BoundaryEstimator::new(config.boundary.clone()),
            cancel,
        }
    }

    fn checkpoint(&self, next: ProcessingStage) -> OcrResult<()> {
        match self.cancel {
            Some(token) => token.check(next),
            None => Ok(()),
        }
    }

    fn run(
        &self,
        image: &DynamicImage,
        direction: TextDirection,
        mask: Option<&DynamicImage>,
        reading_order: &dyn ReadingOrder,
    ) -> OcrResult<SegmentationResult> {
        info!(
            "segmenting {}x{} page ({}) with model '{}'",
            image.width(),
            image.height(),
            direction,
            self.model.name()
        );

        self.checkpoint(ProcessingStage::Preprocessing)?;
        let prepared = self.model.preprocessor().prepare(image, mask)?;

        self.checkpoint(ProcessingStage::Inference)?;
        let mut raster = self.model.infer(&prepared.tensor)?;
        debug!("raster output {:?}", raster.shape());
        prepared.apply_mask(&mut raster);
        let (_, _, raster_h, raster_w) = raster.dim();

        self.checkpoint(ProcessingStage::Vectorization)?;
        let baselines = self.vectorizer.vectorize(&raster)?;
        drop(raster);

        self.checkpoint(ProcessingStage::BoundaryEstimation)?;
        let boundaries = self.boundaries.estimate(&baselines, (raster_w, raster_h))?;
        if boundaries.len() != baselines.len() {
            return Err(OCRError::processing_error(
                ProcessingStage::BoundaryEstimation,
                "boundary count differs from baseline count",
                SimpleError::new(format!(
                    "{} baselines, {} boundaries",
                    baselines.len(),
                    boundaries.len()
                )),
            ));
        }
        let lines: Vec<LineRecord> = baselines
            .into_iter()
            .zip(boundaries)
            .map(|(baseline, boundary)| LineRecord::new(baseline, boundary))
            .collect();

        self.checkpoint(ProcessingStage::Rescaling)?;
        let scale = Scale2D::between(prepared.image_size, (raster_w, raster_h))?;
        debug!("rescaling {} lines by ({}, {})", lines.len(), scale.sx, scale.sy);
        let lines = scale_lines(lines, scale);

        self.checkpoint(ProcessingStage::ReadingOrder)?;
        let count = lines.len();
        let keys: Vec<LineKey> = lines.iter().map(LineKey::of).collect();
        let ordered = reading_order.order(lines, direction.reading_direction());
        if let Some(problem) = permutation_mismatch(keys, &ordered) {
            return Err(OCRError::processing_error(
                ProcessingStage::ReadingOrder,
                &format!("reading order policy '{}' is not a permutation", reading_order.name()),
                SimpleError::new(problem),
            ));
        }
        debug!("ordered {} lines with '{}'", count, reading_order.name());

        Ok(SegmentationResult::new(direction, ordered))
    }
}

/// Exact identity of a line: script plus the bit patterns of every coordinate.
#[derive(PartialEq, Eq, Hash)]
struct LineKey {
    script: String,
    baseline: Vec<(u32, u32)>,
    boundary: Vec<(u32, u32)>,
}

impl LineKey {
    fn of(line: &LineRecord) -> Self {
        Self {
            script: line.script.clone(),
            baseline: coordinate_bits(&line.baseline),
            boundary: coordinate_bits(&line.boundary),
        }
    }
}

fn coordinate_bits(points: &[Point]) -> Vec<(u32, u32)> {
    points.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect()
}

/// Describes how `ordered` fails to be a permutation of the lines behind
/// `input`, or `None` when every input line appears exactly once, unmodified.
fn permutation_mismatch(input: Vec<LineKey>, ordered: &[LineRecord]) -> Option<String> {
    if input.len() != ordered.len() {
        return Some(format!("{} lines in, {} lines out", input.len(), ordered.len()));
    }
    let mut pending: HashMap<LineKey, usize> = HashMap::with_capacity(input.len());
    for key in input {
        *pending.entry(key).or_default() += 1;
    }
    for (position, line) in ordered.iter().enumerate() {
        match pending.get_mut(&LineKey::of(line)) {
            Some(left) if *left > 0 => *left -= 1,
            _ => {
                return Some(format!(
                    "line {position} of the ordered output is altered or repeats another line"
                ));
            }
        }
    }
    None
}

/// A loaded model bundled with its post-processing settings.
///
/// The segmenter is `Send + Sync`; one instance can serve many threads.
///
/// ```rust,no_run
/// use oar_blla::domain::TextDirection;
/// use oar_blla::pipeline::{BaselineSegmenter, SegmenterConfig};
///
/// let segmenter = BaselineSegmenter::load("blla.onnx", SegmenterConfig::default())?;
/// let page = image::open("page.png")?;
/// let result = segmenter.segment(&page, TextDirection::HorizontalLr, None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BaselineSegmenter {
    model: SegmentationModel,
    config: SegmenterConfig,
    reading_order: Box<dyn ReadingOrder>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for BaselineSegmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineSegmenter")
            .field("model", &self.model.name())
            .field("config", &self.config)
            .field("reading_order", &self.reading_order.name())
            .finish()
    }
}

impl BaselineSegmenter {
    /// Wraps an already loaded model.
    pub fn new(model: SegmentationModel, config: SegmenterConfig) -> OcrResult<Self> {
        let config = config.validate_and_wrap_ocr_error()?;
        let reading_order = config.reading_order.build();
        Ok(Self {
            model,
            config,
            reading_order,
            cancel: CancellationToken::new(),
        })
    }

    /// Loads the model at `path` with `config.inference` and wraps it.
    pub fn load(path: impl AsRef<Path>, config: SegmenterConfig) -> OcrResult<Self> {
        config.validate()?;
        let model = SegmentationModel::load(path, &config.inference)?;
        Self::new(model, config)
    }

    /// Replaces the configured reading order policy.
    pub fn with_reading_order(mut self, policy: impl ReadingOrder + 'static) -> Self {
        self.reading_order = Box::new(policy);
        self
    }

    /// Uses `token` for cancellation instead of the segmenter's own.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels in-flight and future calls on this segmenter.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The wrapped model.
    pub fn model(&self) -> &SegmentationModel {
        &self.model
    }

    /// Active configuration.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segments one page.
    pub fn segment(
        &self,
        image: &DynamicImage,
        direction: TextDirection,
        mask: Option<&DynamicImage>,
    ) -> OcrResult<SegmentationResult> {
        Stages::new(&self.model, &self.config, Some(&self.cancel)).run(
            image,
            direction,
            mask,
            self.reading_order.as_ref(),
        )
    }

    /// Segments independent pages in parallel.
    ///
    /// Results are returned in input order; one failing page does not affect
    /// the others.
    pub fn segment_batch(
        &self,
        images: &[DynamicImage],
        direction: TextDirection,
    ) -> Vec<OcrResult<SegmentationResult>> {
        info!("segmenting batch of {} pages", images.len());
        images
            .par_iter()
            .map(|image| self.segment(image, direction, None))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn line(y: f32) -> LineRecord {
        LineRecord::new(
            vec![Point::new(0.0, y), Point::new(10.0, y)],
            vec![Point::new(0.0, y - 5.0), Point::new(10.0, y - 5.0), Point::new(10.0, y + 1.0)],
        )
    }

    fn keys(lines: &[LineRecord]) -> Vec<LineKey> {
        lines.iter().map(LineKey::of).collect()
    }

    #[test]
    fn test_reordering_is_a_permutation() {
        let input = vec![line(1.0), line(2.0), line(3.0)];
        let ordered = vec![line(3.0), line(1.0), line(2.0)];
        assert!(permutation_mismatch(keys(&input), &ordered).is_none());
    }

    #[test]
    fn test_repeated_line_is_rejected() {
        let input = vec![line(1.0), line(2.0), line(3.0)];
        let ordered = vec![line(1.0), line(2.0), line(1.0)];
        let problem = permutation_mismatch(keys(&input), &ordered).unwrap();
        assert!(problem.contains("line 2"), "{problem}");
    }

    #[test]
    fn test_identical_lines_count_separately() {
        let input = vec![line(1.0), line(1.0)];
        assert!(permutation_mismatch(keys(&input), &[line(1.0), line(1.0)]).is_none());
        assert!(permutation_mismatch(keys(&input), &[line(1.0), line(2.0)]).is_some());
    }

    #[test]
    fn test_altered_line_is_rejected() {
        let input = vec![line(1.0), line(2.0)];
        let mut moved = line(2.0);
        moved.boundary[0].x += 0.5;
        assert!(permutation_mismatch(keys(&input), &[line(1.0), moved]).is_some());

        let mut retagged = line(2.0);
        retagged.script = "latin".to_string();
        assert!(permutation_mismatch(keys(&input), &[retagged, line(1.0)]).is_some());
    }

    #[test]
    fn test_dropped_line_reports_counts() {
        let input = vec![line(1.0), line(2.0)];
        let problem = permutation_mismatch(keys(&input), &[line(1.0)]).unwrap();
        assert_eq!(problem, "2 lines in, 1 lines out");
    }
}
