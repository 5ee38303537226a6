//! Baseline Segmentation Example
//!
//! This example loads a baseline segmentation model, segments one or more
//! page images and prints each result as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example segment -- [OPTIONS] --model-path <MODEL> <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-m, --model-path` - Path to the ONNX segmentation model
//! * `-t, --text-direction` - Principal text direction of the pages
//! * `-c, --config` - Optional JSON segmenter configuration
//! * `--mask` - Optional bitonal exclusion mask (single image only)
//! * `-o, --output-dir` - Directory to write JSON (and drawings with `visualization`)
//! * `<IMAGES>...` - Paths to input images to process
//!
//! # Example
//!
//! ```bash
//! cargo run --example segment -- -m blla.onnx -t horizontal-lr page1.png page2.png
//! ```

use clap::Parser;
use oar_blla::core::config::onnx::OrtExecutionProvider;
use oar_blla::domain::{SegmentationResult, TextDirection};
use oar_blla::pipeline::{BaselineSegmenter, SegmenterConfig};
use oar_blla::utils::{load_image, load_mask};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Command-line arguments for the segmentation example
#[derive(Parser)]
#[command(name = "segment")]
#[command(about = "Baseline Segmentation Example - finds text lines in page images")]
struct Args {
    /// Path to the segmentation model file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Paths to input images to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Principal text direction (horizontal-lr, horizontal-rl, vertical-lr, vertical-rl)
    #[arg(short, long, default_value = "horizontal-lr")]
    text_direction: String,

    /// JSON segmenter configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bitonal mask excluding page regions, applied to a single input image
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Directory to save results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Device to use for inference ('cpu' or 'cuda')
    #[arg(short, long, default_value = "cpu")]
    device: String,

    /// Session pool size for concurrent inference (default: 1)
    #[arg(long, default_value = "1")]
    session_pool_size: usize,
}

fn execution_providers(device: &str) -> Vec<OrtExecutionProvider> {
    match device.to_lowercase().as_str() {
        #[cfg(feature = "cuda")]
        "cuda" => vec![
            OrtExecutionProvider::CUDA {
                device_id: Some(0),
                gpu_mem_limit: None,
            },
            OrtExecutionProvider::CPU,
        ],
        "cpu" => vec![OrtExecutionProvider::CPU],
        other => {
            warn!("Device '{}' not available in this build. Using CPU.", other);
            vec![OrtExecutionProvider::CPU]
        }
    }
}

fn write_outputs(
    output_dir: &Path,
    image_path: &Path,
    result: &SegmentationResult,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    let json_path = output_dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, result.to_json_pretty()?)?;
    info!("Saved {}", json_path.display());

    #[cfg(feature = "visualization")]
    {
        let page = load_image(image_path)?;
        let drawing = oar_blla::utils::visualization::draw_segmentation(&page, result);
        let drawing_path = output_dir.join(format!("{stem}_lines.png"));
        drawing.save(&drawing_path)?;
        info!("Saved {}", drawing_path.display());
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    oar_blla::init_tracing();

    let args = Args::parse();
    info!("Baseline Segmentation Example");

    if !args.model_path.exists() {
        error!("Model file not found: {}", args.model_path.display());
        return Err("Model file not found".into());
    }
    let direction: TextDirection = args.text_direction.parse()?;

    let mut config = match &args.config {
        Some(path) => SegmenterConfig::from_file(path)?,
        None => SegmenterConfig::default(),
    };
    let mut session = config.inference.ort_session.clone().unwrap_or_default();
    session.execution_providers = Some(execution_providers(&args.device));
    config.inference = config
        .inference
        .with_session_pool_size(args.session_pool_size)
        .with_ort_session(session);

    let segmenter = BaselineSegmenter::load(&args.model_path, config)?;
    info!("Model: {}", segmenter.model().engine_info());

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mask = match &args.mask {
        Some(path) if args.images.len() == 1 => Some(load_mask(path)?),
        Some(_) => return Err("--mask needs exactly one input image".into()),
        None => None,
    };

    for image_path in &args.images {
        let page = match load_image(image_path) {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to load {}: {}", image_path.display(), e);
                continue;
            }
        };

        let start = Instant::now();
        let result = segmenter.segment(&page, direction, mask.as_ref())?;
        info!(
            "{}: {} lines in {:.2?}",
            image_path.display(),
            result.len(),
            start.elapsed()
        );

        match &args.output_dir {
            Some(dir) => write_outputs(dir, image_path, &result)?,
            None => println!("{}", result.to_json_pretty()?),
        }
    }

    Ok(())
}

