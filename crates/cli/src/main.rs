use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use facealign_core::alignment::domain::alignment_config::{AlignmentConfig, DetectorKwargs};
use facealign_core::alignment::domain::detector_context::DetectorContext;
use facealign_core::alignment::domain::detector_factory::DetectorFactory;
use facealign_core::alignment::domain::landmarks_type::Dimension;
use facealign_core::alignment::infrastructure::onnx_alignment_library::OnnxAlignmentLibrary;

/// Build a facial landmark detector and report what was loaded.
#[derive(Parser)]
#[command(name = "facealign")]
struct Cli {
    /// JSON config file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark dimensionality: 2D, 2.5D or 3D (default 3D without a config file).
    #[arg(long)]
    dimension: Option<Dimension>,

    /// Compute device: cpu, cuda, cuda:N, coreml, directml.
    #[arg(long)]
    device: Option<String>,

    /// Also run mirrored inputs and average the predictions.
    #[arg(long)]
    flip: bool,

    /// Face detector backend: sfd or blazeface.
    #[arg(long)]
    face_detector: Option<String>,

    /// Face detector options as a JSON object, e.g. '{"filter_threshold": 0.8}'.
    /// Defaults to {"filter_threshold": 0.8} when --face-detector is not given.
    #[arg(long)]
    detector_kwargs: Option<String>,

    /// Directory with pre-packaged model files.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Base URL to download missing models from.
    #[arg(long)]
    model_url: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(cli)?;

    let library = OnnxAlignmentLibrary::new().with_progress(Arc::new(report_download));
    let context = DetectorContext::new(DetectorFactory::new(library));
    context.construct_global(&config)?;
    let detector = context
        .current()
        .ok_or("detector was not stored after construction")?;

    log::info!("Landmark mode: {}", detector.landmarks_type());
    log::info!("Device: {}", detector.device());
    log::info!("Flip input: {}", detector.flip_input());
    log::info!("Face detector: {}", detector.backend());
    log::info!(
        "Sessions: detector {} inputs, landmarks {} inputs, depth {}",
        detector.face_detector_session().inputs().len(),
        detector.landmark_session().inputs().len(),
        detector
            .depth_session()
            .map_or("none".to_string(), |s| format!("{} inputs", s.inputs().len()))
    );
    println!(
        "{} landmark detector ready on {}",
        detector.landmarks_type(),
        detector.device()
    );
    Ok(())
}

fn report_download(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        eprint!("\rDownloading {name}: {}%", downloaded * 100 / total);
        if downloaded >= total {
            eprintln!();
        }
    }
}

fn build_config(cli: Cli) -> Result<AlignmentConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config {
        Some(ref path) => AlignmentConfig::load(path)?,
        None => AlignmentConfig::new(Dimension::ThreeD),
    };

    if let Some(dimension) = cli.dimension {
        config.dimension = dimension;
    }
    if let Some(device) = cli.device {
        config.device = device;
    }
    if cli.flip {
        config.flip_input = true;
    }
    if let Some(name) = cli.face_detector {
        let kwargs = match cli.detector_kwargs {
            Some(ref json) => parse_kwargs(json)?,
            None => DetectorKwargs::new(),
        };
        config = config.with_face_detector(name, kwargs);
    } else if let Some(ref json) = cli.detector_kwargs {
        config.face_detector_kwargs = parse_kwargs(json)?;
    }
    if let Some(dir) = cli.models_dir {
        config.models.bundled_dir = Some(dir);
    }
    if let Some(url) = cli.model_url {
        config.models.base_url = Some(url);
    }

    Ok(config)
}

fn parse_kwargs(json: &str) -> Result<DetectorKwargs, Box<dyn std::error::Error>> {
    serde_json::from_str(json).map_err(|e| format!("--detector-kwargs: {e}").into())
}
