//! Command-line interface for outpainting and describing images

use crate::algorithm::executor::{Collaborators, OutpaintConfig, Outpainter};
use crate::io::configuration::{
    DEFAULT_DESCRIPTION_MODEL, DEFAULT_DETECTION_MODEL, HF_API_KEY_VAR, OPENAI_API_KEY_VAR,
    TileSize,
};
use crate::io::error::{OutpaintError, Result, Stage, collaborator_error, invalid_parameter};
use crate::io::image::{default_output_path, load_rgba};
use crate::io::logging::init_logging;
use crate::io::progress::TileProgress;
use crate::services::huggingface::HuggingFaceClient;
use crate::services::openai::OpenAiClient;
use crate::services::{FocusDetector, SceneDescriber, SubjectDetector};
use crate::spatial::geometry::{Dimensions, Rect};
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "outpainter")]
#[command(
    author,
    version,
    about = "Extend images beyond their borders with a generative inpainting service"
)]
/// Command-line arguments for the outpainting tool
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations
#[derive(Subcommand)]
pub enum Command {
    /// Outpaint an image to a larger canvas
    Outpaint(OutpaintArgs),
    /// Print a generated description of an image
    Describe(DescribeArgs),
}

/// Arguments of the `outpaint` command
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
#[derive(Args)]
pub struct OutpaintArgs {
    /// Input image
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Output PNG path (defaults to <stem>_outpainted-<W>x<H>.png beside the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output width in pixels
    #[arg(short = 'W', long)]
    pub width: u32,

    /// Output height in pixels
    #[arg(short = 'H', long)]
    pub height: u32,

    /// Prompt guiding generation (described from the image if omitted)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Prompt for tiles without subjects (rewritten from the prompt if omitted)
    #[arg(short, long)]
    pub fallback: Option<String>,

    /// Tile side length: 256, 512 or 1024
    #[arg(short = 's', long, default_value_t = TileSize::default().pixels())]
    pub tile_size: u32,

    /// Distance between tiles in pixels (defaults to half the tile size)
    #[arg(long)]
    pub step: Option<u32>,

    /// Detect people to pick the focal point and per-tile prompts
    #[arg(long)]
    pub subjects: bool,

    /// Log debug details and save a snapshot after every tile
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Inpainting service key
    #[arg(long, env = OPENAI_API_KEY_VAR, hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Inference service token for description and detection
    #[arg(long, env = HF_API_KEY_VAR, hide_env_values = true)]
    pub hf_api_key: Option<String>,

    /// Captioning model
    #[arg(long, default_value = DEFAULT_DESCRIPTION_MODEL)]
    pub description_model: String,

    /// Object detection model
    #[arg(long, default_value = DEFAULT_DETECTION_MODEL)]
    pub detection_model: String,
}

impl OutpaintArgs {
    /// Output path, falling back to the default name beside the input
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            default_output_path(&self.image, Dimensions::new(self.width, self.height))
        })
    }

    /// Whether a description or detection service will be called
    pub fn needs_inference(&self) -> bool {
        self.subjects || self.prompt.as_deref().is_none_or(|p| p.trim().is_empty())
    }

    /// Build the run configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the tile size is unsupported or the step is zero
    pub fn to_config(&self) -> Result<OutpaintConfig> {
        let tile_size = TileSize::try_from(self.tile_size)?;
        let step = self.step.unwrap_or_else(|| tile_size.default_step());
        if step == 0 {
            return Err(invalid_parameter("step", &step, &"must be positive"));
        }

        Ok(OutpaintConfig {
            output_path: self.output_path(),
            canvas: Dimensions::new(self.width, self.height),
            tile_size,
            step,
            subject_aware: self.subjects,
            snapshots: self.verbose,
            prompt: self.prompt.clone(),
            fallback: self.fallback.clone(),
        })
    }
}

/// Arguments of the `describe` command
#[derive(Args)]
pub struct DescribeArgs {
    /// Input image
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Inference service token
    #[arg(long, env = HF_API_KEY_VAR, hide_env_values = true)]
    pub hf_api_key: Option<String>,

    /// Captioning model
    #[arg(long, default_value = DEFAULT_DESCRIPTION_MODEL)]
    pub description_model: String,

    /// Log debug details
    #[arg(short, long)]
    pub verbose: bool,
}

/// Stand-in for a service that was not configured for this run
///
/// Only reachable when configuration and collaborator wiring disagree, so
/// every call fails with a collaborator error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl FocusDetector for Unconfigured {
    fn detect_focus(&self, _image: &RgbaImage) -> Result<Option<Rect>> {
        Err(collaborator_error(Stage::FocusDetection, &"no detection service configured"))
    }
}

impl SubjectDetector for Unconfigured {
    fn detect_subjects(&self, _image: &RgbaImage) -> Result<Vec<Rect>> {
        Err(collaborator_error(Stage::SubjectDetection, &"no detection service configured"))
    }
}

impl SceneDescriber for Unconfigured {
    fn describe(&self, _image: &RgbaImage) -> Result<String> {
        Err(collaborator_error(Stage::Description, &"no description service configured"))
    }
}

/// Resolve a credential, rejecting blanks
///
/// # Errors
///
/// Returns an error if the key is absent or blank
pub fn require_credential(key: Option<&str>, variable: &'static str) -> Result<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or(OutpaintError::MissingCredential { variable })
}

/// Dispatches parsed CLI commands
pub struct CommandRunner {
    cli: Cli,
}

impl CommandRunner {
    /// Create a runner for the parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Execute the selected command
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input loading, any service call
    /// or output writing fails
    pub fn process(&self) -> Result<()> {
        match &self.cli.command {
            Command::Outpaint(args) => {
                init_logging(args.verbose);
                Self::outpaint(args)
            }
            Command::Describe(args) => {
                init_logging(args.verbose);
                Self::describe(args)
            }
        }
    }

    // Reporting the result path on stdout is the command's output
    #[allow(clippy::print_stdout)]
    fn outpaint(args: &OutpaintArgs) -> Result<()> {
        let config = args.to_config()?;
        let openai_key = require_credential(args.openai_api_key.as_deref(), OPENAI_API_KEY_VAR)?;
        let openai = OpenAiClient::new(openai_key)?;
        let inference = if args.needs_inference() {
            let hf_key = require_credential(args.hf_api_key.as_deref(), HF_API_KEY_VAR)?;
            Some(
                HuggingFaceClient::new(hf_key)?
                    .with_description_model(args.description_model.clone())
                    .with_detection_model(args.detection_model.clone()),
            )
        } else {
            None
        };

        let source = load_rgba(&args.image)?;
        let unconfigured = Unconfigured;
        let services = match &inference {
            Some(client) => Collaborators {
                focus: client,
                subjects: client,
                describer: client,
                rewriter: &openai,
                generator: &openai,
            },
            None => Collaborators {
                focus: &unconfigured,
                subjects: &unconfigured,
                describer: &unconfigured,
                rewriter: &openai,
                generator: &openai,
            },
        };

        let cancel = Arc::new(AtomicBool::new(false));
        if let Err(error) =
            signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&cancel))
        {
            warn!(%error, "Could not install the interrupt handler");
        }

        let progress = if args.quiet {
            TileProgress::hidden(0)
        } else {
            TileProgress::new(0)
        };
        let output_path = config.output_path.clone();
        let mut outpainter = Outpainter::new(source, config, services)?
            .with_progress(progress)
            .with_cancel_flag(cancel);

        match outpainter.run() {
            Ok(report) => {
                info!(
                    planned = report.planned,
                    generated = report.generated,
                    skipped = report.skipped,
                    "Outpainting complete"
                );
                println!("{}", output_path.display());
                Ok(())
            }
            Err(error @ OutpaintError::Cancelled { .. }) => {
                Self::save_partial(&outpainter, &output_path);
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    fn save_partial(outpainter: &Outpainter<'_>, output_path: &Path) {
        match outpainter.save_canvas(output_path) {
            Ok(()) => warn!(path = %output_path.display(), "Saved partial canvas"),
            Err(error) => warn!(%error, "Could not save partial canvas"),
        }
    }

    // Printing the description on stdout is the command's output
    #[allow(clippy::print_stdout)]
    fn describe(args: &DescribeArgs) -> Result<()> {
        let hf_key = require_credential(args.hf_api_key.as_deref(), HF_API_KEY_VAR)?;
        let client =
            HuggingFaceClient::new(hf_key)?.with_description_model(args.description_model.clone());
        let image = load_rgba(&args.image)?;
        let description = client.describe(&image)?;
        println!("{description}");
        Ok(())
    }
}
