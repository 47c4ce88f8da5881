use crate::{
    algorithm::canvas::Canvas,
    algorithm::prompts::PromptSet,
    io::configuration::TileSize,
    io::error::{OutpaintError, Result, Stage, WithContext, invalid_parameter, invariant_violation},
    io::image::{encode_png, save_png, snapshot_path, timestamp},
    io::progress::TileProgress,
    services::{FocusDetector, PromptRewriter, SceneDescriber, SubjectDetector, TileGenerator},
    spatial::geometry::{Dimensions, Expansion, Point, Rect, compute_expansion, initial_tile_origin},
    spatial::plan::{TilePlan, build_plan},
    spatial::regions::{is_covered_by_original, overlaps_any, placement_rect, to_canvas_space},
};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Run parameters controlling canvas size, tiling and prompting
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutpaintConfig {
    /// Where the finished canvas is written
    pub output_path: PathBuf,
    /// Output canvas size
    pub canvas: Dimensions,
    /// Side length of each generated tile
    pub tile_size: TileSize,
    /// Distance between neighbouring tile origins along a ray
    pub step: u32,
    /// Detect subjects for the focal point and per-tile prompt choice
    pub subject_aware: bool,
    /// Write a timestamped snapshot after every generated tile
    pub snapshots: bool,
    /// Primary prompt; described from the image when absent
    pub prompt: Option<String>,
    /// Fallback prompt; rewritten from the primary when absent
    pub fallback: Option<String>,
}

impl OutpaintConfig {
    /// Defaults for everything but the output location and size
    pub fn new(output_path: impl Into<PathBuf>, canvas: Dimensions) -> Self {
        let tile_size = TileSize::default();
        Self {
            output_path: output_path.into(),
            canvas,
            tile_size,
            step: tile_size.default_step(),
            subject_aware: false,
            snapshots: false,
            prompt: None,
            fallback: None,
        }
    }

    /// Check the configuration against the input image size
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The step is zero
    /// - The canvas has a zero dimension
    /// - The canvas is smaller than the input on either axis
    pub fn validate(&self, input: Dimensions) -> Result<()> {
        if self.step == 0 {
            return Err(invalid_parameter("step", &self.step, &"must be positive"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid_parameter(
                "canvas",
                &format!("{}x{}", self.canvas.width, self.canvas.height),
                &"output dimensions must be positive",
            ));
        }
        if self.canvas.width < input.width {
            return Err(invalid_parameter(
                "width",
                &self.canvas.width,
                &format!("must be at least the input width {}", input.width),
            ));
        }
        if self.canvas.height < input.height {
            return Err(invalid_parameter(
                "height",
                &self.canvas.height,
                &format!("must be at least the input height {}", input.height),
            ));
        }
        Ok(())
    }
}

/// External services a run depends on
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Primary subject locator for the focal point
    pub focus: &'a dyn FocusDetector,
    /// Subject locator for prompt selection
    pub subjects: &'a dyn SubjectDetector,
    /// Captioner used when no primary prompt is configured
    pub describer: &'a dyn SceneDescriber,
    /// Fallback prompt rewriter
    pub rewriter: &'a dyn PromptRewriter,
    /// Tile generator
    pub generator: &'a dyn TileGenerator,
}

/// Lifecycle of an outpainting run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Configuration validated, nothing allocated
    Configured,
    /// Transparent canvas allocated
    CanvasReady,
    /// Focal point and expansion known, original pasted
    FocalResolved,
    /// Prompts, subjects and tile plan known
    Planned,
    /// Tiles being generated
    Running,
    /// Final canvas written
    Done,
    /// Stopped between tiles on request
    Cancelled,
    /// A collaborator or I/O failure ended the run
    Failed,
}

impl RunState {
    /// Lowercase name used in logs and errors
    pub const fn label(self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::CanvasReady => "canvas ready",
            Self::FocalResolved => "focal resolved",
            Self::Planned => "planned",
            Self::Running => "running",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// Everything derived before the tile loop starts
///
/// Immutable once built; the tile loop reads it alongside the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Pixel of the original the expansion is centered on
    pub focal: Point,
    /// Padding around the original
    pub expansion: Expansion,
    /// Canvas rectangle covered by the original
    pub placement: Rect,
    /// Subject boxes in canvas coordinates
    pub subjects: Vec<Rect>,
    /// Prompts for subject and background tiles
    pub prompts: PromptSet,
    /// Ordered tile plan
    pub plan: TilePlan,
}

/// Tile counts of a finished tile loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Tiles in the plan
    pub planned: usize,
    /// Tiles sent to the generator and pasted
    pub generated: usize,
    /// Tiles lying entirely over the original
    pub skipped: usize,
}

/// Drives a single outpainting run over one owned canvas
///
/// Tiles are processed strictly in plan order because each crop reads
/// pixels written by the tiles before it.
pub struct Outpainter<'a> {
    config: OutpaintConfig,
    source: RgbaImage,
    services: Collaborators<'a>,
    state: RunState,
    canvas: Option<Canvas>,
    progress: Option<TileProgress>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Outpainter<'a> {
    /// Validate `config` against `source` and set up a run
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for this image
    pub fn new(
        source: RgbaImage,
        config: OutpaintConfig,
        services: Collaborators<'a>,
    ) -> Result<Self> {
        config.validate(Dimensions::new(source.width(), source.height()))?;
        info!(
            canvas = %format!("{}x{}", config.canvas.width, config.canvas.height),
            tile = %config.tile_size,
            step = config.step,
            subject_aware = config.subject_aware,
            "Configured outpainting run"
        );
        Ok(Self {
            config,
            source,
            services,
            state: RunState::Configured,
            canvas: None,
            progress: None,
            cancel: None,
        })
    }

    /// Report per-tile progress through `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: TileProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stop between tiles once `flag` is set
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Current lifecycle state
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Run configuration
    pub const fn config(&self) -> &OutpaintConfig {
        &self.config
    }

    /// Canvas in its current state, once allocated
    pub const fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    fn input_dimensions(&self) -> Dimensions {
        Dimensions::new(self.source.width(), self.source.height())
    }

    fn expect_state(&self, expected: RunState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(invariant_violation(
                operation,
                &format!(
                    "run is {}, expected {}",
                    self.state.label(),
                    expected.label()
                ),
            ))
        }
    }

    /// Prepare the canvas, focal point, prompts and tile plan
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The run was already prepared
    /// - Focus detection, subject detection or description fails
    /// - The tile plan cannot be built
    pub fn prepare(&mut self) -> Result<RunContext> {
        self.expect_state(RunState::Configured, "prepare")?;
        let result = self.prepare_stages();
        if result.is_err() {
            self.state = RunState::Failed;
        }
        result
    }

    fn prepare_stages(&mut self) -> Result<RunContext> {
        let input = self.input_dimensions();
        let mut canvas = Canvas::new(self.config.canvas);
        self.state = RunState::CanvasReady;

        let focal = self.resolve_focal()?;
        let expansion = compute_expansion(focal, input, self.config.canvas);
        canvas.paste(&self.source, expansion.origin());
        self.canvas = Some(canvas);
        self.state = RunState::FocalResolved;
        info!(?focal, ?expansion, "Resolved focal point");

        let primary = match self.config.prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => prompt.to_string(),
            _ => self.services.describer.describe(&self.source)?,
        };

        let subjects = if self.config.subject_aware {
            let local = self.services.subjects.detect_subjects(&self.source)?;
            to_canvas_space(&local, expansion)
        } else {
            Vec::new()
        };

        let prompts = PromptSet::resolve(
            primary,
            self.config.fallback.as_deref(),
            !subjects.is_empty(),
            self.services.rewriter,
        );
        info!(primary = %prompts.primary, fallback = %prompts.fallback, "Prompts");

        let square = self.config.tile_size.pixels();
        let initial = initial_tile_origin(expansion, square, input);
        let plan = build_plan(initial, square, self.config.step, self.config.canvas)?;
        self.state = RunState::Planned;
        info!(tiles = plan.len(), ?initial, "Planned tiles");

        Ok(RunContext {
            focal,
            expansion,
            placement: placement_rect(expansion, input),
            subjects,
            prompts,
            plan,
        })
    }

    fn resolve_focal(&self) -> Result<Point> {
        let center = self.input_dimensions().center();
        if !self.config.subject_aware {
            return Ok(center);
        }
        let focus = self.services.focus.detect_focus(&self.source)?;
        Ok(focus.map_or(center, |rect| rect.center()))
    }

    /// Generate every planned tile in visit order
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The run has not been prepared
    /// - The cancellation flag is raised between tiles
    /// - Tile encoding, generation or snapshotting fails
    pub fn execute(&mut self, context: &RunContext) -> Result<RunReport> {
        self.expect_state(RunState::Planned, "execute")?;
        self.state = RunState::Running;

        let result = self.visit_tiles(context);
        match &result {
            Ok(_) => {
                if let Some(progress) = &self.progress {
                    progress.finish();
                }
            }
            Err(error) => {
                self.state = if matches!(error, OutpaintError::Cancelled { .. }) {
                    RunState::Cancelled
                } else {
                    RunState::Failed
                };
                if let Some(progress) = &self.progress {
                    progress.abandon();
                }
            }
        }
        result
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn visit_tiles(&mut self, context: &RunContext) -> Result<RunReport> {
        let square = self.config.tile_size.pixels();
        let visit_order = context.plan.visit_order();
        let mut report = RunReport {
            planned: visit_order.len(),
            ..RunReport::default()
        };
        if let Some(progress) = &self.progress {
            progress.reset(report.planned);
        }

        for (index, origin) in visit_order.into_iter().enumerate() {
            if self.cancel_requested() {
                return Err(OutpaintError::Cancelled {
                    completed: index,
                    total: report.planned,
                });
            }

            let tile = Rect::tile(origin, square);
            if is_covered_by_original(&tile, &context.placement) {
                debug!(x = origin.x, y = origin.y, "Tile inside original, skipping");
                report.skipped += 1;
            } else {
                self.generate_tile(context, origin, tile)?;
                report.generated += 1;
                if self.config.snapshots {
                    self.snapshot(index)?;
                }
            }

            if let Some(progress) = &self.progress {
                progress.tick();
            }
        }

        info!(
            generated = report.generated,
            skipped = report.skipped,
            "Tile loop finished"
        );
        Ok(report)
    }

    fn generate_tile(&mut self, context: &RunContext, origin: Point, tile: Rect) -> Result<()> {
        let tile_size = self.config.tile_size;
        let generator = self.services.generator;
        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| invariant_violation("generate_tile", &"canvas not allocated"))?;

        let crop = canvas.crop(tile);
        let png = encode_png(&crop)?;
        let overlaps_subject = overlaps_any(&tile, &context.subjects);
        let prompt = context.prompts.select(overlaps_subject);
        info!(
            x0 = tile.x0,
            y0 = tile.y0,
            x1 = tile.x1,
            y1 = tile.y1,
            subject = overlaps_subject,
            prompt,
            "Inpainting tile"
        );

        let generated = generator
            .generate_tile(&png, prompt, tile_size)
            .at_tile(origin)?;
        let side = tile_size.pixels();
        if generated.width() != side || generated.height() != side {
            return Err(OutpaintError::Collaborator {
                stage: Stage::TileGeneration,
                tile: Some(origin),
                reason: format!(
                    "expected a {tile_size} tile, got {}x{}",
                    generated.width(),
                    generated.height()
                ),
            });
        }

        canvas.paste(&generated, origin);
        Ok(())
    }

    /// Write the current canvas to a timestamped file beside the output
    ///
    /// `tile` is the index of the tile just completed in the visit order.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no canvas yet or the file cannot be written
    pub fn snapshot(&self, tile: usize) -> Result<PathBuf> {
        let path = snapshot_path(&self.config.output_path, &timestamp(), tile);
        self.save_canvas(&path)?;
        info!(path = %path.display(), "Saved snapshot");
        Ok(path)
    }

    /// Write the canvas as it currently is to `path`
    ///
    /// Usable in any state once the canvas exists, including after a
    /// failure or cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no canvas yet or the file cannot be written
    pub fn save_canvas(&self, path: &Path) -> Result<()> {
        let canvas = self.canvas.as_ref().ok_or_else(|| {
            invariant_violation("save_canvas", &format!("no canvas while {}", self.state.label()))
        })?;
        save_png(canvas.image(), path)
    }

    /// Persist the finished canvas to the configured output path
    ///
    /// # Errors
    ///
    /// Returns an error if the tile loop has not completed or the file
    /// cannot be written
    pub fn finish(&mut self) -> Result<PathBuf> {
        self.expect_state(RunState::Running, "finish")?;
        let path = self.config.output_path.clone();
        if let Err(error) = self.save_canvas(&path) {
            self.state = RunState::Failed;
            return Err(error);
        }
        self.state = RunState::Done;
        info!(path = %path.display(), "Output image saved");
        Ok(path)
    }

    /// Prepare, generate every tile and write the output
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage; see [`Self::prepare`],
    /// [`Self::execute`] and [`Self::finish`]
    pub fn run(&mut self) -> Result<RunReport> {
        let context = self.prepare()?;
        let report = self.execute(&context)?;
        self.finish()?;
        Ok(report)
    }
}
