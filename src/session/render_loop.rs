use std::sync::{Arc, mpsc};

use anyhow::Context as _;

use crate::assets::{FsImageLoader, ImageLoader, ImageSource};
use crate::config::{EffectConfig, HoverBehavior};
use crate::effects::scatter::{ScatterOverlay, ScatterStats};
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::{FrameCounter, PointerState};
use crate::foundation::error::{SkyError, SkyResult};
use crate::pipeline::EffectPipeline;
use crate::render::surface::{Surface, SurfaceStatus};
use crate::session::scheduler::{FrameHandle, FrameScheduler, ManualScheduler};

/// Lifecycle of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No source assigned yet.
    Uninitialized,
    /// A load is in flight.
    Loading,
    /// Rendering every tick. Also the state after a failed load, with no base image.
    Ready,
    /// Hover freeze: the last output is re-presented and the counter does not move.
    Paused,
    /// Terminal.
    Destroyed,
}

/// Identifies one image load; only the most recent ticket is honored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadFailureKind {
    Decode,
    PixelRead,
    Other,
}

/// Why the current image could not be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: LoadFailureKind,
    pub message: String,
}

impl From<&SkyError> for LoadFailure {
    fn from(err: &SkyError) -> Self {
        let kind = match err {
            SkyError::Decode(_) => LoadFailureKind::Decode,
            SkyError::PixelRead(_) => LoadFailureKind::PixelRead,
            _ => LoadFailureKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks that ran the pipeline.
    pub rendered: u64,
    /// Ticks that re-presented the frozen frame.
    pub frozen: u64,
    /// Ticks with nothing to draw.
    pub idle: u64,
    /// Ticks where the surface refused the frame.
    pub present_failures: u64,
    /// Totals over all scatter passes.
    pub scatter: ScatterStats,
}

struct InFlightLoad {
    ticket: LoadTicket,
    rx: mpsc::Receiver<SkyResult<PixelBuffer>>,
}

/// Frame-state machine: owns the base image, the pointer, the frame counter and the single
/// pending tick, and turns each tick into a presented frame.
///
/// Single-threaded. The only background work is image decoding started by
/// [`RenderLoop::set_source`], whose result is picked up on a later tick.
pub struct RenderLoop<S: Surface, K: FrameScheduler = ManualScheduler> {
    state: LoopState,
    config: EffectConfig,
    pipeline: EffectPipeline,
    scatter: ScatterOverlay,
    loader: Arc<dyn ImageLoader>,
    surface: S,
    scheduler: K,
    pending_frame: Option<FrameHandle>,

    base: Option<PixelBuffer>,
    last_output: Option<PixelBuffer>,
    pointer: PointerState,
    counter: FrameCounter,

    next_ticket: u64,
    current_ticket: Option<LoadTicket>,
    inflight: Option<InFlightLoad>,
    load_error: Option<LoadFailure>,
    stats: LoopStats,
}

impl<S: Surface, K: FrameScheduler> RenderLoop<S, K> {
    /// Create a loop and schedule its first tick.
    pub fn new(surface: S, scheduler: K, config: EffectConfig) -> SkyResult<Self> {
        config.validate()?;
        let mut this = Self {
            state: LoopState::Uninitialized,
            config,
            pipeline: EffectPipeline::cpu(),
            scatter: ScatterOverlay::from_os_rng(),
            loader: Arc::new(FsImageLoader::default()),
            surface,
            scheduler,
            pending_frame: None,
            base: None,
            last_output: None,
            pointer: PointerState::default(),
            counter: FrameCounter::new(),
            next_ticket: 0,
            current_ticket: None,
            inflight: None,
            load_error: None,
            stats: LoopStats::default(),
        };
        this.pending_frame = Some(this.scheduler.request_frame());
        Ok(this)
    }

    pub fn with_pipeline(mut self, pipeline: EffectPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_scatter(mut self, scatter: ScatterOverlay) -> Self {
        self.scatter = scatter;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Frames rendered since the current image loaded.
    pub fn frame_counter(&self) -> u64 {
        self.counter.value()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn base(&self) -> Option<&PixelBuffer> {
        self.base.as_ref()
    }

    /// The most recent pipeline output, which is what a paused loop shows.
    pub fn last_output(&self) -> Option<&PixelBuffer> {
        self.last_output.as_ref()
    }

    /// Failure of the most recent load, if it failed.
    pub fn load_error(&self) -> Option<&LoadFailure> {
        self.load_error.as_ref()
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn pipeline(&self) -> &EffectPipeline {
        &self.pipeline
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }

    /// Start loading `source` on a worker thread. Any earlier load is superseded.
    pub fn set_source(&mut self, source: ImageSource) -> SkyResult<LoadTicket> {
        let ticket = self.begin_load()?;
        let (tx, rx) = mpsc::channel();
        let loader = Arc::clone(&self.loader);
        tracing::debug!(source = %source.describe(), "loading image");
        let spawned = std::thread::Builder::new()
            .name("skyfx-loader".to_string())
            .spawn(move || {
                if tx.send(loader.load(&source)).is_err() {
                    tracing::trace!("image load finished after being superseded");
                }
            })
            .context("spawn image loader thread");
        match spawned {
            Ok(_) => self.inflight = Some(InFlightLoad { ticket, rx }),
            Err(e) => {
                self.finish_load(ticket, Err(e.into()));
            }
        }
        Ok(ticket)
    }

    /// Enter `Loading` for a load the caller performs itself; complete it with
    /// [`RenderLoop::finish_load`].
    pub fn begin_load(&mut self) -> SkyResult<LoadTicket> {
        if self.state == LoopState::Destroyed {
            return Err(SkyError::validation("render loop was torn down"));
        }
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.current_ticket = Some(ticket);
        self.inflight = None;
        self.state = LoopState::Loading;
        self.surface.show_status(SurfaceStatus::Loading);
        Ok(ticket)
    }

    /// Apply the outcome of a load. Returns `false` when `ticket` is stale and the outcome was
    /// dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: SkyResult<PixelBuffer>) -> bool {
        if self.state == LoopState::Destroyed || self.current_ticket != Some(ticket) {
            tracing::debug!(?ticket, "ignoring stale image load");
            return false;
        }
        self.current_ticket = None;
        self.inflight = None;
        self.last_output = None;
        self.counter.reset();

        let loaded = result.and_then(|buf| {
            self.surface.resize(buf.width(), buf.height())?;
            Ok(buf)
        });
        match loaded {
            Ok(buf) => {
                tracing::info!(width = buf.width(), height = buf.height(), "image loaded");
                self.pointer = PointerState::clamped(
                    self.pointer.active,
                    self.pointer.x,
                    self.pointer.y,
                    buf.width(),
                    buf.height(),
                );
                self.base = Some(buf);
                self.load_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "image load failed");
                let failure = LoadFailure::from(&err);
                self.surface
                    .show_status(SurfaceStatus::Error(failure.message.clone()));
                self.base = None;
                self.load_error = Some(failure);
            }
        }
        self.state = LoopState::Ready;
        if self.pointer.active && self.config.hover == HoverBehavior::Freeze {
            self.freeze_on_base();
        }
        true
    }

    /// Pointer was already over the surface when the image arrived: show the unanimated base and
    /// hold it until the pointer leaves.
    fn freeze_on_base(&mut self) {
        let Some(base) = self.base.as_ref() else {
            return;
        };
        if let Err(err) = self.surface.present(base) {
            self.stats.present_failures += 1;
            tracing::warn!(error = %err, "present failed");
        }
        self.last_output = Some(base.clone());
        self.state = LoopState::Paused;
    }

    /// Wait for the in-flight load started by [`RenderLoop::set_source`]. Returns `true` when an
    /// outcome was applied.
    pub fn block_on_load(&mut self) -> bool {
        let Some(load) = self.inflight.take() else {
            return false;
        };
        let result = load.rx.recv().unwrap_or_else(|_| {
            Err(SkyError::Other(anyhow::anyhow!("image loader thread exited")))
        });
        self.finish_load(load.ticket, result)
    }

    fn poll_load(&mut self) {
        let Some(load) = self.inflight.as_ref() else {
            return;
        };
        let result = match load.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(SkyError::Other(anyhow::anyhow!("image loader thread exited")))
            }
        };
        let ticket = load.ticket;
        self.finish_load(ticket, result);
    }

    pub fn pointer_enter(&mut self, x: i32, y: i32) {
        if self.state == LoopState::Destroyed {
            return;
        }
        self.pointer = self.clamp_pointer(true, x, y);
        if self.state == LoopState::Ready && self.config.hover == HoverBehavior::Freeze {
            self.state = LoopState::Paused;
        }
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) {
        if self.state == LoopState::Destroyed {
            return;
        }
        self.pointer = self.clamp_pointer(self.pointer.active, x, y);
    }

    pub fn pointer_leave(&mut self) {
        if self.state == LoopState::Destroyed {
            return;
        }
        self.pointer.active = false;
        if self.state == LoopState::Paused {
            self.state = LoopState::Ready;
        }
    }

    fn clamp_pointer(&self, active: bool, x: i32, y: i32) -> PointerState {
        let (w, h) = self
            .base
            .as_ref()
            .map_or((0, 0), |b| (b.width(), b.height()));
        PointerState::clamped(active, x, y, w, h)
    }

    /// Replace the effect configuration; takes effect on the next tick.
    pub fn set_config(&mut self, config: EffectConfig) -> SkyResult<()> {
        config.validate()?;
        let freeze = config.hover == HoverBehavior::Freeze;
        match self.state {
            LoopState::Paused if !freeze => self.state = LoopState::Ready,
            LoopState::Ready if freeze && self.pointer.active => self.state = LoopState::Paused,
            _ => {}
        }
        self.config = config;
        Ok(())
    }

    /// Run one tick. Handles other than the pending one are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        if self.state == LoopState::Destroyed || self.pending_frame != Some(handle) {
            tracing::trace!(?handle, "ignoring stale frame callback");
            return;
        }
        self.pending_frame = None;
        self.poll_load();

        match self.state {
            LoopState::Ready if self.base.is_some() => self.render_tick(),
            LoopState::Paused => match self.last_output.as_ref() {
                Some(frame) => {
                    if let Err(err) = self.surface.present(frame) {
                        self.stats.present_failures += 1;
                        tracing::warn!(error = %err, "present failed");
                    }
                    self.stats.frozen += 1;
                }
                None => self.stats.idle += 1,
            },
            _ => self.stats.idle += 1,
        }

        if self.state != LoopState::Destroyed {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn render_tick(&mut self) {
        let Some(base) = self.base.as_ref() else {
            return;
        };
        let frame = self.counter.phase(self.config.cycle_period);
        let out = self.pipeline.render(base, frame, &self.config);
        if let Err(err) = self.surface.present(&out) {
            self.stats.present_failures += 1;
            tracing::warn!(error = %err, "present failed");
        }
        if self.pointer.active && self.config.hover == HoverBehavior::Scatter {
            let s = self
                .scatter
                .draw(base, &mut self.surface, self.pointer, &self.config.scatter);
            self.stats.scatter.painted += s.painted;
            self.stats.scatter.rejected += s.rejected;
        }
        self.last_output = Some(out);
        self.counter.advance();
        self.stats.rendered += 1;
    }

    /// Stop the loop for good: cancel the pending tick and release every buffer.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.base = None;
        self.last_output = None;
        self.pointer = PointerState::default();
        self.counter.reset();
        self.inflight = None;
        self.current_ticket = None;
        self.state = LoopState::Destroyed;
        tracing::debug!("render loop torn down");
    }
}

impl<S: Surface> RenderLoop<S, ManualScheduler> {
    /// Deliver the pending tick, if any. Returns `false` once nothing is scheduled.
    pub fn pump(&mut self) -> bool {
        match self.scheduler.take_pending() {
            Some(handle) => {
                self.on_frame(handle);
                true
            }
            None => false,
        }
    }
}

impl<S: Surface, K: FrameScheduler> Drop for RenderLoop<S, K> {
    fn drop(&mut self) {
        if self.state != LoopState::Destroyed {
            self.teardown();
        }
    }
}
