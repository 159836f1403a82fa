use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{SimConfig, TARGET_FPS};
use crate::math::{Eigen, Mat2};
use crate::scene::{FrameScene, Viewport};
use crate::simulation::{create_engine, DynamicsEngine, EngineError, SimulationState};

/// Headless driver: owns the simulation and produces one scene per frame.
pub struct App {
    state: SimulationState,
    engine: Box<dyn DynamicsEngine>,
    viewport: Viewport,
    rng: StdRng,
    frame_number: u64,
    tick_counter: TickCounter,
}

/// What a `run` did
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Frames where the engine failed and the step was skipped
    pub failed_frames: u64,
    /// Segments in the last successfully built scene
    pub segments: usize,
    /// Simulated time at the end of the run
    pub t: f64,
    /// Decomposition of the final matrix, if the engine produced one
    pub eigen: Option<Eigen>,
}

impl App {
    pub fn new(config: &SimConfig, a: Mat2, engine: Box<dyn DynamicsEngine>) -> Self {
        log::info!("Initializing linear system visualizer...");
        log::info!("Engine: {}", engine.name());
        log::info!(
            "dt = {}, {} trajectory slots, seed {}",
            config.dt,
            config.num_trajectories,
            config.seed
        );
        log::info!("A = {}", a);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut state = SimulationState::new(config, a);
        state.reset(&mut rng);

        Self {
            state,
            engine,
            viewport: Viewport::default(),
            rng,
            frame_number: 0,
            tick_counter: TickCounter::new(),
        }
    }

    /// Build the engine named by `config.engine` and start a session with it
    pub fn from_config(config: &SimConfig, a: Mat2) -> Result<Self, EngineError> {
        let engine = create_engine(&config.engine)?;
        Ok(Self::new(config, a, engine))
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Window resize; automatic spawns follow the new visible area
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    /// Mouse wheel
    pub fn zoom(&mut self, wheel: f32) {
        self.viewport.zoom(wheel);
        log::debug!("Zoom: {:.1} px/unit", self.viewport.pixels_per_unit);
    }

    /// Mouse press at `pixel`: start a trajectory there
    pub fn spawn_at_pixel(&mut self, pixel: [f32; 2]) -> usize {
        let position = self.viewport.to_coords(pixel);
        self.state.spawn_at(position)
    }

    pub fn reset(&mut self) {
        self.state.reset(&mut self.rng);
    }

    /// Tick the simulation, decompose the current matrix and build the scene.
    ///
    /// When the engine fails the step is skipped and the error returned;
    /// the next frame tries again.
    pub fn frame(&mut self) -> Result<(FrameScene, Eigen), EngineError> {
        self.frame_number = self.frame_number.wrapping_add(1);
        let half_extent = self.viewport.visible_half_extent();
        self.state
            .tick(self.engine.as_mut(), &mut self.rng, half_extent)?;

        let eigen = self.engine.decomposition(self.state.a)?;
        let scene = FrameScene::build(&self.state, &eigen, &self.viewport);

        if let Some(rate) = self.tick_counter.tick() {
            let [l1, l2] = eigen.values;
            log::info!(
                "{:.0} frames/s - t = {:.2} - λ1 = {} - λ2 = {}",
                rate,
                self.state.t,
                l1,
                l2
            );
        }
        Ok((scene, eigen))
    }

    /// Run `frames` frames back to back, logging and counting engine failures
    pub fn run(&mut self, frames: u64) -> RunSummary {
        self.run_paced(frames, None)
    }

    /// Like `run`, but sleeps so frames go out at `TARGET_FPS`
    pub fn run_realtime(&mut self, frames: u64) -> RunSummary {
        self.run_paced(frames, Some(Duration::from_secs_f64(1.0 / TARGET_FPS as f64)))
    }

    fn run_paced(&mut self, frames: u64, budget: Option<Duration>) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary {
            frames,
            failed_frames: 0,
            segments: 0,
            t: 0.0,
            eigen: None,
        };

        for _ in 0..frames {
            let frame_start = Instant::now();
            match self.frame() {
                Ok((scene, eigen)) => {
                    summary.segments = scene.segment_count();
                    summary.eigen = Some(eigen);
                }
                Err(e) => {
                    log::error!("Frame {} skipped: {}", self.frame_number, e);
                    summary.failed_frames += 1;
                }
            }
            if let Some(budget) = budget {
                if let Some(remaining) = budget.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
        }

        summary.t = self.state.t;
        log::info!(
            "Ran {} frames in {:.2?} ({} failed), t = {:.3}",
            frames,
            started.elapsed(),
            summary.failed_frames,
            summary.t
        );
        summary
    }
}

/// Frame rate counter
struct TickCounter {
    last_update: Instant,
    frame_count: u32,
}

impl TickCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(rate) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let rate = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}
