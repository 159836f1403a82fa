/// Simulation time step in seconds (one step per rendered frame)
pub const DT: f64 = 0.02;

/// Target frame rate of the driver loop
pub const TARGET_FPS: u32 = 62;

/// Number of recent positions kept per trajectory
pub const HISTORY_CAPACITY: usize = 16;

/// Number of trajectory slots; spawning wraps around and reuses the oldest slot
pub const NUM_TRAJECTORIES: usize = 400;

/// How long a trajectory survives before its slot is reused (seconds)
pub const TRAJECTORY_LIFETIME_S: f64 = 5.0;

/// Interval between automatic spawns, so every slot is recycled once per lifetime
pub const SPAWN_PERIOD: f64 = TRAJECTORY_LIFETIME_S / NUM_TRAJECTORIES as f64;

/// Half side of the square that `reset` scatters states over
pub const BOX_LIMIT: f64 = 20.0;

/// Range of the matrix entry sliders: [-SLIDER_MAX, SLIDER_MAX]
pub const SLIDER_MAX: f32 = 5.0;

// ============================================
// Math core
// ============================================

/// Absolute tolerance used by `IsApprox::is_approx`
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Number of Taylor terms (k = 0..EXPM_TERMS-1) summed by `expm`
pub const EXPM_TERMS: usize = 20;

/// `linsolve2x2` reports a singular matrix when |det| falls below this
pub const SINGULAR_EPSILON: f64 = 1e-9;

// ============================================
// Viewport
// ============================================

pub const SCREEN_WIDTH: u32 = 1200;
pub const SCREEN_HEIGHT: u32 = 800;

/// Default zoom level (pixels per graph unit)
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 20.0;
pub const MIN_PIXELS_PER_UNIT: f32 = 20.0;
pub const MAX_PIXELS_PER_UNIT: f32 = 1000.0;

/// Zoom multiplier per mouse wheel notch
pub const ZOOM_STEP: f32 = 1.05;

// ============================================
// Scene styling
// ============================================

/// Eigenvector lines are drawn from -scale*v to +scale*v so they span the screen
pub const EIGENVECTOR_LINE_SCALE: f64 = 1000.0;
pub const EIGENVECTOR_THICKNESS: f32 = 3.0;
pub const EIGEN_COMPONENT_THICKNESS: f32 = 2.0;

/// Thickness of the newest trajectory segment; each older segment is thinner
pub const TRAJECTORY_THICKNESS: f32 = 3.0;
pub const TRAJECTORY_THICKNESS_FALLOFF: f32 = 0.1;

pub const TRAJECTORY_COLOR: [f32; 4] = [0.31, 0.31, 0.31, 1.0];
/// Eigen-direction with positive real eigenvalue part (growing)
pub const UNSTABLE_COLOR: [f32; 4] = [0.0, 0.89, 0.19, 1.0];
/// Eigen-direction with non-positive real eigenvalue part (decaying or neutral)
pub const STABLE_COLOR: [f32; 4] = [0.0, 0.47, 0.95, 1.0];

// ============================================
// Runtime configuration
// ============================================

/// Which implementation of the dynamics math the driver talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// In-process closed-form engine
    #[default]
    BuiltIn,
    /// Child process speaking the line protocol in `simulation::protocol`
    External { program: String, args: Vec<String> },
}

/// Runtime settings for a simulation session. Defaults come from the constants above.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub dt: f64,
    pub num_trajectories: usize,
    pub trajectory_lifetime_s: f64,
    pub spawn_new_trajectories: bool,
    pub engine: EngineKind,
    pub seed: u64,
}

impl SimConfig {
    /// Interval between automatic spawns for this configuration
    pub fn spawn_period(&self) -> f64 {
        self.trajectory_lifetime_s / self.num_trajectories as f64
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: DT,
            num_trajectories: NUM_TRAJECTORIES,
            trajectory_lifetime_s: TRAJECTORY_LIFETIME_S,
            spawn_new_trajectories: true,
            engine: EngineKind::BuiltIn,
            seed: 0,
        }
    }
}
