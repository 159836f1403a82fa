pub mod engine;
pub mod presets;
pub mod protocol;
pub mod state;
pub mod stepper;
pub mod trajectory;

pub use engine::{create_engine, ClosedFormEngine, DynamicsEngine, EngineError, ExternalEngine};
pub use protocol::{serve, ProtocolError, Reply, Request};
pub use state::{ControlInput, SimulationState};
pub use stepper::{advance, control_propagators, step, step_with_control, Propagator};
pub use trajectory::{Trajectory, TrajectoryArena};
