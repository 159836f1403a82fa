use rand::Rng;

use super::engine::{DynamicsEngine, EngineError};
use super::stepper::{advance, Propagator};
use super::trajectory::TrajectoryArena;
use crate::config::{SimConfig, BOX_LIMIT, SLIDER_MAX};
use crate::math::{Mat2, Vec2};

/// Constant input of `x' = Ax + Bu`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlInput {
    pub b: Mat2,
    pub u: Vec2,
}

/// Everything the driver mutates between frames.
///
/// Owned by the driver and passed by reference to whoever reads or
/// writes it; all access happens on the frame thread.
#[derive(Clone, Debug)]
pub struct SimulationState {
    /// Dynamics matrix, edited by the UI
    pub a: Mat2,
    /// When present, steps use the control-affine propagators
    pub control: Option<ControlInput>,
    pub arena: TrajectoryArena,
    pub dt: f64,
    /// Simulated time since the last reset
    pub t: f64,
    pub paused: bool,
    pub spawn_new_trajectories: bool,
    pub show_eigenvectors: bool,
    pub show_eigen_components: bool,
    spawn_period: f64,
    time_since_last_spawn: f64,
}

impl SimulationState {
    pub fn new(config: &SimConfig, a: Mat2) -> Self {
        Self {
            a,
            control: None,
            arena: TrajectoryArena::new(config.num_trajectories),
            dt: config.dt,
            t: 0.0,
            paused: false,
            spawn_new_trajectories: config.spawn_new_trajectories,
            show_eigenvectors: true,
            show_eigen_components: false,
            spawn_period: config.spawn_period(),
            time_since_last_spawn: 0.0,
        }
    }

    /// Advance one frame. Does nothing while paused.
    ///
    /// Spawns due trajectories at random points within `±half_extent`, then
    /// steps every state and records it in its history. An engine failure
    /// skips the step and is returned to the caller; spawns and the clock
    /// have already advanced by then.
    pub fn tick<R: Rng>(
        &mut self,
        engine: &mut dyn DynamicsEngine,
        rng: &mut R,
        half_extent: Vec2,
    ) -> Result<(), EngineError> {
        if self.paused {
            return Ok(());
        }

        if self.spawn_new_trajectories {
            self.time_since_last_spawn += self.dt;
            // More than one spawn per slot would only overwrite this tick's own spawns
            let mut spawned = 0;
            while self.time_since_last_spawn > self.spawn_period && spawned < self.arena.len() {
                let position = Vec2::new(
                    rng.gen_range(-half_extent.x..=half_extent.x),
                    rng.gen_range(-half_extent.y..=half_extent.y),
                );
                self.arena.spawn(position);
                self.time_since_last_spawn -= self.spawn_period;
                spawned += 1;
            }
            if self.time_since_last_spawn > self.spawn_period {
                log::debug!("Dropping spawn backlog of {:.3} s", self.time_since_last_spawn);
                self.time_since_last_spawn = 0.0;
            }
        }

        self.t += self.dt;
        let propagator = self.propagator(engine)?;
        advance(&propagator, self.arena.states_mut());
        self.arena.record();
        log::trace!("t = {:.3}: stepped {} states", self.t, self.arena.len());
        Ok(())
    }

    /// Propagator for the current matrix, asked of the engine once per tick
    pub fn propagator(&self, engine: &mut dyn DynamicsEngine) -> Result<Propagator, EngineError> {
        match self.control {
            None => Ok(Propagator {
                free: engine.propagator(self.a, self.dt)?,
                forced: Vec2::ZERO,
            }),
            Some(ControlInput { b, u }) => {
                let (free, input) = engine.control_propagators(self.a, b, self.dt)?;
                Ok(Propagator::from_matrices(free, input, u))
            }
        }
    }

    /// Manual spawn (e.g. a mouse press); works while paused and restarts the spawn timer
    pub fn spawn_at(&mut self, position: Vec2) -> usize {
        self.time_since_last_spawn = 0.0;
        self.arena.spawn(position)
    }

    /// Scatter all states over the reset box, clear histories and rewind the clock
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.t = 0.0;
        self.time_since_last_spawn = 0.0;
        self.arena.reset(rng, BOX_LIMIT);
        log::info!("Simulation reset ({} trajectories)", self.arena.len());
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Replace the dynamics matrix from row-major slider values, clamped to the slider range
    pub fn set_matrix_from_sliders(&mut self, data: [f32; 4]) {
        self.a = Mat2::from_row_major_f32(data.map(|v| v.clamp(-SLIDER_MAX, SLIDER_MAX)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{expm2x2, IsApprox};
    use crate::simulation::engine::ClosedFormEngine;
    use crate::simulation::presets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Fails every request, to exercise the error path
    struct BrokenEngine;

    impl DynamicsEngine for BrokenEngine {
        fn name(&self) -> &str {
            "broken"
        }

        fn propagator(&mut self, _a: Mat2, _dt: f64) -> Result<Mat2, EngineError> {
            Err(EngineError::Closed)
        }

        fn control_propagators(
            &mut self,
            _a: Mat2,
            _b: Mat2,
            _dt: f64,
        ) -> Result<(Mat2, Mat2), EngineError> {
            Err(EngineError::Closed)
        }

        fn decomposition(&mut self, _a: Mat2) -> Result<crate::math::Eigen, EngineError> {
            Err(EngineError::Closed)
        }
    }

    fn quiet_config(slots: usize) -> SimConfig {
        SimConfig {
            num_trajectories: slots,
            spawn_new_trajectories: false,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_tick_steps_and_records() {
        let a = presets::rotation();
        let mut state = SimulationState::new(&quiet_config(2), a);
        let mut rng = StdRng::seed_from_u64(1);
        state.spawn_at(Vec2::new(1.0, 0.0));
        state.spawn_at(Vec2::new(0.0, 2.0));

        state
            .tick(&mut ClosedFormEngine, &mut rng, Vec2::new(10.0, 10.0))
            .expect("closed form never fails");

        let propagator = expm2x2(state.dt * a);
        assert!(state.arena.states()[0].is_approx(&(propagator * Vec2::new(1.0, 0.0))));
        assert!(state.arena.states()[1].is_approx(&(propagator * Vec2::new(0.0, 2.0))));
        assert_eq!(state.arena.trajectories()[0].len(), 1);
        assert!(state.t.is_approx(&state.dt));
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut state = SimulationState::new(&SimConfig::default(), presets::rotation());
        let mut rng = StdRng::seed_from_u64(2);
        state.set_paused(true);
        let before = state.arena.states().to_vec();
        for _ in 0..10 {
            state
                .tick(&mut ClosedFormEngine, &mut rng, Vec2::new(10.0, 10.0))
                .unwrap();
        }
        assert_eq!(state.arena.states(), &before[..]);
        assert_eq!(state.t, 0.0);
        assert_eq!(state.arena.next_slot(), 0, "no automatic spawns while paused");
    }

    #[test]
    fn test_automatic_spawning_follows_spawn_period() {
        let config = SimConfig {
            num_trajectories: 8,
            trajectory_lifetime_s: 2.0,
            dt: 0.625,
            ..SimConfig::default()
        };
        // spawn period 0.25 s: 0.625 s leaves 0.125 s over, then 0.75 s spawns
        // twice more with exactly one period left (strictly greater is required)
        let mut state = SimulationState::new(&config, Mat2::zero());
        let mut rng = StdRng::seed_from_u64(3);
        let half = Vec2::new(5.0, 3.0);

        state.tick(&mut ClosedFormEngine, &mut rng, half).unwrap();
        assert_eq!(state.arena.next_slot(), 2);
        state.tick(&mut ClosedFormEngine, &mut rng, half).unwrap();
        assert_eq!(state.arena.next_slot(), 4);

        for s in &state.arena.states()[..4] {
            assert!(s.x.abs() <= 5.0 && s.y.abs() <= 3.0, "spawned outside the view: {:?}", s);
        }
    }

    #[test]
    fn test_huge_time_step_spawns_each_slot_once() {
        for dt in [1e9, f64::INFINITY] {
            let config = SimConfig {
                num_trajectories: 4,
                dt,
                ..SimConfig::default()
            };
            let mut state = SimulationState::new(&config, Mat2::zero());
            let mut rng = StdRng::seed_from_u64(7);

            let _ = state.tick(&mut ClosedFormEngine, &mut rng, Vec2::new(1.0, 1.0));
            assert_eq!(state.arena.next_slot(), 0, "dt = {}: every slot spawned once, cursor wrapped", dt);

            // the backlog is dropped, so a normal step afterwards spawns nothing
            state.dt = 1e-6;
            let _ = state.tick(&mut ClosedFormEngine, &mut rng, Vec2::new(1.0, 1.0));
            assert_eq!(state.arena.next_slot(), 0, "dt = {}: backlog carried over", dt);
        }
    }

    #[test]
    fn test_engine_failure_skips_step() {
        let mut state = SimulationState::new(&quiet_config(1), presets::rotation());
        let mut rng = StdRng::seed_from_u64(4);
        state.spawn_at(Vec2::new(1.0, 1.0));

        let result = state.tick(&mut BrokenEngine, &mut rng, Vec2::new(1.0, 1.0));
        assert!(matches!(result, Err(EngineError::Closed)));
        assert_eq!(state.arena.states()[0], Vec2::new(1.0, 1.0));
        assert!(state.arena.trajectories()[0].is_empty());
    }

    #[test]
    fn test_zero_control_matches_autonomous() {
        let a = presets::rotation();
        let mut plain = SimulationState::new(&quiet_config(1), a);
        let mut controlled = plain.clone();
        controlled.control = Some(ControlInput {
            b: Mat2::zero(),
            u: Vec2::ZERO,
        });
        let mut rng = StdRng::seed_from_u64(5);
        plain.spawn_at(Vec2::new(3.0, -1.0));
        controlled.spawn_at(Vec2::new(3.0, -1.0));

        for _ in 0..25 {
            plain.tick(&mut ClosedFormEngine, &mut rng, Vec2::new(1.0, 1.0)).unwrap();
            controlled.tick(&mut ClosedFormEngine, &mut rng, Vec2::new(1.0, 1.0)).unwrap();
        }
        assert!(plain.arena.states()[0].is_approx(&controlled.arena.states()[0]));
    }

    #[test]
    fn test_reset_rewinds_clock() {
        let mut state = SimulationState::new(&quiet_config(8), presets::rotation());
        let mut rng = StdRng::seed_from_u64(6);
        state.tick(&mut ClosedFormEngine, &mut rng, Vec2::new(1.0, 1.0)).unwrap();
        state.reset(&mut rng);
        assert_eq!(state.t, 0.0);
        assert!(state.arena.trajectories().iter().all(|t| t.is_empty()));
    }

    #[test]
    fn test_slider_matrix_is_row_major() {
        let mut state = SimulationState::new(&quiet_config(1), Mat2::zero());
        state.set_matrix_from_sliders([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(state.a, Mat2::from_rows([[1.0, 2.0], [3.0, 4.0]]));

        state.set_matrix_from_sliders([-9.0, 0.5, 7.0, 0.0]);
        assert_eq!(state.a, Mat2::from_rows([[-5.0, 0.5], [5.0, 0.0]]));
    }
}
