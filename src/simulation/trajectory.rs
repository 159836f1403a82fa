use rand::Rng;

use crate::config::HISTORY_CAPACITY;
use crate::math::Vec2;

/// Fixed-capacity ring buffer of the most recent positions of one particle.
#[derive(Clone, Copy, Debug)]
pub struct Trajectory {
    positions: [Vec2; HISTORY_CAPACITY],
    /// Slot the next position is written to
    cursor: usize,
    /// Number of valid entries, at most `HISTORY_CAPACITY`
    size: usize,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Trajectory {
    pub const fn new() -> Self {
        Self {
            positions: [Vec2::ZERO; HISTORY_CAPACITY],
            cursor: 0,
            size: 0,
        }
    }

    /// Forget every recorded position
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn push(&mut self, position: Vec2) {
        self.positions[self.cursor] = position;
        self.cursor = (self.cursor + 1) % HISTORY_CAPACITY;
        self.size = (self.size + 1).min(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub const fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Position recorded `ago` steps before the most recent one.
    ///
    /// # Panics
    ///
    /// Panics if `ago >= self.len()`.
    pub fn recent(&self, ago: usize) -> Vec2 {
        assert!(
            ago < self.size,
            "trajectory holds {} positions, asked for {} ago",
            self.size,
            ago
        );
        let idx = (self.cursor + HISTORY_CAPACITY - 1 - ago) % HISTORY_CAPACITY;
        self.positions[idx]
    }

    pub fn most_recent(&self) -> Option<Vec2> {
        (!self.is_empty()).then(|| self.recent(0))
    }

    pub fn least_recent(&self) -> Option<Vec2> {
        (!self.is_empty()).then(|| self.recent(self.size - 1))
    }

    /// Positions from most recent to oldest
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.size).map(move |ago| self.recent(ago))
    }
}

/// Trajectory slots plus the current state of the particle in each slot.
///
/// Slots are never freed: spawning takes the slot under the cursor and the
/// cursor wraps, so the oldest trajectory is the one overwritten.
#[derive(Clone, Debug)]
pub struct TrajectoryArena {
    trajectories: Vec<Trajectory>,
    states: Vec<Vec2>,
    next_slot: usize,
}

impl TrajectoryArena {
    pub fn new(slots: usize) -> Self {
        assert!(slots > 0, "arena needs at least one slot");
        Self {
            trajectories: vec![Trajectory::new(); slots],
            states: vec![Vec2::ZERO; slots],
            next_slot: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Start a new trajectory at `position` in the next slot; returns the slot used.
    ///
    /// The position becomes the slot's current state and enters its history
    /// on the next recorded step.
    pub fn spawn(&mut self, position: Vec2) -> usize {
        let slot = self.next_slot;
        self.trajectories[slot].reset();
        self.states[slot] = position;
        self.next_slot = (self.next_slot + 1) % self.trajectories.len();
        slot
    }

    /// Scatter every state uniformly over `[-limit, limit]²` and clear all histories
    pub fn reset<R: Rng>(&mut self, rng: &mut R, limit: f64) {
        for state in &mut self.states {
            *state = Vec2::new(rng.gen_range(-limit..=limit), rng.gen_range(-limit..=limit));
        }
        for trajectory in &mut self.trajectories {
            trajectory.reset();
        }
    }

    /// Append each slot's current state to its history
    pub fn record(&mut self) {
        for (trajectory, &state) in self.trajectories.iter_mut().zip(&self.states) {
            trajectory.push(state);
        }
    }

    pub fn states(&self) -> &[Vec2] {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut [Vec2] {
        &mut self.states
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub fn next_slot(&self) -> usize {
        self.next_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_trajectory_is_empty() {
        let t = Trajectory::new();
        assert!(t.is_empty());
        assert_eq!(t.most_recent(), None);
        assert_eq!(t.least_recent(), None);
        assert_eq!(t.iter().count(), 0);
    }

    #[test]
    fn test_push_orders_most_recent_first() {
        let mut t = Trajectory::new();
        for i in 0..3 {
            t.push(Vec2::new(i as f64, 0.0));
        }
        assert_eq!(t.len(), 3);
        assert_eq!(t.most_recent(), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(t.least_recent(), Some(Vec2::new(0.0, 0.0)));
        let xs: Vec<f64> = t.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_size_saturates_at_capacity() {
        let mut t = Trajectory::new();
        let total = HISTORY_CAPACITY + 5;
        for i in 0..total {
            t.push(Vec2::new(i as f64, -(i as f64)));
        }
        assert_eq!(t.len(), HISTORY_CAPACITY);
        assert_eq!(t.most_recent(), Some(Vec2::new((total - 1) as f64, -((total - 1) as f64))));
        assert_eq!(t.least_recent(), Some(Vec2::new(5.0, -5.0)));
    }

    #[test]
    #[should_panic(expected = "asked for")]
    fn test_reading_past_size_panics() {
        let mut t = Trajectory::new();
        t.push(Vec2::new(1.0, 1.0));
        t.recent(1);
    }

    #[test]
    fn test_spawn_wraps_and_resets_slot() {
        let mut arena = TrajectoryArena::new(2);
        assert_eq!(arena.spawn(Vec2::new(1.0, 0.0)), 0);
        arena.record();
        arena.record();
        assert_eq!(arena.trajectories()[0].len(), 2);

        assert_eq!(arena.spawn(Vec2::new(2.0, 0.0)), 1);
        assert_eq!(arena.spawn(Vec2::new(3.0, 0.0)), 0);
        assert!(arena.trajectories()[0].is_empty(), "reused slot must start fresh");
        assert_eq!(arena.states()[0], Vec2::new(3.0, 0.0));
        assert_eq!(arena.next_slot(), 1);
    }

    #[test]
    fn test_reset_scatters_inside_box() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut arena = TrajectoryArena::new(100);
        arena.record();
        arena.reset(&mut rng, 20.0);
        for (state, trajectory) in arena.states().iter().zip(arena.trajectories()) {
            assert!(state.x.abs() <= 20.0 && state.y.abs() <= 20.0);
            assert!(trajectory.is_empty());
        }
    }
}
