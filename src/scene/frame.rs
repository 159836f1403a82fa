use super::vertex::{as_bytes, LineVertex};
use super::viewport::Viewport;
use crate::config::{
    EIGENVECTOR_LINE_SCALE, EIGENVECTOR_THICKNESS, EIGEN_COMPONENT_THICKNESS, STABLE_COLOR,
    TRAJECTORY_COLOR, TRAJECTORY_THICKNESS, TRAJECTORY_THICKNESS_FALLOFF, UNSTABLE_COLOR,
};
use crate::math::{eigen_components, Complex, Eigen};
use crate::simulation::SimulationState;

/// Number of trajectories that get the eigen-component overlay
const COMPONENT_OVERLAY_SUBSET: usize = 1;

/// Line-list vertex buffers for one frame, in screen pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameScene {
    /// Trajectory tails, newest segment thickest
    pub trajectory_lines: Vec<LineVertex>,
    /// Real parts of both eigenvectors, spanning the screen
    pub eigen_lines: Vec<LineVertex>,
    /// Projections of the first state onto the eigendirections
    pub component_lines: Vec<LineVertex>,
}

impl FrameScene {
    pub fn build(state: &SimulationState, eigen: &Eigen, viewport: &Viewport) -> Self {
        let mut scene = Self::default();
        scene.push_trajectories(state, viewport);
        if state.show_eigenvectors {
            scene.push_eigenvectors(eigen, viewport);
        }
        if state.show_eigen_components && eigen.is_real() {
            scene.push_eigen_components(state, eigen, viewport);
        }
        scene
    }

    fn push_trajectories(&mut self, state: &SimulationState, viewport: &Viewport) {
        for trajectory in state.arena.trajectories() {
            let points: Vec<[f32; 2]> = trajectory.iter().map(|p| viewport.to_pixels(p)).collect();
            for (i, pair) in points.windows(2).enumerate() {
                let thickness = TRAJECTORY_THICKNESS - TRAJECTORY_THICKNESS_FALLOFF * i as f32;
                self.trajectory_lines
                    .extend(LineVertex::segment(pair[0], pair[1], thickness, TRAJECTORY_COLOR));
            }
        }
    }

    fn push_eigenvectors(&mut self, eigen: &Eigen, viewport: &Viewport) {
        for (v, &lambda) in eigen.real_vectors().into_iter().zip(&eigen.values) {
            let tip = EIGENVECTOR_LINE_SCALE * v;
            self.eigen_lines.extend(LineVertex::segment(
                viewport.to_pixels(tip),
                viewport.to_pixels(-tip),
                EIGENVECTOR_THICKNESS,
                eigen_color(lambda),
            ));
        }
    }

    fn push_eigen_components(&mut self, state: &SimulationState, eigen: &Eigen, viewport: &Viewport) {
        for &x in state.arena.states().iter().take(COMPONENT_OVERLAY_SUBSET) {
            let components = match eigen_components(eigen, x) {
                Ok(components) => components,
                Err(e) => {
                    log::debug!("Skipping eigen components of {}: {}", x, e);
                    continue;
                }
            };
            for (component, &lambda) in components.into_iter().zip(&eigen.values) {
                self.component_lines.extend(LineVertex::segment(
                    viewport.to_pixels(x),
                    viewport.to_pixels(x - component),
                    EIGEN_COMPONENT_THICKNESS,
                    eigen_color(lambda),
                ));
            }
        }
    }

    pub fn trajectory_bytes(&self) -> &[u8] {
        as_bytes(&self.trajectory_lines)
    }

    pub fn eigen_bytes(&self) -> &[u8] {
        as_bytes(&self.eigen_lines)
    }

    pub fn component_bytes(&self) -> &[u8] {
        as_bytes(&self.component_lines)
    }

    /// Total number of segments across all lists
    pub fn segment_count(&self) -> usize {
        (self.trajectory_lines.len() + self.eigen_lines.len() + self.component_lines.len()) / 2
    }
}

/// Growing directions are drawn in the unstable color
fn eigen_color(lambda: Complex) -> [f32; 4] {
    if lambda.re > 0.0 {
        UNSTABLE_COLOR
    } else {
        STABLE_COLOR
    }
}
