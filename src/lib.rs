//! Simulation core of an interactive visualizer for 2-D linear systems
//! `x' = Ax` (optionally `x' = Ax + Bu`).
//!
//! `math` holds the closed-form linear algebra, `simulation` the trajectory
//! bookkeeping and the engines that compute propagators, and `scene` turns
//! a simulation state into line vertices for a renderer.

pub mod app;
pub mod config;
pub mod math;
pub mod scene;
pub mod simulation;
