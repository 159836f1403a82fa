use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;

use super::protocol::{eigen_from_numbers, mat2_from, ProtocolError, Reply, Request, EIGEN_REPLY_LEN};
use super::stepper::control_propagators;
use crate::config::EngineKind;
use crate::math::{eigendecompose, expm2x2, Eigen, Mat2};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("engine reported: {0}")]
    Remote(String),
    #[error("engine process closed its pipes")]
    Closed,
}

/// Source of propagators and eigendecompositions for the simulation.
///
/// Every implementation must reproduce the closed-form results exactly
/// (same series truncation, same eigen formulas) to be interchangeable.
pub trait DynamicsEngine {
    fn name(&self) -> &str;

    /// `exp(dt·A)`
    fn propagator(&mut self, a: Mat2, dt: f64) -> Result<Mat2, EngineError>;

    /// Free- and input-response propagators of `x' = Ax + Bu`
    fn control_propagators(
        &mut self,
        a: Mat2,
        b: Mat2,
        dt: f64,
    ) -> Result<(Mat2, Mat2), EngineError>;

    fn decomposition(&mut self, a: Mat2) -> Result<Eigen, EngineError>;
}

/// In-process engine backed by `crate::math`. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosedFormEngine;

impl DynamicsEngine for ClosedFormEngine {
    fn name(&self) -> &str {
        "closed-form"
    }

    fn propagator(&mut self, a: Mat2, dt: f64) -> Result<Mat2, EngineError> {
        Ok(expm2x2(dt * a))
    }

    fn control_propagators(
        &mut self,
        a: Mat2,
        b: Mat2,
        dt: f64,
    ) -> Result<(Mat2, Mat2), EngineError> {
        Ok(control_propagators(a, b, dt))
    }

    fn decomposition(&mut self, a: Mat2) -> Result<Eigen, EngineError> {
        Ok(eigendecompose(a))
    }
}

/// Engine running in a child process, driven over the line protocol.
pub struct ExternalEngine {
    name: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    line: String,
}

impl ExternalEngine {
    /// Start `program` with `args` and talk to it over its stdin/stdout
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = child.stdout.take().ok_or(EngineError::Closed)?;
        log::info!("Started external engine `{}` (pid {})", program, child.id());

        Ok(Self {
            name: program.to_string(),
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            line: String::new(),
        })
    }

    /// Send one request and wait for its numbers
    fn call(&mut self, request: &Request, expected: usize) -> Result<Vec<f64>, EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::Closed)?;
        writeln!(stdin, "{}", request.encode())?;
        stdin.flush()?;

        self.line.clear();
        if self.stdout.read_line(&mut self.line)? == 0 {
            return Err(EngineError::Closed);
        }
        log::trace!("{} -> {}", request.command(), self.line.trim_end());

        match Reply::parse(&self.line)? {
            Reply::Values(numbers) if numbers.len() == expected => Ok(numbers),
            Reply::Values(numbers) => Err(ProtocolError::Arity {
                command: request.command().to_string(),
                expected,
                got: numbers.len(),
            }
            .into()),
            Reply::Failure(message) => Err(EngineError::Remote(message)),
        }
    }
}

impl DynamicsEngine for ExternalEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn propagator(&mut self, a: Mat2, dt: f64) -> Result<Mat2, EngineError> {
        let numbers = self.call(&Request::Expm { dt, a }, 4)?;
        Ok(mat2_from(&numbers))
    }

    fn control_propagators(
        &mut self,
        a: Mat2,
        b: Mat2,
        dt: f64,
    ) -> Result<(Mat2, Mat2), EngineError> {
        let numbers = self.call(&Request::Control { dt, a, b }, 8)?;
        Ok((mat2_from(&numbers[..4]), mat2_from(&numbers[4..])))
    }

    fn decomposition(&mut self, a: Mat2) -> Result<Eigen, EngineError> {
        let numbers = self.call(&Request::Eigen { a }, EIGEN_REPLY_LEN)?;
        Ok(eigen_from_numbers(&numbers))
    }
}

impl Drop for ExternalEngine {
    fn drop(&mut self) {
        // Closing stdin is the server's signal to exit
        drop(self.stdin.take());
        match self.child.wait() {
            Ok(status) => log::info!("External engine `{}` exited with {}", self.name, status),
            Err(e) => log::warn!("Failed to reap external engine `{}`: {}", self.name, e),
        }
    }
}

/// Build the engine selected by the configuration
pub fn create_engine(kind: &EngineKind) -> Result<Box<dyn DynamicsEngine>, EngineError> {
    match kind {
        EngineKind::BuiltIn => Ok(Box::new(ClosedFormEngine)),
        EngineKind::External { program, args } => {
            Ok(Box::new(ExternalEngine::spawn(program, args)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IsApprox;

    #[test]
    fn test_closed_form_engine_matches_math_core() {
        let mut engine = ClosedFormEngine;
        let a = Mat2::from_rows([[0.0, 1.0], [-4.0, -0.5]]);
        let dt = 0.02;
        assert_eq!(engine.propagator(a, dt).unwrap(), expm2x2(dt * a));
        assert_eq!(engine.decomposition(a).unwrap(), eigendecompose(a));

        let (free, input) = engine.control_propagators(a, Mat2::zero(), dt).unwrap();
        assert!(free.is_approx(&expm2x2(dt * a)));
        assert!(input.is_approx(&Mat2::zero()));
    }

    #[test]
    fn test_create_builtin_engine() {
        let engine = create_engine(&EngineKind::BuiltIn).expect("built-in engine");
        assert_eq!(engine.name(), "closed-form");
    }

    #[test]
    fn test_missing_external_program_is_io_error() {
        let kind = EngineKind::External {
            program: "/nonexistent/diffeq-engine".to_string(),
            args: Vec::new(),
        };
        assert!(matches!(create_engine(&kind), Err(EngineError::Io(_))));
    }
}
