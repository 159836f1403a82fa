//! Line protocol spoken between `ExternalEngine` and an engine server.
//!
//! One request per line, one reply per line. Matrices travel column-major
//! (`a11 a21 a12 a22`) and every number is written with Rust's shortest
//! round-trip formatting, so a reply parses back to the exact bits the
//! server computed.
//!
//! ```text
//! expm <dt> <a: 4>              -> ok <exp(dt·A): 4>
//! control <dt> <a: 4> <b: 4>    -> ok <free: 4> <input: 4>
//! eigen <a: 4>                  -> ok <λ1 re im> <λ2 re im> <v1: 4> <v2: 4>
//! (anything else)               -> err <message>
//! ```

use std::io::{self, BufRead, Write};

use thiserror::Error;

use super::engine::{ClosedFormEngine, DynamicsEngine};
use crate::math::{Complex, ComplexVec2, Eigen, Mat2};

/// Numbers in an `eigen` reply
pub const EIGEN_REPLY_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,
    #[error("message is not valid UTF-8")]
    NotUtf8,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected} numbers, got {got}")]
    Arity {
        command: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("malformed reply `{0}`")]
    MalformedReply(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Request {
    Expm { dt: f64, a: Mat2 },
    Control { dt: f64, a: Mat2, b: Mat2 },
    Eigen { a: Mat2 },
}

impl Request {
    pub fn command(&self) -> &'static str {
        match self {
            Request::Expm { .. } => "expm",
            Request::Control { .. } => "control",
            Request::Eigen { .. } => "eigen",
        }
    }

    /// Single line without the trailing newline
    pub fn encode(&self) -> String {
        let mut numbers = Vec::with_capacity(9);
        match self {
            Request::Expm { dt, a } => {
                numbers.push(*dt);
                numbers.extend(a.elems);
            }
            Request::Control { dt, a, b } => {
                numbers.push(*dt);
                numbers.extend(a.elems);
                numbers.extend(b.elems);
            }
            Request::Eigen { a } => numbers.extend(a.elems),
        }
        format!("{} {}", self.command(), join_numbers(&numbers))
    }

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ProtocolError::Empty)?;
        let numbers = parse_numbers(words)?;
        let expected = match command {
            "expm" => 5,
            "control" => 9,
            "eigen" => 4,
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        if numbers.len() != expected {
            return Err(ProtocolError::Arity {
                command: command.to_string(),
                expected,
                got: numbers.len(),
            });
        }
        Ok(match command {
            "expm" => Request::Expm {
                dt: numbers[0],
                a: mat2_from(&numbers[1..5]),
            },
            "control" => Request::Control {
                dt: numbers[0],
                a: mat2_from(&numbers[1..5]),
                b: mat2_from(&numbers[5..9]),
            },
            _ => Request::Eigen {
                a: mat2_from(&numbers[0..4]),
            },
        })
    }
}

/// Server reply to one request.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// `ok` followed by the result numbers
    Values(Vec<f64>),
    /// `err` followed by a message
    Failure(String),
}

impl Reply {
    /// Single line without the trailing newline
    pub fn encode(&self) -> String {
        match self {
            Reply::Values(numbers) => format!("ok {}", join_numbers(numbers)),
            Reply::Failure(message) => format!("err {}", message.replace('\n', " ")),
        }
    }

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end();
        if let Some(message) = line.strip_prefix("err") {
            return Ok(Reply::Failure(message.trim().to_string()));
        }
        match line.strip_prefix("ok") {
            Some(rest) => Ok(Reply::Values(parse_numbers(rest.split_whitespace())?)),
            None if line.is_empty() => Err(ProtocolError::Empty),
            None => Err(ProtocolError::MalformedReply(line.to_string())),
        }
    }
}

pub fn eigen_to_numbers(eigen: &Eigen) -> [f64; EIGEN_REPLY_LEN] {
    let [l1, l2] = eigen.values;
    let [v1, v2] = eigen.vectors;
    [
        l1.re,
        l1.im,
        l2.re,
        l2.im,
        v1.elems[0].re,
        v1.elems[0].im,
        v1.elems[1].re,
        v1.elems[1].im,
        v2.elems[0].re,
        v2.elems[0].im,
        v2.elems[1].re,
        v2.elems[1].im,
    ]
}

/// Inverse of `eigen_to_numbers`; `n` must hold `EIGEN_REPLY_LEN` numbers
pub fn eigen_from_numbers(n: &[f64]) -> Eigen {
    let c = |i: usize| Complex::new(n[i], n[i + 1]);
    Eigen {
        values: [c(0), c(2)],
        vectors: [ComplexVec2::new(c(4), c(6)), ComplexVec2::new(c(8), c(10))],
    }
}

/// Column-major `Mat2` from the first four numbers of `n`
pub fn mat2_from(n: &[f64]) -> Mat2 {
    Mat2::new(n[0], n[1], n[2], n[3])
}

/// Answer requests from `reader` on `writer` with the closed-form engine
/// until end of input. Returns the number of requests answered.
pub fn serve<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<usize> {
    let mut engine = ClosedFormEngine;
    let mut served = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let reply = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match Request::parse(line) {
                Ok(request) => answer(&mut engine, &request),
                Err(e) => {
                    log::warn!("Rejecting request `{}`: {}", line.trim_end(), e);
                    Reply::Failure(e.to_string())
                }
            },
            Err(_) => {
                log::warn!("Rejecting {} bytes of non-UTF-8 input", buf.len());
                Reply::Failure(ProtocolError::NotUtf8.to_string())
            }
        };
        writeln!(writer, "{}", reply.encode())?;
        writer.flush()?;
        served += 1;
    }
    log::debug!("Engine server answered {} requests", served);
    Ok(served)
}

fn answer(engine: &mut ClosedFormEngine, request: &Request) -> Reply {
    let numbers = match *request {
        Request::Expm { dt, a } => engine.propagator(a, dt).map(|p| p.elems.to_vec()),
        Request::Control { dt, a, b } => engine
            .control_propagators(a, b, dt)
            .map(|(free, input)| free.elems.iter().chain(&input.elems).copied().collect()),
        Request::Eigen { a } => engine
            .decomposition(a)
            .map(|eigen| eigen_to_numbers(&eigen).to_vec()),
    };
    match numbers {
        Ok(numbers) => Reply::Values(numbers),
        Err(e) => Reply::Failure(e.to_string()),
    }
}

fn join_numbers(numbers: &[f64]) -> String {
    numbers
        .iter()
        .map(|x| format!("{:?}", x))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_numbers<'a>(words: impl Iterator<Item = &'a str>) -> Result<Vec<f64>, ProtocolError> {
    words
        .map(|w| {
            w.parse::<f64>()
                .map_err(|_| ProtocolError::InvalidNumber(w.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::eigendecompose;
    use std::io::Cursor;

    #[test]
    fn test_request_encoding_is_bit_exact() {
        let a = Mat2::new(0.1, -1.0 / 3.0, 1e-300, f64::MAX);
        let request = Request::Control {
            dt: 0.02,
            a,
            b: Mat2::identity(),
        };
        let line = request.encode();
        assert!(line.starts_with("control 0.02 0.1 "));
        assert_eq!(Request::parse(&line), Ok(request));
    }

    #[test]
    fn test_request_errors() {
        assert_eq!(Request::parse("   "), Err(ProtocolError::Empty));
        assert_eq!(
            Request::parse("invert 1 2 3 4"),
            Err(ProtocolError::UnknownCommand("invert".to_string()))
        );
        assert_eq!(
            Request::parse("eigen 1 2 3"),
            Err(ProtocolError::Arity {
                command: "eigen".to_string(),
                expected: 4,
                got: 3
            })
        );
        assert_eq!(
            Request::parse("expm 0.02 1 2 x 4"),
            Err(ProtocolError::InvalidNumber("x".to_string()))
        );
    }

    #[test]
    fn test_reply_parsing() {
        assert_eq!(Reply::parse("ok 1 2.5\n"), Ok(Reply::Values(vec![1.0, 2.5])));
        assert_eq!(Reply::parse("err nope"), Ok(Reply::Failure("nope".to_string())));
        assert_eq!(
            Reply::parse("maybe 1"),
            Err(ProtocolError::MalformedReply("maybe 1".to_string()))
        );
        assert_eq!(Reply::Failure("a\nb".to_string()).encode(), "err a b");
    }

    fn values(line: &str) -> Vec<f64> {
        match Reply::parse(line) {
            Ok(Reply::Values(numbers)) => numbers,
            other => panic!("expected values, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_survives_invalid_utf8() {
        let mut input = b"eigen 1 2 3 4\n".to_vec();
        input.extend_from_slice(b"expm \xff\xfe 1 2 3\n");
        input.extend_from_slice(b"eigen 1 0 0 1\n");
        let mut output = Vec::new();
        let served = serve(Cursor::new(input), &mut output).expect("in-memory io");
        assert_eq!(served, 3, "server stopped at the bad line");

        let text = String::from_utf8(output).expect("utf8");
        let replies: Vec<&str> = text.lines().collect();
        assert_eq!(values(replies[0]).len(), EIGEN_REPLY_LEN);
        assert_eq!(
            Reply::parse(replies[1]),
            Ok(Reply::Failure(ProtocolError::NotUtf8.to_string()))
        );
        assert_eq!(eigen_from_numbers(&values(replies[2])), eigendecompose(Mat2::identity()));
    }

    #[test]
    fn test_serve_answers_each_line() {
        let a = Mat2::from_rows([[1.0, 2.0], [3.0, 4.0]]);
        let input = format!(
            "{}\n\n{}\nbogus\n",
            Request::Eigen { a }.encode(),
            Request::Expm { dt: 0.02, a }.encode()
        );
        let mut output = Vec::new();
        let served = serve(Cursor::new(input), &mut output).expect("in-memory io");
        assert_eq!(served, 3);

        let text = String::from_utf8(output).expect("utf8");
        let replies: Vec<&str> = text.lines().collect();
        assert_eq!(replies.len(), 3);

        assert_eq!(eigen_from_numbers(&values(replies[0])), eigendecompose(a));
        assert_eq!(mat2_from(&values(replies[1])), crate::math::expm2x2(0.02 * a));
        assert!(matches!(Reply::parse(replies[2]), Ok(Reply::Failure(_))));
    }
}
