use std::io;
use std::process::ExitCode;

use thiserror::Error;

use diffeq_visualizer::app::App;
use diffeq_visualizer::config::{EngineKind, SimConfig};
use diffeq_visualizer::math::{Mat2, Vec2};
use diffeq_visualizer::simulation::{presets, protocol, ControlInput};

const USAGE: &str = "\
usage: diffeq-visualizer [OPTIONS]
       diffeq-visualizer --serve

options:
  --ticks N                      frames to simulate (default 500)
  --dt S                         time step in seconds (default 0.02)
  --matrix a11,a12,a21,a22       dynamics matrix, row-major (default: rotation)
  --oscillator m,k,c             damped harmonic oscillator instead of --matrix
  --control b11,b12,b21,b22:u1,u2  constant input x' = Ax + Bu
  --seed N                       seed for trajectory spawning (default 0)
  --realtime                     pace frames at the target frame rate
  --external PROGRAM [ARGS..]    use an engine process (consumes the remaining arguments)
  --serve                        answer engine requests on stdin/stdout";

const DEFAULT_TICKS: u64 = 500;

#[derive(Error, Debug, PartialEq)]
enum ArgsError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("`{0}` needs a value")]
    MissingValue(&'static str),
    #[error("invalid value `{value}` for `{option}`")]
    InvalidValue { option: &'static str, value: String },
    #[error("`--matrix` and `--oscillator` are mutually exclusive")]
    ConflictingMatrix,
    #[error("oscillator mass must be non-zero")]
    ZeroMass,
}

#[derive(Debug, PartialEq)]
enum Command {
    Simulate(Box<Session>),
    Serve,
    Help,
}

#[derive(Debug, PartialEq)]
struct Session {
    config: SimConfig,
    a: Mat2,
    control: Option<ControlInput>,
    ticks: u64,
    realtime: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, ArgsError> {
    let mut args = args.into_iter();
    let mut config = SimConfig::default();
    let mut matrix = None;
    let mut oscillator = None;
    let mut control = None;
    let mut ticks = DEFAULT_TICKS;
    let mut realtime = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serve" => return Ok(Command::Serve),
            "-h" | "--help" => return Ok(Command::Help),
            "--realtime" => realtime = true,
            "--ticks" => ticks = parse_value("--ticks", args.next())?,
            "--dt" => config.dt = parse_time_step(args.next())?,
            "--seed" => config.seed = parse_value("--seed", args.next())?,
            "--matrix" => {
                let [a11, a12, a21, a22] = parse_list::<4>("--matrix", args.next())?;
                matrix = Some(Mat2::from_rows([[a11, a12], [a21, a22]]));
            }
            "--oscillator" => {
                let [m, k, c] = parse_list::<3>("--oscillator", args.next())?;
                if m == 0.0 {
                    return Err(ArgsError::ZeroMass);
                }
                oscillator = Some(presets::harmonic_oscillator(m, k, c));
            }
            "--control" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--control"))?;
                let invalid = || ArgsError::InvalidValue {
                    option: "--control",
                    value: value.clone(),
                };
                let (b, u) = value.split_once(':').ok_or_else(invalid)?;
                let [b11, b12, b21, b22] = parse_list::<4>("--control", Some(b.to_string()))?;
                let [u1, u2] = parse_list::<2>("--control", Some(u.to_string()))?;
                control = Some(ControlInput {
                    b: Mat2::from_rows([[b11, b12], [b21, b22]]),
                    u: Vec2::new(u1, u2),
                });
            }
            "--external" => {
                let program = args.next().ok_or(ArgsError::MissingValue("--external"))?;
                config.engine = EngineKind::External {
                    program,
                    args: args.by_ref().collect(),
                };
            }
            other => return Err(ArgsError::UnknownOption(other.to_string())),
        }
    }

    let a = match (matrix, oscillator) {
        (Some(_), Some(_)) => return Err(ArgsError::ConflictingMatrix),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => presets::rotation(),
    };

    Ok(Command::Simulate(Box::new(Session {
        config,
        a,
        control,
        ticks,
        realtime,
    })))
}

fn parse_value<T: std::str::FromStr>(
    option: &'static str,
    value: Option<String>,
) -> Result<T, ArgsError> {
    let value = value.ok_or(ArgsError::MissingValue(option))?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue { option, value })
}

/// A finite, strictly positive step
fn parse_time_step(value: Option<String>) -> Result<f64, ArgsError> {
    let dt: f64 = parse_value("--dt", value.clone())?;
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(ArgsError::InvalidValue {
            option: "--dt",
            value: value.unwrap_or_default(),
        })
    }
}

/// Exactly `N` comma-separated numbers
fn parse_list<const N: usize>(
    option: &'static str,
    value: Option<String>,
) -> Result<[f64; N], ArgsError> {
    let value = value.ok_or(ArgsError::MissingValue(option))?;
    let invalid = || ArgsError::InvalidValue {
        option,
        value: value.clone(),
    };
    let numbers = value
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    numbers.try_into().map_err(|_| invalid())
}

fn simulate(session: Session) -> ExitCode {
    let mut app = match App::from_config(&session.config, session.a) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start engine: {}", e);
            return ExitCode::FAILURE;
        }
    };
    app.state_mut().control = session.control;

    let summary = if session.realtime {
        app.run_realtime(session.ticks)
    } else {
        app.run(session.ticks)
    };

    match summary.eigen {
        Some(eigen) => {
            let [l1, l2] = eigen.values;
            log::info!("Eigenvalues: λ1 = {}, λ2 = {}", l1, l2);
        }
        None => log::warn!("No decomposition was produced"),
    }
    if summary.failed_frames > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match parse_args(std::env::args().skip(1)) {
        Ok(Command::Simulate(session)) => simulate(*session),
        Ok(Command::Serve) => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            match protocol::serve(stdin.lock(), stdout.lock()) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("Engine server failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Ok(Command::Help) => {
            println!("{}", USAGE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            ExitCode::from(2)
        }
    }
}
