use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};

use rd_kits::console::{ColorLogger, TermColor};
use rd_kits::keyboard::KeyboardPoller;
use rd_kits::log_with_color;
use rd_kits::time::ts_now;
use rd_kits::types::DVec;
use rd_kits::{Clock, FilterConfig, ManualClock, Pid, PidGains, TimeoutStateMachine};

#[derive(Parser, Debug)]
#[command(name = "rd_kits")]
#[command(about = "Control-loop utility demos: Kalman filter, timeout FSM, PID", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Use env_logger instead of the coloured logger
    #[arg(long, global = true, default_value_t = false)]
    plain_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a Kalman filter over a synthetic noisy constant
    Kf(KfArgs),
    /// Cycle a timeout-driven state machine, keys interrupt it
    Fsm(FsmArgs),
    /// Drive a first-order plant with the PID controller
    Pid(PidArgs),
}

#[derive(Args, Debug)]
struct KfArgs {
    /// JSON model file; a scalar random-walk model is used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "50")]
    steps: usize,

    /// True value the observations are built around
    #[arg(long, default_value = "1.0")]
    truth: f64,

    /// Amplitude of the deterministic disturbance
    #[arg(long, default_value = "0.2")]
    noise: f64,

    #[arg(long, default_value = "0.1")]
    dt: f64,

    #[arg(long, default_value = "0.0001")]
    q: f64,

    #[arg(long, default_value = "0.04")]
    r: f64,

    #[arg(long, default_value = "1.0")]
    p0: f64,
}

#[derive(Args, Debug)]
struct FsmArgs {
    /// Seconds spent in each phase
    #[arg(long, default_value = "1.0")]
    period: f64,

    /// Loop gap in seconds that forces a return to IDLE
    #[arg(long, default_value = "0.5")]
    watchdog: f64,

    /// Run time in seconds (0 = until q/Esc)
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Do not touch the terminal
    #[arg(long, default_value_t = false)]
    no_keyboard: bool,
}

#[derive(Args, Debug)]
struct PidArgs {
    #[arg(long, default_value = "0.8")]
    kp: f64,

    #[arg(long, default_value = "0.05")]
    ki: f64,

    #[arg(long, default_value = "0.1")]
    kd: f64,

    /// Output and integral bound
    #[arg(long, default_value = "5.0")]
    limit: f64,

    #[arg(long, default_value = "1.0")]
    setpoint: f64,

    #[arg(long, default_value = "100")]
    steps: usize,

    #[arg(long, default_value = "0.05")]
    dt: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: LevelFilter = cli
        .log_level
        .parse()
        .with_context(|| format!("invalid log level '{}'", cli.log_level))?;
    if cli.plain_log {
        env_logger::Builder::new().filter_level(level).init();
    } else {
        ColorLogger::init(level).context("failed to install logger")?;
    }

    match cli.command {
        Command::Kf(args) => run_kf(args),
        Command::Fsm(args) => run_fsm(args),
        Command::Pid(args) => run_pid(args),
    }
}

fn run_kf(args: KfArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => FilterConfig::load(path)
            .with_context(|| format!("failed to load model {}", path.display()))?,
        None => FilterConfig::scalar(args.dt, args.q, args.r, args.p0),
    };
    let mut kf = config
        .build_initialized()
        .context("failed to build filter")?;
    info!(
        "Kalman filter: n={}, m={}, dt={}",
        kf.state_dim(),
        kf.observation_dim(),
        kf.dt()
    );

    for k in 0..args.steps {
        let reading = args.truth + args.noise * (1.7 * k as f64).sin();
        let y = DVec::from_element(kf.observation_dim(), reading);
        kf.update(&y)
            .with_context(|| format!("update {} failed", k))?;
        info!(
            "t={:.2} y={:.4} x_hat={:?}",
            kf.time(),
            reading,
            kf.state().as_slice()
        );
    }

    println!("{}", serde_json::to_string_pretty(&kf.snapshot())?);
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Active,
    Cooldown,
}

impl Phase {
    fn color(self) -> TermColor {
        match self {
            Phase::Idle => TermColor::Blue,
            Phase::Active => TermColor::Green,
            Phase::Cooldown => TermColor::Yellow,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Idle => "IDLE",
            Phase::Active => "ACTIVE",
            Phase::Cooldown => "COOLDOWN",
        };
        f.write_str(name)
    }
}

fn run_fsm(args: FsmArgs) -> Result<()> {
    let keyboard = if args.no_keyboard {
        None
    } else {
        match KeyboardPoller::new() {
            Ok(kb) => Some(kb),
            Err(e) => {
                warn!("keyboard unavailable, running without it: {}", e);
                None
            }
        }
    };
    if keyboard.is_some() {
        log_with_color!(TermColor::White, "any key interrupts, q/Esc quits\r\n");
    }

    let mut machine: TimeoutStateMachine<Phase> = TimeoutStateMachine::new();
    let mut shown = machine.value;
    log_with_color!(shown.color(), "[{}] start in {}\r\n", ts_now(), shown);

    loop {
        if args.duration > 0.0 && machine.clock().now() > args.duration {
            break;
        }

        if let Some(kb) = &keyboard {
            match kb.try_read_char()? {
                Some('q') | Some('\x1b') => break,
                Some(_) => machine.raise_interrupt(),
                None => {}
            }
        }

        if machine.is_interrupted() {
            machine.acknowledge_interrupt();
            machine.value = Phase::Idle;
            machine.reset_timeout();
            log_with_color!(TermColor::Red, "[{}] interrupt\r\n", ts_now());
        }

        // A stalled loop restarts the cycle
        if machine.reentry(Phase::Idle, args.watchdog) {
            warn!("loop stalled for more than {:.2}s", args.watchdog);
        }

        match machine.value {
            Phase::Idle => {
                machine.timeout(Phase::Active, args.period);
            }
            Phase::Active => {
                machine.timeout(Phase::Cooldown, args.period);
            }
            Phase::Cooldown => {
                machine.timeout(Phase::Idle, args.period);
            }
        }

        if machine.value != shown {
            log_with_color!(
                machine.value.color(),
                "[{}] {} -> {}\r\n",
                ts_now(),
                shown,
                machine.value
            );
            shown = machine.value;
        }

        thread::sleep(Duration::from_millis(10));
    }

    log_with_color!(TermColor::Reset, "[{}] stopped in {}\r\n", ts_now(), shown);
    Ok(())
}

fn run_pid(args: PidArgs) -> Result<()> {
    let clock = ManualClock::new(0.0);
    let mut pid = Pid::with_clock(PidGains::new(args.kp, args.ki, args.kd), &clock);
    let mut x = 0.0;

    for step in 0..args.steps {
        let u = pid.calculate(args.setpoint - x, args.limit);
        x += (u - x) * args.dt;
        clock.advance(args.dt);
        if step % 10 == 0 {
            info!(
                "t={:.2} x={:.4} u={:.4} integral={:.4}",
                clock.now(),
                x,
                u,
                pid.integral()
            );
        }
    }

    println!("[{}] final tracking error: {:.4}", ts_now(), args.setpoint - x);
    Ok(())
}
