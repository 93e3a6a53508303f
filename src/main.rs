use std::error::Error;
use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::thread;

use clap::{Parser, Subcommand};
use desk_clock::{
    AlertDriver, AlertState, AudioStatus, ClockEngine, ClockTime, Config, StateChange, Ticker,
    TICK_PERIOD,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// arm an alarm at startup, formatted HH:MM
    #[clap(long, short)]
    alarm: Option<String>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
}

/// everything the shell reacts to, multiplexed onto one channel so all
/// engine calls happen on this thread
enum ShellEvent {
    Tick(ClockTime),
    Input(String),
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("desk_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    if let Some(Command::Init { force }) = args.command {
        if let Some(path) = Config::config_path() {
            if force || !Config::is_config_present() {
                Config::new().save(&path)?;
                println!("wrote default config to {}", path.display());
            }
        }
        return Ok(());
    }

    let config = Config::config_path().map_or_else(Config::new, |path| Config::load(&path));
    let mut engine = ClockEngine::new(AlertDriver::initialize(config.tone));
    let changes = engine.subscribe();
    if let AudioStatus::Degraded(reason) = engine.audio_status() {
        println!("note: {reason}");
    }

    if let Some(time) = args.alarm {
        let (hour, minute) = parse_alarm_time(&time)?;
        engine.request_arm(hour, minute)?;
    }

    let (tx, rx) = mpsc::channel();
    let tick_tx = tx.clone();
    let _ticker = Ticker::spawn(TICK_PERIOD, move |now| {
        let _ = tick_tx.send(ShellEvent::Tick(now));
    });
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(ShellEvent::Input(line)).is_err() {
                break;
            }
        }
    });

    println!("commands: arm HH:MM, cancel, stop, quit");
    for event in rx {
        match event {
            ShellEvent::Tick(now) => {
                engine.handle_tick(now);
                render(now, &engine, &config);
            }
            ShellEvent::Input(line) => {
                if !handle_command(line.trim(), &mut engine) {
                    break;
                }
            }
        }
        for change in changes.try_iter() {
            announce(change, &engine, &config);
        }
    }
    Ok(())
}

/// one status line, redrawn in place every tick
fn render(now: ClockTime, engine: &ClockEngine, config: &Config) {
    let snapshot = engine.current_state();
    let time = now.format(&config.time_format);
    match snapshot.state {
        AlertState::Firing => print!("\r{time}  ALARM! type stop to silence it        "),
        AlertState::Armed => {
            if let Some(target) = snapshot.target {
                print!("\r{time}  (alarm {})        ", target.format(&config.time_format));
            }
        }
        AlertState::Idle => print!("\r{time}                                          "),
    }
    let _ = std::io::stdout().flush();
}

fn announce(change: StateChange, engine: &ClockEngine, config: &Config) {
    match change {
        StateChange::Armed(target) => {
            println!("\nalarm set for {}", target.format(&config.time_format));
        }
        StateChange::Cancelled => println!("\nalarm cancelled"),
        StateChange::Firing(_) => {
            println!("\nALARM! type stop to silence it");
            if let AudioStatus::Degraded(reason) = engine.audio_status() {
                println!("note: {reason}");
            }
        }
        StateChange::Stopped => println!("\nalarm stopped"),
    }
}

/// returns false when the shell should exit
fn handle_command(line: &str, engine: &mut ClockEngine) -> bool {
    match line {
        "" => {}
        "quit" | "exit" | "q" => return false,
        "stop" => engine.request_stop(),
        "cancel" => engine.request_cancel(),
        _ => {
            if let Some(time) = line.strip_prefix("arm ") {
                match parse_alarm_time(time.trim()) {
                    Ok((hour, minute)) => {
                        if let Err(e) = engine.request_arm(hour, minute) {
                            println!("{e}");
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            } else {
                println!("unknown command {line:?}, try arm HH:MM, cancel, stop, or quit");
            }
        }
    }
    true
}

/// input validation lives here, before anything reaches the engine
fn parse_alarm_time(time: &str) -> Result<(u32, u32), String> {
    let (hour, minute) = time
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got {time:?}"))?;
    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| format!("{hour:?} is not a valid hour"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| format!("{minute:?} is not a valid minute"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("{hour:02}:{minute:02} is out of range"));
    }
    Ok((hour, minute))
}
