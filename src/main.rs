use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use picomux::host::{self, SearchStep};
use picomux::{
    try_parse, BoardConfig, BoardVariant, Device, EnableLines, Firmware, PicoLink,
    SimulatedGpio,
};
use std::io::{self, BufRead, Read, Write};
use std::thread;
use std::time::Duration;

mod monitor;

/// PicoControl mux firmware simulator and bench client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// board revision whose wiring to use (v1 or v2)
    #[arg(short = 'b', long, global = true, default_value = "v1")]
    variant: BoardVariant,

    /// enable debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Type commands and see the resulting pin writes
    Manual,
    /// Act as the board on a serial port
    Listen {
        /// serial port to listen on; prompts for one if omitted
        #[arg(short, long)]
        port: Option<String>,
        #[arg(long, default_value_t = host::DEFAULT_BAUD_RATE)]
        baud: u32,
    },
    /// Full-screen view of the simulated pins
    Monitor,
    /// Send commands to a real board
    Send {
        #[arg(short, long)]
        port: Option<String>,
        #[arg(long, default_value_t = host::DEFAULT_BAUD_RATE)]
        baud: u32,
        /// commands such as 0_32 or 2_5; reads stdin if none are given
        commands: Vec<String>,
    },
    /// Walk every channel of every device on a real board
    Sweep {
        #[arg(short, long)]
        port: Option<String>,
        #[arg(long, default_value_t = host::DEFAULT_BAUD_RATE)]
        baud: u32,
        /// pause between commands
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,
    },
    /// Step the scopes across each wavegen channel, waiting for Enter
    Search {
        #[arg(short, long)]
        port: Option<String>,
        #[arg(long, default_value_t = host::DEFAULT_BAUD_RATE)]
        baud: u32,
    },
}

// The main entry point for the command-line simulator application.
fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    } else {
        builder.filter(None, log::LevelFilter::Info);
    }
    builder.init();

    let board = cli.variant.config();
    info!("Using {}", board.name);

    let result = match cli.mode {
        Mode::Manual => run_manual_mode(board),
        Mode::Listen { port, baud } => run_serial_mode(board, port, baud),
        Mode::Monitor => monitor::run(board),
        Mode::Send { port, baud, commands } => run_send(port, baud, commands),
        Mode::Sweep { port, baud, delay_ms } => run_sweep(port, baud, Duration::from_millis(delay_ms)),
        Mode::Search { port, baud } => run_search(port, baud),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

// Handles the manual command input mode.
fn run_manual_mode(board: &'static BoardConfig) -> Result<()> {
    println!("\n--- Manual Mode ({}) ---", board.name);
    println!("Enter commands such as 0_32 or 2_5, or type 'exit' to quit.");
    print_pins(board);
    prompt()?;

    let mut firmware = Firmware::new(board, SimulatedGpio::new());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let input = line.context("failed to read stdin")?;
        let command = input.as_str();

        if command == "exit" {
            break;
        }

        process_and_display_command(&mut firmware, command);
        prompt()?;
    }
    Ok(())
}

// Handles the serial port listening mode.
fn run_serial_mode(board: &'static BoardConfig, port: Option<String>, baud: u32) -> Result<()> {
    println!("\n--- Serial Mode ({}) ---", board.name);

    let port_name = match port {
        Some(name) => name,
        None => choose_port()?,
    };

    let mut port = serialport::new(&port_name, baud)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("failed to open port '{}'", port_name))?;

    println!("\nListening on {} at {} baud. Press Ctrl+C to exit.", port_name, baud);

    let mut firmware = Firmware::new(board, SimulatedGpio::new());
    let mut serial_buf: Vec<u8> = vec![0; 128];
    loop {
        match port.read(serial_buf.as_mut_slice()) {
            Ok(bytes_read) => {
                for &byte in &serial_buf[..bytes_read] {
                    if let Some(cmd) = firmware.feed_byte(byte) {
                        let writes = firmware.dispatcher_mut().gpio_mut().take_journal();
                        println!("> Received: {} ({} pin writes)", cmd, writes.len());
                        for w in writes {
                            println!("    GP{:<2} <- {:?}", w.line, w.level);
                        }
                    }
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
            Err(e) => return Err(e).context("serial port error"),
        }
    }
}

// Lists the available ports and asks which one to use.
fn choose_port() -> Result<String> {
    let ports = serialport::available_ports().context("could not enumerate serial ports")?;
    if ports.is_empty() {
        bail!("no serial ports found");
    }

    println!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("  {}: {}", i, port.port_name);
    }

    print!("Select a port (number): ");
    io::stdout().flush()?;
    let mut port_choice = String::new();
    io::stdin().read_line(&mut port_choice)?;
    match port_choice.trim().parse::<usize>() {
        Ok(i) if i < ports.len() => Ok(ports[i].port_name.clone()),
        _ => bail!("invalid port selection"),
    }
}

fn open_link(port: Option<String>, baud: u32) -> Result<PicoLink<Box<dyn serialport::SerialPort>>> {
    let port_name = port.unwrap_or_else(|| host::default_port().to_string());
    let serial = serialport::new(&port_name, baud)
        .timeout(Duration::from_secs(1))
        .open()
        .with_context(|| format!("failed to connect to Pico on '{}'", port_name))?;
    thread::sleep(host::SETTLE_TIME);
    info!("Connected to Pico on {}", port_name);
    Ok(PicoLink::new(serial))
}

fn run_send(port: Option<String>, baud: u32, commands: Vec<String>) -> Result<()> {
    let mut link = open_link(port, baud)?;

    if !commands.is_empty() {
        for command in &commands {
            warn_if_malformed(command);
            link.send_raw(command).context("failed to send command")?;
            thread::sleep(host::DEFAULT_COMMAND_DELAY);
        }
        return Ok(());
    }

    println!("Enter a command to send to the Pico (or type 'exit' to quit):");
    prompt()?;
    for line in io::stdin().lock().lines() {
        let input = line.context("failed to read stdin")?;
        let command = input.trim();
        if command.eq_ignore_ascii_case("exit") {
            println!("Exiting command loop.");
            break;
        }
        warn_if_malformed(command);
        link.send_raw(command).context("failed to send command")?;
        prompt()?;
    }
    Ok(())
}

fn run_sweep(port: Option<String>, baud: u32, delay: Duration) -> Result<()> {
    let mut link = open_link(port, baud)?;
    for cmd in host::sweep_order() {
        link.send(&cmd).context("failed to send command")?;
        thread::sleep(delay);
    }
    Ok(())
}

fn run_search(port: Option<String>, baud: u32) -> Result<()> {
    let mut link = open_link(port, baud)?;
    let stdin = io::stdin();
    for step in host::search_order() {
        let sent = match step {
            SearchStep::Source(cmd) => link.send(&cmd),
            SearchStep::Probe(cmd) => {
                print!("Press Enter to send {}...", cmd);
                io::stdout().flush()?;
                let mut ack = String::new();
                if stdin.lock().read_line(&mut ack)? == 0 {
                    return Ok(());
                }
                link.send(&cmd)
            }
        };
        sent.context("failed to send command")?;
    }
    Ok(())
}

// Common function to process a command line and print the output.
fn process_and_display_command(firmware: &mut Firmware<SimulatedGpio>, line: &str) {
    warn_if_malformed(line);

    for outcome in firmware.feed_line(line) {
        match outcome.action {
            Some(action) => println!("< {} -> {:?}", outcome.command, action),
            None => println!("< {} ignored", outcome.command),
        }
        for w in outcome.writes {
            println!("    GP{:<2} <- {:?}", w.line, w.level);
        }
    }
}

// The firmware takes anything; this only tells the operator when a line will
// silently fall back to zeros.
fn warn_if_malformed(line: &str) {
    if let Err(e) = try_parse(line) {
        warn!("'{}': {}; the board reads it as {}", line, e, picomux::parse(line));
    }
}

fn print_pins(board: &BoardConfig) {
    for device in Device::ALL {
        let pins = board.pins(device);
        let enable = match pins.enable {
            EnableLines::Single(en) => format!("EN=GP{}", en),
            EnableLines::Dual { a, b } => format!("EN_A=GP{} EN_B=GP{}", a, b),
        };
        println!("  {} ({}): {} S={:?}", device.index(), device, enable, pins.select);
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}
