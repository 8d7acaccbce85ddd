//! Gridterm Headless Runner
//!
//! Feeds a byte stream through the interpreter without a shell or display
//! and prints the resulting grid. Useful for testing and reproducing
//! rendering issues from captured shell output.

use std::io::{self, Read};
use std::process::ExitCode;

use gridterm::app::{init_logging, Config};
use gridterm::core::Snapshot;
use gridterm::Terminal;

fn main() -> ExitCode {
    init_logging("warn");

    let args: Vec<String> = std::env::args().collect();
    let defaults = Config::default();

    // Parse command line arguments
    let mut cols = defaults.columns;
    let mut rows = defaults.rows;
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut display_control_chars = false;
    let mut chunk_size: Option<usize> = None;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().unwrap_or(defaults.columns);
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().unwrap_or(defaults.rows);
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "--chunk" => {
                i += 1;
                if i < args.len() {
                    chunk_size = args[i].parse().ok().filter(|&n| n > 0);
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "--show-control" => {
                display_control_chars = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cols == 0 || rows == 0 {
        eprintln!("Grid dimensions must be non-zero");
        return ExitCode::FAILURE;
    }

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    let mut terminal = Terminal::new(cols as usize, rows as usize);
    terminal.set_display_control_chars(display_control_chars);
    match chunk_size {
        Some(n) => input_data.chunks(n).for_each(|chunk| terminal.process(chunk)),
        None => terminal.process(&input_data),
    }
    terminal.finish();

    let snapshot = Snapshot::capture(terminal.grid(), &terminal.cursor());
    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", cols, rows);
            println!("Cursor: ({}, {})", snapshot.cursor_row, snapshot.cursor_col);
            println!("---");
            for line in &snapshot.text {
                println!("{}", line);
            }
            println!("---");
        },
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Gridterm Headless Runner");
    println!();
    println!("Usage: gridterm-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>     Set terminal width (default: 80)");
    println!("  -r, --rows <N>     Set terminal height (default: 20)");
    println!("  -f, --file <PATH>  Read input from file");
    println!("      --chunk <N>    Feed input in N-byte pieces");
    println!("      --show-control Place control bytes into the grid");
    println!("  -j, --json         Output snapshot as JSON");
    println!("  -t, --text         Output snapshot as text (default)");
    println!("  -h, --help         Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  printf 'ab\\ncd\\x1b[2;5Hx' | gridterm-headless");
    println!("  gridterm-headless -c 40 -r 10 --chunk 7 capture.bin");
}
