//! termpress CLI - native REPL over a site fixture
//!
//! Runs the same session, commands and bootstrapper as the browser build,
//! against an in-memory copy of a site loaded from JSON.
//!
//! Usage: termpress-cli [fixture.json] [--path /deep/link]

use futures::executor::block_on;
use std::io::{self, BufRead, IsTerminal};
use termpress::boot;
use termpress::content::SiteFixture;
use termpress::render::TextView;
use termpress::shell::Session;

const DEFAULT_FIXTURE: &str = "fixtures/demo-site.json";

struct Options {
    fixture: String,
    path: String,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        fixture: DEFAULT_FIXTURE.to_string(),
        path: "/".to_string(),
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--path" => {
                options.path = args.next().ok_or("--path needs a value")?;
            }
            "-h" | "--help" => {
                return Err("usage: termpress-cli [fixture.json] [--path /deep/link]".into());
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option: {}", arg)),
            _ => options.fixture = arg,
        }
    }
    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    let fixture = std::fs::read_to_string(&options.fixture)
        .map_err(|e| e.to_string())
        .and_then(|json| SiteFixture::from_json(&json).map_err(|e| e.to_string()));
    let (config, content) = match fixture {
        Ok(fixture) => fixture.into_parts(),
        Err(e) => {
            eprintln!("termpress-cli: {}: {}", options.fixture, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("termpress-cli: {}: {}", options.fixture, e);
        std::process::exit(1);
    }

    // A terminal already shows what was typed
    let interactive = io::stdin().is_terminal();
    let view = if interactive {
        TextView::new(io::stdout()).without_echo()
    } else {
        TextView::new(io::stdout())
    };
    let session = Session::with_view(config, content, Box::new(view));

    block_on(boot::start(&session, &options.path));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {
                let command = line.trim();
                if matches!(command, "exit" | "quit") {
                    break;
                }
                if let Err(e) = block_on(session.submit(command)) {
                    eprintln!("termpress-cli: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}
