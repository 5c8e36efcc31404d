//! yed-go - Go syntax highlighting and gofmt-on-save
//!
//! Command line front end that drives the plugin the way the editor
//! does: load a file, optionally save it through the formatter, then
//! draw every row.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yed_go::error::{ConfigError, PluginError, Result};
use yed_go::format::{self, SubprocessOutput};
use yed_go::render::{describe_spans, render_line};
use yed_go::{BufferId, BufferInfo, BufferKind, Config, Event, FrameInfo, GoPlugin, Host};

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr, `warn` and above unless RUST_LOG says otherwise
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// How rows are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Color,
    Plain,
    Spans,
}

/// Parsed command line
struct Options {
    format: bool,
    output: Output,
    config: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options {
        format: false,
        output: Output::Color,
        config: None,
        files: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--format" | "-f" => options.format = true,
            "--no-color" => options.output = Output::Plain,
            "--spans" => options.output = Output::Spans,
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| PluginError::Usage("--config needs a path".to_string()))?;
                options.config = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => {
                return Err(PluginError::Usage(format!("unknown option `{}`", other)));
            }
            file => options.files.push(PathBuf::from(file)),
        }
    }

    if options.files.is_empty() {
        return Err(PluginError::Usage("no input files (try --help)".to_string()));
    }
    Ok(Some(options))
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let config = match &options.config {
        Some(path) => match Config::load_from(path) {
            Err(ConfigError::Parse(err)) => {
                warn!("Invalid config at {:?}: {}", path, err);
                Config::default()
            }
            loaded => loaded?,
        },
        None => Config::load(),
    };
    let theme = config.theme();
    let mut plugin = GoPlugin::new(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (id, path) in options.files.iter().enumerate() {
        let filetype = plugin
            .syntax()
            .handles_path(path)
            .then(|| config.filetype.clone());
        let mut host = CliHost::open(id, path, filetype)?;
        debug!(path = %path.display(), rows = host.lines.len(), "loaded");

        let buffer = host.buffer.clone();
        plugin.handle(&mut host, Event::BufferPostLoad { buffer: &buffer });
        if options.format {
            plugin.handle(&mut host, Event::BufferPostWrite { buffer: &buffer });
        }

        let frame = host.frame();
        plugin.handle(&mut host, Event::FramePreBuffDraw { frame: &frame });

        if options.files.len() > 1 {
            writeln!(out, "==> {} <==", path.display())?;
        }

        let lines = host.lines.clone();
        for (row, text) in lines.iter().enumerate() {
            let spans = plugin.handle(&mut host, Event::LinePreDraw { frame: &frame, row, text });
            match options.output {
                Output::Color => writeln!(out, "{}", render_line(text, &spans, &theme))?,
                Output::Plain => writeln!(out, "{}", text)?,
                Output::Spans if !spans.is_empty() => {
                    writeln!(out, "{}", describe_spans(row, text, &spans))?
                }
                Output::Spans => {}
            }
        }

        plugin.syntax_mut().remove_cache(id);
    }

    plugin.unload();
    out.flush()?;
    Ok(())
}

/// A one-frame editor holding a single file buffer
struct CliHost {
    buffer: BufferInfo,
    lines: Vec<String>,
}

impl CliHost {
    fn open(id: BufferId, path: &Path, filetype: Option<String>) -> Result<Self> {
        let lines = read_lines(path)?;
        let buffer = BufferInfo {
            id,
            kind: BufferKind::File,
            filetype,
            path: Some(path.to_path_buf()),
        };
        Ok(Self { buffer, lines })
    }

    fn frame(&self) -> FrameInfo {
        FrameInfo {
            buffer: Some(self.buffer.clone()),
            top_row: 0,
        }
    }
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read(path)?;
    let text = String::from_utf8_lossy(&contents);
    Ok(text.lines().map(str::to_string).collect())
}

impl Host for CliHost {
    fn active_frame(&self) -> Option<FrameInfo> {
        Some(self.frame())
    }

    fn line(&self, _buffer: BufferId, row: usize) -> Option<String> {
        self.lines.get(row).cloned()
    }

    fn run_subprocess(
        &mut self,
        program: &str,
        args: &[OsString],
        timeout: Option<Duration>,
    ) -> io::Result<SubprocessOutput> {
        format::run_process(program, args, timeout)
    }

    fn reload_buffer(&mut self, _buffer: BufferId) -> io::Result<()> {
        if let Some(path) = self.buffer.path.clone() {
            self.lines = read_lines(&path)?;
        }
        Ok(())
    }

    fn message(&mut self, text: &str) {
        eprintln!("{}", text);
    }

    fn error(&mut self, text: &str) {
        eprintln!("error: {}", text);
    }
}

fn print_usage() {
    println!("yed-go {} - Go highlighting and gofmt-on-save", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: yed-go [OPTIONS] FILE...");
    println!();
    println!("Options:");
    println!("  -f, --format       Run the formatter on each file first");
    println!("      --no-color     Print the text without styling");
    println!("      --spans        Print classified spans instead of text");
    println!("  -c, --config PATH  Read settings from PATH");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Settings are read from ~/.yed-go.toml when --config is not given.");
    println!("Set RUST_LOG=debug for diagnostics.");
}

fn print_version() {
    println!("yed-go {}", env!("CARGO_PKG_VERSION"));
}
