use std::env;
use std::fs::File;
use std::io;
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use xmrs::codec::{Format, WriteOptions};
use xmrs::Xmrs;

pub type Err = Box<dyn std::error::Error + 'static>;

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} convert --from FORMAT --to FORMAT [options] [PATH]

Reads PATH (or stdin) and writes the converted structures to stdout.
Formats: simplemrs (mrs), simpledmrs (dmrs, write only)

Options:
  -h, --help          Print this message
  -p, --pretty-print  One section or node per line
  -c, --color         Ask for colored output",
    prog_name
  )
}

struct Args {
  from: Format,
  to: Format,
  path: Option<String>,
  pretty_print: bool,
  color: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "xmrs"));
    }

    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap_or_else(|| "xmrs".to_string());

    match iter.next() {
      Some(o) if o == "-h" || o == "--help" => {
        println!("{}", usage(&prog_name));
        process::exit(0);
      }
      Some(o) if o == "convert" => {}
      Some(o) => {
        return Err(Self::make_error_message(
          &format!("unknown command {}", o),
          prog_name,
        ));
      }
      None => return Err(Self::make_error_message("missing command", prog_name)),
    }

    let mut from: Option<Format> = None;
    let mut to: Option<Format> = None;
    let mut path: Option<String> = None;
    let mut pretty_print = false;
    let mut color = false;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-p" || o == "--pretty-print" {
        pretty_print = true;
      } else if o == "-c" || o == "--color" {
        color = true;
      } else if o == "--from" || o == "--to" {
        let name = iter.next().ok_or_else(|| {
          Self::make_error_message(&format!("{} needs a format", o), &prog_name)
        })?;
        let format = Format::from_name(&name).ok_or_else(|| {
          Self::make_error_message(&format!("unknown format {}", name), &prog_name)
        })?;
        if o == "--from" {
          from = Some(format);
        } else {
          to = Some(format);
        }
      } else if path.is_none() && !o.starts_with('-') {
        path = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    match (from, to) {
      (Some(from), Some(to)) => Ok(Self {
        from,
        to,
        path,
        pretty_print,
        color,
      }),
      (None, _) => Err(Self::make_error_message("missing --from", prog_name)),
      (_, None) => Err(Self::make_error_message("missing --to", prog_name)),
    }
  }
}

fn convert(opts: &Args) -> Result<(), Err> {
  let reader = opts.from.reader();
  let writer = opts.to.writer();

  let results = match &opts.path {
    Some(path) => reader.read(&mut File::open(path)?)?,
    None => reader.read(&mut io::stdin().lock())?,
  };
  let ms = results.collect::<Result<Vec<Xmrs>, _>>()?;
  info!(structures = ms.len(), "read input");

  let mut options = WriteOptions {
    pretty_print: opts.pretty_print,
    ..WriteOptions::default()
  };
  if opts.color {
    options = options.with_color(None);
  }

  writer.write(&mut io::stdout().lock(), &ms, &options)?;
  Ok(())
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  if let Err(e) = convert(&opts) {
    warn!(error = %e, "conversion failed");
    eprintln!("{}", e);
    process::exit(1);
  }
  Ok(())
}
