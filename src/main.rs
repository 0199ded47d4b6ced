//! arrayfile - print lines or records of a large file by position
//!
//! Thin command-line front end over the library views.

use anyhow::{Context, Result};
use arrayfile::loaders::{open_csv_with, open_with};
use arrayfile::{Encoding, LineAccess, Record, Slice, ViewOptions};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fmt::Display;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("arrayfile")
        .version(arrayfile::VERSION)
        .about("Random access into large line-oriented and CSV files")
        .long_about(
            "arrayfile memory-maps a file, indexes its line boundaries on first use and \
             prints selected lines or records without reading the whole file into memory.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the file to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("index")
                .short('n')
                .long("index")
                .help("Print the line at this position (negative counts from the end)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(isize)),
        )
        .arg(
            Arg::new("slice")
                .short('s')
                .long("slice")
                .help("Print lines selected by a START:STOP[:STEP] slice"),
        )
        .arg(
            Arg::new("range")
                .short('r')
                .long("range")
                .help("Stream lines START..END from the mapping"),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .long("count")
                .help("Print the number of lines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Parse lines as delimited records")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("header")
                .long("header")
                .help("Treat the first line as field names (implies --csv)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delimiter")
                .short('d')
                .long("delimiter")
                .help("Field delimiter for --csv")
                .value_parser(clap::value_parser!(char)),
        )
        .arg(
            Arg::new("line-delimiter")
                .long("line-delimiter")
                .help("Record separator, e.g. '\\n\\n' (escapes \\n \\r \\t \\\\ accepted)"),
        )
        .arg(
            Arg::new("encoding")
                .short('e')
                .long("encoding")
                .help("Text encoding: utf-8, utf-8-lossy, latin-1, ascii"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with view options"),
        )
        .get_matches();

    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .context("file argument is required")?,
    );
    let options = load_options(&matches)?;
    log::debug!("options: {:?}", options);

    if options.csv.is_some() {
        let view = open_csv_with(&file_path, &options)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        run(&view, &matches, format_record)
    } else {
        let view = open_with(&file_path, &options)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        run(&view, &matches, |line: String| line)
    }
}

/// Config file (explicit or default location) overlaid with command-line flags
fn load_options(matches: &ArgMatches) -> Result<ViewOptions> {
    let config_path = match matches.get_one::<String>("config") {
        Some(path) => Some(PathBuf::from(path)),
        None => dirs::config_dir()
            .map(|dir| dir.join("arrayfile").join("config.toml"))
            .filter(|path| path.is_file()),
    };

    let mut options = match config_path {
        Some(path) => ViewOptions::from_toml_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ViewOptions::default(),
    };

    if let Some(label) = matches.get_one::<String>("encoding") {
        options.encoding = label.parse::<Encoding>()?;
    }
    if let Some(delimiter) = matches.get_one::<String>("line-delimiter") {
        options.line_delimiter = Some(unescape(delimiter));
    }

    let header = matches.get_flag("header");
    let delimiter = matches.get_one::<char>("delimiter").copied();
    if matches.get_flag("csv") || header || delimiter.is_some() {
        let mut csv = options.csv.take().unwrap_or_default();
        if header {
            csv.header = true;
        }
        if let Some(delimiter) = delimiter {
            csv.delimiter = delimiter;
        }
        options.csv = Some(csv);
    }

    options.validate()?;
    Ok(options)
}

fn run<V, T, F>(view: &V, matches: &ArgMatches, format: F) -> Result<()>
where
    V: LineAccess,
    F: Fn(V::Item) -> T,
    T: Display,
{
    if matches.get_flag("count") {
        println!("{}", view.len()?);
        return Ok(());
    }

    if let Some(&index) = matches.get_one::<isize>("index") {
        println!("{}", format(view.get(index)?));
        return Ok(());
    }

    if let Some(spec) = matches.get_one::<String>("slice") {
        for item in view.get_slice(parse_slice(spec)?)? {
            println!("{}", format(item));
        }
        return Ok(());
    }

    let items = match matches.get_one::<String>("range") {
        Some(spec) => {
            let (start, end) = parse_range(spec)?;
            view.iter_range(start, end)?
        }
        None => view.iter()?,
    };
    for item in items {
        println!("{}", format(item?));
    }
    Ok(())
}

fn format_record(record: Record) -> String {
    match record {
        Record::Fields(fields) => fields.join("\t"),
        Record::Named(named) => named
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .chain(named.rest().iter().cloned())
            .collect::<Vec<_>>()
            .join("\t"),
    }
}

/// `START:STOP[:STEP]`, each part optional
fn parse_slice(spec: &str) -> Result<Slice> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        anyhow::bail!("slice must look like START:STOP[:STEP], got {spec:?}");
    }

    let bound = |part: &str| -> Result<Option<isize>> {
        if part.is_empty() {
            Ok(None)
        } else {
            Ok(Some(part.parse().with_context(|| {
                format!("invalid slice bound {part:?}")
            })?))
        }
    };

    let step = match parts.get(2) {
        Some(&part) => bound(part)?.unwrap_or(1),
        None => 1,
    };
    Ok(Slice::new(bound(parts[0])?, bound(parts[1])?, step))
}

/// `START..END` or `START:END`
fn parse_range(spec: &str) -> Result<(usize, usize)> {
    let (start, end) = spec
        .split_once("..")
        .or_else(|| spec.split_once(':'))
        .with_context(|| format!("range must look like START..END, got {spec:?}"))?;
    Ok((
        start.trim().parse().context("invalid range start")?,
        end.trim().parse().context("invalid range end")?,
    ))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
