use std::io::{self, Write};

use procinfo::{ProcFs, ProcInfoError, ProcessEnumerator, ProcessRecord};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: procinfo [OPTIONS]

Options:
  --json              Print records as a JSON array
  --filter <TEXT>     Only show processes whose name, window title or
                      command line contains TEXT (case-insensitive)
  --windowed          Only show processes with a window title
  --proc-root <DIR>   Read processes from DIR instead of the native source
  -h, --help          Print this help";

const NAME_WIDTH: usize = 24;
const TITLE_WIDTH: usize = 32;

/// Command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    json: bool,
    filter: String,
    windowed: bool,
    proc_root: Option<String>,
    help: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Args {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--filter" => parsed.filter = args.next().unwrap_or_default(),
            "--windowed" => parsed.windowed = true,
            "--proc-root" => parsed.proc_root = args.next().filter(|dir| !dir.is_empty()),
            "-h" | "--help" => parsed.help = true,
            other => tracing::warn!(arg = %other, "ignoring unknown argument"),
        }
    }

    parsed
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.help {
        println!("{USAGE}");
        return;
    }

    let records = collect(&args);
    tracing::debug!(count = records.len(), "processes collected");

    if let Err(e) = write_records(&mut io::stdout().lock(), &records, args.json) {
        tracing::error!(error = %e, "failed to write process list");
        std::process::exit(1);
    }
}

/// Enumerate, filter and sort by pid.
fn collect(args: &Args) -> Vec<ProcessRecord> {
    let records = match &args.proc_root {
        Some(root) => ProcFs::with_root(root).enumerate(),
        None => procinfo::enumerate(),
    };
    select(records, args)
}

fn select(mut records: Vec<ProcessRecord>, args: &Args) -> Vec<ProcessRecord> {
    records.retain(|r| r.matches(&args.filter) && (!args.windowed || r.has_window()));
    records.sort_by_key(|r| r.pid);
    records
}

fn write_records(
    out: &mut impl Write,
    records: &[ProcessRecord],
    json: bool,
) -> Result<(), ProcInfoError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, records).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>7}  {:<NAME_WIDTH$}  {:<TITLE_WIDTH$}  COMMAND",
        "PID", "NAME", "WINDOW"
    )?;
    for record in records {
        writeln!(
            out,
            "{:>7}  {:<NAME_WIDTH$}  {:<TITLE_WIDTH$}  {}",
            record.pid,
            clip(&record.name, NAME_WIDTH),
            clip(&record.window_title, TITLE_WIDTH),
            record.command_line
        )?;
    }
    Ok(())
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args(list.iter().map(ToString::to_string))
    }

    fn sample() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord {
                pid: 300,
                name: "code".into(),
                window_title: "main.rs - procinfo".into(),
                command_line: "/usr/share/code/code --unity-launch".into(),
            },
            ProcessRecord {
                pid: 1,
                name: "systemd".into(),
                window_title: String::new(),
                command_line: "/sbin/init splash".into(),
            },
            ProcessRecord {
                pid: 2,
                name: "kthreadd".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn parses_all_flags() {
        let parsed = args(&[
            "--json",
            "--filter",
            "Code",
            "--windowed",
            "--proc-root",
            "/host/proc",
        ]);
        assert_eq!(
            parsed,
            Args {
                json: true,
                filter: "Code".into(),
                windowed: true,
                proc_root: Some("/host/proc".into()),
                help: false,
            }
        );
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let parsed = args(&["--filter"]);
        assert!(parsed.filter.is_empty());

        let parsed = args(&["--proc-root"]);
        assert_eq!(parsed.proc_root, None);
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        assert_eq!(
            args(&["--frobnicate", "-h"]),
            Args {
                help: true,
                ..Args::default()
            }
        );
    }

    #[test]
    fn select_filters_and_sorts() {
        let all = select(sample(), &Args::default());
        let pids: Vec<u32> = all.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![1, 2, 300]);

        let filtered = select(sample(), &args(&["--filter", "INIT"]));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "systemd");

        let windowed = select(sample(), &args(&["--windowed"]));
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].pid, 300);
    }

    #[test]
    fn json_output_round_trips() {
        let records = select(sample(), &Args::default());
        let mut out = Vec::new();
        write_records(&mut out, &records, true).unwrap();

        let parsed: Vec<ProcessRecord> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, records);
        assert!(String::from_utf8(out).unwrap().contains("\"windowTitle\""));
    }

    #[test]
    fn table_output_has_header_and_rows() {
        let records = select(sample(), &Args::default());
        let mut out = Vec::new();
        write_records(&mut out, &records, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("PID") && lines[0].ends_with("COMMAND"));
        assert!(lines[1].trim_start().starts_with("1  systemd"));
        assert!(lines[3].contains("main.rs - procinfo"));
        assert!(lines[3].ends_with("/usr/share/code/code --unity-launch"));
    }

    #[test]
    fn clip_counts_characters() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("exactly-10", 10), "exactly-10");
        assert_eq!(clip("much-too-long-name", 8), "much-to…");
        assert_eq!(clip("ñññññ", 3), "ññ…");
    }
}
