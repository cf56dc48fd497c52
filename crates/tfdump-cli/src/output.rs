//! Formatted output helpers for CLI commands.

use std::time::Duration;

use tfdump_common::types::ObjectKey;
use tfdump_runtime::engine::DumpReport;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Formats a byte count into a human-readable string (e.g., "128 MiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Prints a summary of a completed dump to stderr.
#[allow(clippy::print_stderr)]
pub fn print_report(key: &ObjectKey, report: &DumpReport, elapsed: Duration) {
    eprintln!();
    eprintln!(
        "  {GREEN}{BOLD}Dumped {key}{RESET} in {:.1}s {DIM}({}, {} entries){RESET}",
        elapsed.as_secs_f64(),
        format_bytes(report.bytes as u64),
        report.entries,
    );
    if let Some(revision) = &report.revision {
        eprintln!("    {DIM}revision:{RESET}  {revision}");
    }
    eprintln!("    {DIM}workdir:{RESET}   {}", report.working_dir.display());
    eprintln!(
        "    {DIM}var file:{RESET}  {} {DIM}({} vars, {} init options){RESET}",
        report.var_file.display(),
        report.variables,
        report.init_options,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_displays_bytes() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn format_bytes_displays_kib() {
        assert_eq!(format_bytes(2048), "2.0 KiB");
    }

    #[test]
    fn format_bytes_displays_mib() {
        assert_eq!(format_bytes(134_217_728), "128.0 MiB");
    }
}
