//! Usage and version text.
//!
//! Build identifiers are fixed at compile time and handed to the printer
//! explicitly rather than read from globals.

use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub program: String,
    pub version: &'static str,
    pub build_date: &'static str,
}

impl BuildInfo {
    /// Identifiers baked in by the build. `RUNAPP_BUILD_DATE` may be set by
    /// the release pipeline; it reads `unknown` otherwise.
    pub fn current(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: env!("CARGO_PKG_VERSION"),
            build_date: option_env!("RUNAPP_BUILD_DATE").unwrap_or("unknown"),
        }
    }

    /// Derive the program name from `argv[0]`, keeping only the file name.
    pub fn from_argv0(argv0: Option<&str>) -> Self {
        let program = argv0
            .and_then(|arg| std::path::Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        Self::current(program)
    }

    pub fn write_version<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{}: version {}, build {}",
            self.program, self.version, self.build_date
        )
    }

    pub fn write_usage<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let prog = &self.program;
        writeln!(out, "Usage:     {prog} [-h] [-V] [--init-log FILE] [--] COMMAND [ARGS...]")?;
        writeln!(out)?;
        writeln!(out, "Commands:")?;
        writeln!(out)?;
        writeln!(out, "  COMMAND         - app and args to execute. app requires full path.")?;
        writeln!(out, "  --              - args after this flag are reserved for COMMAND.")?;
        writeln!(out, "  -h, --help      - print this help message.")?;
        writeln!(out, "  --init-log FILE - write {prog} output to FILE.")?;
        writeln!(out, "  -V, --version   - print version info.")?;
        writeln!(out)?;
        writeln!(out, "Environment:")?;
        writeln!(out)?;
        writeln!(out, "  RUNAPP_SIGNAL__TIMEOUT_MS - wait per escalation step (default 2000).")?;
        writeln!(
            out,
            "  RUNAPP_SIGNAL__FALLBACK   - signals tried after the received one (default TERM)."
        )?;
        writeln!(out, "  RUNAPP_LOG__LEVEL         - log level (default info).")?;
        writeln!(out, "  RUNAPP_LOG__FORMAT        - full, compact, pretty or json.")?;
        Ok(())
    }

    pub fn print_version(&self) {
        let _ = self.write_version(&mut io::stdout().lock());
    }

    pub fn print_usage(&self) {
        let _ = self.write_usage(&mut io::stdout().lock());
    }
}
