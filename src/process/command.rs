use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// The executable to supervise and the arguments passed to it verbatim.
///
/// The program path is handed straight to `exec`; no shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl AppCommand {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a command line into program and arguments. Returns `None` when
    /// the line is empty.
    pub fn from_argv(argv: Vec<OsString>) -> Option<Self> {
        let mut tokens = argv.into_iter();
        let program = tokens.next()?;
        Some(Self {
            program: PathBuf::from(program),
            args: tokens.collect(),
        })
    }
}

impl fmt::Display for AppCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
