use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use footprint_features::profile::LifestyleProfile;

/// Where a subcommand writes its result: stdout unless `--output` names a file.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout(_) => f.write_str("stdout"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        let file = File::create(path)
            .with_context(|| format!("Cannot create output file {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    /// Pretty-printed JSON followed by a newline.
    pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Self::create(path)?;
        serde_json::to_writer_pretty(&mut output, value)
            .with_context(|| format!("Cannot write JSON to {output}"))?;
        output.finish()
    }

    pub fn save_text<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: fmt::Display,
    {
        let mut output = Self::create(path)?;
        write!(output, "{value}").with_context(|| format!("Cannot write text to {output}"))?;
        output.finish()
    }

    fn finish(mut self) -> anyhow::Result<()> {
        writeln!(self).with_context(|| format!("Cannot write to {self}"))?;
        self.flush().with_context(|| format!("Cannot flush {self}"))
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

/// Deserializes a JSON document, naming `what` and the path on failure.
pub fn read_json_file<T, P>(what: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Cannot open {what} file {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("{} is not a valid {what} document", path.display()))
}

/// Reads a profile document and checks its numeric answers against the form ranges.
///
/// Unrecognized categorical labels are accepted and encoded as the attribute baseline.
pub fn read_profile_file<P>(path: P) -> anyhow::Result<LifestyleProfile>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let profile: LifestyleProfile = read_json_file("profile", path)?;
    profile
        .validate()
        .with_context(|| format!("Invalid profile: {}", path.display()))?;
    Ok(profile)
}
