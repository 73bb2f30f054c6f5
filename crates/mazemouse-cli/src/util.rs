use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, TimeZone};
use mazemouse_engine::{CellGrid, Outcome};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    /// Writes `grid` in the whitespace-separated digit format.
    pub fn write_maze(&mut self, grid: &CellGrid) -> anyhow::Result<()> {
        write!(&mut *self, "{grid}")
            .with_context(|| format!("Failed to write maze to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a maze from a text file
///
/// Accepts the legacy `1.0`/`0.0` tokens as well as plain digits.
pub fn read_maze_file<P>(path: P) -> anyhow::Result<CellGrid>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read maze file: {}", path.display()))?;
    let grid = text
        .parse()
        .with_context(|| format!("Failed to parse maze file: {}", path.display()))?;
    Ok(grid)
}

/// File name for a maze no agent got through.
///
/// `maze_<REASON>_<YYYYMMDD-HHMMSS>_path-<n>.txt`, where the reason is the
/// outcome of the best agent.
pub fn failed_maze_file_name<Tz>(reason: Outcome, time: &DateTime<Tz>, path_length: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "maze_{reason}_{}_path-{path_length}.txt",
        time.format("%Y%m%d-%H%M%S")
    )
}

/// Saves `grid` into `dir`, creating the directory when needed.
pub fn save_failed_maze(
    dir: &Path,
    grid: &CellGrid,
    reason: Outcome,
    path_length: u32,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(failed_maze_file_name(
        reason,
        &chrono::Local::now(),
        path_length,
    ));
    let mut output = Output::open(path.clone())?;
    output.write_maze(grid)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_failed_maze_file_name() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            failed_maze_file_name(Outcome::Crashed, &time, 42),
            "maze_CRASHED_20240305-070809_path-42.txt"
        );
        assert_eq!(
            failed_maze_file_name(Outcome::TimedOut, &time, 7),
            "maze_TIMEDOUT_20240305-070809_path-7.txt"
        );
    }
}
