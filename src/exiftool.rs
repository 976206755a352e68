use crate::error::MetasiftError;
use log::{debug, warn};
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Flags passed to every extraction: duplicate tags, family-1 group prefix,
/// short tag names.
pub const EXTRACT_ARGS: [&str; 3] = ["-a", "-G1", "-s"];

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const INSTALL_HINT: &str =
    "Install with: sudo apt-get install libimage-exiftool-perl (or see https://exiftool.org)";

/// Handle to the external `exiftool` executable.
///
/// Unlike a long-running stay-open session, every call to [`ExifTool::extract`]
/// spawns a fresh process, waits for it to exit and collects its output. The
/// wait is unbounded unless a timeout is configured, and can be cut short by
/// an interrupt flag (typically set from a Ctrl-C handler).
#[derive(Debug, Clone)]
pub struct ExifTool {
    executable: PathBuf,
    timeout: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ExifTool {
    /// Uses `exiftool` from `PATH`.
    pub fn new() -> Self {
        Self::with_executable(Path::new("exiftool"))
    }

    /// Uses `exiftool` from a specific path (or any other name resolvable on `PATH`).
    pub fn with_executable(exiftool_path: &Path) -> Self {
        Self {
            executable: exiftool_path.to_path_buf(),
            timeout: None,
            interrupt: None,
        }
    }

    /// Kill the process and fail with [`MetasiftError::Timeout`] once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort the wait with [`MetasiftError::Interrupted`] as soon as `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Resolves the executable on `PATH` without running it.
    ///
    /// Returns [`MetasiftError::MissingDependency`] if it cannot be found.
    pub fn locate(&self) -> Result<PathBuf, MetasiftError> {
        which::which(&self.executable).map_err(|e| {
            debug!("which({}) failed: {}", self.executable.display(), e);
            self.missing_dependency()
        })
    }

    /// Extracts all metadata of `file_path` as `Key: Value` text.
    ///
    /// Runs `exiftool -a -G1 -s {file_path}`. The path is checked first, so a
    /// missing file fails with [`MetasiftError::FileNotFound`] and a directory
    /// with [`MetasiftError::NotAFile`], without spawning anything. Output is
    /// decoded lossily, binary-ish values never abort the run.
    ///
    /// # Example
    /// ```no_run
    /// # use metasift::{ExifTool, MetasiftError};
    /// # use std::path::Path;
    /// # fn main() -> Result<(), MetasiftError> {
    /// let exiftool = ExifTool::new();
    /// let text = exiftool.extract(Path::new("data/image.jpg"))?;
    /// for line in text.lines().filter(|l| l.starts_with("[GPS]")) {
    ///     println!("{}", line);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract(&self, file_path: &Path) -> Result<String, MetasiftError> {
        if !file_path.exists() {
            return Err(MetasiftError::FileNotFound {
                path: file_path.to_path_buf(),
            });
        }
        if !file_path.is_file() {
            return Err(MetasiftError::NotAFile {
                path: file_path.to_path_buf(),
            });
        }

        let path_arg = path_argument(file_path);
        let path_str = path_arg.to_string_lossy();
        let mut args = EXTRACT_ARGS.to_vec();
        args.push(path_str.as_ref());

        let stdout_bytes = self.execute_raw(&args)?;
        Ok(String::from_utf8_lossy(&stdout_bytes).into_owned())
    }

    /// Runs `exiftool {args...}` and returns stdout once the process exits successfully.
    ///
    /// stderr is inspected after exit: `Error: File not found - X` becomes
    /// [`MetasiftError::FileNotFound`], `Warning:` lines are logged. Any non-zero
    /// exit status becomes [`MetasiftError::ExtractionFailed`].
    pub fn execute_raw(&self, args: &[&str]) -> Result<Vec<u8>, MetasiftError> {
        let command_args = args.join(" ");
        debug!("Running {} {}", self.executable.display(), command_args);
        let started = Instant::now();

        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => self.missing_dependency(),
                _ => MetasiftError::Io(e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stderr"))?;

        // Drain both pipes while waiting, a full pipe would stall the child.
        let stdout_handle: JoinHandle<std::io::Result<Vec<u8>>> = thread::spawn(move || {
            let mut buffer = Vec::with_capacity(4096);
            BufReader::new(stdout).read_to_end(&mut buffer)?;
            Ok(buffer)
        });
        let stderr_handle: JoinHandle<Vec<String>> = thread::spawn(move || {
            BufReader::new(stderr)
                .lines()
                .map_while(Result::ok)
                .collect()
        });

        // On timeout or interrupt the reader threads are left detached: a
        // grandchild may still hold the pipes open.
        let status = self.wait(&mut child, &command_args)?;

        let stdout_bytes = stdout_handle
            .join()
            .map_err(|_| std::io::Error::other("stdout reader thread panicked"))??;
        let stderr_lines = stderr_handle
            .join()
            .map_err(|_| std::io::Error::other("stderr reader thread panicked"))?;

        debug!(
            "exiftool finished with {} in {:?} ({} bytes stdout, {} stderr lines)",
            status,
            started.elapsed(),
            stdout_bytes.len(),
            stderr_lines.len()
        );

        for err_line in &stderr_lines {
            if let Some(filename) = err_line.strip_prefix("Error: File not found - ") {
                return Err(MetasiftError::FileNotFound {
                    path: PathBuf::from(filename.trim()),
                });
            } else if err_line.contains("Warning:") {
                warn!("ExifTool Warning - {}", err_line);
            }
        }

        if !status.success() {
            return Err(MetasiftError::ExtractionFailed {
                code: status.code(),
                stderr: stderr_lines.join("\n"),
                command_args,
            });
        }

        Ok(stdout_bytes)
    }

    fn wait(&self, child: &mut Child, command_args: &str) -> Result<ExitStatus, MetasiftError> {
        let started = Instant::now();
        loop {
            if self.is_interrupted() {
                kill(child);
                return Err(MetasiftError::Interrupted);
            }

            if let Some(status) = child.try_wait()? {
                // Ctrl-C reaches the child too, it usually dies before we poll the flag.
                if !status.success() && self.is_interrupted() {
                    return Err(MetasiftError::Interrupted);
                }
                return Ok(status);
            }

            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    warn!("exiftool did not finish within {:?}, killing it", limit);
                    kill(child);
                    return Err(MetasiftError::Timeout {
                        command_args: command_args.to_string(),
                        after: limit,
                    });
                }
            }

            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn missing_dependency(&self) -> MetasiftError {
        MetasiftError::MissingDependency {
            tool: self.executable.display().to_string(),
            hint: INSTALL_HINT.to_string(),
        }
    }
}

/// `-photo.jpg` would be read as an option, `./-photo.jpg` is not.
fn path_argument(file_path: &Path) -> PathBuf {
    match file_path.components().next() {
        Some(Component::Normal(_)) => Path::new(".").join(file_path),
        _ => file_path.to_path_buf(),
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
