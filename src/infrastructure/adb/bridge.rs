use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use bytes::{Bytes, BytesMut};
use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead};
use tracing::{debug, info, warn};

use crate::config::settings::AppConfig;
use crate::modules::launch::error::LaunchError;
use crate::modules::launch::model::LaunchRequest;

pub const VIEW_ACTION: &str = "android.intent.action.VIEW";

// Lines of each stream kept for the failure report.
const CAPTURE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub fn label(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: OutputSource,
    pub text: String,
}

/// Launches the YouTube TV app on a device through `adb`.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
    serial: Option<String>,
    package: String,
}

impl AdbBridge {
    pub fn new(
        program: impl Into<PathBuf>,
        serial: Option<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            serial,
            package: package.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.adb_path.clone(),
            config.adb_serial.clone(),
            config.tv_package.clone(),
        )
    }

    /// The `am start` invocation run by the device shell.
    pub fn intent_command(&self, request: &LaunchRequest) -> String {
        let url = request.canonical_url();
        [
            "am",
            "start",
            "-a",
            VIEW_ACTION,
            "-d",
            url.as_str(),
            "-p",
            self.package.as_str(),
        ]
        .iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Full argv, program first.
    pub fn command_line(&self, request: &LaunchRequest) -> Vec<String> {
        let mut argv = vec![self.program.display().to_string()];
        if let Some(serial) = &self.serial {
            argv.push("-s".to_string());
            argv.push(serial.clone());
        }
        argv.push("exec-out".to_string());
        argv.push(self.intent_command(request));
        argv
    }

    pub fn spawn(&self, request: &LaunchRequest) -> Result<LaunchProcess, LaunchError> {
        let argv = self.command_line(request);
        debug!("Spawning {:?}", argv);

        let mut child = Command::new(&self.program)
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LaunchError::failed(format!(
                    "{} was not found. Please check your PATH.",
                    self.program.display()
                )),
                _ => LaunchError::failed(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                )),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LaunchError::failed("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| LaunchError::failed("stderr was not captured"))?;

        info!(
            "📺 Launching video {} from {} (pid {:?})",
            request.video_id(),
            request.url,
            child.id()
        );

        Ok(LaunchProcess {
            child,
            output: stream::select(
                read_lines(stdout, OutputSource::Stdout),
                read_lines(stderr, OutputSource::Stderr),
            )
            .boxed(),
            stdout_tail: VecDeque::new(),
            stderr_tail: VecDeque::new(),
        })
    }
}

/// A running launch. Dropping it kills the child.
pub struct LaunchProcess {
    child: Child,
    output: BoxStream<'static, OutputLine>,
    stdout_tail: VecDeque<String>,
    stderr_tail: VecDeque<String>,
}

impl LaunchProcess {
    /// Next line from either stream, `None` once both are closed.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        let line = self.output.next().await?;
        let tail = match line.source {
            OutputSource::Stdout => &mut self.stdout_tail,
            OutputSource::Stderr => &mut self.stderr_tail,
        };
        if tail.len() == CAPTURE_LIMIT {
            tail.pop_front();
        }
        tail.push_back(line.text.clone());
        Some(line)
    }

    /// Drains whatever output is left and waits for exit. Returns the exit code on success.
    pub async fn finish(mut self) -> Result<i32, LaunchError> {
        while self.next_line().await.is_some() {}

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| LaunchError::failed(format!("failed to wait for process: {}", e)))?;

        match status.code() {
            Some(0) => Ok(0),
            code => {
                let reason = self.failure_reason(code);
                warn!("Launch process exited unsuccessfully: {}", reason);
                Err(LaunchError::exited(code, reason))
            }
        }
    }

    fn failure_reason(&self, code: Option<i32>) -> String {
        let status = match code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };

        let captured = if self.stderr_tail.is_empty() {
            &self.stdout_tail
        } else {
            &self.stderr_tail
        };

        if captured.is_empty() {
            status
        } else {
            let text = captured.iter().cloned().collect::<Vec<_>>().join("\n");
            format!("{}: {}", status, text)
        }
    }
}

/// Longest output line relayed as-is. Longer lines are replaced by a marker.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

enum Chunk {
    Line(Bytes),
    TooLong,
}

/// Newline framing that reports an oversized line once and keeps reading.
///
/// `FramedRead` ends the stream after a decoder error, so the length error of
/// the inner codec is turned into an item instead.
struct OutputCodec {
    inner: AnyDelimiterCodec,
}

impl OutputCodec {
    fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\n".to_vec(),
                max_length,
            ),
        }
    }

    fn map(
        result: Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<Chunk>, AnyDelimiterCodecError> {
        match result {
            Ok(chunk) => Ok(chunk.map(Chunk::Line)),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Chunk::TooLong)),
            Err(e) => Err(e),
        }
    }
}

impl Decoder for OutputCodec {
    type Item = Chunk;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, Self::Error> {
        Self::map(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, Self::Error> {
        Self::map(self.inner.decode_eof(buf))
    }
}

fn read_lines<R>(reader: R, source: OutputSource) -> BoxStream<'static, OutputLine>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    read_lines_with_limit(reader, source, MAX_LINE_BYTES)
}

fn read_lines_with_limit<R>(
    reader: R,
    source: OutputSource,
    max_length: usize,
) -> BoxStream<'static, OutputLine>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    FramedRead::new(reader, OutputCodec::new(max_length))
        .filter_map(move |chunk| {
            future::ready(match chunk {
                Ok(Chunk::Line(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes);
                    Some(OutputLine {
                        source,
                        text: text.trim_end_matches('\r').to_string(),
                    })
                }
                Ok(Chunk::TooLong) => {
                    warn!("Dropped a {} line longer than {} bytes", source.label(), max_length);
                    Some(OutputLine {
                        source,
                        text: format!("[line longer than {} bytes omitted]", max_length),
                    })
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", source.label(), e);
                    None
                }
            })
        })
        .boxed()
}

/// POSIX shell quoting; words made only of safe characters pass through untouched.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r#"'"'"'"#))
    }
}
