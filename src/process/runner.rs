use crate::process::decode::{decode_output, encode_input};
use crate::process::env::merge_environment;
use crate::process::{DecodeDiagnostic, OutputStream, ProcessError, ProcessOutcome, ProcessRequest};
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A child process whose output is collected on worker threads. The completion
/// callback runs on the waiter thread; callers marshal it to their own loop.
#[derive(Debug)]
pub struct ExternalProcess {
    pid: u32,
    killed: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl ExternalProcess {
    pub fn spawn<F>(request: &ProcessRequest, on_exit: F) -> Result<Self, ProcessError>
    where
        F: FnOnce(ProcessOutcome) + Send + 'static,
    {
        let Some(program) = request.argv.first() else {
            return Err(ProcessError::EmptyCommand);
        };

        let env = merge_environment(std::env::vars(), &request.env_overlay);
        let mut command = Command::new(program);
        command
            .args(&request.argv[1..])
            .env_clear()
            .envs(&env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        let missing = |stream| ProcessError::MissingPipe {
            program: program.clone(),
            stream,
        };
        let stdin = child.stdin.take().ok_or_else(|| missing(OutputStream::Stdin))?;
        let mut stdout = child.stdout.take().ok_or_else(|| missing(OutputStream::Stdout))?;
        let mut stderr = child.stderr.take().ok_or_else(|| missing(OutputStream::Stderr))?;

        let input = request
            .stdin_text
            .as_deref()
            .map(|text| encode_input(text, &request.encoding))
            .unwrap_or_default();
        let stdin_writer = thread::spawn(move || {
            let mut stdin = stdin;
            if !input.is_empty() {
                let _ = stdin.write_all(&input);
            }
        });
        let stdout_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            buf
        });
        let stderr_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        });

        let killed = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let waiter_killed = killed.clone();
        let waiter_finished = finished.clone();
        let encoding = request.encoding.clone();

        thread::spawn(move || {
            let status = child.wait();
            let _ = stdin_writer.join();
            let stdout = stdout_reader.join().unwrap_or_default();
            let stderr = stderr_reader.join().unwrap_or_default();

            let mut diagnostics = Vec::new();
            let stdout = decode_stream(&stdout, &encoding, OutputStream::Stdout, &mut diagnostics);
            let mut stderr = decode_stream(&stderr, &encoding, OutputStream::Stderr, &mut diagnostics);
            let exit_code = match status {
                Ok(status) => exit_code_of(status),
                Err(err) => {
                    stderr.push_str(&err.to_string());
                    -1
                }
            };

            waiter_finished.store(true, Ordering::SeqCst);
            on_exit(ProcessOutcome {
                exit_code,
                stdout,
                stderr,
                killed: waiter_killed.load(Ordering::SeqCst),
                diagnostics,
            });
        });

        Ok(Self {
            pid,
            killed,
            finished,
        })
    }

    pub fn is_running(&self) -> bool {
        !self.finished.load(Ordering::SeqCst)
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    /// Requests termination of the child and everything it started. Only the
    /// first call signals; later calls return `false`.
    pub fn kill(&self) -> bool {
        if self.killed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if self.is_running() {
            terminate_tree(self.pid);
        }
        true
    }
}

fn decode_stream(
    bytes: &[u8],
    encoding: &str,
    stream: OutputStream,
    diagnostics: &mut Vec<DecodeDiagnostic>,
) -> String {
    match decode_output(bytes, encoding) {
        Some(text) => text,
        None => {
            diagnostics.push(DecodeDiagnostic {
                stream,
                encoding: encoding.to_string(),
            });
            String::new()
        }
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(unix)]
fn terminate_tree(pid: u32) {
    use nix::sys::signal::{kill, killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    let pid = Pid::from_raw(raw);
    if killpg(pid, Signal::SIGTERM).is_err() {
        let _ = kill(pid, Signal::SIGTERM);
    }
}

#[cfg(windows)]
fn terminate_tree(pid: u32) {
    use std::os::windows::process::CommandExt;
    let _ = Command::new("taskkill")
        .args(["/T", "/F", "/PID"])
        .arg(pid.to_string())
        .creation_flags(CREATE_NO_WINDOW)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(any(unix, windows)))]
fn terminate_tree(pid: u32) {
    let _ = pid;
}
