//! Bounded subprocess execution shared by every backend.

use crate::{DumpOptions, Error, Result};

use futures_lite::io::AsyncReadExt;
use futures_util::FutureExt;

use std::process::Stdio;

/// Run one tool invocation and return its stdout as lossy UTF-8.
///
/// Stdout and stderr capture is capped (`max_output_bytes` / `max_stderr_bytes`)
/// and the whole invocation races `invoke_timeout`: on expiry the child is
/// killed and the call fails with `Error::Timeout`, which callers treat as an
/// ordinary per-call failure.
pub(crate) async fn run(
    opts: &DumpOptions,
    backend: &'static str,
    program: &'static str,
    args: &[&str],
) -> Result<String> {
    let rendered = render_command(program, args);

    let mut cmd = async_process::Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            return Error::BackendUnavailable {
                backend,
                detail: format!("{program} not found"),
            };
        }
        Error::IoError {
            context: format!("spawn {program} failed: {e}"),
        }
    })?;

    let mut stdout = match child.stdout.take() {
        Some(s) => s,
        None => {
            return Err(Error::IoError {
                context: format!("{program} stdout not captured"),
            });
        }
    };

    let mut stderr = child.stderr.take();
    let mut err_buf = Vec::<u8>::new();
    let mut err_tmp = [0u8; 1024];

    let mut out_buf = Vec::<u8>::new();
    let mut out_tmp = [0u8; 4096];
    let mut overflowed = false;

    let timeout = opts.invoke_timeout;
    let mut deadline = crate::runtime::sleep(timeout).fuse();

    loop {
        let n = if let Some(s) = &mut stderr {
            futures_util::select! {
                _ = deadline => {
                    let _ = child.kill();
                    let _ = child.status().await;
                    return Err(Error::Timeout { action: program, timeout });
                }
                n = s.read(&mut err_tmp).fuse() => {
                    let n = n.map_err(|e| Error::IoError { context: format!("read {program} stderr: {e}") })?;
                    if n == 0 {
                        stderr = None;
                    } else {
                        push_limited(&mut err_buf, &err_tmp[..n], opts.max_stderr_bytes);
                    }
                    continue;
                }
                n = stdout.read(&mut out_tmp).fuse() => {
                    n.map_err(|e| Error::IoError { context: format!("read {program} stdout: {e}") })?
                }
            }
        } else {
            futures_util::select! {
                _ = deadline => {
                    let _ = child.kill();
                    let _ = child.status().await;
                    return Err(Error::Timeout { action: program, timeout });
                }
                n = stdout.read(&mut out_tmp).fuse() => {
                    n.map_err(|e| Error::IoError { context: format!("read {program} stdout: {e}") })?
                }
            }
        };

        if n == 0 {
            break;
        }

        if out_buf.len().saturating_add(n) > opts.max_output_bytes {
            overflowed = true;
            break;
        }
        out_buf.extend_from_slice(&out_tmp[..n]);
    }

    if overflowed {
        let _ = child.kill();
        let _ = child.status().await;
        return Err(Error::IoError {
            context: format!(
                "{rendered}: output exceeded {} bytes",
                opts.max_output_bytes
            ),
        });
    }

    let status = child.status().await.map_err(|e| Error::IoError {
        context: format!("wait {program}: {e}"),
    })?;

    if let Some(s) = &mut stderr {
        let _ = drain_to_end_limited(s, &mut err_buf, opts.max_stderr_bytes).await;
    }

    if !status.success() {
        let stderr_str = String::from_utf8_lossy(&err_buf);
        return Err(Error::process_error(
            rendered,
            status.code(),
            stderr_str.as_ref(),
        ));
    }

    Ok(String::from_utf8_lossy(&out_buf).into_owned())
}

async fn drain_to_end_limited(
    stderr: &mut async_process::ChildStderr,
    out: &mut Vec<u8>,
    cap: usize,
) -> std::io::Result<()> {
    let mut tmp = [0u8; 1024];
    loop {
        let n = stderr.read(&mut tmp).await?;
        if n == 0 {
            return Ok(());
        }
        push_limited(out, &tmp[..n], cap);
    }
}

fn push_limited(out: &mut Vec<u8>, chunk: &[u8], cap: usize) {
    if out.len() >= cap {
        return;
    }
    let remaining = cap.saturating_sub(out.len());
    let n = std::cmp::min(chunk.len(), remaining);
    out.extend_from_slice(&chunk[..n]);
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        return program.to_string();
    }
    format!("{program} {}", args.join(" "))
}
