//! Clipboard access by piping text into an external command.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::{io::AsyncWriteExt, process::Command};

/// Run `command` (program plus whitespace-separated arguments) with `text` on
/// its stdin. Fails if the program cannot be started or exits unsuccessfully.
pub async fn copy(command: &str, text: &str) -> Result<()> {
  let mut parts = command.split_whitespace();
  let program = parts.next().context("clipboard command is empty")?;

  let mut child = Command::new(program)
    .args(parts)
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("starting clipboard command {program:?}"))?;

  if let Some(mut stdin) = child.stdin.take() {
    stdin
      .write_all(text.as_bytes())
      .await
      .context("writing to clipboard command")?;
  }

  let status = child.wait().await.context("waiting for clipboard command")?;
  if !status.success() {
    bail!("clipboard command {program:?} exited with {status}");
  }
  Ok(())
}
