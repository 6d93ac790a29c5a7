//! Line-oriented console over an [`OwnerPreviewSession`].
//!
//! Each input line is the complete content of the owner field; each
//! published preview state is written as one JSON line.

use anyhow::Context;
use msc_app::{OwnerPreviewSession, PreviewSubscription};
use msc_core::PublishedState;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info_span, Instrument};

/// Drive `session` from `reader` until end of input.
///
/// Every publication, starting with the state current at startup, is written
/// to `writer`. At end of input the driver waits until no resolution is
/// scheduled or in flight, writes whatever is still queued and tears the
/// session down. Returns the settled state, which is also the last line
/// written.
pub async fn run_console<R, W>(
    session: &OwnerPreviewSession,
    reader: R,
    mut writer: W,
) -> anyhow::Result<PublishedState>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let span = info_span!("console.run");
    async move {
        let mut updates = session.subscribe();
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line.context("Failed to read owner input")? {
                        Some(line) => session.update_input(&line),
                        None => break,
                    }
                }
                Some(state) = updates.next() => write_state(&mut writer, &state).await?,
            }
        }

        debug!("input closed, waiting for preview to settle");
        let settled = settle(session, &mut updates, &mut writer).await?;
        session.teardown();
        Ok(settled)
    }
    .instrument(span)
    .await
}

async fn settle<W>(
    session: &OwnerPreviewSession,
    updates: &mut PreviewSubscription,
    writer: &mut W,
) -> anyhow::Result<PublishedState>
where
    W: AsyncWrite + Unpin,
{
    while session.is_busy() {
        match updates.next().await {
            Some(state) => write_state(writer, &state).await?,
            None => break,
        }
    }
    while let Some(state) = updates.try_next() {
        write_state(writer, &state).await?;
    }
    Ok(session.snapshot())
}

async fn write_state<W>(writer: &mut W, state: &PublishedState) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(state).context("Failed to encode preview state")?;
    line.push(b'\n');
    writer
        .write_all(&line)
        .await
        .context("Failed to write preview state")?;
    writer.flush().await.context("Failed to flush preview output")?;
    Ok(())
}
