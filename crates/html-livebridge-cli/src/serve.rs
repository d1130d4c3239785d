//! JSON-lines bridge: `FromPreview` messages in on stdin, `ToPreview`
//! messages out on stdout, one JSON object per line.

use anyhow::Result;
use html_livebridge_config::PreviewConfig;
use html_livebridge_engine::models::HtmlFile;
use html_livebridge_engine::protocol::{FromPreview, ToPreview};
use html_livebridge_engine::session::{HostAction, PreviewSession};
use html_livebridge_engine::{Document, HostDocument, io};
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

pub fn run(file: HtmlFile, config: PreviewConfig) -> Result<()> {
    let text = io::read_html_file(&file)?;
    let document = Document::from_bytes(text.as_bytes())?;
    let mut session = PreviewSession::new(document, file.base_uri(), config.clone());
    log::info!("serving {}", file.absolute_path().display());

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut out = std::io::stdout().lock();
    emit(&mut out, &session.set_config(config))?;

    loop {
        let received = match session.next_deadline() {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match FromPreview::from_json(&line) {
                Ok(message) => {
                    for action in session.handle_message(message, Instant::now()) {
                        carry_out(&mut out, &file, &session, action)?;
                    }
                }
                Err(err) => log::warn!("ignoring malformed message: {err}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(update) = session.poll(Instant::now()) {
            emit(&mut out, &update)?;
        }
    }

    log::info!("input closed, stopping");
    Ok(())
}

fn carry_out(
    out: &mut impl Write,
    file: &HtmlFile,
    session: &PreviewSession<Document>,
    action: HostAction,
) -> Result<()> {
    match action {
        HostAction::Post(message) => emit(out, &message)?,
        HostAction::DocumentChanged => {
            // The edit stays in the session; the next successful save writes it
            if let Err(err) = io::write_html_file(file, &session.document().text()) {
                log::warn!("could not save {}: {err}", file.absolute_path().display());
            }
        }
        HostAction::RevealSelection { start, end } => {
            log::info!(
                "selection {}:{}..{}:{}",
                start.line + 1,
                start.column,
                end.line + 1,
                end.column
            );
        }
        HostAction::OpenDevtools => log::info!("devtools are not available in serve mode"),
        HostAction::Notify(notice) => log::warn!("{notice}"),
    }
    Ok(())
}

fn emit(out: &mut impl Write, message: &ToPreview) -> Result<()> {
    writeln!(out, "{}", message.to_json()?)?;
    out.flush()?;
    Ok(())
}
