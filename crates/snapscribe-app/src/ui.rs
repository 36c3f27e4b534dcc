use std::io::BufRead;

use anyhow::Context;
use kanal::AsyncReceiver;
use snapscribe_types::{
    AppEvent, CaptureRegion, Point, PointerEvent, RecognitionStatus, UiEvent,
};

use crate::controller::UiHandle;

pub const HELP: &str = "Commands: select | down/move/up X Y | cancel | capture X Y W H | \
quick X Y W H [noocr] | ocr | stop | save | reset | quit";

/// Read stdin lines on a plain thread. A blocked read cannot be cancelled,
/// so it must not hold up runtime shutdown.
pub fn spawn_stdin_reader() -> AsyncReceiver<String> {
    let (tx, rx) = kanal::bounded(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx.to_async()
}

/// Console front-end. Ends once the backend reports `Shutdown`.
pub async fn ui_loop(handle: UiHandle, lines: AsyncReceiver<String>) -> anyhow::Result<()> {
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.recv(), if input_open => {
                let event = match line {
                    Ok(line) => match parse_command(&line) {
                        Ok(Some(event)) => event,
                        Ok(None) => continue,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    },
                    // End of input
                    Err(_) => AppEvent::Shutdown,
                };

                if matches!(event, AppEvent::Shutdown) {
                    input_open = false;
                }
                handle
                    .to_app
                    .send(event)
                    .await
                    .context("Backend stopped accepting events")?;
            }
            event = handle.from_app.recv() => {
                let event = event.context("Backend channel closed")?;
                if let Some(text) = render_event(&event) {
                    println!("{text}");
                }
                if matches!(event, AppEvent::Shutdown) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Send `events`, then shut the backend down and collect everything it
/// reported on the way.
pub async fn drive(handle: &UiHandle, events: Vec<AppEvent>) -> anyhow::Result<Vec<AppEvent>> {
    for event in events.into_iter().chain([AppEvent::Shutdown]) {
        handle
            .to_app
            .send(event)
            .await
            .context("Backend stopped accepting events")?;
    }

    let mut seen = Vec::new();
    loop {
        let event = handle
            .from_app
            .recv()
            .await
            .context("Backend channel closed")?;
        if let Some(text) = render_event(&event) {
            println!("{text}");
        }
        if matches!(event, AppEvent::Shutdown) {
            break;
        }
        seen.push(event);
    }

    Ok(seen)
}

pub fn parse_command(line: &str) -> Result<Option<AppEvent>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    if command.starts_with('#') {
        return Ok(None);
    }
    let args: Vec<&str> = parts.collect();

    let event = match command.to_ascii_lowercase().as_str() {
        "select" | "begin" => AppEvent::BeginSelection,
        "down" => AppEvent::Pointer(PointerEvent::Down(parse_point(&args)?)),
        "move" => AppEvent::Pointer(PointerEvent::Move(parse_point(&args)?)),
        "up" => AppEvent::Pointer(PointerEvent::Up(parse_point(&args)?)),
        "cancel" | "esc" => AppEvent::Pointer(PointerEvent::Cancel),
        "capture" => AppEvent::Capture(parse_region(&args)?),
        "quick" => {
            let region = parse_region(&args[..args.len().min(4)])?;
            let ocr = match args.get(4) {
                None => true,
                Some(flag) if flag.eq_ignore_ascii_case("noocr") => false,
                Some(other) => return Err(format!("unexpected argument '{other}'")),
            };
            AppEvent::QuickCapture { region, ocr }
        }
        "ocr" | "extract" => AppEvent::ExtractText,
        "stop" => AppEvent::CancelExtraction,
        "save" => AppEvent::Save,
        "reset" => AppEvent::Reset,
        "quit" | "exit" => AppEvent::Shutdown,
        "help" => return Err(HELP.to_string()),
        other => return Err(format!("Unknown command '{other}'. {HELP}")),
    };

    Ok(Some(event))
}

fn parse_numbers<const N: usize>(args: &[&str]) -> Result<[i32; N], String> {
    if args.len() != N {
        return Err(format!("expected {N} numbers, got {}", args.len()));
    }
    let mut numbers = [0; N];
    for (slot, arg) in numbers.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| format!("'{arg}' is not a whole number"))?;
    }
    Ok(numbers)
}

fn parse_point(args: &[&str]) -> Result<Point, String> {
    let [x, y] = parse_numbers(args)?;
    Ok(Point::new(x, y))
}

fn parse_region(args: &[&str]) -> Result<CaptureRegion, String> {
    let [x, y, width, height] = parse_numbers(args)?;
    Ok(CaptureRegion::new(x, y, width, height))
}

pub fn render_event(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::BackendReady => Some(format!("Ready. {HELP}")),
        AppEvent::UiEvent(UiEvent::ShowOverlay) => {
            Some("Selecting: down X Y, move X Y, up X Y or cancel".to_string())
        }
        AppEvent::UiEvent(UiEvent::DrawSelection(region)) => Some(format!("  selection {region}")),
        AppEvent::UiEvent(other) => {
            tracing::trace!("Window instruction {:?}", other);
            None
        }
        AppEvent::SelectionResolved(region) => Some(format!("Selected {region}")),
        AppEvent::CaptureTaken {
            region,
            sequence,
            bounds_warning,
        } => {
            let mut text = format!("Captured #{sequence}: {region}");
            if let Some(warning) = bounds_warning {
                text.push_str(&format!("\nWarning: {warning}"));
            }
            Some(text)
        }
        AppEvent::TextExtracted { sequence, result } => Some(match result.status {
            RecognitionStatus::Available if result.text.trim().is_empty() => {
                format!("No text found in capture #{sequence}")
            }
            RecognitionStatus::Available => {
                format!("Text from capture #{sequence}:\n{}", result.text)
            }
            RecognitionStatus::Unavailable | RecognitionStatus::ExtractionError => format!(
                "No text for capture #{sequence}: {}",
                result.message.as_deref().unwrap_or("unknown error")
            ),
        }),
        AppEvent::ArtifactSaved { image, descriptor } => Some(format!(
            "Saved {} and {}",
            image.display(),
            descriptor.display()
        )),
        AppEvent::ArtifactFailed {
            message,
            orphaned_image,
        } => Some(match orphaned_image {
            Some(image) => format!("Save failed: {message} (image kept at {})", image.display()),
            None => format!("Save failed: {message}"),
        }),
        AppEvent::StatusUpdate { status, busy } => {
            tracing::debug!(busy, "{}", status);
            Some(format!("> {status}"))
        }
        AppEvent::SelectionCancelled | AppEvent::Shutdown => None,
        // Front-end -> backend events are never sent this way
        AppEvent::BeginSelection
        | AppEvent::Pointer(_)
        | AppEvent::Capture(_)
        | AppEvent::ExtractText
        | AppEvent::QuickCapture { .. }
        | AppEvent::Save
        | AppEvent::Reset
        | AppEvent::CancelExtraction => None,
    }
}
