//! Command-line host: load a photo, replay drag gestures, export.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use badgeink_core::{
    ConfigError, EditorConfig, FileImageSource, InputEvent, InputKind, InputModality, Subject,
    container_contains,
};
use clap::{Parser, ValueEnum};
use kurbo::{Point, Rect, Size};
use thiserror::Error;

use crate::editor::EditorError;
use crate::export::{ExportError, ExportOutcome, ExportService};
use crate::host::{Screen, open_editor};
use crate::native::{ClipboardShare, DirectoryDownload};

/// Place a badge on a photo and export the result as PNG.
#[derive(Parser, Debug)]
#[command(name = "badgeink", version, about)]
pub struct Cli {
    /// Subject photo (path or file:// URL).
    pub image: String,

    /// Subject display name. Defaults to the photo's file stem.
    #[arg(long)]
    pub name: Option<String>,

    /// Subject id. Defaults to the name.
    #[arg(long)]
    pub id: Option<String>,

    /// Badge image, overriding the config.
    #[arg(long)]
    pub badge: Option<String>,

    /// JSON editor config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Drag gesture as `x,y:x,y[:x,y...]` in container coordinates. Repeatable.
    #[arg(long = "drag", value_parser = parse_gesture)]
    pub drags: Vec<Gesture>,

    /// Replay gestures as touch events instead of mouse events.
    #[arg(long)]
    pub touch: bool,

    /// On-screen container size as WIDTHxHEIGHT.
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    pub container: Size,

    /// Move events generated between consecutive gesture points.
    #[arg(long, default_value_t = 8)]
    pub steps: u32,

    #[arg(long, value_enum, default_value_t = ExportMode::Share)]
    pub mode: ExportMode,

    /// Where downloads go. Defaults to the user's downloads folder.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    /// Copy to the clipboard, downloading if that fails.
    Share,
    /// Save to the output directory only.
    Download,
}

/// A drag path in container coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub points: Vec<Point>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Failed to load images: {0}")]
    Load(String),
    #[error("No subject to edit, expected one on the command line")]
    NoSubject,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x in '{}'", s))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y in '{}'", s))?;
    Ok(Point::new(x, y))
}

/// Parse `x,y:x,y:...`.
pub fn parse_gesture(s: &str) -> Result<Gesture, String> {
    let points = s
        .split(':')
        .filter(|part| !part.trim().is_empty())
        .map(parse_point)
        .collect::<Result<Vec<_>, _>>()?;
    if points.is_empty() {
        return Err("gesture needs at least one point".to_string());
    }
    Ok(Gesture { points })
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT but got '{}'", s))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("invalid width in '{}'", s))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("invalid height in '{}'", s))?;
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("size must be positive, got '{}'", s));
    }
    Ok(Size::new(w, h))
}

/// Expand a gesture into start, interpolated moves and end.
///
/// The press is followed by a move at the same point, so a single-point
/// gesture still places the badge there. A mouse path that crosses out of
/// `container` ends with a leave at the first outside point, the way the
/// browser ends a mouse drag; touch keeps tracking outside, clamped.
pub fn gesture_events(
    gesture: &Gesture,
    steps: u32,
    modality: InputModality,
    container: Rect,
) -> Vec<InputEvent> {
    let Some(&first) = gesture.points.first() else {
        return Vec::new();
    };
    let last = gesture.points.last().copied().unwrap_or(first);
    let steps = steps.max(1);

    let mut events = vec![
        InputEvent::new(InputKind::Start, first, modality),
        InputEvent::new(InputKind::Move, first, modality),
    ];
    for pair in gesture.points.windows(2) {
        for step in 1..=steps {
            let point = pair[0].lerp(pair[1], step as f64 / steps as f64);
            if modality == InputModality::Pointer && !container_contains(container, point) {
                events.push(InputEvent::pointer_leave(point));
                return events;
            }
            events.push(InputEvent::new(InputKind::Move, point, modality));
        }
    }
    events.push(InputEvent::new(InputKind::End, last, modality));
    events
}

fn default_name(image: &str) -> String {
    Path::new(image)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("subject")
        .to_string()
}

/// Run one edit and export.
pub fn execute(cli: Cli) -> Result<ExportOutcome, CliError> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_json_file(path)?,
        None => EditorConfig::default(),
    };
    if let Some(badge) = cli.badge {
        config.badge_image = badge;
        config.validate()?;
    }

    let name = cli.name.unwrap_or_else(|| default_name(&cli.image));
    let id = cli.id.unwrap_or_else(|| name.clone());
    let subject = Subject::new(id, name, cli.image);

    let (mut editor, ticket) = match open_editor(Some(subject), config)? {
        Screen::Editor { editor, ticket } => (editor, ticket),
        Screen::Redirect(_) => return Err(CliError::NoSubject),
    };

    let source = FileImageSource::new();
    if !pollster::block_on(editor.load_images(ticket, &source)) {
        let reason = editor
            .load_failure()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(CliError::Load(reason));
    }

    let container = Rect::from_origin_size(Point::ZERO, cli.container);
    let modality = if cli.touch {
        InputModality::Touch
    } else {
        InputModality::Pointer
    };
    for gesture in &cli.drags {
        for event in gesture_events(gesture, cli.steps, modality, container) {
            editor.handle_input(&event, container);
        }
    }
    let position = editor.position();
    log::info!("Badge placed at ({:.1}%, {:.1}%)", position.x(), position.y());

    let download = match cli.out_dir {
        Some(dir) => DirectoryDownload::new(dir),
        None => DirectoryDownload::default_location()?,
    };
    let service = ExportService::new(&download);
    let outcome = match cli.mode {
        ExportMode::Share => {
            let clipboard = ClipboardShare::new();
            pollster::block_on(service.with_share(&clipboard).share(&editor))
        }
        ExportMode::Download => service.download(&editor),
    };
    Ok(outcome)
}

/// Parse arguments, run, and report.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    let outcome = match execute(cli) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("Failed to serialize outcome: {}", e),
        }
    } else {
        let notification = outcome.notification();
        println!("{}: {}", notification.title, notification.description);
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
