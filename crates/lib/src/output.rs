//! Status line formatting.
//!
//! Each kind of status line has a [`Tone`]; [`paint`] applies it according to
//! the configured [`ColorMode`] and the stream the line is headed for.

use std::time::Duration;

use owo_colors::{AnsiColors, OwoColorize, Stream};

use crate::options::ColorMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Plain,
  /// Echoed command lines.
  Command,
  /// Breadcrumbs and target names.
  Target,
  Info,
  Warning,
  Error,
  Success,
}

impl Tone {
  fn color(self) -> Option<AnsiColors> {
    match self {
      Tone::Plain => None,
      Tone::Command => Some(AnsiColors::Magenta),
      Tone::Target => Some(AnsiColors::Cyan),
      Tone::Info | Tone::Success => Some(AnsiColors::Green),
      Tone::Warning => Some(AnsiColors::Yellow),
      Tone::Error => Some(AnsiColors::Red),
    }
  }
}

/// Colorizes `text` for a sink.
///
/// `stream` is the terminal stream behind the sink, or `None` for a custom
/// writer. In `Auto` mode custom writers are never colorized.
pub fn paint(text: &str, tone: Tone, mode: ColorMode, stream: Option<Stream>) -> String {
  let Some(color) = tone.color() else {
    return text.to_string();
  };

  match (mode, stream) {
    (ColorMode::Never, _) | (ColorMode::Auto, None) => text.to_string(),
    (ColorMode::Always, _) => text.color(color).to_string(),
    (ColorMode::Auto, Some(stream)) => text.if_supports_color(stream, |s| s.color(color)).to_string(),
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}
