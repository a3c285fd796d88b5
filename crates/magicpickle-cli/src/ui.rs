//! UI utilities for MagicPickle CLI.

use std::time::Duration;

const MIN_BOX_WIDTH: usize = 33;

/// A formatted box for displaying a relayed instruction.
pub struct CommandBox<'a> {
    command: &'a str,
    route: Option<(&'a str, &'a str)>,
}

impl<'a> CommandBox<'a> {
    /// Create a new command box.
    #[must_use]
    pub const fn new(command: &'a str) -> Self {
        Self {
            command,
            route: None,
        }
    }

    /// Add the source and target panes to the box.
    #[must_use]
    pub const fn with_route(mut self, from: &'a str, to: &'a str) -> Self {
        self.route = Some((from, to));
        self
    }

    /// Display the command box to stdout.
    pub fn display(&self) {
        let route_line = self
            .route
            .map(|(from, to)| format!("pane {} -> pane {}", from, to));
        let width = box_width(self.command, route_line.as_deref());

        println!("  ┌{}┐", "─".repeat(width));
        println!("  │{}│", " ".repeat(width));
        println!("  │{}│", center_in_box(self.command, width));
        println!("  │{}│", " ".repeat(width));

        if let Some(route_line) = route_line {
            println!("  │{}│", center_in_box(&route_line, width));
            println!("  │{}│", " ".repeat(width));
        }

        println!("  └{}┘", "─".repeat(width));
    }
}

fn box_width(command: &str, route: Option<&str>) -> usize {
    let longest = command
        .chars()
        .count()
        .max(route.map_or(0, |r| r.chars().count()));
    (longest + 4).max(MIN_BOX_WIDTH)
}

fn center_in_box(content: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(content_len);
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), content, " ".repeat(right))
}

/// Format a byte count as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format an elapsed duration as "5s ago", "3m ago", "2h ago" or "4d ago".
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
