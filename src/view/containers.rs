use std::io::{self, Write};
use crossterm::{queue, style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor}};

use crate::model::{ContainerRecord, ContainerStatus, ImageRecord};
use crate::registry::Registry;
use super::SIDEBAR_COLS;
use super::shared::{put, put_selectable};

const TOP: u16 = 2;

/// List row for one container: status label, then the name.
pub fn container_line(record: &ContainerRecord) -> String {
    format!(" {:<9} {}", record.status.label(), record.display_name)
}

fn status_color(status: ContainerStatus) -> Color {
    match status {
        ContainerStatus::Running => Color::Green,
        ContainerStatus::Stopping => Color::Yellow,
        ContainerStatus::Down => Color::DarkGrey,
    }
}

/// Containers (display order, selection highlighted), then the image snapshot
/// in whatever rows are left above the status line.
pub fn render_sidebar(out: &mut impl Write, registry: &Registry, images: &[ImageRecord], rows: u16) -> io::Result<()> {
    let width = SIDEBAR_COLS as usize - 1;
    let bottom = rows.saturating_sub(2);
    let mut y = TOP;

    queue!(out, SetAttribute(Attribute::Bold))?;
    put(out, 0, y, " CONTAINERS", width)?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    y += 1;

    let ordered = registry.ordered();
    if ordered.is_empty() {
        put(out, 0, y, "  (none)", width)?;
        y += 1;
    }
    for record in ordered {
        if y >= bottom {
            break;
        }
        if record.selected {
            put_selectable(out, 0, y, &container_line(record), width, true)?;
        } else {
            queue!(out, SetForegroundColor(status_color(record.status)))?;
            put(out, 0, y, &container_line(record), width)?;
            queue!(out, ResetColor)?;
        }
        y += 1;
    }

    y += 1;
    if y + 1 >= bottom {
        return Ok(());
    }
    queue!(out, SetAttribute(Attribute::Bold))?;
    put(out, 0, y, &format!(" IMAGES ({})", images.len()), width)?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    y += 1;
    for image in images {
        if y >= bottom {
            break;
        }
        queue!(out, SetForegroundColor(Color::DarkGrey))?;
        put(out, 0, y, &format!("  {}", image.reference()), width)?;
        queue!(out, ResetColor)?;
        y += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_status_then_name() {
        let record = ContainerRecord::new("web", "w1", ContainerStatus::Stopping);
        assert_eq!(container_line(&record), " stopping  web");
        let down = ContainerRecord::new("db", "d1", ContainerStatus::Down);
        assert_eq!(container_line(&down), " down      db");
    }
}
