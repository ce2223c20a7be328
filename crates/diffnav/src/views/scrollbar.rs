use ratatui::style::Style;
use ratatui::text::Line;

use super::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarCell {
    Track,
    Thumb,
}

/// Scrollbar cells for a window of `height` rows at `offset` into `total`.
///
/// Returns `None` when everything fits.
pub fn scrollbar(offset: usize, height: usize, total: usize) -> Option<Vec<ScrollbarCell>> {
    if height == 0 || total <= height {
        return None;
    }
    let thumb = (height * height / total).clamp(1, height);
    let max_offset = total - height;
    let travel = height - thumb;
    let start = (offset.min(max_offset) * travel + max_offset / 2) / max_offset;

    Some(
        (0..height)
            .map(|row| {
                if row >= start && row < start + thumb {
                    ScrollbarCell::Thumb
                } else {
                    ScrollbarCell::Track
                }
            })
            .collect(),
    )
}

pub fn scrollbar_lines(cells: &[ScrollbarCell]) -> Vec<Line<'static>> {
    cells
        .iter()
        .map(|cell| match cell {
            ScrollbarCell::Thumb => Line::styled("█", Style::default().fg(style::HUNK)),
            ScrollbarCell::Track => Line::styled("│", style::muted()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb(cells: &[ScrollbarCell]) -> (usize, usize) {
        let start = cells
            .iter()
            .position(|c| *c == ScrollbarCell::Thumb)
            .expect("thumb");
        let len = cells.iter().filter(|c| **c == ScrollbarCell::Thumb).count();
        (start, len)
    }

    #[test]
    fn test_hidden_when_content_fits() {
        assert!(scrollbar(0, 20, 20).is_none());
        assert!(scrollbar(0, 20, 5).is_none());
        assert!(scrollbar(0, 0, 5).is_none());
    }

    #[test]
    fn test_thumb_length_and_travel() {
        let cells = scrollbar(0, 10, 100).expect("bar");
        assert_eq!(cells.len(), 10);
        assert_eq!(thumb(&cells), (0, 1));

        let cells = scrollbar(90, 10, 100).expect("bar");
        assert_eq!(thumb(&cells), (9, 1));

        let cells = scrollbar(45, 10, 100).expect("bar");
        assert_eq!(thumb(&cells), (5, 1));

        let cells = scrollbar(0, 10, 20).expect("bar");
        assert_eq!(thumb(&cells), (0, 5));
    }

    #[test]
    fn test_huge_content_keeps_one_cell_thumb() {
        let cells = scrollbar(500_000, 40, 1_000_000).expect("bar");
        assert_eq!(thumb(&cells).1, 1);
    }
}
