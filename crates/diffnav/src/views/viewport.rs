//! Scrolling strategies over diff content

use super::content::VirtualContent;
use super::layout::ContentLayout;
use crate::app::ViewMode;
use diffnav_core::WordDiffCache;
use ratatui::text::Line;

/// Content with at most this many rows is rendered up front
pub const VIRTUAL_THRESHOLD: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPosition {
    Top,
    Bottom,
    Percent(u8),
}

impl ScrollPosition {
    pub fn label(self) -> String {
        match self {
            ScrollPosition::Top => "Top".to_string(),
            ScrollPosition::Bottom => "Bot".to_string(),
            ScrollPosition::Percent(pct) => format!("{pct}%"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scroll {
    offset: usize,
    height: usize,
    total: usize,
}

impl Scroll {
    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    fn set(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    fn position(&self) -> ScrollPosition {
        let max = self.max_offset();
        if self.offset == 0 {
            ScrollPosition::Top
        } else if self.offset >= max {
            ScrollPosition::Bottom
        } else {
            ScrollPosition::Percent((self.offset * 100 / max) as u8)
        }
    }

    fn window(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + self.height).min(self.total)
    }
}

/// Every row rendered once when the content is built
#[derive(Debug)]
pub struct MaterializedView {
    content: VirtualContent,
    lines: Vec<Line<'static>>,
    scroll: Scroll,
}

impl MaterializedView {
    pub fn new(content: VirtualContent, height: usize, cache: &mut WordDiffCache) -> Self {
        let total = content.total_lines();
        let lines = (0..total).map(|row| content.render_row(row, cache)).collect();
        Self {
            content,
            lines,
            scroll: Scroll {
                offset: 0,
                height,
                total,
            },
        }
    }
}

/// Renders only the rows inside the window on each frame
#[derive(Debug)]
pub struct VirtualViewport {
    content: VirtualContent,
    scroll: Scroll,
}

impl VirtualViewport {
    pub fn new(content: VirtualContent, height: usize) -> Self {
        let total = content.total_lines();
        Self {
            content,
            scroll: Scroll {
                offset: 0,
                height,
                total,
            },
        }
    }
}

#[derive(Debug)]
pub enum DiffViewport {
    Materialized(MaterializedView),
    Virtual(VirtualViewport),
}

impl DiffViewport {
    /// Pick a strategy by size: more than `threshold` rows renders virtually
    pub fn new(
        content: VirtualContent,
        height: usize,
        threshold: usize,
        cache: &mut WordDiffCache,
    ) -> Self {
        if content.total_lines() > threshold {
            tracing::debug!(rows = content.total_lines(), "using virtual viewport");
            DiffViewport::Virtual(VirtualViewport::new(content, height))
        } else {
            DiffViewport::Materialized(MaterializedView::new(content, height, cache))
        }
    }

    /// Rebuild for a new mode or width, keeping the offset clamped to the new total
    pub fn rebuild(
        &self,
        mode: ViewMode,
        width: u16,
        threshold: usize,
        cache: &mut WordDiffCache,
    ) -> Self {
        let content = self.content().rebuilt(mode, width);
        let mut viewport = Self::new(content, self.height(), threshold, cache);
        viewport.set_offset(self.offset());
        viewport
    }

    fn scroll(&self) -> &Scroll {
        match self {
            DiffViewport::Materialized(view) => &view.scroll,
            DiffViewport::Virtual(view) => &view.scroll,
        }
    }

    fn scroll_mut(&mut self) -> &mut Scroll {
        match self {
            DiffViewport::Materialized(view) => &mut view.scroll,
            DiffViewport::Virtual(view) => &mut view.scroll,
        }
    }

    pub fn content(&self) -> &VirtualContent {
        match self {
            DiffViewport::Materialized(view) => &view.content,
            DiffViewport::Virtual(view) => &view.content,
        }
    }

    pub fn layout(&self) -> &ContentLayout {
        self.content().layout()
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, DiffViewport::Virtual(_))
    }

    pub fn scroll_up(&mut self, n: usize) {
        let offset = self.offset().saturating_sub(n);
        self.scroll_mut().set(offset);
    }

    pub fn scroll_down(&mut self, n: usize) {
        let offset = self.offset().saturating_add(n);
        self.scroll_mut().set(offset);
    }

    pub fn goto_top(&mut self) {
        self.scroll_mut().set(0);
    }

    pub fn goto_bottom(&mut self) {
        self.scroll_mut().set(usize::MAX);
    }

    pub fn offset(&self) -> usize {
        self.scroll().offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.scroll_mut().set(offset);
    }

    pub fn max_offset(&self) -> usize {
        self.scroll().max_offset()
    }

    pub fn total_lines(&self) -> usize {
        self.scroll().total
    }

    pub fn height(&self) -> usize {
        self.scroll().height
    }

    /// Resize the window, re-clamping the offset
    pub fn set_height(&mut self, height: usize) {
        let scroll = self.scroll_mut();
        scroll.height = height;
        let offset = scroll.offset;
        scroll.set(offset);
    }

    pub fn position(&self) -> ScrollPosition {
        self.scroll().position()
    }

    /// The rows inside the window
    pub fn render(&self, cache: &mut WordDiffCache) -> Vec<Line<'static>> {
        match self {
            DiffViewport::Materialized(view) => view.lines[view.scroll.window()].to_vec(),
            DiffViewport::Virtual(view) => view
                .scroll
                .window()
                .map(|row| view.content.render_row(row, cache))
                .collect(),
        }
    }
}
