//! List rendering strategies.
//!
//! Small lists render every group with its header and honor per-group
//! collapse. Past the threshold the list switches to a windowed renderer
//! that materializes only the rows inside the measured viewport (plus
//! overscan). Both produce the same [`ListRow`] sequence shape so selection,
//! drag targets and keyboard focus behave identically.

use std::ops::Range;

use crate::constants::WINDOW_OVERSCAN;
use crate::conversation::{Conversation, DepartmentGroups, GroupExpansion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Grouped,
    Virtualized,
}

impl RenderStrategy {
    /// Strictly more than `threshold` conversations selects the windowed renderer.
    pub fn choose(item_count: usize, threshold: usize) -> Self {
        if item_count > threshold {
            Self::Virtualized
        } else {
            Self::Grouped
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRow<'a> {
    GroupHeader {
        key: &'a str,
        name: &'a str,
        count: usize,
        expanded: bool,
        /// Windowed rows have no collapse concept
        collapsible: bool,
    },
    Conversation {
        conversation: &'a Conversation,
        /// Index in the flattened list, i.e. the keyboard cursor value
        position: usize,
    },
}

/// Capability set shared by both renderers.
pub trait ListRenderer {
    fn strategy(&self) -> RenderStrategy;

    /// Every row of the list in display order.
    fn rows<'a>(
        &self,
        groups: &'a DepartmentGroups<'a>,
        expansion: &GroupExpansion,
    ) -> Vec<ListRow<'a>>;

    /// Rows the host must materialize, given `total` rows.
    fn window(&self, total: usize) -> Range<usize>;

    /// Bring `row` into view.
    fn scroll_to(&mut self, row: usize);

    /// First row shown at the top of the viewport.
    fn offset(&self) -> usize;

    /// Measured viewport height in rows.
    fn height(&self) -> Option<u16>;

    /// The offset as drawn for a list of `total` rows.
    fn visible_offset(&self, total: usize) -> usize {
        self.offset().min(max_offset(self.height(), total))
    }

    /// Jump back to the top of the list.
    fn reset_scroll(&mut self);

    /// Pull the offset back so a list of `total` rows still fills the viewport.
    fn clamp_scroll(&mut self, total: usize);

    /// Record a new viewport height in rows.
    fn on_resize(&mut self, height: u16);
}

/// Keeps `row` inside `[offset, offset + height)`.
fn scrolled_offset(offset: usize, height: Option<u16>, row: usize) -> usize {
    let height = height.map_or(1, |h| (h as usize).max(1));
    if row < offset {
        row
    } else if row >= offset + height {
        row + 1 - height
    } else {
        offset
    }
}

/// Largest offset that still shows the last row at the bottom.
fn max_offset(height: Option<u16>, total: usize) -> usize {
    let height = height.map_or(1, |h| (h as usize).max(1));
    total.saturating_sub(height)
}

#[derive(Debug, Clone, Default)]
pub struct GroupedRenderer {
    offset: usize,
    height: Option<u16>,
}

impl ListRenderer for GroupedRenderer {
    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::Grouped
    }

    fn rows<'a>(
        &self,
        groups: &'a DepartmentGroups<'a>,
        expansion: &GroupExpansion,
    ) -> Vec<ListRow<'a>> {
        let mut rows = Vec::new();
        let mut position = 0;
        for group in groups.iter() {
            let expanded = expansion.is_expanded(group);
            rows.push(ListRow::GroupHeader {
                key: &group.key,
                name: &group.name,
                count: group.len(),
                expanded,
                collapsible: true,
            });
            for conv in &group.conversations {
                if expanded {
                    rows.push(ListRow::Conversation {
                        conversation: conv,
                        position,
                    });
                }
                position += 1;
            }
        }
        rows
    }

    fn window(&self, total: usize) -> Range<usize> {
        0..total
    }

    fn scroll_to(&mut self, row: usize) {
        self.offset = scrolled_offset(self.offset, self.height, row);
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn height(&self) -> Option<u16> {
        self.height
    }

    fn reset_scroll(&mut self) {
        self.offset = 0;
    }

    fn clamp_scroll(&mut self, total: usize) {
        self.offset = self.offset.min(max_offset(self.height, total));
    }

    fn on_resize(&mut self, height: u16) {
        self.height = Some(height);
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowedRenderer {
    offset: usize,
    /// Measured viewport height; nothing is materialized until known
    height: Option<u16>,
}

impl WindowedRenderer {
    pub fn is_measured(&self) -> bool {
        self.height.is_some()
    }
}

impl ListRenderer for WindowedRenderer {
    fn strategy(&self) -> RenderStrategy {
        RenderStrategy::Virtualized
    }

    fn rows<'a>(
        &self,
        groups: &'a DepartmentGroups<'a>,
        _expansion: &GroupExpansion,
    ) -> Vec<ListRow<'a>> {
        let mut rows = Vec::new();
        let mut position = 0;
        for group in groups.iter() {
            rows.push(ListRow::GroupHeader {
                key: &group.key,
                name: &group.name,
                count: group.len(),
                expanded: true,
                collapsible: false,
            });
            for conv in &group.conversations {
                rows.push(ListRow::Conversation {
                    conversation: conv,
                    position,
                });
                position += 1;
            }
        }
        rows
    }

    fn window(&self, total: usize) -> Range<usize> {
        let Some(height) = self.height else {
            return 0..0;
        };
        let offset = self.visible_offset(total);
        let start = offset.saturating_sub(WINDOW_OVERSCAN);
        let end = (offset + height as usize + WINDOW_OVERSCAN).min(total);
        start..end
    }

    fn scroll_to(&mut self, row: usize) {
        self.offset = scrolled_offset(self.offset, self.height, row);
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn height(&self) -> Option<u16> {
        self.height
    }

    fn reset_scroll(&mut self) {
        self.offset = 0;
    }

    fn clamp_scroll(&mut self, total: usize) {
        self.offset = self.offset.min(max_offset(self.height, total));
    }

    fn on_resize(&mut self, height: u16) {
        if self.height != Some(height) {
            tracing::debug!("List viewport measured at {} rows", height);
        }
        self.height = Some(height);
    }
}

/// Row index showing flattened `position`, or its group header when the
/// group is collapsed. Expanded headers are followed by all of their rows.
pub fn row_for_position(rows: &[ListRow<'_>], position: usize) -> Option<usize> {
    let mut start = 0;
    for (i, row) in rows.iter().enumerate() {
        if let ListRow::GroupHeader {
            count, expanded, ..
        } = row
        {
            if position < start + count {
                return Some(if *expanded { i + 1 + (position - start) } else { i });
            }
            start += count;
        }
    }
    None
}
