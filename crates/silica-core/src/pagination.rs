//! Stateless windowing over result lists.
//!
//! The interactive view keeps no session on the server: the client sends
//! the start offset of each list with every request, and [`window`] is a
//! pure function of `(list, start, page_size)`. Out-of-range starts (for
//! example after paging back past the first window) are clamped, never an
//! error.

use serde::{Deserialize, Serialize};

use crate::models::{Amplicon, Primer, ResultData};

/// Visible slice of a list plus navigation hints.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'a, T> {
    pub visible: &'a [T],
    /// Clamped start offset actually used.
    pub start: usize,
    pub has_more: bool,
    /// Start of the following window (equals the list length at the end).
    pub next_start: usize,
    pub has_previous: bool,
    /// Start of the preceding window, saturating at 0.
    pub previous_start: usize,
}

/// Compute the window `[start, start + page_size)` of `items`.
pub fn window<T>(items: &[T], start: i64, page_size: usize) -> Window<'_, T> {
    let len = items.len();
    let start = start.clamp(0, len as i64) as usize;
    let end = start.saturating_add(page_size).min(len);

    Window {
        visible: &items[start..end],
        start,
        has_more: start.saturating_add(page_size) < len,
        next_start: end,
        has_previous: start > 0,
        previous_start: start.saturating_sub(page_size),
    }
}

/// Owned, serializable form of a [`Window`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub start: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub next_start: usize,
    pub has_previous: bool,
    pub previous_start: usize,
}

impl<T: Clone> Page<T> {
    pub fn of(items: &[T], start: i64, page_size: usize) -> Self {
        let w = window(items, start, page_size);
        Self {
            items: w.visible.to_vec(),
            total: items.len(),
            start: w.start,
            page_size,
            has_more: w.has_more,
            next_start: w.next_start,
            has_previous: w.has_previous,
            previous_start: w.previous_start,
        }
    }
}

/// Which list is shown first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Amplicon,
    Primer,
}

impl Focus {
    /// Amplicons when any were found, primers otherwise.
    pub fn default_for(data: &ResultData) -> Self {
        if data.amplicon.is_empty() {
            Focus::Primer
        } else {
            Focus::Amplicon
        }
    }
}

/// Per-request window positions, carried by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub amplicon_start: i64,
    #[serde(default)]
    pub primer_start: i64,
    /// Step size; the configured default applies when absent.
    pub step: Option<usize>,
    pub focus: Option<Focus>,
}

/// Two independent windows over one job's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultView {
    pub focus: Focus,
    pub amplicon: Page<Amplicon>,
    pub primer: Page<Primer>,
}

impl ResultView {
    pub fn build(data: &ResultData, request: &ViewRequest, default_step: usize) -> Self {
        let step = request.step.unwrap_or(default_step).max(1);
        Self {
            focus: request.focus.unwrap_or_else(|| Focus::default_for(data)),
            amplicon: Page::of(&data.amplicon, request.amplicon_start, step),
            primer: Page::of(&data.primer, request.primer_start, step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Orientation;

    fn primer(id: u64) -> Primer {
        Primer {
            id,
            tm: 58.0,
            chrom: "chr1".to_string(),
            pos: 100 + id,
            ori: Orientation::Forward,
            name: format!("P{}", id),
            seq: "ACGT".to_string(),
            genome: "aACGTa".to_string(),
        }
    }

    #[test]
    fn test_window_sizes_match_contract() {
        let items: Vec<u32> = (0..75).collect();
        let len = items.len() as i64;
        for page_size in [1usize, 10, 30, 75, 100] {
            for start in 0..len + 5 {
                let w = window(&items, start, page_size);
                let expected = if start >= len {
                    0
                } else {
                    page_size.min((len - start) as usize)
                };
                assert_eq!(w.visible.len(), expected, "start={} size={}", start, page_size);
                let clamped = start.min(len) as usize;
                assert_eq!(w.has_more, clamped + page_size < items.len());
            }
        }
    }

    #[test]
    fn test_window_is_pure() {
        let items: Vec<u32> = (0..40).collect();
        assert_eq!(window(&items, 30, 30), window(&items, 30, 30));
    }

    #[test]
    fn test_stepping_through_list() {
        let items: Vec<u32> = (0..65).collect();
        let first = window(&items, 0, 30);
        assert!(first.has_more);
        assert!(!first.has_previous);
        assert_eq!(first.next_start, 30);

        let second = window(&items, first.next_start as i64, 30);
        assert_eq!(second.visible[0], 30);
        assert_eq!(second.next_start, 60);

        let last = window(&items, second.next_start as i64, 30);
        assert_eq!(last.visible, &[60, 61, 62, 63, 64]);
        assert!(!last.has_more);
        assert_eq!(last.next_start, 65);
        assert_eq!(last.previous_start, 30);
    }

    #[test]
    fn test_negative_and_overflowing_starts_are_clamped() {
        let items: Vec<u32> = (0..10).collect();
        let back = window(&items, -60, 30);
        assert_eq!(back.start, 0);
        assert_eq!(back.visible.len(), 10);

        let past = window(&items, 500, 30);
        assert_eq!(past.start, 10);
        assert!(past.visible.is_empty());
        assert!(!past.has_more);

        let huge = window(&items, i64::MAX, usize::MAX);
        assert!(huge.visible.is_empty());
    }

    #[test]
    fn test_empty_list() {
        let items: Vec<u32> = Vec::new();
        let w = window(&items, 0, 30);
        assert!(w.visible.is_empty());
        assert!(!w.has_more);
        assert!(!w.has_previous);
    }

    #[test]
    fn test_focus_defaults() {
        let mut data = ResultData::default();
        data.primer.push(primer(0));
        assert_eq!(Focus::default_for(&data), Focus::Primer);
    }

    #[test]
    fn test_result_view_windows_are_independent() {
        let data = ResultData {
            primer: (0..50).map(primer).collect(),
            amplicon: Vec::new(),
        };
        let request = ViewRequest {
            amplicon_start: 90,
            primer_start: 30,
            step: None,
            focus: None,
        };
        let view = ResultView::build(&data, &request, 30);
        assert_eq!(view.focus, Focus::Primer);
        assert_eq!(view.primer.items.len(), 20);
        assert_eq!(view.primer.items[0].id, 30);
        assert_eq!(view.primer.total, 50);
        assert!(view.amplicon.items.is_empty());
        assert_eq!(view.amplicon.start, 0);
    }

    #[test]
    fn test_result_view_zero_step_is_raised_to_one() {
        let data = ResultData {
            primer: (0..3).map(primer).collect(),
            amplicon: Vec::new(),
        };
        let request = ViewRequest {
            step: Some(0),
            ..Default::default()
        };
        let view = ResultView::build(&data, &request, 30);
        assert_eq!(view.primer.page_size, 1);
        assert_eq!(view.primer.items.len(), 1);
        assert!(view.primer.has_more);
    }
}
