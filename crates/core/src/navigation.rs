//! Bounds-checked page navigation.

use crate::error::{EditorError, EditorResult};

/// Current page of an open document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageNavigator {
    current: usize,
    page_count: usize,
}

impl PageNavigator {
    /// Navigator positioned on the first page
    pub fn new(page_count: usize) -> Self {
        Self {
            current: 0,
            page_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn can_prev(&self) -> bool {
        self.current > 0
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.page_count
    }

    /// Move forward one page. At the last page this is a no-op returning `false`.
    pub fn next(&mut self) -> bool {
        if self.can_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page. At the first page this is a no-op returning `false`.
    pub fn prev(&mut self) -> bool {
        if self.can_prev() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, index: usize) -> EditorResult<()> {
        if index >= self.page_count {
            return Err(EditorError::PageIndexOutOfRange {
                index,
                page_count: self.page_count,
            });
        }
        self.current = index;
        Ok(())
    }

    /// "3 / 10" style label, or a placeholder with no pages
    pub fn label(&self) -> String {
        if self.page_count > 0 {
            format!("{} / {}", self.current + 1, self.page_count)
        } else {
            "— / —".to_string()
        }
    }
}
