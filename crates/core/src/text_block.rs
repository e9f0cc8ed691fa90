//! Text blocks reported by page extraction
//!
//! A block is a contiguous run of text with its bounding rectangle. Blocks are
//! produced fresh by every extraction call; their identity is their coordinates.

use crate::geometry::{PdfPoint, PdfRect};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Vertical gap (as a fraction of the previous line's height) still treated as
/// the same paragraph when grouping lines.
const MAX_LINE_GAP_RATIO: f32 = 0.6;

/// A block of text on a page
///
/// Equality and hashing use the rectangle only, so two extractions of the same
/// region compare equal even if the text was re-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// Bounding box in page coordinates (points, top-left origin)
    pub rect: PdfRect,

    /// The text content as extracted
    pub text: String,
}

impl TextBlock {
    pub fn new(rect: PdfRect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }

    /// Identity key for this block
    pub fn key(&self) -> BlockKey {
        BlockKey::from_rect(&self.rect)
    }

    /// Whether the block holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl PartialEq for TextBlock {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TextBlock {}

impl Hash for TextBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Coordinate-based identity of a [`TextBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockKey([u32; 4]);

impl BlockKey {
    pub fn from_rect(rect: &PdfRect) -> Self {
        // -0.0 and 0.0 must hash alike
        let bits = |v: f32| if v == 0.0 { 0 } else { v.to_bits() };
        Self([bits(rect.x0), bits(rect.y0), bits(rect.x1), bits(rect.y1)])
    }
}

/// A single line of text as reported by a backend, before paragraph grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub rect: PdfRect,
    pub text: String,
}

/// Merge consecutive lines into paragraph blocks.
///
/// A line joins the current block when it overlaps it horizontally and starts no
/// further below the previous line than `MAX_LINE_GAP_RATIO` of that line's height.
/// Lines must be in reading order.
pub fn group_lines_into_blocks(lines: &[TextLine]) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(PdfRect, Vec<&str>, PdfRect)> = None;

    for line in lines {
        if line.text.trim().is_empty() {
            continue;
        }

        current = match current.take() {
            Some((rect, mut texts, previous)) => {
                let gap = line.rect.y0 - previous.y1;
                let joins = rect.overlaps_horizontally(&line.rect)
                    && gap >= -previous.height()
                    && gap <= previous.height() * MAX_LINE_GAP_RATIO;

                if joins {
                    texts.push(line.text.as_str());
                    Some((rect.union(&line.rect), texts, line.rect))
                } else {
                    blocks.push(TextBlock::new(rect, texts.join("\n")));
                    Some((line.rect, vec![line.text.as_str()], line.rect))
                }
            }
            None => Some((line.rect, vec![line.text.as_str()], line.rect)),
        };
    }

    if let Some((rect, texts, _)) = current {
        blocks.push(TextBlock::new(rect, texts.join("\n")));
    }

    blocks
}

/// First non-blank block containing `point` (inclusive bounds).
pub fn block_at(blocks: &[TextBlock], point: PdfPoint) -> Option<&TextBlock> {
    blocks
        .iter()
        .find(|block| !block.is_blank() && block.rect.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: f32, y0: f32, x1: f32, y1: f32, text: &str) -> TextLine {
        TextLine {
            rect: PdfRect::new(x0, y0, x1, y1),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_equality_is_by_coordinates() {
        let a = TextBlock::new(PdfRect::new(10.0, 10.0, 110.0, 30.0), "Hello");
        let b = TextBlock::new(PdfRect::new(10.0, 10.0, 110.0, 30.0), "Goodbye");
        let c = TextBlock::new(PdfRect::new(10.0, 10.0, 111.0, 30.0), "Hello");

        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert_ne!(a, c);
    }

    #[test]
    fn test_block_key_negative_zero() {
        let a = BlockKey::from_rect(&PdfRect::new(0.0, 0.0, 1.0, 1.0));
        let b = BlockKey::from_rect(&PdfRect::new(-0.0, -0.0, 1.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_group_adjacent_lines() {
        let lines = vec![
            line(72.0, 72.0, 300.0, 84.0, "First line of a paragraph"),
            line(72.0, 86.0, 280.0, 98.0, "continues here"),
            line(72.0, 140.0, 200.0, 152.0, "Second paragraph"),
        ];

        let blocks = group_lines_into_blocks(&lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "First line of a paragraph\ncontinues here");
        assert_eq!(blocks[0].rect, PdfRect::new(72.0, 72.0, 300.0, 98.0));
        assert_eq!(blocks[1].text, "Second paragraph");
    }

    #[test]
    fn test_group_splits_columns() {
        let lines = vec![
            line(72.0, 72.0, 250.0, 84.0, "Left column"),
            line(320.0, 86.0, 500.0, 98.0, "Right column"),
        ];

        let blocks = group_lines_into_blocks(&lines);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_group_skips_blank_lines() {
        let lines = vec![line(0.0, 0.0, 10.0, 10.0, "   "), line(0.0, 0.0, 10.0, 10.0, "")];
        assert!(group_lines_into_blocks(&lines).is_empty());
    }

    #[test]
    fn test_block_at() {
        let blocks = vec![
            TextBlock::new(PdfRect::new(0.0, 0.0, 50.0, 50.0), " "),
            TextBlock::new(PdfRect::new(10.0, 10.0, 110.0, 30.0), "Hello"),
        ];

        let hit = block_at(&blocks, PdfPoint::new(10.0, 30.0)).unwrap();
        assert_eq!(hit.text, "Hello");
        assert!(block_at(&blocks, PdfPoint::new(5.0, 5.0)).is_none());
        assert!(block_at(&blocks, PdfPoint::new(200.0, 200.0)).is_none());
    }
}
