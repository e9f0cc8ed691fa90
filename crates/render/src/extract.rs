//! Text extraction from page objects
//!
//! PDFium reports text as page objects, usually one per word or short run.
//! Runs sharing a vertical band are joined into lines, and lines are then
//! grouped into blocks with the core grouping rule. A run covered entirely by a
//! later white fill is no longer visible and is dropped; this is how text erased
//! by a commit disappears from the overlays, even after the file is reopened.

use pdf_text_editor_core::{PdfRect, Rgb, TextLine};

/// Fraction of the shorter run's height two runs must share to sit on one line
const SAME_LINE_OVERLAP: f32 = 0.5;

/// Horizontal gap, relative to line height, still treated as a word space.
/// Wider gaps split the band into separate lines (table cells, columns).
const MAX_WORD_GAP_RATIO: f32 = 2.0;

/// A run of text with its box in page coordinates (top-left origin)
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub rect: PdfRect,
    pub text: String,
}

/// The parts of a page object that matter for extraction, in paint order
#[derive(Debug, Clone, PartialEq)]
pub enum PageObjectSummary {
    Text(TextRun),
    Fill { rect: PdfRect, color: Rgb },
}

/// Text runs not hidden behind a later opaque white fill.
pub fn visible_runs(objects: &[PageObjectSummary]) -> Vec<TextRun> {
    objects
        .iter()
        .enumerate()
        .filter_map(|(i, object)| match object {
            PageObjectSummary::Text(run) if !run.text.trim().is_empty() => {
                let hidden = objects[i + 1..].iter().any(|later| {
                    matches!(later, PageObjectSummary::Fill { rect, color }
                        if *color == Rgb::WHITE && rect.covers(&run.rect))
                });
                (!hidden).then(|| run.clone())
            }
            _ => None,
        })
        .collect()
}

fn vertical_overlap(a: &PdfRect, b: &PdfRect) -> f32 {
    (a.y1.min(b.y1) - a.y0.max(b.y0)).max(0.0)
}

fn shares_band(band: &PdfRect, run: &PdfRect) -> bool {
    let shorter = band.height().min(run.height());
    shorter > 0.0 && vertical_overlap(band, run) >= shorter * SAME_LINE_OVERLAP
}

fn push_run(line: &mut TextLine, run: &TextRun) {
    let needs_space = !line.text.ends_with(char::is_whitespace)
        && !run.text.starts_with(char::is_whitespace);
    if needs_space {
        line.text.push(' ');
    }
    line.text.push_str(&run.text);
    line.rect = line.rect.union(&run.rect);
}

/// Join runs into lines, returned in reading order (top to bottom, then left to right).
pub fn merge_runs_into_lines(mut runs: Vec<TextRun>) -> Vec<TextLine> {
    runs.sort_by(|a, b| a.rect.y0.total_cmp(&b.rect.y0));

    // Bands of runs whose vertical extents overlap enough
    let mut bands: Vec<(PdfRect, Vec<TextRun>)> = Vec::new();
    for run in runs {
        match bands.iter_mut().find(|(rect, _)| shares_band(rect, &run.rect)) {
            Some((rect, members)) => {
                *rect = rect.union(&run.rect);
                members.push(run);
            }
            None => bands.push((run.rect, vec![run])),
        }
    }

    let mut lines = Vec::new();
    for (band, mut members) in bands {
        members.sort_by(|a, b| a.rect.x0.total_cmp(&b.rect.x0));
        let max_gap = band.height() * MAX_WORD_GAP_RATIO;

        let mut current: Option<TextLine> = None;
        for run in &members {
            current = match current.take() {
                Some(mut line) if run.rect.x0 - line.rect.x1 <= max_gap => {
                    push_run(&mut line, run);
                    Some(line)
                }
                Some(line) => {
                    lines.push(line);
                    Some(TextLine {
                        rect: run.rect,
                        text: run.text.clone(),
                    })
                }
                None => Some(TextLine {
                    rect: run.rect,
                    text: run.text.clone(),
                }),
            };
        }
        lines.extend(current);
    }

    lines.sort_by(|a, b| {
        a.rect
            .y0
            .total_cmp(&b.rect.y0)
            .then(a.rect.x0.total_cmp(&b.rect.x0))
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(x0: f32, y0: f32, x1: f32, y1: f32, text: &str) -> TextRun {
        TextRun {
            rect: PdfRect::new(x0, y0, x1, y1),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_words_on_a_line_are_joined() {
        let lines = merge_runs_into_lines(vec![
            run(60.0, 10.5, 100.0, 22.0, "world"),
            run(10.0, 10.0, 50.0, 22.0, "Hello"),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[0].rect, PdfRect::new(10.0, 10.0, 100.0, 22.0));
    }

    #[test]
    fn test_wide_gap_splits_columns() {
        let lines = merge_runs_into_lines(vec![
            run(10.0, 10.0, 50.0, 22.0, "Left"),
            run(300.0, 10.0, 340.0, 22.0, "Right"),
        ]);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right"]);
    }

    #[test]
    fn test_lines_come_back_top_to_bottom() {
        let lines = merge_runs_into_lines(vec![
            run(10.0, 40.0, 50.0, 52.0, "second"),
            run(10.0, 10.0, 50.0, 22.0, "first"),
        ]);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_white_fill_hides_earlier_text() {
        let objects = vec![
            PageObjectSummary::Text(run(10.0, 10.0, 110.0, 30.0, "Hello")),
            PageObjectSummary::Fill {
                rect: PdfRect::new(10.0, 10.0, 110.0, 30.0),
                color: Rgb::WHITE,
            },
            PageObjectSummary::Text(run(10.0, 10.0, 52.0, 22.0, "Goodbye")),
        ];
        let visible = visible_runs(&objects);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "Goodbye");
    }

    #[test]
    fn test_reloaded_fill_with_round_off_still_hides_text() {
        let objects = vec![
            PageObjectSummary::Text(run(10.0, 10.0, 110.0, 30.0, "Hello")),
            PageObjectSummary::Fill {
                rect: PdfRect::new(10.005, 9.996, 109.995, 30.0),
                color: Rgb::WHITE,
            },
        ];
        assert!(visible_runs(&objects).is_empty());
    }

    #[test]
    fn test_coloured_or_partial_fill_keeps_text() {
        let objects = vec![
            PageObjectSummary::Text(run(10.0, 10.0, 110.0, 30.0, "Shaded")),
            PageObjectSummary::Fill {
                rect: PdfRect::new(0.0, 0.0, 200.0, 100.0),
                color: Rgb::new(200, 200, 200),
            },
            PageObjectSummary::Text(run(10.0, 50.0, 110.0, 70.0, "Cropped")),
            PageObjectSummary::Fill {
                rect: PdfRect::new(10.0, 50.0, 60.0, 70.0),
                color: Rgb::WHITE,
            },
        ];
        assert_eq!(visible_runs(&objects).len(), 2);
    }

    #[test]
    fn test_blank_runs_are_skipped() {
        let objects = vec![PageObjectSummary::Text(run(0.0, 0.0, 5.0, 5.0, "  "))];
        assert!(visible_runs(&objects).is_empty());
    }
}
