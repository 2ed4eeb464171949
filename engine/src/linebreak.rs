use unicode_linebreak::{linebreaks, BreakOpportunity};

/// One wrapped line as a byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: usize,
    pub end: usize,
    pub width: f32,
}

#[derive(Debug, Default, Clone)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn break_positions_into(&self, text: &str, out: &mut Vec<(usize, bool)>) {
        out.clear();
        out.extend(linebreaks(text).map(|(idx, op)| (idx, op == BreakOpportunity::Mandatory)));
    }

    /// Greedy wrap honoring mandatory breaks. Segments wider than the line
    /// are split between characters. Empty text yields no lines.
    pub fn wrap(&self, text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<Line> {
        let mut lines = Vec::new();
        if text.is_empty() {
            return lines;
        }
        let max_width = max_width.max(1.0);
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut prev = 0;
        for (idx, op) in linebreaks(text) {
            let segment = &text[prev..idx];
            let visible = measure(segment.trim_end());
            if prev > line_start && line_width + visible > max_width {
                lines.push(Line { start: line_start, end: prev, width: line_width });
                line_start = prev;
                line_width = 0.0;
            }
            if visible > max_width {
                for (offset, ch) in segment.char_indices() {
                    let at = prev + offset;
                    let w = measure(&text[at..at + ch.len_utf8()]);
                    if at > line_start && line_width + w > max_width {
                        lines.push(Line { start: line_start, end: at, width: line_width });
                        line_start = at;
                        line_width = 0.0;
                    }
                    line_width += w;
                }
            } else {
                line_width += measure(segment);
            }
            prev = idx;
            if op == BreakOpportunity::Mandatory {
                let end = line_start + text[line_start..idx].trim_end_matches(['\n', '\r']).len();
                lines.push(Line { start: line_start, end, width: line_width });
                line_start = idx;
                line_width = 0.0;
            }
        }
        lines
    }

    pub fn line_count(&self, text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> usize {
        self.wrap(text, max_width, measure).len()
    }
}
