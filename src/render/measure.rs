use unicode_width::UnicodeWidthStr;

/// Monospace text metrics used for node sizing and row placement.
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub header_padding: f64,
    pub min_node_width: f64,
    pub min_node_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 8.0,
            header_padding: 4.0,
            min_node_width: 100.0,
            min_node_height: 36.0,
        }
    }
}

impl TextMetrics {
    /// Width of `text`, counting east-asian wide characters as two cells.
    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    pub fn header_height(&self) -> f64 {
        self.line_height + self.header_padding * 2.0
    }

    /// Size of a node with a header `label` and one line per entry of `rows`.
    pub fn node_size(&self, label: &str, rows: &[String]) -> (f64, f64) {
        let header_width = self.text_width(label);
        let max_row_width = rows
            .iter()
            .map(|row| self.text_width(row))
            .fold(0.0, f64::max);

        let width = (header_width.max(max_row_width) + self.padding_x * 2.0).max(self.min_node_width);

        let body_height = if rows.is_empty() {
            0.0
        } else {
            rows.len() as f64 * self.line_height + self.padding_y * 2.0
        };
        let height = (self.header_height() + body_height).max(self.min_node_height);

        (width, height)
    }

    /// Vertical center of row `index`, relative to the top of its node.
    pub fn row_center(&self, index: usize) -> f64 {
        self.header_height() + self.padding_y + self.line_height * (index as f64 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("users"), 5.0 * 8.0);
    }

    #[test]
    fn test_wide_chars_take_two_cells() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("ユーザー"), 8.0 * 8.0);
        assert_eq!(m.text_width("idテスト"), 8.0 * 8.0);
    }

    #[test]
    fn test_node_size_without_rows() {
        let m = TextMetrics::default();
        let (w, h) = m.node_size("users", &[]);
        assert_eq!(w, m.min_node_width);
        assert_eq!(h, m.header_height().max(m.min_node_height));
    }

    #[test]
    fn test_node_size_grows_with_rows() {
        let m = TextMetrics::default();
        let rows = vec![
            "id: int".to_string(),
            "a_rather_long_column_name: timestamp with time zone".to_string(),
        ];
        let (w, h) = m.node_size("users", &rows);
        assert_eq!(w, m.text_width(&rows[1]) + m.padding_x * 2.0);
        assert_eq!(h, m.header_height() + 2.0 * m.line_height + m.padding_y * 2.0);
    }

    #[test]
    fn test_row_center() {
        let m = TextMetrics::default();
        assert_eq!(m.row_center(0), m.header_height() + m.padding_y + m.line_height / 2.0);
        assert_eq!(m.row_center(1) - m.row_center(0), m.line_height);
    }
}
