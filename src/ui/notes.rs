use unicode_width::UnicodeWidthChar;

/// Hard-wrap text at `width` display columns. Explicit newlines always start
/// a new line, so a trailing newline yields an empty last line.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut used = 0;
        for c in raw.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(c);
            used += w;
        }
        lines.push(line);
    }

    lines
}

/// The last `height` lines, so the end of the text stays in view
pub fn tail(lines: &[String], height: usize) -> &[String] {
    &lines[lines.len().saturating_sub(height)..]
}
