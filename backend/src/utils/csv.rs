fn needs_formula_guard(value: &str) -> bool {
    matches!(value.chars().next(), Some('=' | '+' | '-' | '@'))
}

fn escape_cell(value: &str) -> String {
    let mut sanitized = value.replace('"', "\"\"");
    if needs_formula_guard(&sanitized) {
        sanitized.insert(0, '\'');
    }
    format!("\"{}\"", sanitized)
}

pub fn append_csv_row(buffer: &mut String, fields: &[String]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            buffer.push(',');
        }
        buffer.push_str(&escape_cell(field));
    }
    buffer.push('\n');
}

/// Builds a full CSV document from a header row and data rows.
pub fn csv_document(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut buffer = String::new();
    append_csv_row(
        &mut buffer,
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    );
    for row in rows {
        append_csv_row(&mut buffer, row);
    }
    buffer
}
