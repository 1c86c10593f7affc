//! Minimal CSV record handling
//!
//! The import job only needs to count fields per record to validate rows
//! against the header; rows are staged verbatim. This splitter understands
//! minimally-quoted CSV: commas inside double-quoted fields do not separate,
//! and `""` inside a quoted field is an escaped quote.

use dataport_common::DataportError;

/// Split one CSV record into its fields.
pub(crate) fn split_record(line: &str) -> Result<Vec<String>, DataportError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(DataportError::Parse(format!(
            "unterminated quoted field in record: {line}"
        )));
    }

    fields.push(field);
    Ok(fields)
}
