use crate::response::{COLUMNS, Response};
use std::error::Error;

/// Load responses from CSV text
///
/// The first record must be the header row written by
/// [`crate::downloader::to_csv`]. Blank trailing lines are ignored.
///
/// # Arguments
/// * `content` - Whole file content
///
/// # Returns
/// * `Result<Vec<Response>, Box<dyn Error + Send + Sync>>` - The rows or the first malformed record
pub fn from_csv(content: &str) -> Result<Vec<Response>, Box<dyn Error + Send + Sync>> {
    let mut records = parse_csv(content).into_iter();

    let header = match records.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };
    if header.iter().map(String::as_str).ne(COLUMNS.iter().copied()) {
        return Err(format!("Unexpected CSV header: {}", header.join(",")).into());
    }

    let mut responses = Vec::new();
    for (line, record) in records.enumerate() {
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        let response = Response::from_fields(&record)
            .map_err(|e| format!("Row {}: {}", line + 1, e))?;
        responses.push(response);
    }

    Ok(responses)
}

// Split CSV text into records; quoted fields may span lines
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut current_record = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Double quote inside quoted field - add a single quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                current_record.push(std::mem::take(&mut current_field));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                current_record.push(std::mem::take(&mut current_field));
                records.push(std::mem::take(&mut current_record));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    // Last record without a trailing newline
    if !current_field.is_empty() || !current_record.is_empty() {
        current_record.push(current_field);
        records.push(current_record);
    }

    records
}
