use crate::response::{COLUMNS, Response};

/// File name offered to the browser for the export
pub const EXPORT_FILENAME: &str = "responses.csv";

/// Convert responses to CSV format
///
/// This function exports every response to CSV (Comma-Separated Values) format.
/// It creates a string where:
/// - The header row holds the storage column names
/// - Values are comma-separated, one response per row
/// - Special characters (commas, quotes, newlines) are properly escaped
///
/// # Arguments
/// * `responses` - Rows to export, in store order
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use checkin::downloader::to_csv;
///
/// let csv = to_csv(&[]);
/// assert!(csv.starts_with("name,ageRange,age"));
/// ```
pub fn to_csv(responses: &[Response]) -> String {
    let mut csv_content = header_row();

    for response in responses {
        csv_content.push_str(&csv_row(response));
    }

    csv_content
}

/// Header line, terminated by a newline
pub fn header_row() -> String {
    let mut line = COLUMNS.join(",");
    line.push('\n');
    line
}

/// One response as a CSV line, terminated by a newline
pub fn csv_row(response: &Response) -> String {
    let mut line = String::new();
    for (c, value) in response.to_fields().iter().enumerate() {
        if c > 0 {
            line.push(',');
        }
        line.push_str(&escape_field(value));
    }
    line.push('\n');
    line
}

/// Quote a field only when it contains a comma, quote or line break
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
