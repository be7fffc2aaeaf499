//! Comma-separated export rendering
//!
//! Minimal quoting: a field is wrapped in double quotes only when it
//! contains a delimiter, a quote, or a line break. Embedded quotes are
//! doubled. Missing values render as empty fields. Lines end with `\n`.

use std::fmt::Write;

/// Column order of the `people_info` export.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "h3index",
    "hexdistancetopark",
    "married",
    "education",
    "employment",
    "numkids",
    "income",
];

/// Anything that can be written as one CSV record.
pub trait CsvRecord {
    /// Field values in [`EXPORT_COLUMNS`] order; `None` is an empty field.
    fn fields(&self) -> Vec<Option<String>>;
}

/// In-memory CSV document builder.
#[derive(Debug, Default)]
pub struct CsvWriter {
    buf: String,
    rows: usize,
}

impl CsvWriter {
    /// Start a document with the given header row.
    pub fn with_header(columns: &[&str]) -> Self {
        let mut writer = Self::default();
        writer.push_line(columns.iter().map(|c| Some(*c)));
        writer
    }

    /// Append one data row.
    pub fn push_record<R: CsvRecord + ?Sized>(&mut self, record: &R) {
        let fields = record.fields();
        self.push_line(fields.iter().map(|f| f.as_deref()));
        self.rows += 1;
    }

    /// Number of data rows written (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn push_line<'a>(&mut self, fields: impl Iterator<Item = Option<&'a str>>) {
        for (i, field) in fields.enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            if let Some(value) = field {
                write_field(&mut self.buf, value);
            }
        }
        self.buf.push('\n');
    }
}

fn write_field(buf: &mut String, value: &str) {
    if value.contains([',', '"', '\n', '\r']) {
        // write! into a String cannot fail
        let _ = write!(buf, "\"{}\"", value.replace('"', "\"\""));
    } else {
        buf.push_str(value);
    }
}

/// Render a full export document: header plus one line per record.
pub fn render<R: CsvRecord>(records: &[R]) -> String {
    let mut writer = CsvWriter::with_header(&EXPORT_COLUMNS);
    for record in records {
        writer.push_record(record);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(Vec<Option<&'static str>>);

    impl CsvRecord for Row {
        fn fields(&self) -> Vec<Option<String>> {
            self.0.iter().map(|f| f.map(str::to_owned)).collect()
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        let out = render::<Row>(&[]);
        assert_eq!(
            out,
            "h3index,hexdistancetopark,married,education,employment,numkids,income\n"
        );
    }

    #[test]
    fn nulls_render_as_empty_fields() {
        let out = render(&[Row(vec![
            Some("8928308280fffff"),
            Some("3"),
            None,
            None,
            Some("Student"),
            None,
            None,
        ])]);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "8928308280fffff,3,,,Student,,");
    }

    #[test]
    fn quotes_only_when_needed() {
        let out = render(&[Row(vec![
            Some("8928308280fffff"),
            Some("1"),
            Some("Yes"),
            Some("Bachelor's Degree"),
            Some("a, b"),
            Some("say \"hi\""),
            Some("10"),
        ])]);
        assert!(out.ends_with(
            "8928308280fffff,1,Yes,Bachelor's Degree,\"a, b\",\"say \"\"hi\"\"\",10\n"
        ));
    }

    #[test]
    fn counts_rows() {
        let mut writer = CsvWriter::with_header(&["a"]);
        writer.push_record(&Row(vec![Some("1")]));
        writer.push_record(&Row(vec![Some("2")]));
        assert_eq!(writer.rows(), 2);
        assert_eq!(writer.finish(), "a\n1\n2\n");
    }
}
