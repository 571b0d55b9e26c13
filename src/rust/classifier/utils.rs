use super::error::ClassifierError;

/// Decodes one raw data line.
///
/// Invalid UTF-8 is a problem with that record only: the lossy text is
/// returned for reporting together with a `MalformedRecordError`.
pub(crate) fn decode_line(bytes: Vec<u8>) -> (String, Option<ClassifierError>) {
    match String::from_utf8(bytes) {
        Ok(line) => (line, None),
        Err(e) => {
            let error = ClassifierError::MalformedRecordError(
                format!("line is not valid UTF-8 ({})", e.utf8_error())
            );
            (String::from_utf8_lossy(e.as_bytes()).into_owned(), Some(error))
        }
    }
}

/// Splits a data line into its comma-separated fields, dropping trailing whitespace.
pub(crate) fn split_record(line: &str) -> Vec<&str> {
    line.trim_end().split(',').collect()
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
