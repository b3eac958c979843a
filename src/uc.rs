//src/uc.rs

use std::io::BufRead;
use std::path::Path;

use crate::error::{Result, UcError};
use crate::input::open_input;
use crate::types::{RecordType, UcRecord};

/// Minimum number of tab-separated fields on a `.uc` line.
pub const UC_MIN_FIELDS: usize = 10;

const TYPE_FIELD: usize = 0;
const QUERY_FIELD: usize = 8;
const TARGET_FIELD: usize = 9;

/// Streams records out of vsearch/usearch `.uc` cluster output.
///
/// Trailing whitespace is dropped from every line; lines left empty and
/// lines starting with `#` are skipped. Any other line with
/// fewer than [`UC_MIN_FIELDS`] fields ends the stream with
/// [`UcError::MalformedRecord`]. Records of every type are yielded; callers
/// decide what to do with [`RecordType::Ignored`].
pub struct UcReader<R> {
    reader: R,
    line: String,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> UcReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            done: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<UcRecord>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return parse_uc_line(line, self.line_number).map(Some);
        }
    }
}

impl<R: BufRead> Iterator for UcReader<R> {
    type Item = Result<UcRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Opens a (possibly gzipped) `.uc` file.
pub fn open_uc<P: AsRef<Path>>(path: P) -> Result<UcReader<Box<dyn BufRead>>> {
    Ok(UcReader::new(open_input(path)?))
}

/// Parses a single non-comment `.uc` line.
pub fn parse_uc_line(line: &str, line_number: usize) -> Result<UcRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < UC_MIN_FIELDS {
        return Err(UcError::MalformedRecord {
            line: line_number,
            fields: fields.len(),
        });
    }

    Ok(UcRecord {
        record_type: RecordType::from_field(fields[TYPE_FIELD]),
        query_id: fields[QUERY_FIELD].to_string(),
        target_id: fields[TARGET_FIELD].to_string(),
        line_number,
    })
}
