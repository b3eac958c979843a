//src/input.rs

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Opens a text input, transparently decompressing it if the name ends in `.gz`.
pub fn open_input<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Buffered writer over a freshly created (truncated) file.
pub fn create_output<P: AsRef<Path>>(path: P) -> std::io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes `text` to `path` in one go.
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> std::io::Result<()> {
    let mut out = create_output(path)?;
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Strips a trailing `\n` or `\r\n`.
pub fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Read;

    #[test]
    fn test_open_plain_and_gz() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("tax.tsv");
        std::fs::write(&plain, "A\tk__Fungi\n").unwrap();

        let gz = dir.path().join("tax.tsv.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(b"A\tk__Fungi\n").unwrap();
        enc.finish().unwrap();

        for path in [&plain, &gz] {
            let mut text = String::new();
            open_input(path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "A\tk__Fungi\n");
        }
    }

    #[test]
    fn test_trim_newline() {
        assert_eq!(trim_newline("a\tb\r\n"), "a\tb");
        assert_eq!(trim_newline("a\tb\n"), "a\tb");
        assert_eq!(trim_newline("a\tb"), "a\tb");
        // trailing tabs are data, keep them
        assert_eq!(trim_newline("a\t\n"), "a\t");
    }
}
