//! Reader/writer for the plain-text model format.
//!
//! ```text
//! Vertex Count: 3
//!
//! Data:
//!
//! 0.0 0.0 0.0  0.0 0.0  0.0 0.0 -1.0
//! 1.0 0.0 0.0  1.0 0.0  0.0 0.0 -1.0
//! 0.0 1.0 0.0  0.0 1.0  0.0 0.0 -1.0
//! ```
//!
//! Grammar: anything up to the first `:`, the vertex count, anything up to the
//! next `:`, then `count` rows of `x y z tu tv nx ny nz`. All separators are
//! arbitrary ASCII whitespace, so LF and CRLF files read the same.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use corelib::{ModelError, ModelResult, vec2, vec3};

use crate::mesh::{ModelRecord, VertexAttributes};

const FLOATS_PER_VERTEX: usize = 8;

/// Load a model in the text format from a file path.
pub fn load_custom_from_path(path: impl AsRef<Path>) -> ModelResult<ModelRecord> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = load_custom_from_str(&contents)?;
    log::info!(
        "Loaded model {:?}: {} vertices, {} faces",
        path,
        record.vertex_count(),
        record.face_count()
    );
    Ok(record)
}

/// Parse the text format from an in-memory string.
pub fn load_custom_from_str(contents: &str) -> ModelResult<ModelRecord> {
    let mut tokens = Tokens::new(contents);

    if !tokens.skip_past(':') {
        return Err(ModelError::format(tokens.line, "missing ':' before vertex count"));
    }
    let (line, raw_count) = tokens
        .next_token()
        .ok_or_else(|| ModelError::format(tokens.line, "missing vertex count"))?;
    let vertex_count = raw_count.parse::<usize>().map_err(|_| {
        ModelError::format(line, format!("invalid vertex count '{}'", raw_count))
    })?;

    if !tokens.skip_past(':') {
        return Err(ModelError::format(tokens.line, "missing ':' before vertex data"));
    }

    // Each row needs at least 8 numbers and 8 separators; the declared count alone
    // is untrusted.
    let capacity = vertex_count.min(tokens.rest.len() / (2 * FLOATS_PER_VERTEX));
    let mut vertices = Vec::with_capacity(capacity);
    let mut row = [0.0f32; FLOATS_PER_VERTEX];
    for index in 0..vertex_count {
        for value in row.iter_mut() {
            *value = tokens.next_f32(index)?;
        }
        let [x, y, z, tu, tv, nx, ny, nz] = row;
        vertices.push(VertexAttributes::new(
            vec3(x, y, z),
            vec2(tu, tv),
            vec3(nx, ny, nz),
        ));
    }

    if let Some((line, _)) = tokens.next_token() {
        log::warn!(
            "Ignoring trailing data after {} vertices (line {})",
            vertex_count,
            line
        );
    }

    Ok(ModelRecord::new(vertices))
}

/// Serialise positions, texcoords and normals in the text format.
/// Tangent frames are not part of the format.
pub fn write_custom<W: Write>(record: &ModelRecord, mut writer: W) -> io::Result<()> {
    writeln!(writer, "Vertex Count: {}", record.vertex_count())?;
    writeln!(writer)?;
    writeln!(writer, "Data:")?;
    writeln!(writer)?;
    for v in record.vertices() {
        writeln!(
            writer,
            "{} {} {} {} {} {} {} {}",
            v.position.x,
            v.position.y,
            v.position.z,
            v.texcoord.x,
            v.texcoord.y,
            v.normal.x,
            v.normal.y,
            v.normal.z
        )?;
    }
    writer.flush()
}

/// Write a model to `path` in the text format.
pub fn save_custom_to_path(record: &ModelRecord, path: impl AsRef<Path>) -> ModelResult<()> {
    let path = path.as_ref();
    let to_model_error = |source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_model_error)?;
    write_custom(record, BufWriter::new(file)).map_err(to_model_error)?;
    log::info!("Wrote {} vertices to {:?}", record.vertex_count(), path);
    Ok(())
}

/// Whitespace tokenizer that tracks the current line.
struct Tokens<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self { rest: src, line: 1 }
    }

    /// Advance just past the next `delim`. Returns `false` at end of input.
    fn skip_past(&mut self, delim: char) -> bool {
        match self.rest.find(delim) {
            Some(at) => {
                self.line += count_newlines(&self.rest[..at]);
                self.rest = &self.rest[at + delim.len_utf8()..];
                true
            }
            None => {
                self.line += count_newlines(self.rest);
                self.rest = "";
                false
            }
        }
    }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        let start = self
            .rest
            .find(|c: char| !c.is_ascii_whitespace())
            .unwrap_or(self.rest.len());
        self.line += count_newlines(&self.rest[..start]);
        self.rest = &self.rest[start..];
        if self.rest.is_empty() {
            return None;
        }

        let end = self
            .rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(self.rest.len());
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some((self.line, token))
    }

    fn next_f32(&mut self, vertex: usize) -> ModelResult<f32> {
        let (line, token) = self.next_token().ok_or_else(|| {
            ModelError::format(
                self.line,
                format!("unexpected end of data while reading vertex {}", vertex),
            )
        })?;
        token.parse::<f32>().map_err(|_| {
            ModelError::format(line, format!("invalid number '{}' in vertex {}", token, vertex))
        })
    }
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Vec3;

    const TWO_FACES: &str = "Vertex Count: 6\n\nData:\n\n\
        -1.0  1.0 -1.0 0.0 0.0  0.0  0.0 -1.0\n\
         1.0  1.0 -1.0 1.0 0.0  0.0  0.0 -1.0\n\
        -1.0 -1.0 -1.0 0.0 1.0  0.0  0.0 -1.0\n\
        -1.0 -1.0 -1.0 0.0 1.0  0.0  0.0 -1.0\n\
         1.0  1.0 -1.0 1.0 0.0  0.0  0.0 -1.0\n\
         1.0 -1.0 -1.0 1.0 1.0  0.0  0.0 -1.0\n";

    #[test]
    fn parses_declared_vertex_count() {
        let record = load_custom_from_str(TWO_FACES).expect("parse");
        assert_eq!(record.vertex_count(), 6);
        assert_eq!(record.index_count(), record.vertex_count());
        assert_eq!(record.face_count(), 2);

        let last = record.vertices()[5];
        assert_eq!(last.position, vec3(1.0, -1.0, -1.0));
        assert_eq!(last.texcoord, vec2(1.0, 1.0));
        assert_eq!(last.normal, -Vec3::Z);
        assert!(!record.has_tangents());
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let src = TWO_FACES.replace('\n', "\r\n");
        let record = load_custom_from_str(&src).expect("parse crlf");
        assert_eq!(record.vertex_count(), 6);
    }

    #[test]
    fn truncated_data_is_format_error() {
        let src = "Vertex Count: 2\n\nData:\n\n0 0 0 0 0 0 0 1\n1 0 0 1";
        match load_custom_from_str(src) {
            Err(ModelError::Format { line, message }) => {
                assert_eq!(line, 6);
                assert!(message.contains("vertex 1"), "{message}");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn huge_declared_count_is_format_error() {
        let src = "Vertex Count: 18446744073709551615\nData:\n0 0 0 0 0 0 0 1\n";
        match load_custom_from_str(src) {
            Err(ModelError::Format { message, .. }) => {
                assert!(message.contains("vertex 1"), "{message}");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn bad_number_reports_its_line() {
        let src = "Vertex Count: 1\nData:\n0 0 zero 0 0 0 0 1\n";
        match load_custom_from_str(src) {
            Err(ModelError::Format { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn missing_header_or_label_is_format_error() {
        assert!(matches!(
            load_custom_from_str("no delimiters here"),
            Err(ModelError::Format { .. })
        ));
        assert!(matches!(
            load_custom_from_str("Vertex Count: 1\n0 0 0 0 0 0 0 1"),
            Err(ModelError::Format { .. })
        ));
        assert!(matches!(
            load_custom_from_str("Vertex Count: -3\nData:\n"),
            Err(ModelError::Format { .. })
        ));
    }

    #[test]
    fn zero_vertices_is_empty_record() {
        let record = load_custom_from_str("Vertex Count: 0\n\nData:\n\n").expect("parse");
        assert!(record.is_empty());
    }

    #[test]
    fn write_then_read_preserves_attributes() {
        let mut src = String::from("Vertex Count: 3\nData:\n");
        src.push_str("0.1 0.2 0.3 0.125 0.875 0.0 0.70710677 0.70710677\n");
        src.push_str("1e-3 -2.5 3.75 1.0 0.0 1.0 0.0 0.0\n");
        src.push_str("123.456 7.0 -0.333 0.5 0.5 0.0 0.0 1.0\n");
        let original = load_custom_from_str(&src).expect("parse");

        let mut out = Vec::new();
        write_custom(&original, &mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let reparsed = load_custom_from_str(&text).expect("reparse");

        assert_eq!(reparsed.vertex_count(), original.vertex_count());
        for (a, b) in original.vertices().iter().zip(reparsed.vertices()) {
            assert!(a.position.abs_diff_eq(b.position, 1e-6));
            assert!(a.texcoord.abs_diff_eq(b.texcoord, 1e-6));
            assert!(a.normal.abs_diff_eq(b.normal, 1e-6));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("custom-format-does-not-exist.txt");
        assert!(matches!(
            load_custom_from_path(&path),
            Err(ModelError::Io { .. })
        ));
    }

    #[test]
    fn save_and_load_through_filesystem() {
        let record = load_custom_from_str(TWO_FACES).expect("parse");
        let path = std::env::temp_dir().join(format!(
            "custom-format-roundtrip-{}.txt",
            std::process::id()
        ));
        save_custom_to_path(&record, &path).expect("save");
        let loaded = load_custom_from_path(&path).expect("load");
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, record);
    }
}
