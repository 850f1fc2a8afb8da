// expands an obj file into one FaceVertex per triangle corner;
// the indexer squashes it back down afterwards.
// only triangulated faces with full v/vt/vn corners are accepted,
// anything else in the file we don't understand gets skipped

use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use crate::stream::{FaceVertex, FaceVertexStream};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: malformed `{record}` record")]
    MalformedRecord { line: usize, record: String },
    #[error("line {line}: `{token}` is not a number")]
    BadNumber { line: usize, token: String },
    #[error("line {line}: face has {found} corners, expected 3")]
    FaceArity { line: usize, found: usize },
    #[error("line {line}: face corner needs v/vt/vn indices")]
    MissingAttribute { line: usize },
    #[error("line {line}: {kind} index {index} out of range (have {len})")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    /// Negate V on load. DDS stores rows top-down so its textures want this.
    pub flip_v: bool,
}

pub fn load(path: &Path, opts: &LoadOptions) -> Result<FaceVertexStream, ParseError> {
    let src = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_owned(),
        source,
    })?;
    let stream = parse(&src, opts)?;
    log::debug!(
        "loaded {} triangles from {}",
        stream.len() / 3,
        path.display()
    );
    Ok(stream)
}

// (v, vt, vn), still 1-based
type Corner = (usize, usize, usize);

pub fn parse(src: &str, opts: &LoadOptions) -> Result<FaceVertexStream, ParseError> {
    let mut positions = vec![];
    let mut uvs = vec![];
    let mut normals = vec![];
    let mut faces: Vec<(usize, [Corner; 3])> = vec![];
    let mut skipped = 0usize;

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let content = match raw.find('#') {
            Some(at) => &raw[..at],
            None => raw,
        };
        let mut parts = content.split_whitespace();
        let record = match parts.next() {
            Some(r) => r,
            None => continue,
        };
        match record {
            "v" => positions.push(floats::<3>(&mut parts, line, record)?),
            "vt" => {
                let [u, v] = floats::<2>(&mut parts, line, record)?;
                uvs.push(if opts.flip_v { [u, -v] } else { [u, v] });
            }
            "vn" => normals.push(floats::<3>(&mut parts, line, record)?),
            "f" => faces.push((line, face(parts, line)?)),
            other => {
                log::trace!("line {}: skipping `{}` record", line, other);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("skipped {} unsupported obj records", skipped);
    }

    // resolve after reading everything; obj lets faces come before
    // the vertices they reference
    let mut stream = FaceVertexStream::new();
    for (line, corners) in faces {
        for (v, vt, vn) in corners {
            stream.push(FaceVertex {
                position: lookup(&positions, v, "vertex", line)?,
                uv: lookup(&uvs, vt, "texture coordinate", line)?,
                normal: lookup(&normals, vn, "normal", line)?,
            });
        }
    }
    if !positions.is_empty() && stream.is_empty() {
        log::warn!("obj has {} vertices but no faces", positions.len());
    }
    Ok(stream)
}

fn floats<const N: usize>(
    parts: &mut SplitWhitespace,
    line: usize,
    record: &str,
) -> Result<[f32; N], ParseError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = parts.next().ok_or_else(|| ParseError::MalformedRecord {
            line,
            record: record.to_owned(),
        })?;
        *slot = number(token, line)?;
    }
    // anything extra (w components and such) is ignored
    Ok(out)
}

fn number<T: FromStr>(token: &str, line: usize) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::BadNumber {
        line,
        token: token.to_owned(),
    })
}

fn face(parts: SplitWhitespace, line: usize) -> Result<[Corner; 3], ParseError> {
    let corners = parts.collect::<Vec<_>>();
    if corners.len() != 3 {
        return Err(ParseError::FaceArity {
            line,
            found: corners.len(),
        });
    }
    let mut out = [(0, 0, 0); 3];
    for (slot, corner) in out.iter_mut().zip(corners) {
        let mut idx = corner.split('/');
        let mut next = || -> Result<usize, ParseError> {
            match idx.next() {
                Some(s) if !s.is_empty() => number(s, line),
                _ => Err(ParseError::MissingAttribute { line }),
            }
        };
        *slot = (next()?, next()?, next()?);
    }
    Ok(out)
}

fn lookup<T: Copy>(
    table: &[T],
    index: usize,
    kind: &'static str,
    line: usize,
) -> Result<T, ParseError> {
    // obj indices start at 1
    index
        .checked_sub(1)
        .and_then(|i| table.get(i))
        .copied()
        .ok_or(ParseError::IndexOutOfRange {
            line,
            kind,
            index,
            len: table.len(),
        })
}
