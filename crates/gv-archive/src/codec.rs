// Format du fichier archive :
//
//   magic    b"GVAR"   4 bytes
//   version  u8 = 1    1 byte
//   zstd( bincode( ArchiveBlob ) )
//
// ArchiveBlob holds one u8 array under the key "arr_0", shape
// [N, R, C] (binary) or [N, R, C, 3] (color), row-major.

use std::path::Path;

use serde::{Deserialize, Serialize};

use gv_core::error::GridError;
use gv_core::frame::{FrameSequence, GridCell, GridMatrix};
use gv_core::reduce::GridMode;

pub const MAGIC: &[u8; 4] = b"GVAR";
pub const FORMAT_VERSION: u8 = 1;
/// Nom fixe du tableau dans l'archive.
pub const ARRAY_KEY: &str = "arr_0";
const ZSTD_LEVEL: i32 = 9;

/// Tableau numérique nommé, tel que sérialisé.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArchiveBlob {
    pub key: String,
    pub shape: Vec<u64>,
    pub data: Vec<u8>,
}

/// Aplatit une séquence en tableau `[N, R, C]` ou `[N, R, C, 3]`.
///
/// # Example
/// ```
/// use gv_core::frame::{FrameSequence, GridMatrix};
/// use gv_core::reduce::GridMode;
/// use gv_archive::codec::sequence_to_blob;
///
/// let mut seq = FrameSequence::new(2, 3, GridMode::Color);
/// seq.push(GridMatrix::new(2, 3, GridMode::Color)).unwrap();
/// let blob = sequence_to_blob(&seq);
/// assert_eq!(blob.shape, vec![1, 2, 3, 3]);
/// assert_eq!(blob.data.len(), 18);
/// ```
#[must_use]
pub fn sequence_to_blob(sequence: &FrameSequence) -> ArchiveBlob {
    let mode = sequence.mode();
    let mut shape = vec![
        sequence.len() as u64,
        sequence.rows() as u64,
        sequence.cols() as u64,
    ];
    if mode == GridMode::Color {
        shape.push(3);
    }

    let mut data =
        Vec::with_capacity(sequence.len() * sequence.rows() * sequence.cols() * mode.channels());
    for matrix in sequence {
        for cell in matrix.cells() {
            match *cell {
                GridCell::Binary(v) => data.push(v),
                GridCell::Color((r, g, b)) => data.extend_from_slice(&[r, g, b]),
            }
        }
    }

    ArchiveBlob {
        key: ARRAY_KEY.to_string(),
        shape,
        data,
    }
}

/// Rebuild a sequence from a decoded blob, validating its shape.
///
/// Binary values above 1 are clamped to 1.
///
/// # Errors
/// Returns [`GridError::ArchiveLoad`] (attributed to `path`) if the key,
/// rank, or data length is wrong.
pub fn blob_to_sequence(blob: &ArchiveBlob, path: &Path) -> Result<FrameSequence, GridError> {
    if blob.key != ARRAY_KEY {
        return Err(GridError::archive(
            path,
            format!("missing array '{ARRAY_KEY}' (found '{}')", blob.key),
        ));
    }

    let mode = match blob.shape.as_slice() {
        [_, _, _] => GridMode::Binary,
        [_, _, _, 3] => GridMode::Color,
        other => {
            return Err(GridError::archive(
                path,
                format!("unsupported array shape {other:?}"),
            ));
        }
    };

    let dim = |i: usize| usize::try_from(blob.shape[i]).map_err(|e| GridError::archive(path, e));
    let (frames, rows, cols) = (dim(0)?, dim(1)?, dim(2)?);
    let expected = frames
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .and_then(|n| n.checked_mul(mode.channels()))
        .ok_or_else(|| GridError::archive(path, "array shape overflows"))?;
    if expected != blob.data.len() {
        return Err(GridError::archive(
            path,
            format!(
                "shape {:?} needs {expected} values, archive holds {}",
                blob.shape,
                blob.data.len()
            ),
        ));
    }

    let mut sequence = FrameSequence::new(rows, cols, mode);
    if expected == 0 {
        // Zero-area grids still carry `frames` empty matrices.
        for _ in 0..frames {
            sequence.push(GridMatrix::new(rows, cols, mode))?;
        }
        return Ok(sequence);
    }

    let mut clamped = 0usize;
    let frame_len = rows * cols * mode.channels();
    for chunk in blob.data.chunks_exact(frame_len) {
        let cells: Vec<GridCell> = match mode {
            GridMode::Binary => chunk
                .iter()
                .map(|&v| {
                    if v > 1 {
                        clamped += 1;
                    }
                    GridCell::Binary(v.min(1))
                })
                .collect(),
            GridMode::Color => chunk
                .chunks_exact(3)
                .map(|px| GridCell::Color((px[0], px[1], px[2])))
                .collect(),
        };
        sequence.push(GridMatrix::from_cells(rows, cols, mode, cells)?)?;
    }
    if clamped > 0 {
        log::warn!(
            "{clamped} valeurs binaires > 1 ramenées à 1 dans {}",
            path.display()
        );
    }
    Ok(sequence)
}

/// Encode a blob to the on-disk byte layout.
///
/// # Errors
/// Returns an I/O error if serialization or compression fails.
pub fn encode_blob(blob: &ArchiveBlob) -> std::io::Result<Vec<u8>> {
    let payload = bincode::serialize(blob).map_err(std::io::Error::other)?;
    let compressed = zstd::encode_all(payload.as_slice(), ZSTD_LEVEL)?;
    let mut out = Vec::with_capacity(compressed.len() + MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode the on-disk byte layout.
///
/// # Errors
/// Returns [`GridError::ArchiveLoad`] on a bad header, a corrupt zstd
/// stream, or an undecodable payload.
pub fn decode_blob(bytes: &[u8], path: &Path) -> Result<ArchiveBlob, GridError> {
    let Some(rest) = bytes.strip_prefix(MAGIC.as_slice()) else {
        return Err(GridError::archive(path, "not a gridvid archive (bad magic)"));
    };
    let Some((&version, compressed)) = rest.split_first() else {
        return Err(GridError::archive(path, "truncated header"));
    };
    if version != FORMAT_VERSION {
        return Err(GridError::archive(
            path,
            format!("unsupported format version {version}"),
        ));
    }
    let payload = zstd::decode_all(compressed)
        .map_err(|e| GridError::archive(path, format!("decompression failed: {e}")))?;
    bincode::deserialize(&payload)
        .map_err(|e| GridError::archive(path, format!("corrupt payload: {e}")))
}

/// Écrit la séquence complète dans `path`.
///
/// # Errors
/// Returns [`GridError::Io`] if the file cannot be written.
pub fn store_archive(path: &Path, sequence: &FrameSequence) -> Result<(), GridError> {
    let io_err = |source| GridError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = encode_blob(&sequence_to_blob(sequence)).map_err(io_err)?;
    std::fs::write(path, &bytes).map_err(io_err)?;
    log::info!(
        "Archive écrite : {} ({} frames, {} octets)",
        path.display(),
        sequence.len(),
        bytes.len()
    );
    Ok(())
}

/// Relit la séquence complète depuis `path`.
///
/// # Errors
/// Returns [`GridError::ArchiveLoad`] if the file is missing or corrupt.
pub fn load_archive(path: &Path) -> Result<FrameSequence, GridError> {
    let bytes = std::fs::read(path).map_err(|e| GridError::archive(path, e))?;
    let blob = decode_blob(&bytes, path)?;
    let sequence = blob_to_sequence(&blob, path)?;
    log::info!(
        "Archive chargée : {} ({} frames {}x{} {})",
        path.display(),
        sequence.len(),
        sequence.rows(),
        sequence.cols(),
        sequence.mode()
    );
    Ok(sequence)
}
