use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::foundation::core::{CanvasDims, CanvasId};
use crate::foundation::error::{ChartaError, ChartaResult, IoContext};
use crate::format::bmp::{self, BYTES_PER_PIXEL, HEADER_LEN, PAD_FILLER};
use crate::store::scratch::ScratchSpace;

/// Owner of the `<id>.bmp` raster files under one workspace directory.
#[derive(Clone, Debug)]
pub struct CanvasStore {
    root: PathBuf,
}

impl CanvasStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the raster file backing canvas `id`.
    pub fn path_for(&self, id: CanvasId) -> PathBuf {
        self.root.join(format!("{id}.bmp"))
    }

    /// Scratch area for throwaway canvases used while synthesizing reads.
    pub fn scratch(&self) -> ScratchSpace {
        ScratchSpace::new(self.root.join(".scratch"))
    }

    /// Allocate the backing file for a new canvas: header plus blank rows.
    pub fn create(&self, id: CanvasId, dims: CanvasDims) -> ChartaResult<()> {
        create_blank(&self.path_for(id), dims)
    }

    /// Open an existing canvas for positioned reads and writes.
    pub fn open(&self, id: CanvasId, dims: CanvasDims) -> ChartaResult<CanvasFile> {
        let path = self.path_for(id);
        match CanvasFile::open(&path, dims) {
            Err(ChartaError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(ChartaError::NotFound(id))
            }
            other => other,
        }
    }

    /// Remove the backing file. Returns `false` when there was nothing to remove.
    pub fn delete(&self, id: CanvasId) -> ChartaResult<bool> {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ChartaError::io(
                format!("remove canvas file '{}'", path.display()),
                err,
            )),
        }
    }
}

/// Write a blank canvas file: zero pixel bytes, [`PAD_FILLER`] in every pad byte.
pub fn create_blank(path: &Path, dims: CanvasDims) -> ChartaResult<()> {
    let file =
        File::create(path).io_context(|| format!("create canvas file '{}'", path.display()))?;
    let mut out = BufWriter::new(file);

    let row_len = dims.width as usize * BYTES_PER_PIXEL as usize;
    let mut row = vec![0u8; row_len + bmp::row_padding(dims.width) as usize];
    row[row_len..].fill(PAD_FILLER);

    let ctx = || format!("write canvas file '{}'", path.display());
    out.write_all(&bmp::encode_header(dims)).io_context(ctx)?;
    for _ in 0..dims.height {
        out.write_all(&row).io_context(ctx)?;
    }
    out.flush().io_context(ctx)?;
    Ok(())
}

/// Open handle on one canvas file. Dropped at the end of each operation.
#[derive(Debug)]
pub struct CanvasFile {
    file: File,
    dims: CanvasDims,
    path: PathBuf,
}

impl CanvasFile {
    /// Open `path` read/write and check that its header declares `dims`.
    pub fn open(path: &Path, dims: CanvasDims) -> ChartaResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .io_context(|| format!("open canvas file '{}'", path.display()))?;
        let mut canvas = Self {
            file,
            dims,
            path: path.to_path_buf(),
        };
        canvas.check_header()?;
        Ok(canvas)
    }

    pub fn dims(&self) -> CanvasDims {
        self.dims
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the cursor to an absolute byte offset.
    pub fn seek_to(&mut self, offset: u64) -> ChartaResult<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .io_context(|| format!("seek to {offset} in '{}'", self.path.display()))
    }

    /// Advance the cursor without touching the bytes skipped over.
    pub fn skip(&mut self, count: u64) -> ChartaResult<()> {
        // Canvas files stay far below i64::MAX bytes.
        self.file
            .seek(SeekFrom::Current(count as i64))
            .map(|_| ())
            .io_context(|| format!("skip {count} bytes in '{}'", self.path.display()))
    }

    /// Write `bytes` at the cursor.
    pub fn write_next(&mut self, bytes: &[u8]) -> ChartaResult<()> {
        self.file
            .write_all(bytes)
            .io_context(|| format!("write canvas file '{}'", self.path.display()))
    }

    /// Write `bytes` at `offset`.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> ChartaResult<()> {
        self.seek_to(offset)?;
        self.write_next(bytes)
    }

    /// Fill `buf` from `offset`. A short file is reported as an I/O failure.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> ChartaResult<()> {
        self.seek_to(offset)?;
        let len = buf.len();
        self.file.read_exact(buf).io_context(|| {
            format!(
                "read {len} bytes at {offset} from '{}'",
                self.path.display()
            )
        })
    }

    pub fn flush(&mut self) -> ChartaResult<()> {
        self.file
            .flush()
            .io_context(|| format!("flush canvas file '{}'", self.path.display()))
    }

    fn check_header(&mut self) -> ChartaResult<()> {
        let mut header = [0u8; HEADER_LEN as usize];
        self.read_at(0, &mut header)?;
        if header != bmp::encode_header(self.dims) {
            return Err(ChartaError::io(
                format!("canvas file '{}' is corrupt", self.path.display()),
                std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!(
                        "header does not describe a {}x{} canvas",
                        self.dims.width, self.dims.height
                    ),
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/canvas_file.rs"]
mod tests;
