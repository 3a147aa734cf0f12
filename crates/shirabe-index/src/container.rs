use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use memmap2::Mmap;

use crate::data::{IndexByteOrder, IndexData};
use crate::error::{IndexError, Result};

/// Conventional file name suffix of index containers
pub const EXTENSION: &str = ".index";
/// "JGIX" in ASCII
pub const MAGIC: i32 = 0x4A47_4958;
pub const VERSION: i32 = 1000;

const HEADER_LENGTH: u64 = 4 * 4;
const FIRST_RECORD_POINTER_OFFSET: u64 = 2 * 4;
const RECORD_PREFIX_LENGTH: i32 = 3 * 4;
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Edit mode writes records, access mode reads payloads. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerMode {
    Edit,
    Access,
}

impl fmt::Display for ContainerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerMode::Edit => f.write_str("edit"),
            ContainerMode::Access => f.write_str("access"),
        }
    }
}

/// Location of one record inside the container file
#[derive(Debug)]
struct IndexMetaData {
    start: u64,
    index_type: i32,
    length: u64,
    data_offset: u64,
    data: OnceLock<IndexData>,
}

impl IndexMetaData {
    fn next_record_offset(&self) -> u64 {
        self.start + self.data_offset + self.length
    }

    fn payload_start(&self) -> u64 {
        self.start + self.data_offset
    }
}

/// Index container stored in a single file.
///
/// Not internally synchronized: one owner, one writer, and never an edit-mode
/// and an access-mode instance on the same file at the same time.
pub struct FileIndexContainer {
    path: PathBuf,
    file: Option<File>,
    mode: ContainerMode,
    byte_order: IndexByteOrder,
    indexes: Vec<IndexMetaData>,
    map: OnceLock<Arc<Mmap>>,
}

impl FileIndexContainer {
    /// Open a container. In edit mode a missing file is created with a fresh
    /// header; access mode requires an existing file.
    pub fn open(path: impl AsRef<Path>, mode: ContainerMode) -> Result<Self> {
        let path = path.as_ref();
        let exists = path.exists();

        let mut file = match mode {
            ContainerMode::Edit => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?,
            ContainerMode::Access => File::open(path)?,
        };

        let (byte_order, indexes) = if mode == ContainerMode::Edit && !exists {
            tracing::info!("Creating index container {}", path.display());
            (write_header(&mut file)?, Vec::new())
        } else {
            let byte_order = read_header(&mut file)?;
            (byte_order, read_index_meta_data(&mut file)?)
        };

        tracing::debug!(
            "Opened index container {} in {} mode with {} records",
            path.display(),
            mode,
            indexes.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            mode,
            byte_order,
            indexes,
            map: OnceLock::new(),
        })
    }

    /// Open (or create) a container for writing
    pub fn edit(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, ContainerMode::Edit)
    }

    /// Open an existing container for reading
    pub fn access(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, ContainerMode::Access)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ContainerMode {
        self.mode
    }

    pub fn can_access(&self) -> bool {
        self.mode == ContainerMode::Access
    }

    pub fn can_edit(&self) -> bool {
        self.mode == ContainerMode::Edit
    }

    /// Byte order recorded in the header, used for all payload reads
    pub fn byte_order(&self) -> IndexByteOrder {
        self.byte_order
    }

    pub fn has_index(&self, index_type: i32) -> bool {
        self.meta_data(index_type).is_some()
    }

    /// Record types in file order
    pub fn index_types(&self) -> Vec<i32> {
        self.indexes.iter().map(|index| index.index_type).collect()
    }

    /// Zero-copy view of a record's payload. Repeated calls return handles
    /// over the same cached view.
    pub fn get_index_data(&self, index_type: i32) -> Result<IndexData> {
        self.require_mode(ContainerMode::Access, "get_index_data")?;

        let index = self
            .meta_data(index_type)
            .ok_or(IndexError::IndexMissing(index_type))?;

        if let Some(data) = index.data.get() {
            return Ok(data.clone());
        }

        let map = self.mapping()?;
        let start = usize::try_from(index.payload_start()).map_err(|_| {
            IndexError::Corruption(format!("record offset {} exceeds address space", index.start))
        })?;
        let len = usize::try_from(index.length).map_err(|_| {
            IndexError::Corruption(format!("record length {} exceeds address space", index.length))
        })?;
        if start + len > map.len() {
            return Err(IndexError::Corruption(format!(
                "record {index_type:#x} extends past the end of the file"
            )));
        }

        let data = index
            .data
            .get_or_init(|| IndexData::new(map, start, len, self.byte_order));
        Ok(data.clone())
    }

    /// Append a record at the end of the file.
    pub fn create_index(&mut self, index_type: i32, data: &[u8]) -> Result<()> {
        self.require_mode(ContainerMode::Edit, "create_index")?;

        if self.has_index(index_type) {
            return Err(IndexError::IndexExists(index_type));
        }

        let length = i32::try_from(data.len()).map_err(|_| {
            IndexError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("index data of {} bytes is too large", data.len()),
            ))
        })?;

        let file = self.file_mut()?;
        let start = file.seek(SeekFrom::End(0))?;

        let mut prefix = [0u8; RECORD_PREFIX_LENGTH as usize];
        BigEndian::write_i32(&mut prefix[0..4], index_type);
        BigEndian::write_i32(&mut prefix[4..8], length);
        BigEndian::write_i32(&mut prefix[8..12], RECORD_PREFIX_LENGTH);
        file.write_all(&prefix)?;
        file.write_all(data)?;
        file.flush()?;

        tracing::debug!(
            "Appended index {:#x} ({} bytes) at offset {} of {}",
            index_type,
            data.len(),
            start,
            self.path.display()
        );

        self.indexes.push(IndexMetaData {
            start,
            index_type,
            length: data.len() as u64,
            data_offset: RECORD_PREFIX_LENGTH as u64,
            data: OnceLock::new(),
        });
        Ok(())
    }

    /// Remove a record, shifting every following byte backwards over it and
    /// truncating the file. The record chain is parsed again afterwards since
    /// all later offsets moved.
    pub fn delete_index(&mut self, index_type: i32) -> Result<()> {
        self.require_mode(ContainerMode::Edit, "delete_index")?;

        let (header_offset, next_offset) = {
            let index = self
                .meta_data(index_type)
                .ok_or(IndexError::IndexMissing(index_type))?;
            (index.start, index.next_record_offset())
        };

        let file = self.file.as_mut().ok_or(IndexError::Closed)?;
        let file_length = file.metadata()?.len();
        let remainder = file_length.saturating_sub(next_offset);

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut moved = 0u64;
        while moved < remainder {
            let chunk = (remainder - moved).min(COPY_BUFFER_SIZE as u64) as usize;
            file.seek(SeekFrom::Start(next_offset + moved))?;
            file.read_exact(&mut buffer[..chunk])?;
            file.seek(SeekFrom::Start(header_offset + moved))?;
            file.write_all(&buffer[..chunk])?;
            moved += chunk as u64;
        }
        file.set_len(header_offset + remainder)?;
        file.flush()?;

        self.indexes = read_index_meta_data(file)?;

        tracing::debug!(
            "Deleted index {:#x} from {}, {} records remain",
            index_type,
            self.path.display(),
            self.indexes.len()
        );
        Ok(())
    }

    /// Switch from edit to access mode. There is no way back.
    pub fn end_editing(&mut self) -> Result<()> {
        self.require_mode(ContainerMode::Edit, "end_editing")?;
        self.file_mut()?.sync_data()?;
        self.mode = ContainerMode::Access;
        Ok(())
    }

    /// Release the file handle and the mapping. Views handed out earlier stay
    /// readable until they are dropped. Calling `close` again does nothing.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if self.mode == ContainerMode::Edit {
                // best effort, the data is already written
                let _ = file.sync_data();
            }
            tracing::debug!("Closed index container {}", self.path.display());
        }
        self.indexes.clear();
        self.map = OnceLock::new();
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn meta_data(&self, index_type: i32) -> Option<&IndexMetaData> {
        self.indexes
            .iter()
            .find(|index| index.index_type == index_type)
    }

    fn require_mode(&self, mode: ContainerMode, operation: &'static str) -> Result<()> {
        if self.file.is_none() {
            return Err(IndexError::Closed);
        }
        if self.mode != mode {
            return Err(IndexError::IllegalMode {
                operation,
                mode: self.mode,
            });
        }
        Ok(())
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(IndexError::Closed)
    }

    fn mapping(&self) -> Result<Arc<Mmap>> {
        if let Some(map) = self.map.get() {
            return Ok(Arc::clone(map));
        }
        let file = self.file.as_ref().ok_or(IndexError::Closed)?;
        // SAFETY: the container is the only writer of the file and is in access
        // mode, so the mapped bytes are not modified while the mapping lives.
        let map = Arc::new(unsafe { Mmap::map(file)? });
        Ok(Arc::clone(self.map.get_or_init(|| map)))
    }
}

impl fmt::Debug for FileIndexContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileIndexContainer")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("byte_order", &self.byte_order)
            .field("indexes", &self.index_types())
            .finish()
    }
}

fn premature_end(err: io::Error) -> IndexError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        IndexError::Corruption("premature end of index file".to_string())
    } else {
        IndexError::Io(err)
    }
}

fn write_header(file: &mut File) -> Result<IndexByteOrder> {
    let byte_order = IndexByteOrder::native();

    let mut header = [0u8; HEADER_LENGTH as usize];
    BigEndian::write_i32(&mut header[0..4], MAGIC);
    BigEndian::write_i32(&mut header[4..8], VERSION);
    BigEndian::write_i32(&mut header[8..12], HEADER_LENGTH as i32);
    BigEndian::write_i32(&mut header[12..16], byte_order.marker());

    file.seek(SeekFrom::Start(0))?;
    file.write_all(&header)?;
    file.flush()?;
    Ok(byte_order)
}

fn read_header(file: &mut File) -> Result<IndexByteOrder> {
    file.seek(SeekFrom::Start(0))?;

    let magic = file.read_i32::<BigEndian>().map_err(premature_end)?;
    if magic != MAGIC {
        return Err(IndexError::Corruption(
            "index file does not start with magic number".to_string(),
        ));
    }

    let version = file.read_i32::<BigEndian>().map_err(premature_end)?;
    if version != VERSION {
        return Err(IndexError::Corruption(format!(
            "index version {version} not supported"
        )));
    }

    // first record offset, validated while walking the chain
    file.read_i32::<BigEndian>().map_err(premature_end)?;

    let marker = file.read_i32::<BigEndian>().map_err(premature_end)?;
    IndexByteOrder::from_marker(marker)
        .ok_or_else(|| IndexError::Corruption(format!("unknown byte order marker {marker}")))
}

fn read_index_meta_data(file: &mut File) -> Result<Vec<IndexMetaData>> {
    file.seek(SeekFrom::Start(FIRST_RECORD_POINTER_OFFSET))?;
    let first = file.read_i32::<BigEndian>().map_err(premature_end)?;
    if (first as i64) < HEADER_LENGTH as i64 {
        return Err(IndexError::Corruption(format!(
            "first record offset {first} points into the header"
        )));
    }

    let length = file.metadata()?.len();
    let mut offset = first as u64;
    let mut indexes = Vec::new();

    while offset < length {
        file.seek(SeekFrom::Start(offset))?;
        let index_type = file.read_i32::<BigEndian>().map_err(premature_end)?;
        let data_length = file.read_i32::<BigEndian>().map_err(premature_end)?;
        let data_offset = file.read_i32::<BigEndian>().map_err(premature_end)?;

        if data_length < 0 || data_offset < RECORD_PREFIX_LENGTH {
            return Err(IndexError::Corruption(format!(
                "malformed record header at offset {offset}"
            )));
        }

        if indexes
            .iter()
            .any(|index: &IndexMetaData| index.index_type == index_type)
        {
            return Err(IndexError::Corruption(format!(
                "index type {index_type} stored twice"
            )));
        }

        let index = IndexMetaData {
            start: offset,
            index_type,
            length: data_length as u64,
            data_offset: data_offset as u64,
            data: OnceLock::new(),
        };
        offset = index.next_record_offset();
        indexes.push(index);
    }

    if offset != length {
        return Err(IndexError::Corruption(
            "premature end of index file".to_string(),
        ));
    }

    Ok(indexes)
}
