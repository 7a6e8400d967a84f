//! Binary persistence of [`SimulationData`].
//!
//! Lets repeated benchmark runs skip grid generation. The format is a flat,
//! uncompressed little-endian stream:
//!
//! ```text
//! magic        "XSBD"
//! version      u32
//! n_isotopes   u64
//! n_gridpoints u64
//! grid points  n_isotopes × n_gridpoints × (energy f64, 5 × xs f64)
//! n_unionized  u64
//! energies     n_unionized × f64
//! index table  n_unionized × n_isotopes × u32
//! n_materials  u64
//! materials    n_materials × (n_components u64, n_components × (nuclide u32, concentration f64))
//! ```
//!
//! Floating-point values are stored as raw IEEE-754 bits, so a round trip is
//! bit-exact.

use std::convert::Infallible;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::builder::GridConfig;
use crate::data::SimulationData;
use crate::error::GridError;
use crate::grid::{NuclideGridPoint, N_XS};
use crate::material::{Material, MaterialComponent};

/// File signature.
pub const MAGIC: [u8; 4] = *b"XSBD";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

const POINT_BYTES: u64 = 8 * (1 + N_XS as u64);
const COMPONENT_BYTES: u64 = 4 + 8;

/// Persistence failures. All of them are fatal configuration errors.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Stream-level I/O error (no path context).
    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),

    /// The data does not start with [`MAGIC`].
    #[error("Not a grid data file: bad magic {0:?}")]
    BadMagic([u8; 4]),

    /// Written by an incompatible format version.
    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u32),

    /// The data ends before the declared content.
    #[error("Truncated data while reading {0}")]
    Truncated(&'static str),

    /// Extra bytes follow the declared content.
    #[error("{0} trailing bytes after material data")]
    TrailingBytes(u64),

    /// Declared counts differ from the requested configuration.
    #[error("Count mismatch for {field}: requested {requested}, data declares {found}")]
    CountMismatch {
        /// Which count.
        field: &'static str,
        /// Value requested by the run configuration.
        requested: usize,
        /// Value declared in the data.
        found: usize,
    },

    /// Content is structurally invalid, including decoded arrays that do
    /// not form a valid data model.
    #[error("Corrupt data: {0}")]
    Corrupt(String),
}

impl From<GridError> for PersistError {
    fn from(err: GridError) -> Self {
        PersistError::Corrupt(err.to_string())
    }
}

/// Serialises `data` into a byte blob.
pub fn encode(data: &SimulationData) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(data));
    match write_to(&mut buf, data) {
        Ok(()) => buf,
        Err(never) => match never {},
    }
}

/// Deserialises a byte blob produced by [`encode`].
///
/// # Errors
///
/// Returns [`PersistError`] for a bad signature or version, truncated or
/// oversized input, or structurally invalid content.
pub fn decode(bytes: &[u8]) -> Result<SimulationData, PersistError> {
    Decoder::new(bytes, bytes.len() as u64, None).decode()
}

/// Writes `data` to `path`.
///
/// # Errors
///
/// Returns [`PersistError::Io`] if the file cannot be created or written.
pub fn save(path: impl AsRef<Path>, data: &SimulationData) -> Result<(), PersistError> {
    let path = path.as_ref();
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, data).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(
        path = %path.display(),
        bytes = encoded_len(data),
        "Simulation data written"
    );
    Ok(())
}

/// Reads data written by [`save`], checking its counts against `expected`.
///
/// Counts are compared as soon as they are read, so a mismatched file is
/// rejected before its bulk arrays are loaded.
///
/// # Errors
///
/// - [`PersistError::Io`] if the file is missing or unreadable
/// - [`PersistError::CountMismatch`] if a declared count differs from `expected`
/// - any decoding error of [`decode`]
pub fn load(path: impl AsRef<Path>, expected: &GridConfig) -> Result<SimulationData, PersistError> {
    let path = path.as_ref();
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    let data = Decoder::new(BufReader::new(file), len, Some(expected)).decode()?;

    info!(
        path = %path.display(),
        bytes = len,
        n_unionized = data.n_unionized(),
        "Simulation data loaded"
    );
    Ok(data)
}

/// Exact size of the encoded form of `data`.
pub fn encoded_len(data: &SimulationData) -> usize {
    let header = 4 + 4 + 8 + 8;
    let grids = data.nuclide_grids().len() * POINT_BYTES as usize;
    let unionized = 8 + data.n_unionized() * 8;
    let index = data.index_grid().len() * 4;
    let materials = 8 + data
        .materials()
        .iter()
        .map(|m| 8 + m.len() * COMPONENT_BYTES as usize)
        .sum::<usize>();
    header + grids + unionized + index + materials
}

/// Destination of the encoder. A `Vec` cannot fail; a file writer can.
trait ByteSink {
    type Error;

    fn put(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl ByteSink for Vec<u8> {
    type Error = Infallible;

    fn put(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<W: Write> ByteSink for BufWriter<W> {
    type Error = io::Error;

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

fn write_to<S: ByteSink>(w: &mut S, data: &SimulationData) -> Result<(), S::Error> {
    w.put(&MAGIC)?;
    w.put(&FORMAT_VERSION.to_le_bytes())?;
    w.put(&(data.n_isotopes() as u64).to_le_bytes())?;
    w.put(&(data.n_gridpoints() as u64).to_le_bytes())?;

    for point in data.nuclide_grids() {
        w.put(&point.energy.to_le_bytes())?;
        for xs in &point.xs {
            w.put(&xs.to_le_bytes())?;
        }
    }

    w.put(&(data.n_unionized() as u64).to_le_bytes())?;
    for energy in data.unionized_energy() {
        w.put(&energy.to_le_bytes())?;
    }
    for idx in data.index_grid() {
        w.put(&idx.to_le_bytes())?;
    }

    w.put(&(data.n_materials() as u64).to_le_bytes())?;
    for material in data.materials() {
        w.put(&(material.len() as u64).to_le_bytes())?;
        for c in material.components() {
            w.put(&c.nuclide.to_le_bytes())?;
            w.put(&c.concentration.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Streaming decoder that tracks the bytes left so that declared counts can
/// be checked before anything is allocated for them.
struct Decoder<'a, R> {
    inner: R,
    remaining: u64,
    expected: Option<&'a GridConfig>,
}

impl<'a, R: Read> Decoder<'a, R> {
    fn new(inner: R, len: u64, expected: Option<&'a GridConfig>) -> Self {
        Self {
            inner,
            remaining: len,
            expected,
        }
    }

    fn fill(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), PersistError> {
        self.reserve(buf.len() as u64, what)?;
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => PersistError::Truncated(what),
            _ => PersistError::Stream(e),
        })
    }

    fn reserve(&mut self, bytes: u64, what: &'static str) -> Result<(), PersistError> {
        if bytes > self.remaining {
            return Err(PersistError::Truncated(what));
        }
        self.remaining -= bytes;
        Ok(())
    }

    fn read_u32(&mut self, what: &'static str) -> Result<u32, PersistError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, what)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64, PersistError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf, what)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_f64(&mut self, what: &'static str) -> Result<f64, PersistError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf, what)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads a declared count, checks it fits the remaining bytes at
    /// `bytes_each`, and compares it with the requested configuration.
    fn read_count(
        &mut self,
        field: &'static str,
        bytes_each: u64,
        requested: Option<usize>,
    ) -> Result<usize, PersistError> {
        let count = self.read_u64(field)?;
        if count.saturating_mul(bytes_each) > self.remaining {
            return Err(PersistError::Truncated(field));
        }
        let count = usize::try_from(count)
            .map_err(|_| PersistError::Corrupt(format!("{} of {} does not fit", field, count)))?;
        if let Some(requested) = requested {
            if requested != count {
                return Err(PersistError::CountMismatch {
                    field,
                    requested,
                    found: count,
                });
            }
        }
        Ok(count)
    }

    fn decode(mut self) -> Result<SimulationData, PersistError> {
        let mut magic = [0u8; 4];
        self.fill(&mut magic, "magic")?;
        if magic != MAGIC {
            return Err(PersistError::BadMagic(magic));
        }
        let version = self.read_u32("version")?;
        if version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion(version));
        }

        let expected = self.expected;
        let n_isotopes = self.read_count("n_isotopes", 0, expected.map(|c| c.n_isotopes()))?;
        let n_gridpoints =
            self.read_count("n_gridpoints", 0, expected.map(|c| c.n_gridpoints()))?;
        if n_isotopes == 0 || n_gridpoints < 2 {
            return Err(PersistError::Corrupt(format!(
                "{} nuclides with {} grid points",
                n_isotopes, n_gridpoints
            )));
        }
        let n_points = n_isotopes
            .checked_mul(n_gridpoints)
            .ok_or_else(|| PersistError::Corrupt("grid size overflows".to_string()))?;
        self.reserve_array(n_points, POINT_BYTES, "nuclide grids")?;

        let mut nuclide_grids = Vec::with_capacity(n_points);
        for _ in 0..n_points {
            let energy = self.read_f64("nuclide grids")?;
            let mut xs = [0.0; N_XS];
            for value in xs.iter_mut() {
                *value = self.read_f64("nuclide grids")?;
            }
            nuclide_grids.push(NuclideGridPoint::new(energy, xs));
        }

        let n_unionized = self.read_count("n_unionized", 8, None)?;
        let mut unionized_energy = Vec::with_capacity(n_unionized);
        for _ in 0..n_unionized {
            unionized_energy.push(self.read_f64("unionized grid")?);
        }

        let n_index = n_unionized
            .checked_mul(n_isotopes)
            .ok_or_else(|| PersistError::Corrupt("index table size overflows".to_string()))?;
        self.reserve_array(n_index, 4, "index table")?;
        let mut index_grid = Vec::with_capacity(n_index);
        for _ in 0..n_index {
            index_grid.push(self.read_u32("index table")?);
        }

        let n_materials = self.read_count("n_materials", 8, expected.map(|c| c.n_materials()))?;
        let mut materials = Vec::with_capacity(n_materials);
        for m in 0..n_materials {
            let n_components = self.read_count("material components", COMPONENT_BYTES, None)?;
            if n_components > n_isotopes {
                return Err(PersistError::Corrupt(format!(
                    "material {} declares {} components for {} nuclides",
                    m, n_components, n_isotopes
                )));
            }
            let mut components = Vec::with_capacity(n_components);
            for _ in 0..n_components {
                let nuclide = self.read_u32("material components")?;
                let concentration = self.read_f64("material components")?;
                components.push(MaterialComponent {
                    nuclide,
                    concentration,
                });
            }
            materials.push(Material::new(components));
        }

        if self.remaining > 0 {
            return Err(PersistError::TrailingBytes(self.remaining));
        }

        // Energy ordering and index ranges are enforced by `from_parts`.
        Ok(SimulationData::from_parts(
            n_isotopes,
            n_gridpoints,
            nuclide_grids,
            unionized_energy,
            index_grid,
            materials,
        )?)
    }

    /// Fails early if `count` items of `bytes_each` cannot fit.
    fn reserve_array(
        &self,
        count: usize,
        bytes_each: u64,
        what: &'static str,
    ) -> Result<(), PersistError> {
        if (count as u64).saturating_mul(bytes_each) > self.remaining {
            return Err(PersistError::Truncated(what));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::generate;

    fn config() -> GridConfig {
        GridConfig::builder()
            .n_isotopes(5)
            .n_gridpoints(20)
            .n_materials(3)
            .seed(9)
            .build()
            .unwrap()
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let data = generate(&config()).unwrap();
        let bytes = encode(&data);
        assert_eq!(bytes.len(), encoded_len(&data));

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, data);
        for (a, b) in data.nuclide_grids().iter().zip(decoded.nuclide_grids()) {
            assert_eq!(a.energy.to_bits(), b.energy.to_bits());
        }
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let data = generate(&config()).unwrap();
        let mut bytes = encode(&data);
        bytes[0] = b'Y';

        assert!(matches!(decode(&bytes), Err(PersistError::BadMagic(_))));
    }

    #[test]
    fn test_decode_rejects_future_version() {
        let data = generate(&config()).unwrap();
        let mut bytes = encode(&data);
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());

        assert!(matches!(
            decode(&bytes),
            Err(PersistError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let data = generate(&config()).unwrap();
        let bytes = encode(&data);

        for cut in [3, 10, 100, bytes.len() / 2, bytes.len() - 1] {
            let result = decode(&bytes[..cut]);
            assert!(
                matches!(result, Err(PersistError::Truncated(_))),
                "cut at {} gave {:?}",
                cut,
                result.err()
            );
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let data = generate(&config()).unwrap();
        let mut bytes = encode(&data);
        bytes.extend_from_slice(&[0, 0, 0]);

        assert!(matches!(
            decode(&bytes),
            Err(PersistError::TrailingBytes(3))
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_index() {
        let data = generate(&config()).unwrap();
        let mut bytes = encode(&data);
        let index_start = 24 + data.nuclide_grids().len() * 48 + 8 + data.n_unionized() * 8;
        bytes[index_start..index_start + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(matches!(decode(&bytes), Err(PersistError::Corrupt(_))));
    }

    fn unionized_start(data: &SimulationData) -> usize {
        24 + data.nuclide_grids().len() * 48 + 8
    }

    #[test]
    fn test_decode_rejects_unsorted_unionized_grid() {
        let data = generate(&config()).unwrap();
        let mut bytes = encode(&data);
        let start = unionized_start(&data);
        bytes[start..start + 8].copy_from_slice(&2.0f64.to_le_bytes());

        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt(_)));
        assert!(err.to_string().contains("unionized grid"));
    }

    #[test]
    fn test_decode_rejects_nan_energy() {
        let data = generate(&config()).unwrap();

        let mut bytes = encode(&data);
        let start = unionized_start(&data);
        bytes[start..start + 8].copy_from_slice(&f64::NAN.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(PersistError::Corrupt(_))));

        // Energy of the second point of nuclide 0.
        let mut bytes = encode(&data);
        bytes[24 + 48..24 + 56].copy_from_slice(&f64::NAN.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(PersistError::Corrupt(_))));
    }

    #[test]
    fn test_decode_rejects_absurd_counts() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());

        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.xsbd");
        let data = generate(&config()).unwrap();

        save(&path, &data).unwrap();
        let loaded = load(&path, &config()).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_load_rejects_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.xsbd");
        save(&path, &generate(&config()).unwrap()).unwrap();

        let other = GridConfig::builder()
            .n_isotopes(5)
            .n_gridpoints(21)
            .n_materials(3)
            .build()
            .unwrap();
        let result = load(&path, &other);

        assert!(matches!(
            result,
            Err(PersistError::CountMismatch {
                field: "n_gridpoints",
                requested: 21,
                found: 20,
            })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("absent.xsbd"), &config());

        assert!(matches!(result, Err(PersistError::Io { .. })));
    }
}
