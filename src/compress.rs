//! Gzip compression of compiled firmware images.
//!
//! Each input `X.bin` is stream-compressed at maximum level into `X.bin.gz`,
//! replacing any stale `.gz` from a previous build, and the size reduction
//! is reported.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Errors from firmware image compression.
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    /// A firmware image to compress does not exist.
    #[error("Firmware image not found: {0}")]
    MissingInput(PathBuf),

    /// An I/O error occurred while reading, writing, or replacing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Compress every image in `images`, stopping at the first failure.
pub fn compress_images(images: &[PathBuf]) -> Result<(), CompressError> {
    for image in images {
        compress_image(image)?;
    }
    Ok(())
}

/// Compress a single firmware image to `<image>.gz` at gzip level 9.
///
/// A pre-existing `.gz` is removed first so a failed compression can never
/// leave a stale artifact masquerading as current. Returns the path of the
/// compressed file.
pub fn compress_image(image: &Path) -> Result<PathBuf, CompressError> {
    if !image.is_file() {
        return Err(CompressError::MissingInput(image.to_path_buf()));
    }
    let gz_path = gz_path_for(image);

    if gz_path.exists() {
        std::fs::remove_file(&gz_path).map_err(|source| CompressError::Io {
            path: gz_path.clone(),
            source,
        })?;
    }

    log::info!("Compressing {} for upload...", image.display());

    let input = File::open(image).map_err(|source| CompressError::Io {
        path: image.to_path_buf(),
        source,
    })?;
    let output = File::create(&gz_path).map_err(|source| CompressError::Io {
        path: gz_path.clone(),
        source,
    })?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::best());
    let io_err = |source| CompressError::Io {
        path: gz_path.clone(),
        source,
    };
    std::io::copy(&mut reader, &mut encoder).map_err(io_err)?;
    encoder.finish().map_err(io_err)?;

    report_reduction(image, &gz_path)?;
    Ok(gz_path)
}

/// `firmware.bin` → `firmware.bin.gz` (the full original name is kept).
fn gz_path_for(image: &Path) -> PathBuf {
    let mut name = OsString::from(image.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

fn report_reduction(image: &Path, gz_path: &Path) -> Result<(), CompressError> {
    let size_of = |path: &Path| {
        std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| CompressError::Io {
                path: path.to_path_buf(),
                source,
            })
    };
    let original = size_of(image)?;
    let compressed = size_of(gz_path)?;

    if original > 0 {
        let saved_pct = 100.0 * (1.0 - compressed as f64 / original as f64);
        log::info!(
            "Compression reduced {} by {saved_pct:.0}% (was {}, now {})",
            image.display(),
            ByteSize::b(original),
            ByteSize::b(compressed),
        );
    }
    Ok(())
}
