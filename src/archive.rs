//! Archive unpacking.
//!
//! After the walk, every recognized archive directly in the archives bucket
//! is extracted into a sibling directory named after the archive's stem and
//! the archive file is removed. Zip and tar are read with the `zip` and `tar`
//! crates; gzip streams are decompressed with `flate2` and sniffed for a tar
//! payload.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::categories::{get_extension, get_stem};
use crate::context::SortContext;
use crate::error::{Result, SortError};
use crate::log::ActionKind;

/// Archive formats the unpacker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    Gzip,
}

impl ArchiveKind {
    /// Maps a lowercased, dotted extension to an archive kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".zip" => Some(Self::Zip),
            ".tar" => Some(Self::Tar),
            ".gz" | ".tgz" => Some(Self::Gzip),
            _ => None,
        }
    }
}

/// Offset and value of the ustar magic in a tar header block.
const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: &[u8] = b"ustar";
/// Size of one tar header block; enough of a gzip payload to sniff it.
const TAR_BLOCK: usize = 512;

/// Extracts `archive` into `dest`, which must already exist.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let kind = ArchiveKind::from_extension(&get_extension(archive)).ok_or_else(|| {
        SortError::UnsupportedArchive {
            archive: archive.to_path_buf(),
        }
    })?;

    let unpack_error = |reason: String| SortError::Unpack {
        archive: archive.to_path_buf(),
        reason,
    };

    let file = BufReader::with_capacity(128 * 1024, File::open(archive)?);
    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| unpack_error(e.to_string()))?;
            zip.extract(dest).map_err(|e| unpack_error(e.to_string()))?;
        }
        ArchiveKind::Tar => {
            tar::Archive::new(file)
                .unpack(dest)
                .map_err(|e| unpack_error(e.to_string()))?;
        }
        ArchiveKind::Gzip => {
            let mut decoder = GzDecoder::new(file);
            let mut head = Vec::with_capacity(TAR_BLOCK);
            (&mut decoder)
                .take(TAR_BLOCK as u64)
                .read_to_end(&mut head)
                .map_err(|e| unpack_error(e.to_string()))?;

            let tar_payload = is_tar(&head);
            let mut payload = io::Cursor::new(head).chain(decoder);
            if tar_payload {
                tar::Archive::new(payload)
                    .unpack(dest)
                    .map_err(|e| unpack_error(e.to_string()))?;
            } else {
                let mut out = File::create(dest.join(get_stem(archive)))?;
                io::copy(&mut payload, &mut out).map_err(|e| unpack_error(e.to_string()))?;
            }
        }
    }

    Ok(())
}

fn is_tar(payload: &[u8]) -> bool {
    payload
        .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
        .is_some_and(|magic| magic == USTAR_MAGIC)
}

/// Unpacks every recognized archive directly inside `archives_dir`.
///
/// Archives are handled one after another. A successfully extracted archive
/// is deleted; a failed one is left in place and its partial output removed.
/// Every outcome is written to the action log. A missing `archives_dir` means
/// there is nothing to do.
///
/// Returns the output directories that were created.
pub fn unpack_all(ctx: &SortContext, archives_dir: &Path) -> Vec<PathBuf> {
    let mut unpacked = Vec::new();

    let mut archives: Vec<PathBuf> = match fs::read_dir(archives_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| ArchiveKind::from_extension(&get_extension(p)).is_some())
            .collect(),
        Err(_) => return unpacked,
    };
    archives.sort();

    for archive in archives {
        let dest = archives_dir.join(get_stem(&archive));
        let existed = dest.exists();

        let result = fs::create_dir_all(&dest)
            .map_err(SortError::from)
            .and_then(|()| extract(&archive, &dest));

        match result {
            Ok(()) => {
                ctx.log
                    .log(ActionKind::Unpacked, format!("{} extracted", archive.display()));
                ctx.stats().unpacked += 1;

                if let Err(e) = fs::remove_file(&archive) {
                    ctx.log_error(format!(
                        "Failed to remove unpacked archive {}: {}",
                        archive.display(),
                        e
                    ));
                }
                unpacked.push(dest);
            }
            Err(e) => {
                let message = match e {
                    SortError::Unpack { .. } => e.to_string(),
                    other => format!("Failed to unpack {}: {}", archive.display(), other),
                };
                ctx.log_error(message);
                ctx.stats().unpack_failed += 1;

                if !existed {
                    discard_partial_output(ctx, &dest);
                }
            }
        }
    }

    unpacked
}

/// Removes what a failed extraction left behind in `dest`.
fn discard_partial_output(ctx: &SortContext, dest: &Path) {
    match fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => ctx.log_error(format!(
            "Failed to remove partial output {}: {}",
            dest.display(),
            e
        )),
    }
}
