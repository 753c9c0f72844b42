//! Source indexing: turn an archive, folder, or loose meta file into a
//! [`CurationIndex`].
//!
//! Layout of a curation package:
//! ```text
//! <root>/meta.txt        (or meta.yaml / meta.yml, any case)
//! <root>/content/...     game files
//! <root>/logo.png        thumbnail (png, jpg or jpeg)
//! <root>/ss.png          screenshot
//! ```
//! The root is the directory holding the shallowest meta file. It may be the
//! package itself or a single wrapper directory inside it.
//!
//! Indexing never fails. Structural problems become diagnostics on the
//! returned index and whatever could be found is still filled in.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use curate_core::{
    AssetRef, ContentRef, Curation, CurationIndex, Diagnostic, DiagnosticKind, ParsedMeta,
    SourceType,
};
use curate_meta::{
    ConvertContext, META_FILE_NAMES, generate_image_filename, is_meta_file_name,
    parse_launchbox_xml, parse_meta_file_contents,
};
use walkdir::WalkDir;

use crate::worker_pool::WorkerPool;

const CONTENT_DIR: &str = "content";
const MACOS_METADATA_DIR: &str = "__MACOSX";
const THUMBNAIL_STEM: &str = "logo";
const SCREENSHOT_STEM: &str = "ss";
/// Image extensions, in preference order.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// LaunchBox image folders, relative to `<images>/<platform>/`.
const LAUNCHBOX_THUMBNAIL_DIR: &str = "Box - Front";
const LAUNCHBOX_SCREENSHOT_DIR: &str = "Screenshot - Gameplay";
const LAUNCHBOX_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

// ---------------------------------------------------------------------------
// Package layout (shared by folders and archives)
// ---------------------------------------------------------------------------

/// One entry of a package listing, relative to the package root, with `/`
/// separators.
#[derive(Debug, Clone)]
struct Listing {
    path: String,
    is_dir: bool,
}

/// Result of searching a listing for the curation root.
#[derive(Debug, PartialEq)]
enum RootSearch {
    /// `meta` is the meta file path; `root` is its directory as a prefix
    /// (`""` or ending in `/`).
    Found { meta: String, root: String },
    /// Like `Found`, but other directories at the same depth also hold a
    /// meta file. The first root in path order is used.
    Ambiguous {
        meta: String,
        root: String,
        others: Vec<String>,
    },
    Missing,
}

fn is_macos_metadata(path: &str) -> bool {
    path.split('/').any(|part| part == MACOS_METADATA_DIR)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

fn meta_preference(name: &str) -> usize {
    META_FILE_NAMES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .unwrap_or(META_FILE_NAMES.len())
}

fn locate_root(listing: &[Listing]) -> RootSearch {
    let mut candidates: Vec<&str> = listing
        .iter()
        .filter(|e| !e.is_dir && !is_macos_metadata(&e.path))
        .map(|e| e.path.as_str())
        .filter(|p| is_meta_file_name(file_name(p)))
        .collect();

    let Some(min_depth) = candidates.iter().map(|p| p.matches('/').count()).min() else {
        return RootSearch::Missing;
    };
    candidates.retain(|p| p.matches('/').count() == min_depth);
    // Group by directory, then by preferred meta file name within it.
    candidates.sort_by(|a, b| {
        parent_prefix(a)
            .cmp(parent_prefix(b))
            .then_with(|| meta_preference(file_name(a)).cmp(&meta_preference(file_name(b))))
    });

    let meta = candidates[0].to_string();
    let root = parent_prefix(&meta).to_string();
    let mut others: Vec<String> = candidates
        .iter()
        .map(|p| parent_prefix(p).to_string())
        .filter(|r| *r != root)
        .collect();
    others.dedup();

    if others.is_empty() {
        RootSearch::Found { meta, root }
    } else {
        RootSearch::Ambiguous { meta, root, others }
    }
}

/// Paths of the well-known items under a curation root.
#[derive(Debug, Default, PartialEq)]
struct Layout {
    /// Content prefix as it appears in the listing, ending in `/`.
    content: Option<String>,
    thumbnail: Option<String>,
    screenshot: Option<String>,
}

/// Case-insensitive ASCII prefix match that returns the matched slice of `path`.
fn match_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then_some(head)
}

fn find_layout(listing: &[Listing], root: &str) -> Layout {
    let content_prefix = format!("{root}{CONTENT_DIR}/");
    let mut layout = Layout::default();
    let mut thumb_rank = usize::MAX;
    let mut shot_rank = usize::MAX;

    for entry in listing {
        if is_macos_metadata(&entry.path) {
            continue;
        }
        if layout.content.is_none() {
            // Directory entries may or may not carry a trailing slash.
            let dir_form = format!("{}/", entry.path.trim_end_matches('/'));
            let candidate = if entry.is_dir { &dir_form } else { &entry.path };
            if let Some(head) = match_prefix(candidate, &content_prefix) {
                layout.content = Some(head.to_string());
            }
        }
        if entry.is_dir || parent_prefix(&entry.path) != root {
            continue;
        }
        let name = file_name(&entry.path).to_lowercase();
        let Some((stem, ext)) = name.rsplit_once('.') else {
            continue;
        };
        let Some(rank) = IMAGE_EXTENSIONS.iter().position(|e| *e == ext) else {
            continue;
        };
        if stem == THUMBNAIL_STEM && rank < thumb_rank {
            thumb_rank = rank;
            layout.thumbnail = Some(entry.path.clone());
        } else if stem == SCREENSHOT_STEM && rank < shot_rank {
            shot_rank = rank;
            layout.screenshot = Some(entry.path.clone());
        }
    }
    layout
}

/// Push root-search diagnostics and return the chosen meta path and root.
fn resolve_root(
    listing: &[Listing],
    source: &Path,
    errors: &mut Vec<Diagnostic>,
) -> (Option<String>, String) {
    match locate_root(listing) {
        RootSearch::Found { meta, root } => (Some(meta), root),
        RootSearch::Ambiguous { meta, root, others } => {
            errors.push(Diagnostic::new(
                DiagnosticKind::AmbiguousRoot,
                format!(
                    "{}: meta files found in '{}' and {}",
                    source.display(),
                    display_root(&root),
                    others
                        .iter()
                        .map(|o| format!("'{}'", display_root(o)))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
            (Some(meta), root)
        }
        RootSearch::Missing => {
            errors.push(Diagnostic::new(
                DiagnosticKind::MissingMeta,
                format!(
                    "{}: no {} found",
                    source.display(),
                    META_FILE_NAMES.join(" / ")
                ),
            ));
            (None, String::new())
        }
    }
}

fn display_root(root: &str) -> &str {
    if root.is_empty() { "." } else { root.trim_end_matches('/') }
}

fn missing_content(source: &Path) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::MissingContent,
        format!("{}: no '{CONTENT_DIR}' folder", source.display()),
    )
}

fn parse_meta_into(index: &mut CurationIndex, file_name: &str, bytes: &[u8]) {
    let (meta, errors) = parse_meta_file_contents(file_name, bytes).into_parts();
    index.meta = meta;
    index.errors.extend(errors);
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Index a curation stored as a directory tree.
pub fn index_curation_folder(path: &Path) -> CurationIndex {
    let mut index = CurationIndex::default();

    if !path.is_dir() {
        index.errors.push(Diagnostic::new(
            DiagnosticKind::UnreadableSource,
            format!("{}: not a readable directory", path.display()),
        ));
        return index;
    }

    let mut listing = Vec::new();
    let walker = WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != MACOS_METADATA_DIR);
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                index.errors.push(Diagnostic::new(
                    DiagnosticKind::UnreadableSource,
                    format!("{}: {e}", path.display()),
                ));
                continue;
            }
        };
        let Ok(rel) = entry.path().strip_prefix(path) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        listing.push(Listing {
            path: rel,
            is_dir: entry.file_type().is_dir(),
        });
    }

    let (meta_path, root) = resolve_root(&listing, path, &mut index.errors);

    if let Some(meta_path) = meta_path {
        let full = path.join(&meta_path);
        match std::fs::read(&full) {
            Ok(bytes) => parse_meta_into(&mut index, file_name(&meta_path), &bytes),
            Err(e) => index.errors.push(Diagnostic::new(
                DiagnosticKind::UnreadableSource,
                format!("{}: {e}", full.display()),
            )),
        }
    }

    let layout = find_layout(&listing, &root);
    match layout.content {
        Some(prefix) => {
            index.content = Some(ContentRef::Folder {
                path: path.join(prefix.trim_end_matches('/')),
            })
        }
        None => index.errors.push(missing_content(path)),
    }
    index.thumbnail = layout.thumbnail.map(|p| AssetRef::File {
        path: path.join(p),
    });
    index.screenshot = layout.screenshot.map(|p| AssetRef::File {
        path: path.join(p),
    });

    log::debug!(
        "Indexed folder {} ({} diagnostic(s))",
        path.display(),
        index.errors.len()
    );
    index
}

// ---------------------------------------------------------------------------
// Archives
// ---------------------------------------------------------------------------

/// Index a curation stored as a zip archive.
pub fn index_curation_archive(path: &Path) -> CurationIndex {
    let mut index = CurationIndex::default();

    let mut archive = match File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|f| zip::ZipArchive::new(f).map_err(|e| e.to_string()))
    {
        Ok(a) => a,
        Err(e) => {
            index.errors.push(Diagnostic::new(
                DiagnosticKind::UnreadableSource,
                format!("{}: {e}", path.display()),
            ));
            return index;
        }
    };

    // Normalized listing plus the raw entry index for each item.
    let mut listing = Vec::with_capacity(archive.len());
    let mut raw_index = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = match archive.by_index(i) {
            Ok(e) => e,
            Err(e) => {
                index.errors.push(Diagnostic::new(
                    DiagnosticKind::UnreadableSource,
                    format!("{}: entry {i}: {e}", path.display()),
                ));
                continue;
            }
        };
        let name = entry.name().replace('\\', "/");
        if is_macos_metadata(&name) {
            continue;
        }
        listing.push(Listing {
            is_dir: entry.is_dir(),
            path: name,
        });
        raw_index.push(i);
    }

    let (meta_path, root) = resolve_root(&listing, path, &mut index.errors);

    if let Some(meta_path) = meta_path {
        let pos = listing.iter().position(|e| e.path == meta_path);
        let read = pos
            .map(|p| raw_index[p])
            .ok_or_else(|| "entry vanished".to_string())
            .and_then(|i| {
                let mut entry = archive.by_index(i).map_err(|e| e.to_string())?;
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes).map_err(|e| e.to_string())?;
                Ok(bytes)
            });
        match read {
            Ok(bytes) => parse_meta_into(&mut index, file_name(&meta_path), &bytes),
            Err(e) => index.errors.push(Diagnostic::new(
                DiagnosticKind::UnreadableSource,
                format!("{}: {meta_path}: {e}", path.display()),
            )),
        }
    }

    let layout = find_layout(&listing, &root);
    match layout.content {
        Some(prefix) => {
            index.content = Some(ContentRef::Archive {
                archive: path.to_path_buf(),
                prefix,
            })
        }
        None => index.errors.push(missing_content(path)),
    }
    index.thumbnail = layout.thumbnail.map(|entry| AssetRef::Archive {
        archive: path.to_path_buf(),
        entry,
    });
    index.screenshot = layout.screenshot.map(|entry| AssetRef::Archive {
        archive: path.to_path_buf(),
        entry,
    });

    log::debug!(
        "Indexed archive {} ({} entries, {} diagnostic(s))",
        path.display(),
        listing.len(),
        index.errors.len()
    );
    index
}

// ---------------------------------------------------------------------------
// Loose meta files
// ---------------------------------------------------------------------------

/// Index a loose metadata file. The result has no content or images.
pub fn index_meta_file(path: &Path) -> CurationIndex {
    let mut index = CurationIndex::default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match std::fs::read(path) {
        Ok(bytes) => parse_meta_into(&mut index, &name, &bytes),
        Err(e) => index.errors.push(Diagnostic::new(
            DiagnosticKind::UnreadableSource,
            format!("{}: {e}", path.display()),
        )),
    }
    index
}

// ---------------------------------------------------------------------------
// LaunchBox platform files
// ---------------------------------------------------------------------------

/// Index every `<Game>` of a LaunchBox platform XML file.
///
/// With `images_dir`, each game's box-front and gameplay screenshot are
/// looked up by their canonical LaunchBox file names. XML problems are
/// returned alongside the games that were read.
pub fn index_launchbox_platform(
    xml_path: &Path,
    images_dir: Option<&Path>,
    ctx: &ConvertContext,
) -> curate_core::Parsed<Vec<CurationIndex>> {
    let text = match std::fs::read_to_string(xml_path) {
        Ok(t) => t,
        Err(e) => {
            return curate_core::Parsed::with_errors(
                Vec::new(),
                vec![Diagnostic::new(
                    DiagnosticKind::UnreadableSource,
                    format!("{}: {e}", xml_path.display()),
                )],
            );
        }
    };

    parse_launchbox_xml(&text, ctx).map(|games| {
        games
            .into_iter()
            .map(|game| {
                let (thumbnail, screenshot) = match images_dir {
                    Some(dir) => (
                        find_launchbox_image(dir, &game, LAUNCHBOX_THUMBNAIL_DIR),
                        find_launchbox_image(dir, &game, LAUNCHBOX_SCREENSHOT_DIR),
                    ),
                    None => (None, None),
                };
                CurationIndex {
                    meta: ParsedMeta {
                        game,
                        add_apps: Vec::new(),
                    },
                    thumbnail,
                    screenshot,
                    ..Default::default()
                }
            })
            .collect()
    })
}

fn find_launchbox_image(
    images_dir: &Path,
    game: &curate_core::GameMeta,
    folder: &str,
) -> Option<AssetRef> {
    let platform = game.field(curate_core::meta::fields::PLATFORM)?;
    let title = game.field(curate_core::meta::fields::TITLE)?;
    let stem = generate_image_filename(title, Some(1.0));
    let dir = images_dir.join(platform).join(folder);
    LAUNCHBOX_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .map(|path| AssetRef::File { path })
}

// ---------------------------------------------------------------------------
// Batch indexing
// ---------------------------------------------------------------------------

/// A source to index. `source_type: None` means detect it from the path.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    pub path: PathBuf,
    pub source_type: Option<SourceType>,
}

impl SourceRequest {
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_type: None,
        }
    }
}

/// The index of one source.
#[derive(Debug, Clone)]
pub struct IndexedSource {
    pub path: PathBuf,
    pub source_type: SourceType,
    pub index: CurationIndex,
}

impl IndexedSource {
    /// Turn this index into a pending curation with fresh keys.
    pub fn into_curation(self) -> Curation {
        Curation::from_index(
            self.path.to_string_lossy().into_owned(),
            self.source_type,
            self.index,
        )
    }
}

/// Guess a source's type: directories are folders, recognized meta file
/// names are loose metas, anything else is treated as an archive.
pub fn detect_source_type(path: &Path) -> SourceType {
    if path.is_dir() {
        return SourceType::Folder;
    }
    let is_meta = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_meta_file_name);
    if is_meta {
        SourceType::Meta
    } else {
        SourceType::Archive
    }
}

/// Index one source synchronously.
pub fn index_source(request: SourceRequest) -> IndexedSource {
    let source_type = request
        .source_type
        .unwrap_or_else(|| detect_source_type(&request.path));
    let index = match source_type {
        SourceType::Folder => index_curation_folder(&request.path),
        SourceType::Archive => index_curation_archive(&request.path),
        SourceType::Meta => index_meta_file(&request.path),
    };
    IndexedSource {
        path: request.path,
        source_type,
        index,
    }
}

/// Index many sources concurrently on `workers` workers.
///
/// Each source runs on the blocking thread pool. One source's problems
/// never affect another. Results come back in submission order.
pub async fn index_sources(sources: Vec<SourceRequest>, workers: usize) -> Vec<IndexedSource> {
    index_sources_with_progress(sources, workers, |_, _| {}).await
}

/// Like [`index_sources`], calling `on_result(done, source)` as each source
/// finishes.
pub async fn index_sources_with_progress(
    sources: Vec<SourceRequest>,
    workers: usize,
    on_result: impl FnMut(usize, &IndexedSource),
) -> Vec<IndexedSource> {
    log::debug!(
        "Indexing {} source(s) on {} worker(s)",
        sources.len(),
        workers.max(1)
    );
    WorkerPool::run_ordered(
        workers,
        sources,
        |request: SourceRequest| async move {
            let path = request.path.clone();
            let source_type = request.source_type;
            match tokio::task::spawn_blocking(move || index_source(request)).await {
                Ok(indexed) => indexed,
                Err(e) => {
                    log::warn!("Indexing {} panicked: {}", path.display(), e);
                    IndexedSource {
                        source_type: source_type.unwrap_or(SourceType::Archive),
                        index: CurationIndex {
                            errors: vec![Diagnostic::new(
                                DiagnosticKind::UnreadableSource,
                                format!("{}: indexing aborted: {e}", path.display()),
                            )],
                            ..Default::default()
                        },
                        path,
                    }
                }
            }
        },
        on_result,
    )
    .await
}

#[cfg(test)]
#[path = "tests/indexer_tests.rs"]
mod tests;
