use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use curate_core::*;
use curate_db::{FsImageCollection, SqliteCatalog, count_games};
use curate_import::*;
use curate_lib::{
    CurationAction, CurationDispatch, CurationQueue, QueueError, index_curation_archive,
    index_curation_folder,
};
use zip::write::SimpleFileOptions;

/// A catalog that refuses games with a given title.
#[derive(Default)]
struct PickyCatalog {
    games: Vec<LibraryGame>,
    reject_title: Option<String>,
}

impl GameCatalog for PickyCatalog {
    fn list_games(&self) -> Result<Vec<LibraryGame>, LibraryError> {
        Ok(self.games.clone())
    }

    fn add_game(&mut self, game: &LibraryGame) -> Result<(), LibraryError> {
        if game.meta.title == self.reject_title {
            return Err(LibraryError::storage("rejected"));
        }
        self.games.push(game.clone());
        Ok(())
    }
}

fn options() -> ImportOptions {
    ImportOptions {
        save_curation: false,
        date_added: Some("2024-03-01T12:00:00+00:00".to_string()),
    }
}

fn folder_curation(root: &Path, title: &str) -> Curation {
    let dir = root.join(format!("src-{title}"));
    fs::create_dir_all(dir.join("content/sub")).unwrap();
    fs::write(
        dir.join("meta.txt"),
        format!(
            "Title: {title}\nPlatform: Flash\nAdditional Applications:\n    Extras: {title}_extras\n"
        ),
    )
    .unwrap();
    fs::write(dir.join("content/game.swf"), b"swf").unwrap();
    fs::write(dir.join("content/sub/data.bin"), b"data").unwrap();
    fs::write(dir.join("logo.png"), b"logo").unwrap();
    Curation::from_index(
        dir.to_string_lossy(),
        SourceType::Folder,
        index_curation_folder(&dir),
    )
}

fn archive_curation(root: &Path, title: &str) -> Curation {
    let path = root.join(format!("{title}.zip"));
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let files: [(&str, &[u8]); 4] = [
        ("Wrapper/meta.txt", b"Title: Zipped\nPlatform: HTML5\n"),
        ("Wrapper/content/index.html", b"<html>"),
        ("Wrapper/content/js/app.js", b"app"),
        ("Wrapper/ss.jpg", b"shot"),
    ];
    for (name, data) in files {
        zip.start_file(name, opts).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
    Curation::from_index(
        path.to_string_lossy(),
        SourceType::Archive,
        index_curation_archive(&path),
    )
}

/// Records every action before handing it to an in-memory queue.
#[derive(Default)]
struct RecordingQueue {
    actions: Vec<CurationAction>,
    queue: CurationQueue,
}

impl CurationDispatch for RecordingQueue {
    fn dispatch(&mut self, action: CurationAction) -> Result<(), QueueError> {
        self.actions.push(action.clone());
        self.queue.dispatch(action)
    }
}

fn games_in(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(rd) => rd
            .map(|e| e.unwrap().path())
            .filter(|p| p.file_name().is_some_and(|n| n != STAGING_DIR_NAME))
            .collect(),
        Err(_) => vec![],
    }
}

fn staging_is_empty(games_dir: &Path) -> bool {
    match fs::read_dir(games_dir.join(STAGING_DIR_NAME)) {
        Ok(mut rd) => rd.next().is_none(),
        Err(_) => true,
    }
}

// -- single import --

#[test]
fn imports_folder_curation_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let curation = folder_curation(dir.path(), "Alien Hominid");
    assert!(!curation.is_blocked(), "{:?}", curation.errors);

    let mut catalog = SqliteCatalog::open_memory().unwrap();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };

    let imported = import_curation(&curation, &mut library, &options()).unwrap();

    let content_dir = imported.content_dir.clone().unwrap();
    assert_eq!(content_dir, games_dir.join(&imported.game.id));
    assert_eq!(fs::read(content_dir.join("game.swf")).unwrap(), b"swf");
    assert_eq!(fs::read(content_dir.join("sub/data.bin")).unwrap(), b"data");
    assert!(!content_dir.join(CURATION_FILE_NAME).exists());
    assert_eq!(imported.files, 2);

    assert_eq!(imported.images.len(), 1);
    assert!(imported.images[0].ends_with(format!("Flash/Logos/{}.png", imported.game.id)));

    let games = catalog.list_games().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, imported.game.id);
    assert_eq!(games[0].meta.title.as_deref(), Some("Alien Hominid"));
    assert_eq!(games[0].add_apps, vec![AddAppMeta::extras("Alien Hominid_extras")]);
    assert_eq!(games[0].date_added, "2024-03-01T12:00:00+00:00");
    assert!(staging_is_empty(&games_dir));
}

#[test]
fn imports_archive_curation_with_prefix_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let curation = archive_curation(dir.path(), "zipped");
    assert!(!curation.is_blocked(), "{:?}", curation.errors);

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };

    let imported = import_curation(&curation, &mut library, &options()).unwrap();
    let content_dir = imported.content_dir.unwrap();
    assert_eq!(fs::read(content_dir.join("index.html")).unwrap(), b"<html>");
    assert_eq!(fs::read(content_dir.join("js/app.js")).unwrap(), b"app");
    assert!(imported.images[0].ends_with(format!("HTML5/Screenshots/{}.jpg", imported.game.id)));
    assert_eq!(catalog.games.len(), 1);
}

#[test]
fn archive_with_backslash_separators_imports_its_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("windows.zip");
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let files: [(&str, &[u8]); 3] = [
        ("W\\meta.txt", b"Title: Backslashed\nPlatform: Flash\n"),
        ("W\\content\\a.swf", b"swf"),
        ("W\\logo.png", b"logo"),
    ];
    for (name, data) in files {
        zip.start_file(name, opts).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();

    let curation = Curation::from_index(
        path.to_string_lossy(),
        SourceType::Archive,
        index_curation_archive(&path),
    );
    assert!(!curation.is_blocked(), "{:?}", curation.errors);

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };

    let imported = import_curation(&curation, &mut library, &options()).unwrap();
    assert_eq!(fs::read(imported.content_dir.unwrap().join("a.swf")).unwrap(), b"swf");
    assert_eq!(imported.images.len(), 1);
    assert_eq!(fs::read(&imported.images[0]).unwrap(), b"logo");
}

#[test]
fn malformed_key_is_rejected_before_touching_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let mut curation = folder_curation(dir.path(), "Escapee");
    curation.key = "../../victim".to_string();

    let victim = dir.path().join("victim");
    fs::create_dir_all(&victim).unwrap();
    fs::write(victim.join("precious.txt"), b"keep me").unwrap();

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };

    let err = import_curation(&curation, &mut library, &options()).unwrap_err();
    assert!(matches!(err, ImportError::InvalidKey(k) if k == "../../victim"));
    assert_eq!(fs::read(victim.join("precious.txt")).unwrap(), b"keep me");
    assert!(catalog.games.is_empty());
    assert!(!games_dir.exists());
}

#[test]
fn save_curation_keeps_a_copy_of_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let curation = folder_curation(dir.path(), "Saved");

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    let opts = ImportOptions {
        save_curation: true,
        ..options()
    };

    let imported = import_curation(&curation, &mut library, &opts).unwrap();
    let saved = fs::read_to_string(imported.content_dir.unwrap().join(CURATION_FILE_NAME)).unwrap();
    let record: Curation = serde_json::from_str(&saved).unwrap();
    assert_eq!(record.key, curation.key);
}

#[test]
fn blocked_curation_is_not_imported() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let curation = Curation::from_index("empty", SourceType::Folder, index_curation_folder(&empty));
    assert!(curation.is_blocked());

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };

    let err = import_curation(&curation, &mut library, &options()).unwrap_err();
    assert!(matches!(err, ImportError::Blocked { count: 2, .. }));
    assert!(catalog.games.is_empty());
    assert!(!games_dir.exists());
}

#[test]
fn untitled_curation_is_rejected() {
    let mut curation = Curation::from_index("x", SourceType::Meta, CurationIndex::default());
    curation.meta.title = Some(String::new());

    let dir = tempfile::tempdir().unwrap();
    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    let err = import_curation(&curation, &mut library, &options()).unwrap_err();
    assert!(matches!(err, ImportError::MissingTitle(_)));
}

#[test]
fn meta_only_curation_creates_no_game_folder() {
    let dir = tempfile::tempdir().unwrap();
    let mut curation = Curation::from_index("meta.txt", SourceType::Meta, CurationIndex::default());
    curation.meta.title = Some("Loose".to_string());

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };
    let imported = import_curation(&curation, &mut library, &options()).unwrap();
    assert!(imported.content_dir.is_none());
    assert!(games_in(&games_dir).is_empty());
    assert_eq!(catalog.games.len(), 1);
}

#[test]
fn catalog_failure_rolls_back_content_and_images() {
    let dir = tempfile::tempdir().unwrap();
    let curation = folder_curation(dir.path(), "Doomed");

    let mut catalog = PickyCatalog {
        reject_title: Some("Doomed".to_string()),
        ..Default::default()
    };
    let images_dir = dir.path().join("Images");
    let mut images = FsImageCollection::new(&images_dir);
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };

    let err = import_curation(&curation, &mut library, &options()).unwrap_err();
    assert!(matches!(err, ImportError::Catalog(_)));

    assert!(catalog.games.is_empty());
    assert!(games_in(&games_dir).is_empty());
    assert!(staging_is_empty(&games_dir));
    let logos = images_dir.join("Flash").join("Logos");
    assert!(fs::read_dir(&logos).map(|mut rd| rd.next().is_none()).unwrap_or(true));
}

#[test]
fn missing_content_source_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut curation = folder_curation(dir.path(), "Vanishing");
    fs::remove_dir_all(dir.path().join("src-Vanishing/content")).unwrap();

    let mut catalog = SqliteCatalog::open_memory().unwrap();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let games_dir = dir.path().join("Games");
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: games_dir.clone(),
    };

    curation.thumbnail = None;
    let err = import_curation(&curation, &mut library, &options()).unwrap_err();
    assert!(matches!(err, ImportError::Content(_)));
    assert_eq!(count_games(catalog.conn()).unwrap(), 0);
    assert!(games_in(&games_dir).is_empty());
    assert!(staging_is_empty(&games_dir));
}

// -- batch import --

#[test]
fn batch_isolates_a_failing_curation() {
    let dir = tempfile::tempdir().unwrap();
    let titles = ["One", "Two", "Three", "Four", "Five"];
    let mut queue = CurationQueue::in_memory();
    for title in titles {
        queue
            .apply(CurationAction::Add(folder_curation(dir.path(), title)))
            .unwrap();
    }
    let pending = queue.curations().to_vec();

    let mut catalog = PickyCatalog {
        reject_title: Some("Three".to_string()),
        ..Default::default()
    };
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };

    let stats = import_all(&pending, &mut library, &options(), &mut queue, &SilentProgress);

    assert_eq!(
        stats,
        BatchStats {
            total: 5,
            succeeded: 4,
            failed: 1
        }
    );
    assert_eq!(queue.len(), 1);
    let left = &queue.curations()[0];
    assert_eq!(left.key, pending[2].key);
    assert!(!left.locked);

    let imported: Vec<_> = catalog
        .games
        .iter()
        .map(|g| g.meta.title.clone().unwrap_or_default())
        .collect();
    assert_eq!(imported, vec!["One", "Two", "Four", "Five"]);
}

#[test]
fn batch_counts_blocked_curations_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let good = folder_curation(dir.path(), "Good");
    let blocked = Curation::from_index(
        "nowhere",
        SourceType::Folder,
        index_curation_folder(&dir.path().join("nowhere")),
    );

    let mut queue = CurationQueue::in_memory();
    queue.apply(CurationAction::Add(good.clone())).unwrap();
    queue.apply(CurationAction::Add(blocked.clone())).unwrap();
    let pending = queue.curations().to_vec();

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    let stats = import_all(&pending, &mut library, &options(), &mut queue, &LogProgress);

    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.success_rate(), 50.0);
    assert_eq!(queue.curations().len(), 1);
    assert_eq!(queue.curations()[0].key, blocked.key);
    assert!(!queue.curations()[0].locked);
}

#[test]
fn batch_locks_everything_before_settling_each_curation_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = RecordingQueue::default();
    for title in ["One", "Two", "Three"] {
        recorder
            .queue
            .apply(CurationAction::Add(folder_curation(dir.path(), title)))
            .unwrap();
    }
    let pending = recorder.queue.curations().to_vec();

    let mut catalog = PickyCatalog {
        reject_title: Some("Two".to_string()),
        ..Default::default()
    };
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    import_all(&pending, &mut library, &options(), &mut recorder, &SilentProgress);

    let key = |i: usize| pending[i].key.clone();
    assert_eq!(
        recorder.actions,
        vec![
            CurationAction::Lock(key(0)),
            CurationAction::Lock(key(1)),
            CurationAction::Lock(key(2)),
            CurationAction::Remove(key(0)),
            CurationAction::Unlock(key(1)),
            CurationAction::Remove(key(2)),
        ]
    );
}

#[test]
fn batch_of_a_subset_leaves_other_curations_unlocked() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = RecordingQueue::default();
    for title in ["A", "B", "C"] {
        recorder
            .queue
            .apply(CurationAction::Add(folder_curation(dir.path(), title)))
            .unwrap();
    }
    let all = recorder.queue.curations().to_vec();

    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    let stats = import_all(&all[..1], &mut library, &options(), &mut recorder, &SilentProgress);

    assert_eq!(stats.succeeded, 1);
    assert_eq!(
        recorder.actions,
        vec![
            CurationAction::Lock(all[0].key.clone()),
            CurationAction::Remove(all[0].key.clone()),
        ]
    );
    let left = recorder.queue.curations();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|c| !c.locked));
    assert_eq!(left[0].key, all[1].key);
    assert_eq!(left[1].key, all[2].key);
}

#[test]
fn empty_batch_reports_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut queue = CurationQueue::in_memory();
    let mut catalog = PickyCatalog::default();
    let mut images = FsImageCollection::new(dir.path().join("Images"));
    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: dir.path().join("Games"),
    };
    let stats = import_all(&[], &mut library, &options(), &mut queue, &SilentProgress);
    assert_eq!(stats, BatchStats::default());
    assert_eq!(stats.success_rate(), 0.0);
}
