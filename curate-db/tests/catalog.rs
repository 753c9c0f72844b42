use curate_core::*;
use curate_db::*;

fn game(id: &str, title: &str, platform: Option<&str>) -> LibraryGame {
    LibraryGame {
        id: id.to_string(),
        meta: GameMeta {
            title: Some(title.to_string()),
            platform: platform.map(str::to_string),
            language: Some("en".to_string()),
            ..Default::default()
        },
        add_apps: vec![],
        date_added: "2024-03-01T12:00:00+00:00".to_string(),
    }
}

#[test]
fn add_and_list_games() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    catalog.add_game(&game("b", "Zeta", Some("Flash"))).unwrap();
    catalog.add_game(&game("a", "Alpha", Some("HTML5"))).unwrap();

    let games = catalog.list_games().unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].meta.title.as_deref(), Some("Alpha"));
    assert_eq!(games[1].id, "b");
    assert_eq!(games[1].meta.language.as_deref(), Some("en"));
}

#[test]
fn add_apps_keep_their_order() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    let mut g = game("g1", "Alien Hominid", Some("Flash"));
    g.add_apps = vec![
        AddAppMeta::message("Click to start"),
        AddAppMeta::extras("alien_extras"),
        AddAppMeta {
            heading: Some("Level Select".to_string()),
            application_path: Some("flashplayer.exe".to_string()),
            launch_command: Some("http://example.com/levels.swf".to_string()),
            auto_run_before: false,
            wait_for_exit: true,
        },
    ];
    catalog.add_game(&g).unwrap();

    let found = find_game(catalog.conn(), "g1").unwrap().unwrap();
    assert_eq!(found, g);
}

#[test]
fn extra_fields_survive_storage() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    let mut g = game("g1", "Thing", None);
    g.meta.set_field("starRating", "5");
    catalog.add_game(&g).unwrap();

    let games = catalog.list_games().unwrap();
    assert_eq!(games[0].meta.field("starRating"), Some("5"));
}

#[test]
fn duplicate_id_is_rejected_and_leaves_catalog_unchanged() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    catalog.add_game(&game("same", "First", None)).unwrap();

    let err = catalog.add_game(&game("same", "Second", None)).unwrap_err();
    assert!(matches!(err, LibraryError::AlreadyExists(id) if id == "same"));

    let games = catalog.list_games().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].meta.title.as_deref(), Some("First"));
}

#[test]
fn untitled_game_is_rejected_without_rows() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    let mut g = game("x", "", None);
    g.add_apps.push(AddAppMeta::extras("x"));
    assert!(catalog.add_game(&g).is_err());

    assert_eq!(count_games(catalog.conn()).unwrap(), 0);
    let apps: i64 = catalog
        .conn()
        .query_row("SELECT COUNT(*) FROM additional_apps", [], |r| r.get(0))
        .unwrap();
    assert_eq!(apps, 0);
}

#[test]
fn find_missing_game_returns_none() {
    let catalog = SqliteCatalog::open_memory().unwrap();
    assert!(find_game(catalog.conn(), "nope").unwrap().is_none());
}

#[test]
fn platform_counts_orders_by_popularity() {
    let mut catalog = SqliteCatalog::open_memory().unwrap();
    catalog.add_game(&game("1", "A", Some("Flash"))).unwrap();
    catalog.add_game(&game("2", "B", Some("Flash"))).unwrap();
    catalog.add_game(&game("3", "C", Some("HTML5"))).unwrap();
    catalog.add_game(&game("4", "D", None)).unwrap();

    let counts = platform_counts(catalog.conn()).unwrap();
    assert_eq!(counts[0], ("Flash".to_string(), 2));
    assert_eq!(counts.len(), 3);
    assert!(counts.contains(&(String::new(), 1)));
}

#[test]
fn catalog_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");
    {
        let mut catalog = SqliteCatalog::open(&path).unwrap();
        catalog.add_game(&game("p", "Persisted", None)).unwrap();
    }
    let catalog = SqliteCatalog::open(&path).unwrap();
    assert_eq!(count_games(catalog.conn()).unwrap(), 1);
}
