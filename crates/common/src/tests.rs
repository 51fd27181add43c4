use super::*;

#[test]
fn config_defaults_are_sane() {
    let cfg = Config::default();
    assert_eq!(cfg.buffer_pool_pages, DEFAULT_BUFFER_POOL_PAGES);
    assert_eq!(cfg.data_dir, PathBuf::from("./db_data"));
}

#[test]
fn config_builder_overrides_defaults() {
    let cfg = Config::builder().buffer_pool_pages(64).build();
    assert_eq!(cfg.buffer_pool_pages, 64);
}

#[test]
fn config_table_path_joins_data_dir() {
    let cfg = Config::builder().data_dir(PathBuf::from("/var/db")).build();
    assert_eq!(cfg.table_path("users.db"), PathBuf::from("/var/db/users.db"));
}

#[test]
fn db_error_formats_cleanly() {
    let err = DbError::Validate {
        expected: 0x1234_1234,
        found: 0,
    };
    assert!(format!("{err}").contains("bad magic number"));
}

#[test]
fn io_error_converts() {
    let e = io::Error::other("oops");
    let db_err: DbError = e.into();
    assert!(matches!(db_err, DbError::Io(_)));
}

#[test]
fn page_id_header_is_zero() {
    assert_eq!(PageId::HEADER, PageId(0));
    assert!(PageId::HEADER.is_header());
    assert!(!PageId(1).is_header());
}
