//! Session directory resolution and settings file persistence against an
//! in-memory card

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use intervalcam_core::config::FrameSize;
use intervalcam_core::{ConfigStore, LoadError, SessionDirectoryManager, StorageError};

use common::{Card, MemStorage};

fn card_with(dirs: &[&str]) -> (Rc<RefCell<Card>>, MemStorage) {
    let card = Rc::new(RefCell::new(Card::default()));
    for name in dirs {
        card.borrow_mut().dirs.insert(format!("/sdcard/{}", name));
    }
    let storage = MemStorage::new(card.clone());
    (card, storage)
}

const LISTING: &[&str] = &["timelapse0001", "timelapse0005", "timelapseXXXX", "other"];

#[test]
fn fresh_session_is_one_past_the_highest() {
    let (card, mut storage) = card_with(LISTING);
    let sessions = SessionDirectoryManager::default();

    let session = sessions.resolve(&mut storage, false).unwrap();
    assert_eq!(session.number, 6);
    assert_eq!(session.as_str(), "/sdcard/timelapse0006");
    assert!(session.created);
    assert!(card.borrow().dirs.contains("/sdcard/timelapse0006"));
    assert_eq!(card.borrow().dirs.len(), LISTING.len() + 1);
}

#[test]
fn resumed_session_is_the_highest_and_creates_nothing() {
    let (card, mut storage) = card_with(LISTING);
    let sessions = SessionDirectoryManager::default();

    let session = sessions.resolve(&mut storage, true).unwrap();
    assert_eq!(session.number, 5);
    assert_eq!(session.as_str(), "/sdcard/timelapse0005");
    assert!(!session.created);
    assert_eq!(card.borrow().dirs.len(), LISTING.len());
}

#[test]
fn empty_card_starts_at_one() {
    let (_card, mut storage) = card_with(&[]);
    let session = SessionDirectoryManager::default().resolve(&mut storage, false).unwrap();
    assert_eq!(session.number, 1);
}

#[test]
fn upper_case_names_count() {
    let (_card, mut storage) = card_with(&["TIMELAPSE0012", "timelapse0003"]);
    let sessions = SessionDirectoryManager::default();
    assert_eq!(sessions.scan(&mut storage), Ok(Some(12)));
}

#[test]
fn nested_entries_are_not_sessions() {
    let (_card, mut storage) = card_with(&["backup/timelapse0100", "timelapse0002"]);
    let sessions = SessionDirectoryManager::default();
    assert_eq!(sessions.scan(&mut storage), Ok(Some(2)));
}

#[test]
fn create_failure_is_reported() {
    let (card, mut storage) = card_with(&[]);
    card.borrow_mut().fail_create = true;
    let err = SessionDirectoryManager::default().resolve(&mut storage, false).unwrap_err();
    assert_eq!(err, StorageError::CreateDirFailed);
}

#[test]
fn missing_settings_file_keeps_defaults() {
    let (_card, mut storage) = card_with(&[]);
    let mut store = ConfigStore::new();
    let report = store.load(&mut storage, "/sdcard/timelapse.conf").unwrap();
    assert!(!report.found);
    assert_eq!(store, ConfigStore::new());
}

#[test]
fn unreadable_settings_file_is_a_storage_error() {
    let (card, mut storage) = card_with(&[]);
    card.borrow_mut()
        .files
        .insert("/sdcard/timelapse.conf".to_owned(), vec![0xff, 0xfe, 0x00]);
    let err = ConfigStore::new().load(&mut storage, "/sdcard/timelapse.conf").unwrap_err();
    assert_eq!(err, LoadError::Storage(StorageError::ReadFailed));
}

#[test]
fn saved_file_loads_back() {
    let (card, mut storage) = card_with(&[]);
    let mut store = ConfigStore::new();
    store.apply("framesize", "qxga").unwrap();
    store.apply("timezone", "").unwrap();
    store.apply("wb_mode", "Cloudy").unwrap();
    store.save(&mut storage, "/sdcard/timelapse.conf").unwrap();

    let text = String::from_utf8(card.borrow().files["/sdcard/timelapse.conf"].clone()).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with('#')).count(), 2);
    assert!(text.contains("\ntimezone = \n"));

    let mut reloaded = ConfigStore::new();
    let report = reloaded.load(&mut storage, "/sdcard/timelapse.conf").unwrap();
    assert!(report.found);
    assert_eq!(reloaded, store);
    assert_eq!(reloaded.settings().frame_size(), FrameSize::Qxga);
    assert_eq!(reloaded.settings().timezone(), "");
}

#[test]
fn open_failure_on_save() {
    let (card, mut storage) = card_with(&[]);
    card.borrow_mut().fail_open = true;
    assert_eq!(
        ConfigStore::new().save(&mut storage, "/sdcard/timelapse.conf"),
        Err(StorageError::OpenFailed)
    );
}
