//! End-to-end runs of the simulator against a temporary card directory

use std::fs;
use std::path::Path;

use intervalcam_core::time::millis;
use intervalcam_core::{
    ConfigStore, Fault, PersistedSchedule, ProvisioningReason, State, Storage, StorageError,
    Timestamp, WakeCause,
};
use intervalcam_host::{settings, FsStorage, HostBoardConfig, HostClock, Simulator};

const START: u64 = 1_700_000_000;

fn simulator(card: &Path, rtc: &Path) -> Simulator {
    Simulator::new(
        HostBoardConfig::new(card, rtc),
        HostClock::virtual_at(Timestamp::from_secs(START)),
    )
}

fn jpegs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.ends_with(".jpg"))
        .collect();
    names.sort();
    names
}

#[test]
fn three_activations_fill_one_session() {
    let card = tempfile::tempdir().unwrap();
    let rtc = card.path().join("rtc.bin");
    let mut sim = simulator(card.path(), &rtc);

    let runs = sim.run(3, WakeCause::PowerOn).unwrap();
    assert_eq!(runs.len(), 3);
    assert!(runs.iter().all(|a| a.state == State::Suspended && a.session == Some(1)));
    assert_eq!(runs[0].suspend, Some(millis(58_500)));
    assert_eq!(runs[1].wake, WakeCause::Timer);

    // 2023-11-14 22:13:20 UTC plus 0, 60 and 120 s
    assert_eq!(
        jpegs(&card.path().join("timelapse0001")),
        vec!["20231114_221320.jpg", "20231114_221420.jpg", "20231114_221520.jpg"]
    );

    let bytes: [u8; 16] = fs::read(&rtc).unwrap().try_into().unwrap();
    let record = PersistedSchedule::from_bytes(&bytes).unwrap();
    assert_eq!(record.deadline, Timestamp::from_secs(START + 180));

    let frame = fs::read(card.path().join("timelapse0001/20231114_221320.jpg")).unwrap();
    assert_eq!(&frame[..2], &[0xFF, 0xD8]);
    assert_eq!(&frame[frame.len() - 2..], &[0xFF, 0xD9]);
}

#[test]
fn power_cycle_opens_next_session() {
    let card = tempfile::tempdir().unwrap();
    let rtc = card.path().join("rtc.bin");
    let mut sim = simulator(card.path(), &rtc);

    sim.run(2, WakeCause::PowerOn).unwrap();
    let again = sim.run(1, WakeCause::PowerOn).unwrap();
    assert_eq!(again[0].session, Some(2));
    assert!(card.path().join("timelapse0002").is_dir());
}

#[test]
fn settings_file_sets_interval_and_timezone() {
    let card = tempfile::tempdir().unwrap();
    fs::write(
        card.path().join("timelapse.conf"),
        "interval = 20000\ntimezone = CET-1CEST,M3.5.0,M10.5.0/3\n",
    )
    .unwrap();
    let mut sim = simulator(card.path(), &card.path().join("rtc.bin"));

    let runs = sim.run(1, WakeCause::PowerOn).unwrap();
    assert_eq!(runs[0].suspend, Some(millis(18_500)));
    assert_eq!(jpegs(&card.path().join("timelapse0001")), vec!["20231114_231320.jpg"]);
}

#[test]
fn invalid_settings_halt_the_run() {
    let card = tempfile::tempdir().unwrap();
    fs::write(card.path().join("timelapse.conf"), "framesize = 4k\n").unwrap();
    let mut sim = simulator(card.path(), &card.path().join("rtc.bin"));

    let err = sim.run(1, WakeCause::PowerOn).unwrap_err();
    assert!(err.to_string().contains("halted"));
    assert_eq!(
        sim.activate(WakeCause::PowerOn).state,
        State::Halted(Fault::Config(intervalcam_core::LoadError::Invalid { rejected: 1, malformed: 0 }))
    );
}

#[test]
fn missing_card_halts_with_mount_fault() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = simulator(&dir.path().join("absent"), &dir.path().join("rtc.bin"));
    let activation = sim.activate(WakeCause::PowerOn);
    assert_eq!(activation.state, State::Halted(Fault::Storage(StorageError::MountFailed)));
}

#[test]
fn unset_clock_stops_in_provisioning() {
    let card = tempfile::tempdir().unwrap();
    let mut sim = Simulator::new(
        HostBoardConfig::new(card.path(), card.path().join("rtc.bin")),
        HostClock::virtual_at(Timestamp::from_secs(0)),
    );
    let runs = sim.run(3, WakeCause::PowerOn).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].state, State::ProvisioningMode(ProvisioningReason::ClockUnset));
}

#[test]
fn fs_storage_round_trips_settings() {
    let card = tempfile::tempdir().unwrap();
    let mut storage = FsStorage::mount(card.path()).unwrap();

    let mut store = ConfigStore::new();
    store.apply("special_effect", "sepia").unwrap();
    store.save(&mut storage, "/sdcard/timelapse.conf").unwrap();

    let mut reloaded = ConfigStore::new();
    assert!(reloaded.load(&mut storage, "/sdcard/timelapse.conf").unwrap().found);
    assert_eq!(reloaded, store);

    let mut names = Vec::new();
    storage.list_dir("/sdcard", &mut |n: &str| names.push(n.to_owned())).unwrap();
    assert_eq!(names, vec!["timelapse.conf"]);

    assert_eq!(storage.read_to_string("/sdcard/missing.conf"), Ok(None));
    assert_eq!(storage.create_dir("/elsewhere/x"), Err(StorageError::CreateDirFailed));
}

#[test]
fn update_repairs_a_rejected_settings_file() {
    let card = tempfile::tempdir().unwrap();
    fs::write(card.path().join("timelapse.conf"), "quality = 99\ninterval = 20000\n").unwrap();

    let store = settings::update(card.path(), "quality", "10").unwrap();
    assert_eq!(store.settings().quality(), 10);

    let mut storage = FsStorage::mount(card.path()).unwrap();
    let mut reloaded = ConfigStore::new();
    assert!(reloaded.load(&mut storage, "/sdcard/timelapse.conf").is_ok());
    assert_eq!(reloaded.settings().quality(), 10);
    assert_eq!(reloaded.settings().capture_interval_ms(), 20000);

    assert!(settings::update(card.path(), "quality", "99").is_err());
    assert!(settings::update(&card.path().join("absent"), "quality", "10").is_err());
}
