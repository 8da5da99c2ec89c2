mod common;

use std::fs;
use std::thread;
use std::time::Duration;

use common::{engine_with, temp_dir, FakeClient, HINDI, SCENARIO_A, TAMIL};
use hear2read_voices_lib::catalog::{CatalogError, BASELINE_FILENAME};
use hear2read_voices_lib::commands::{execute, parse_command, CommandOutcome};
use hear2read_voices_lib::events::VoiceEvent;
use hear2read_voices_lib::reconcile::ItemAction;
use hear2read_voices_lib::store::InventoryError;
use hear2read_voices_lib::transfer::{TransferError, TransferStatus};
use hear2read_voices_lib::{AppError, BootstrapOutcome};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn bootstrap_downloads_missing_baseline() {
    let root = temp_dir("engine_bootstrap");
    let dir = root.join("Hear2Read").join("Languages");
    let client = FakeClient::new(SCENARIO_A);
    let (mut engine, _) = engine_with(&dir, client.clone());

    assert_eq!(engine.bootstrap().unwrap(), BootstrapOutcome::Downloaded);
    assert!(dir.join(BASELINE_FILENAME).is_file());

    assert_eq!(engine.bootstrap().unwrap(), BootstrapOutcome::AlreadyInstalled);
    assert_eq!(client.download_count(), 1);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bootstrap_failure_is_surfaced_but_not_fatal() {
    let dir = temp_dir("engine_bootstrap_fail");
    let client = FakeClient::offline();
    let (mut engine, _) = engine_with(&dir, client.clone());

    let err = engine.bootstrap().unwrap_err();
    assert!(matches!(err, CatalogError::Baseline(_)));
    assert!(engine.status().is_some_and(|s| s.is_error));

    // The engine keeps working with a listing obtained later.
    engine.load_catalog(SCENARIO_A);
    assert_eq!(engine.items().len(), 2);
    assert_eq!(engine.items()[0].action, ItemAction::None);
    assert!(engine.items()[0].installed);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_a_catalog_refresh() {
    let dir = temp_dir("engine_scenario_a");
    fs::write(dir.join(BASELINE_FILENAME), b"ok").unwrap();
    let (mut engine, _) = engine_with(&dir, FakeClient::new(SCENARIO_A));

    engine.refresh_catalog().unwrap();
    let items = engine.items();
    assert_eq!(items.len(), 2);
    assert_eq!(
        (items[0].filename(), items[0].action, items[0].installed),
        (BASELINE_FILENAME, ItemAction::None, true)
    );
    assert_eq!(
        (items[1].display_name(), items[1].action, items[1].installed),
        ("Hindi Female", ItemAction::Install, false)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_b_install_flips_to_remove_and_reports_once() {
    let dir = temp_dir("engine_scenario_b");
    fs::write(dir.join(BASELINE_FILENAME), b"ok").unwrap();
    let (mut engine, reporter) = engine_with(&dir, FakeClient::new(SCENARIO_A));
    engine.refresh_catalog().unwrap();
    let events = engine.subscribe();

    engine.start_install(HINDI).unwrap();
    assert!(engine.is_busy());
    assert_eq!(
        engine.active_job().map(|job| job.status),
        Some(TransferStatus::InProgress)
    );
    assert!(engine.wait_until_idle(WAIT));

    let mut progress = Vec::new();
    let mut finished = Vec::new();
    for event in events.try_iter() {
        match event {
            VoiceEvent::TransferProgress { filename, percent } => {
                assert_eq!(filename, HINDI);
                progress.push(percent);
            }
            VoiceEvent::TransferFinished { job, error } => finished.push((job, error)),
            _ => {}
        }
    }

    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));

    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].0.status, TransferStatus::Succeeded);
    assert!(finished[0].1.is_none());

    assert!(dir.join(HINDI).is_file());
    let hindi = engine.list().get(HINDI).unwrap();
    assert_eq!(hindi.action, ItemAction::Remove);
    assert!(hindi.installed);

    assert_eq!(*reporter.installs.lock().unwrap(), vec![HINDI.to_string()]);
    assert!(reporter.removes.lock().unwrap().is_empty());
    assert_eq!(engine.status().unwrap().message, "Hindi Female Added");
    assert!(!engine.is_busy());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_c_second_install_rejected() {
    let dir = temp_dir("engine_scenario_c");
    let client = FakeClient::new(&format!("{BASELINE_FILENAME}|{HINDI}|{TAMIL}"));
    let release = client.hold_downloads();
    let (mut engine, reporter) = engine_with(&dir, client.clone());
    engine.refresh_catalog().unwrap();

    engine.start_install(HINDI).unwrap();
    let second = engine.start_install(TAMIL);
    assert!(matches!(second, Err(TransferError::AlreadyBusy)));
    assert_eq!(
        engine.active_job().map(|job| job.target_filename.as_str()),
        Some(HINDI)
    );

    release.send(()).unwrap();
    assert!(engine.wait_until_idle(WAIT));

    assert_eq!(client.download_count(), 1);
    assert_eq!(engine.list().get(TAMIL).unwrap().action, ItemAction::Install);
    assert_eq!(reporter.installs.lock().unwrap().len(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_d_remove_missing_file_leaves_list_unchanged() {
    let dir = temp_dir("engine_scenario_d");
    fs::write(dir.join(HINDI), b"ok").unwrap();
    let (mut engine, reporter) = engine_with(&dir, FakeClient::new(SCENARIO_A));
    engine.refresh_catalog().unwrap();

    // Deleted behind the engine's back: the list still offers removal.
    fs::remove_file(dir.join(HINDI)).unwrap();
    let before = engine.items().to_vec();

    let err = engine.remove(HINDI).unwrap_err();
    assert!(matches!(
        err,
        TransferError::Inventory(InventoryError::NotFound(_))
    ));
    assert_eq!(engine.items(), before.as_slice());

    let status = engine.status().unwrap();
    assert!(status.is_error);
    assert_eq!(status.message, "Error Removing Hindi Female");
    assert!(reporter.removes.lock().unwrap().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn remove_installed_voice_reports_and_reconciles() {
    let dir = temp_dir("engine_remove");
    fs::write(dir.join(HINDI), b"ok").unwrap();
    let (mut engine, reporter) = engine_with(&dir, FakeClient::new(SCENARIO_A));
    engine.refresh_catalog().unwrap();
    assert_eq!(engine.list().get(HINDI).unwrap().action, ItemAction::Remove);

    engine.toggle(HINDI).unwrap();

    assert!(!dir.join(HINDI).exists());
    assert_eq!(engine.list().get(HINDI).unwrap().action, ItemAction::Install);
    assert_eq!(*reporter.removes.lock().unwrap(), vec![HINDI.to_string()]);
    assert_eq!(engine.status().unwrap().message, "Hindi Female Removed");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn remove_during_install_keeps_download_progress() {
    let dir = temp_dir("engine_remove_mid_install");
    fs::write(dir.join(TAMIL), b"ok").unwrap();
    let client = FakeClient::new(&format!("{BASELINE_FILENAME}|{HINDI}|{TAMIL}"));
    let release = client.hold_downloads();
    let (mut engine, _) = engine_with(&dir, client);
    engine.refresh_catalog().unwrap();

    engine.start_install(HINDI).unwrap();
    while engine.list().get(HINDI).unwrap().progress_percent < 25 {
        assert!(engine.wait_for_update(WAIT), "worker should report progress");
    }
    let events = engine.subscribe();

    engine.remove(TAMIL).unwrap();
    assert_eq!(engine.list().get(HINDI).unwrap().progress_percent, 25);
    assert_eq!(engine.list().get(TAMIL).unwrap().action, ItemAction::Install);

    let refreshed: Vec<u8> = events
        .try_iter()
        .filter_map(|event| match event {
            VoiceEvent::ListRefreshed { items } => items
                .iter()
                .find(|item| item.filename() == HINDI)
                .map(|item| item.progress_percent),
            _ => None,
        })
        .collect();
    assert_eq!(refreshed, vec![25]);

    // A catalog refresh mid-download behaves the same way.
    engine.refresh_catalog().unwrap();
    assert_eq!(engine.list().get(HINDI).unwrap().progress_percent, 25);

    release.send(()).unwrap();
    assert!(engine.wait_until_idle(WAIT));
    assert_eq!(engine.list().get(HINDI).unwrap().action, ItemAction::Remove);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn install_rejected_until_previous_completion_is_applied() {
    let dir = temp_dir("engine_pending_completion");
    let client = FakeClient::new(&format!("{BASELINE_FILENAME}|{HINDI}|{TAMIL}"));
    let (mut engine, reporter) = engine_with(&dir, client.clone());
    engine.refresh_catalog().unwrap();

    engine.start_install(HINDI).unwrap();
    // The worker finishes and frees the lock; its completion is still queued.
    thread::sleep(Duration::from_millis(200));

    let second = engine.start_install(TAMIL);
    assert!(matches!(second, Err(TransferError::AlreadyBusy)));
    assert_eq!(
        engine.active_job().map(|job| job.target_filename.as_str()),
        Some(HINDI)
    );

    assert!(engine.wait_until_idle(WAIT));
    assert_eq!(*reporter.installs.lock().unwrap(), vec![HINDI.to_string()]);
    assert_eq!(engine.list().get(HINDI).unwrap().action, ItemAction::Remove);
    assert_eq!(client.download_count(), 1);

    engine.start_install(TAMIL).unwrap();
    assert!(engine.wait_until_idle(WAIT));
    assert_eq!(engine.list().get(TAMIL).unwrap().action, ItemAction::Remove);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_install_reverts_to_installable() {
    let dir = temp_dir("engine_install_fail");
    let client = FakeClient::new(SCENARIO_A);
    *client.fail_downloads.lock().unwrap() = true;
    let (mut engine, reporter) = engine_with(&dir, client);
    engine.refresh_catalog().unwrap();

    engine.start_install(HINDI).unwrap();
    assert!(engine.wait_until_idle(WAIT));

    let hindi = engine.list().get(HINDI).unwrap();
    assert_eq!(hindi.action, ItemAction::Install);
    assert!(!hindi.installed);
    assert_eq!(hindi.progress_percent, 0);
    assert!(engine.status().unwrap().is_error);
    assert!(reporter.installs.lock().unwrap().is_empty());

    // Ready for the next action.
    assert!(!engine.is_busy());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn baseline_toggle_is_refused() {
    let dir = temp_dir("engine_baseline_toggle");
    let (mut engine, _) = engine_with(&dir, FakeClient::new(SCENARIO_A));
    engine.refresh_catalog().unwrap();

    let err = engine.toggle(BASELINE_FILENAME).unwrap_err();
    assert!(matches!(err, AppError::Transfer(TransferError::Required(_))));
    assert!(!engine.is_busy());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn catalog_failure_keeps_previous_items() {
    let dir = temp_dir("engine_catalog_fail");
    let client = FakeClient::new(SCENARIO_A);
    let (mut engine, _) = engine_with(&dir, client.clone());
    engine.refresh_catalog().unwrap();

    *client.listing.lock().unwrap() = None;
    let err = engine.refresh_catalog().unwrap_err();
    assert!(matches!(err, CatalogError::Listing(_)));
    assert_eq!(engine.items().len(), 2);
    assert!(engine.status().unwrap().is_error);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn commands_drive_the_engine() {
    let dir = temp_dir("engine_commands");
    let (mut engine, _) = engine_with(&dir, FakeClient::new(SCENARIO_A));
    engine.refresh_catalog().unwrap();

    let outcome = execute(&mut engine, parse_command("add hindi female").unwrap()).unwrap();
    assert_eq!(outcome, CommandOutcome::InstallStarted(HINDI.to_string()));
    assert!(engine.wait_until_idle(WAIT));

    let err = execute(&mut engine, parse_command("add 2").unwrap()).unwrap_err();
    assert!(matches!(err, AppError::AlreadyInstalled(_)));

    let outcome = execute(&mut engine, parse_command("remove 2").unwrap()).unwrap();
    assert_eq!(outcome, CommandOutcome::Removed(HINDI.to_string()));

    let err = execute(&mut engine, parse_command("remove 9").unwrap()).unwrap_err();
    assert!(matches!(err, AppError::UnknownVoice(_)));

    match execute(&mut engine, parse_command("list").unwrap()).unwrap() {
        CommandOutcome::Listed(items) => assert_eq!(items.len(), 2),
        other => panic!("unexpected outcome {other:?}"),
    }

    let _ = fs::remove_dir_all(&dir);
}
