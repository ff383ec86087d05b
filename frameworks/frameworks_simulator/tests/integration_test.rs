//! Integration tests for frameworks_simulator
//!
//! Boots the simulator from program files on disk and drives it through
//! operator commands.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use entities_process::ProcessStatus;
use frameworks_simulator::*;
use tempfile::TempDir;

fn write_program(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn boot(extra: &[&str], programs: &[PathBuf]) -> BasicOs {
    let mut argv: Vec<String> = vec!["basic_os".to_string()];
    argv.extend(extra.iter().map(|s| s.to_string()));
    argv.extend(programs.iter().map(|p| p.display().to_string()));
    let args = SimulatorArgs::try_parse_from(argv).unwrap();
    BasicOs::boot(SimulatorConfig::from_args(&args).unwrap()).unwrap()
}

fn run(os: &mut BasicOs, script: &[&str]) -> String {
    let mut out = Vec::new();
    for line in script {
        let command: Command = line.parse().unwrap();
        if os.execute(command, &mut out).unwrap() == Flow::Stop {
            break;
        }
    }
    String::from_utf8(out).unwrap()
}

#[test]
fn test_full_session_from_files() {
    let dir = TempDir::new().unwrap();
    let programs = vec![
        write_program(&dir, "a.txt", "COMPUTE\nINPUT\nCOMPUTE\n"),
        write_program(&dir, "b.txt", "output\n\ncompute\n"),
    ];
    let mut os = boot(&["--user-memory", "10", "--quantum", "5"], &programs);
    assert_eq!(os.jobs().len(), 2);

    let text = run(
        &mut os,
        &[
            "admit all",
            "tick 4",
            "interrupt 1",
            "interrupt 2",
            "tick 10",
            "stop",
        ],
    );

    assert!(text.contains("Process 0 admitted to the ready queue at position 0."));
    assert!(text.contains("Process 1 admitted to the ready queue at position 3."));
    assert!(text.contains("Process 0 moved to ready queue due to interrupt 1."));
    assert!(text.contains("Process 1 moved to ready queue due to interrupt 2."));
    assert!(text.contains("All processes are completed."));
    assert!(text.contains("Number of jobs completed: 2"));

    assert!(os.scheduler().all_processes_complete());
    assert_eq!(os.memory().free_slots(), 10);
    let a = os.job_process(0).unwrap();
    assert_eq!(a.status(), ProcessStatus::Completed);
    assert_eq!(a.program_counter(), 3);
    assert_eq!(a.cpu_ticks(), 3);
}

#[test]
fn test_boot_reports_bad_opcode() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, "bad.txt", "COMPUTE\nJUMP\n");
    let args = SimulatorArgs::try_parse_from(["basic_os".to_string(), path.display().to_string()])
        .unwrap();
    let err = BasicOs::boot(SimulatorConfig::from_args(&args).unwrap()).unwrap_err();
    match err {
        SimulatorError::Program(ProgramError::UnknownOpcode { line, text, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(text, "JUMP");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_boot_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.txt");
    let args =
        SimulatorArgs::try_parse_from(["basic_os".to_string(), missing.display().to_string()])
            .unwrap();
    let err = BasicOs::boot(SimulatorConfig::from_args(&args).unwrap()).unwrap_err();
    assert!(matches!(err, SimulatorError::Program(ProgramError::IoError { .. })));
}

#[test]
fn test_next_fit_admission_order() {
    let dir = TempDir::new().unwrap();
    let programs = vec![
        write_program(&dir, "a.txt", "COMPUTE\nCOMPUTE\nCOMPUTE\n"),
        write_program(&dir, "b.txt", "COMPUTE\nCOMPUTE\n"),
        write_program(&dir, "c.txt", "INPUT\nINPUT\nINPUT\n"),
    ];
    let mut os = boot(&["--user-memory", "10", "--strategy", "NF"], &programs);

    os.admit_job(0).unwrap();
    os.admit_job(1).unwrap();
    // Round robin: job 1 completes on tick 4, job 0 on tick 5
    let report = os.tick(5).unwrap();
    assert_eq!(report.completed, vec![1, 0]);
    assert_eq!(os.memory().free_slots(), 10);

    // Next-Fit resumes after job 1 instead of reusing the hole at 0
    assert_eq!(os.admit_job(2).unwrap().start, 5);
}

#[test]
fn test_jobs_listing_tracks_status() {
    let dir = TempDir::new().unwrap();
    let programs = vec![
        write_program(&dir, "a.txt", "INPUT\n"),
        write_program(&dir, "b.txt", "COMPUTE\n"),
    ];
    let mut os = boot(&[], &programs);
    let text = run(&mut os, &["admit job 0", "tick 1", "show jobs"]);
    assert!(text.contains("job 0: Process ID 0, Instructions=[INPUT], Status=BLOCKED"));
    assert!(text.contains("job 1: Process ID 1, Instructions=[COMPUTE], Status=READY"));
}
