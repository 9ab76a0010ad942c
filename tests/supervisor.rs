//! Integration tests driving real `/bin/sh` children through the public API.

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use procvisor::{
    Bus, Event, EventKind, ProcessSpec, Subscribe, SubscriberSet, SuperviseError, Supervisor,
    SupervisorConfig,
};

static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Fresh per-test directory, so parallel tests never share pid files or cwd.
fn unique_test_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "procvisor-test-{}-{}",
        std::process::id(),
        DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

fn sh_spec(name: &str, script: &str) -> ProcessSpec {
    ProcessSpec::new(name, "/bin/sh")
        .with_args(["-c", script])
        .with_run_dir(unique_test_dir())
}

#[tokio::test]
async fn test_start_and_stop_running_child() {
    let sup = Supervisor::new(sh_spec("sleeper", "sleep 30"));

    sup.start().await.expect("start should succeed");
    assert!(sup.is_running().await);
    let handle = sup.process().await.expect("child should be tracked");
    assert!(handle.is_alive(), "freshly started child should be alive");

    sup.stop().await.expect("stop should succeed");
    assert!(sup.process().await.is_none(), "no child after stop");
    assert!(!sup.is_running().await);
    assert!(!handle.is_alive(), "child should be terminated after stop");
}

#[tokio::test]
async fn test_immediate_nonzero_exit_is_not_a_launch_failure() {
    let sup = Supervisor::new(sh_spec("failing", "false"));
    sup.start()
        .await
        .expect("an abnormal exit is not a launch failure");
    sup.stop().await.expect("stop should succeed");
}

#[tokio::test]
async fn test_launch_failure_for_non_executable_path() {
    let spec = ProcessSpec::new("bad-binary", "/tmp").with_run_dir(unique_test_dir());
    let sup = Supervisor::new(spec);

    let err = sup.start().await.expect_err("directories cannot be executed");
    assert!(matches!(err, SuperviseError::Launch { .. }));
    assert_eq!(err.as_label(), "launch_failed");
    assert!(!sup.is_running().await, "no background task after a failed start");
    assert!(sup.process().await.is_none());
}

#[tokio::test]
async fn test_launch_failure_for_missing_run_dir() {
    let spec = ProcessSpec::new("bad-rundir", "/bin/sh")
        .with_args(["-c", "true"])
        .with_run_dir("/bin/sh/foo/bar");
    let sup = Supervisor::new(spec);

    let err = sup.start().await.expect_err("missing run dir must fail");
    assert!(matches!(err, SuperviseError::Launch { .. }));
}

#[tokio::test]
async fn test_respawn_spawns_new_process() {
    let spec = sh_spec("respawner", "sleep 0.1")
        .with_timeout_respawn(Some(Duration::from_millis(10)));
    let sup = Supervisor::new(spec);

    sup.start().await.expect("start should succeed");
    let first = sup.process().await.expect("first child").id();

    let deadline = Instant::now() + Duration::from_secs(5);
    let relaunched = loop {
        if let Some(handle) = sup.process().await {
            if handle.id() != first {
                break handle;
            }
        }
        assert!(Instant::now() < deadline, "no relaunch within 5s");
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    assert_ne!(relaunched.id(), first, "relaunch must be a new process");

    sup.stop().await.expect("stop should succeed");
}

#[tokio::test]
async fn test_stop_during_respawn_delay() {
    let mut cfg = SupervisorConfig::default();
    cfg.timeout_respawn = Duration::from_millis(800);
    let sup = Supervisor::builder(sh_spec("oneshot", "true"))
        .with_config(cfg)
        .build();

    sup.start().await.expect("start should succeed");
    // Let the child exit and the loop settle into the respawn delay.
    tokio::time::sleep(Duration::from_millis(250)).await;

    let before_stop = Instant::now();
    sup.stop().await.expect("stop should cancel the pending respawn");
    assert!(
        before_stop.elapsed() < Duration::from_millis(500),
        "stop should interrupt the delay, not wait it out"
    );
    assert!(sup.process().await.is_none());

    // Wait past the point where the cancelled relaunch would have happened.
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(sup.process().await.is_none(), "no relaunch after stop");
    assert!(!sup.is_running().await);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let sup = Supervisor::new(sh_spec("idle", "sleep 30"));

    sup.stop().await.expect("stop before start is a no-op");

    sup.start().await.expect("start should succeed");
    sup.stop().await.expect("first stop should succeed");
    sup.stop().await.expect("second stop should succeed");
}

#[tokio::test]
async fn test_start_while_running_is_a_noop() {
    let sup = Supervisor::new(sh_spec("double-start", "sleep 30"));

    sup.start().await.expect("start should succeed");
    let first = sup.process().await.expect("child").id();

    sup.start().await.expect("second start is a no-op");
    let second = sup.process().await.expect("child").id();
    assert_eq!(first, second, "second start must not replace the child");

    sup.stop().await.expect("stop should succeed");
}

#[tokio::test]
async fn test_failed_relaunch_ends_supervision() {
    use std::os::unix::fs::PermissionsExt;

    let dir = unique_test_dir();
    let script = dir.join("run.sh");
    std::fs::write(&script, "#!/bin/sh\nexit 0\n").expect("write script");
    let mut perms = std::fs::metadata(&script).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).expect("make script executable");

    let spec = ProcessSpec::new("vanishing", &script)
        .with_run_dir(&dir)
        .with_timeout_respawn(Some(Duration::from_millis(10)));
    let sup = Supervisor::new(spec);

    sup.start().await.expect("first launch should succeed");
    std::fs::remove_file(&script).expect("remove script");

    let deadline = Instant::now() + Duration::from_secs(5);
    while sup.is_running().await {
        assert!(
            Instant::now() < deadline,
            "loop should end once relaunching is impossible"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(sup.process().await.is_none());

    sup.stop().await.expect("stop after a terminal failure is a no-op");
}

#[tokio::test]
async fn test_start_again_after_terminal_relaunch_failure() {
    use std::os::unix::fs::PermissionsExt;

    let dir = unique_test_dir();
    let script = dir.join("run.sh");
    let install = |body: &str| {
        std::fs::write(&script, body).expect("write script");
        let mut perms = std::fs::metadata(&script).expect("script metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).expect("make script executable");
    };
    install("#!/bin/sh\nexit 0\n");

    let spec = ProcessSpec::new("comeback", &script)
        .with_run_dir(&dir)
        .with_timeout_respawn(Some(Duration::from_millis(10)));
    let sup = Supervisor::new(spec);

    sup.start().await.expect("first launch should succeed");
    std::fs::remove_file(&script).expect("remove script");

    let deadline = Instant::now() + Duration::from_secs(5);
    while sup.is_running().await {
        assert!(
            Instant::now() < deadline,
            "loop should end once relaunching is impossible"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // With the binary back in place, a fresh run must actually begin.
    install("#!/bin/sh\nsleep 30\n");
    sup.start()
        .await
        .expect("start after a terminal failure should succeed");
    assert!(sup.is_running().await, "supervision must resume, not no-op");
    assert!(sup.process().await.is_some(), "a fresh child must be tracked");

    sup.stop().await.expect("stop should succeed");
    assert!(sup.process().await.is_none());
}

#[tokio::test]
async fn test_grace_escalation_kills_term_ignoring_child() {
    let spec = sh_spec("stubborn", "trap '' TERM; sleep 3")
        .with_timeout_stop(Some(Duration::from_millis(300)));
    let sup = Supervisor::new(spec);

    sup.start().await.expect("start should succeed");
    // Give the shell time to install the trap.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let handle = sup.process().await.expect("child");

    let before_stop = Instant::now();
    sup.stop().await.expect("stop should succeed despite the trap");
    let elapsed = before_stop.elapsed();

    assert!(
        elapsed >= Duration::from_millis(250),
        "a TERM-ignoring child is only killed after the grace window"
    );
    assert!(elapsed < Duration::from_secs(2), "kill must not hang");
    assert!(!handle.is_alive(), "child must be gone after escalation");
    assert!(sup.process().await.is_none());
}

#[tokio::test]
async fn test_env_overrides_reach_child() {
    let dir = unique_test_dir();
    let env = [
        ("GREETER_GREETING".to_string(), "override".to_string()),
        ("GREETING".to_string(), "plain".to_string()),
    ]
    .into();
    let spec = ProcessSpec::new("greeter", "/bin/sh")
        .with_args(["-c", r#"printf '%s' "$GREETING" > greeting.txt; sleep 30"#])
        .with_run_dir(&dir)
        .with_env(env);
    let sup = Supervisor::new(spec);

    sup.start().await.expect("start should succeed");

    let marker = dir.join("greeting.txt");
    let deadline = Instant::now() + Duration::from_secs(3);
    let contents = loop {
        if let Ok(contents) = std::fs::read_to_string(&marker) {
            if !contents.is_empty() {
                break contents;
            }
        }
        assert!(Instant::now() < deadline, "child never wrote its marker file");
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    assert_eq!(
        contents, "override",
        "the prefixed extra must override the plain one"
    );

    sup.stop().await.expect("stop should succeed");
}

#[tokio::test]
async fn test_non_utf8_inherited_env_does_not_break_launch() {
    use std::os::unix::ffi::OsStringExt;

    // Inherited, not spec-provided: only the ambient environment can carry
    // values that are not valid UTF-8.
    std::env::set_var(
        "PROCVISOR_TEST_RAW_BYTES",
        std::ffi::OsString::from_vec(vec![b'r', b'a', b'w', 0xff]),
    );

    let sup = Supervisor::new(sh_spec("tolerant", "sleep 30"));
    sup.start()
        .await
        .expect("non-UTF8 inherited values must not prevent a launch");
    assert!(sup.is_running().await);

    sup.stop().await.expect("stop should succeed");
    std::env::remove_var("PROCVISOR_TEST_RAW_BYTES");
}

#[tokio::test]
async fn test_pid_file_lifecycle() {
    let dir = unique_test_dir();
    let spec = ProcessSpec::new("pidproc", "/bin/sh")
        .with_args(["-c", "sleep 30"])
        .with_run_dir(&dir);
    let sup = Supervisor::new(spec);

    sup.start().await.expect("start should succeed");
    let handle = sup.process().await.expect("child");

    let pid_file = dir.join("pidproc.pid");
    let recorded = std::fs::read_to_string(&pid_file).expect("pid file should exist");
    assert_eq!(recorded.trim(), handle.id().to_string());

    sup.stop().await.expect("stop should succeed");
    assert!(!pid_file.exists(), "pid file should be removed on stop");
}

struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn test_events_follow_lifecycle() {
    let recorder = Arc::new(Recorder {
        kinds: Mutex::new(Vec::new()),
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone()];
    let sup = Supervisor::builder(sh_spec("observed", "sleep 30"))
        .with_subscribers(subs)
        .build();

    sup.start().await.expect("start should succeed");
    tokio::time::sleep(Duration::from_millis(100)).await;
    sup.stop().await.expect("stop should succeed");
    // Fan-out is asynchronous; give the worker a moment to drain.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let kinds = recorder.kinds.lock().unwrap().clone();
    let started = kinds
        .iter()
        .position(|k| *k == EventKind::ProcessStarted)
        .expect("ProcessStarted should be delivered");
    let stop_requested = kinds
        .iter()
        .position(|k| *k == EventKind::StopRequested)
        .expect("StopRequested should be delivered");
    let stopped = kinds
        .iter()
        .position(|k| *k == EventKind::SupervisorStopped)
        .expect("SupervisorStopped should be delivered");

    assert!(started < stop_requested, "start precedes the stop request");
    assert!(stop_requested < stopped, "the loop exits after the stop request");
}

struct Bomber;

#[async_trait]
impl Subscribe for Bomber {
    async fn on_event(&self, _event: &Event) {
        panic!("boom in handler");
    }

    fn name(&self) -> &'static str {
        "bomber"
    }
}

#[tokio::test]
async fn test_subscriber_panic_report_carries_the_message() {
    let bus = Bus::new(16);
    let mut rx = bus.subscribe();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Bomber)];
    let set = SubscriberSet::new(subs, bus.clone());

    set.emit(&Event::new(EventKind::ProcessStarted).with_process("victim"));

    let report = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("bus should stay open");
            if event.kind == EventKind::SubscriberPanicked {
                break event;
            }
        }
    })
    .await
    .expect("the panic report should be published");

    assert_eq!(report.process.as_deref(), Some("bomber"));
    let reason = report.reason.as_deref().expect("the report carries a reason");
    assert!(
        reason.contains("boom in handler"),
        "the panic message must reach the event, got {reason:?}"
    );

    set.shutdown().await;
}
