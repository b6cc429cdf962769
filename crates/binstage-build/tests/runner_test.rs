use std::sync::{Arc, Mutex};

use binstage_build::{BuildError, BuildRunner};
use binstage_core::{
    CompileError, Compiler, Error, Format, HookError, HookFuture, HookPhase, LifecycleHook,
    TargetDescriptor,
};

type Log = Arc<Mutex<Vec<String>>>;

/// Records every compile call; fails for the target named in `fail_on`.
struct RecordingCompiler {
    log: Log,
    fail_on: Option<&'static str>,
}

impl Compiler for RecordingCompiler {
    async fn compile(&self, target: &TargetDescriptor) -> Result<(), CompileError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("compile:{}:{}", target.name(), target.format()));
        if self.fail_on == Some(target.name()) {
            return Err(CompileError::new(target.name(), "syntax error"));
        }
        Ok(())
    }
}

struct RecordingHook {
    name: &'static str,
    log: Log,
    fail_before: bool,
    fail_after: bool,
}

impl LifecycleHook for RecordingHook {
    fn name(&self) -> &str {
        self.name
    }

    fn before_build(&self) -> HookFuture<'_> {
        Box::pin(async move {
            self.log.lock().unwrap().push(format!("before:{}", self.name));
            if self.fail_before {
                return Err(HookError::from("prebuild exited with 1"));
            }
            Ok::<(), HookError>(())
        })
    }

    fn after_build(&self) -> HookFuture<'_> {
        Box::pin(async move {
            self.log.lock().unwrap().push(format!("after:{}", self.name));
            if self.fail_after {
                return Err(HookError::from("copy failed"));
            }
            Ok::<(), HookError>(())
        })
    }
}

fn hook(log: &Log) -> RecordingHook {
    RecordingHook {
        name: "stage",
        log: Arc::clone(log),
        fail_before: false,
        fail_after: false,
    }
}

fn target(name: &str, output: &str) -> TargetDescriptor {
    TargetDescriptor::builder(name, output)
        .entry_point(format!("src/{name}.ts"))
        .build()
        .unwrap()
}

fn staged(hook: RecordingHook, format: Format) -> TargetDescriptor {
    TargetDescriptor::builder("cli", "build/index")
        .entry_point("src/bin.ts")
        .format(format)
        .hook(Arc::new(hook))
        .build()
        .unwrap()
}

fn runner(log: &Log, fail_on: Option<&'static str>) -> BuildRunner<RecordingCompiler> {
    BuildRunner::new(RecordingCompiler {
        log: Arc::clone(log),
        fail_on,
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn hooks_bracket_their_target_compilation() {
    let log = Log::default();
    let targets = [
        staged(hook(&log), Format::CommonJs),
        target("preinstall", "preinstall/index"),
    ];

    runner(&log, None).run(&targets).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "before:stage",
            "compile:cli:cjs",
            "after:stage",
            "compile:preinstall:cjs",
        ]
    );
}

#[tokio::test]
async fn esm_sibling_does_not_repeat_hooks() {
    let log = Log::default();
    let targets = [
        staged(hook(&log), Format::CommonJs),
        staged(hook(&log), Format::Esm),
    ];

    runner(&log, None).run(&targets).await.unwrap();

    let log = entries(&log);
    assert_eq!(log.iter().filter(|e| e.starts_with("before:")).count(), 1);
    assert_eq!(log.iter().filter(|e| e.starts_with("after:")).count(), 1);
    assert!(log.contains(&"compile:cli:esm".to_owned()));
}

#[tokio::test]
async fn before_build_failure_skips_compilation_and_later_targets() {
    let log = Log::default();
    let failing = RecordingHook {
        fail_before: true,
        ..hook(&log)
    };
    let targets = [
        staged(failing, Format::CommonJs),
        target("migrate", "build/migrate"),
    ];

    let err = runner(&log, None).run(&targets).await.unwrap_err();

    match err {
        BuildError::Hook {
            target,
            hook,
            phase,
            ..
        } => {
            assert_eq!(target, "cli");
            assert_eq!(hook, "stage");
            assert_eq!(phase, HookPhase::BeforeBuild);
        }
        other => panic!("expected Hook error, got {other:?}"),
    }
    assert_eq!(entries(&log), vec!["before:stage"]);
}

#[tokio::test]
async fn after_build_failure_is_fatal() {
    let log = Log::default();
    let failing = RecordingHook {
        fail_after: true,
        ..hook(&log)
    };
    let targets = [
        staged(failing, Format::CommonJs),
        target("migrate", "build/migrate"),
    ];

    let err = runner(&log, None).run(&targets).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Hook {
            phase: HookPhase::AfterBuild,
            ..
        }
    ));
    assert_eq!(
        entries(&log),
        vec!["before:stage", "compile:cli:cjs", "after:stage"]
    );
}

#[tokio::test]
async fn compiler_failure_skips_after_build_and_stops() {
    let log = Log::default();
    let targets = [
        staged(hook(&log), Format::CommonJs),
        target("migrate", "build/migrate"),
    ];

    let err = runner(&log, Some("cli")).run(&targets).await.unwrap_err();

    match err {
        BuildError::Compile(e) => assert_eq!(e.target, "cli"),
        other => panic!("expected Compile error, got {other:?}"),
    }
    assert_eq!(entries(&log), vec!["before:stage", "compile:cli:cjs"]);
}

#[tokio::test]
async fn duplicate_outputs_rejected_before_anything_runs() {
    let log = Log::default();
    let targets = [
        target("cli", "build/index"),
        target("other", "build/index"),
    ];

    let err = runner(&log, None).run(&targets).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Config(Error::DuplicateOutput { .. })
    ));
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn every_target_is_attempted_on_success() {
    let log = Log::default();
    let targets = [
        target("cli", "build/index"),
        target("preinstall", "preinstall/index"),
        target("migrate", "build/migrate"),
    ];

    runner(&log, None).run(&targets).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "compile:cli:cjs",
            "compile:preinstall:cjs",
            "compile:migrate:cjs",
        ]
    );
}
