//! Release run protocol tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use shipyard_config::PreReleaseSetting;
use shipyard_core::{CoreError, Orchestrator, RunState};
use shipyard_plugin::{
    Increment, Plugin, PluginError, PluginResult, ReleaseContext, ReleaseOptions, ReleasePlugin,
    keys,
};

#[derive(Default)]
struct Recorder {
    name: Option<String>,
    latest: Option<String>,
    changelog: Option<String>,
    increment: Option<Increment>,
    context_increment: Option<Value>,
    version_ci: Option<String>,
    version: Option<String>,
    tag_on_bump: Option<String>,
    fail_init: bool,
    fail_bump: bool,
    journal: Arc<Mutex<Vec<String>>>,
    options_seen: Arc<Mutex<Vec<ReleaseOptions>>>,
}

impl Recorder {
    fn record(&self, entry: &str) {
        self.journal.lock().unwrap().push(entry.to_string());
    }

    fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    fn called(&self, hook: &str) -> bool {
        self.journal().iter().any(|entry| entry == hook)
    }

    fn last_options(&self) -> ReleaseOptions {
        self.options_seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl Plugin for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }
}

#[async_trait]
impl ReleasePlugin for Recorder {
    async fn init(&mut self, _ctx: &ReleaseContext) -> PluginResult<()> {
        self.record("init");
        if self.fail_init {
            return Err(PluginError::InitFailed("no credentials".to_string()));
        }
        Ok(())
    }

    async fn get_name(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        self.record("get_name");
        Ok(self.name.clone())
    }

    async fn get_latest_version(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        self.record("get_latest_version");
        Ok(self.latest.clone())
    }

    async fn get_changelog(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        self.record("get_changelog");
        Ok(self.changelog.clone())
    }

    async fn get_increment(
        &self,
        options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<Increment>> {
        self.record("get_increment");
        self.options_seen.lock().unwrap().push(options.clone());
        Ok(self.increment.clone())
    }

    async fn get_incremented_version_ci(
        &self,
        options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        self.record("get_incremented_version_ci");
        self.options_seen.lock().unwrap().push(options.clone());
        Ok(self.version_ci.clone())
    }

    async fn get_incremented_version(
        &self,
        _options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        self.record("get_incremented_version");
        Ok(self.version.clone())
    }

    fn get_context(&self, key: &str) -> Option<Value> {
        self.record(&format!("get_context:{key}"));
        match key {
            keys::INCREMENT => self.context_increment.clone(),
            _ => None,
        }
    }

    async fn before_bump(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        self.record("before_bump");
        Ok(())
    }

    async fn bump(&mut self, version: &str, ctx: &mut ReleaseContext) -> PluginResult<()> {
        self.record("bump");
        if self.fail_bump {
            return Err(PluginError::ExecutionFailed(format!("cannot write {version}")));
        }
        if let Some(tag) = &self.tag_on_bump {
            ctx.set(keys::TAG_NAME, tag.as_str());
        }
        Ok(())
    }

    async fn before_release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        self.record("before_release");
        Ok(())
    }

    async fn release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        self.record("release");
        Ok(())
    }

    async fn after_release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        self.record("after_release");
        Ok(())
    }
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new().with_default_name("__test__")
}

#[tokio::test]
async fn test_all_absent_uses_defaults() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.name, "__test__");
    assert_eq!(summary.latest_version, "1.0.0");
    assert_eq!(summary.version, "1.0.1");
    assert_eq!(ctx.get_str(keys::NAME), Some("__test__"));
    assert_eq!(ctx.get_str(keys::VERSION), Some("1.0.1"));
    assert_eq!(ctx.get(keys::PATCH), Some(&json!(1)));
}

#[tokio::test]
async fn test_hooks_run_in_order() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(
        plugin.journal(),
        vec![
            "init",
            "get_name",
            "get_latest_version",
            "get_changelog",
            "get_increment",
            "get_context:increment",
            "get_incremented_version_ci",
            "get_incremented_version",
            "before_bump",
            "bump",
            "before_release",
            "release",
            "after_release",
        ]
    );
    assert_eq!(
        summary.states,
        vec![
            RunState::Init,
            RunState::NameResolved,
            RunState::VersionResolved,
            RunState::IncrementResolved,
            RunState::FinalVersionResolved,
            RunState::Bumped,
            RunState::TagResolved,
            RunState::Released,
            RunState::Done,
        ]
    );
}

#[tokio::test]
async fn test_minor_increment_from_context() {
    let mut plugin = Recorder {
        latest: Some("1.2.3".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::INCREMENT, "minor");

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "1.3.0");
}

#[tokio::test]
async fn test_plugin_increment_wins_over_contexts() {
    let mut plugin = Recorder {
        latest: Some("1.2.3".to_string()),
        increment: Some(Increment::Minor),
        context_increment: Some(json!("major")),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::INCREMENT, "patch");

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "1.3.0");
    assert!(!plugin.called("get_context:increment"));
    assert_eq!(plugin.last_options().increment, Some(Increment::Minor));
}

#[tokio::test]
async fn test_plugin_context_increment_wins_over_shared_context() {
    let mut plugin = Recorder {
        latest: Some("1.2.3".to_string()),
        context_increment: Some(json!("major")),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::INCREMENT, "patch");

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "2.0.0");
}

#[tokio::test]
async fn test_skip_increment_keeps_latest() {
    let mut plugin = Recorder {
        latest: Some("1.2.3".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::INCREMENT, false);

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "1.2.3");
}

#[tokio::test]
async fn test_ci_version_returned_verbatim() {
    let mut plugin = Recorder {
        version_ci: Some(String::new()),
        version: Some("9.9.9".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "");
    assert!(!plugin.called("get_incremented_version"));
    assert_eq!(ctx.get_str(keys::VERSION), Some(""));
}

#[tokio::test]
async fn test_non_semver_version_clears_pre_release_flags() {
    let mut plugin = Recorder {
        version_ci: Some("nightly".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::IS_PRE_RELEASE, true);
    ctx.set(keys::PRE_RELEASE_ID, "beta");

    orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(ctx.get_str(keys::VERSION), Some("nightly"));
    assert_eq!(ctx.get(keys::IS_PRE_RELEASE), Some(&json!(false)));
    assert_eq!(ctx.get(keys::PRE_RELEASE_ID), Some(&Value::Null));
}

#[tokio::test]
async fn test_interactive_version_beats_arithmetic() {
    let mut plugin = Recorder {
        latest: Some("1.2.3".to_string()),
        version: Some("1.5.0".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.version, "1.5.0");
}

#[tokio::test]
async fn test_absent_probing_leaves_only_run_keys() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();

    orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    let expected = [
        keys::BUILD,
        keys::CHANGELOG,
        keys::IS_PRE_RELEASE,
        keys::LATEST_TAG,
        keys::LATEST_VERSION,
        keys::MAJOR,
        keys::MINOR,
        keys::NAME,
        keys::PATCH,
        keys::PRE_RELEASE_ID,
        keys::PRERELEASE,
        keys::TAG_NAME,
        keys::VERSION,
    ];
    assert_eq!(ctx.len(), expected.len());
    for key in expected {
        assert!(ctx.get(key).is_some(), "missing context key {key}");
    }
    assert_eq!(ctx.get(keys::CHANGELOG), Some(&Value::Null));
}

#[tokio::test]
async fn test_pre_release_with_identifier() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();
    let orchestrator =
        orchestrator().with_pre_release(Some(PreReleaseSetting::Id("beta".to_string())));

    orchestrator.run_tasks(&mut plugin, &mut ctx).await.unwrap();

    let options = plugin.last_options();
    assert!(options.is_pre_release);
    assert_eq!(options.pre_release_id.as_deref(), Some("beta"));
}

#[tokio::test]
async fn test_pre_release_flag_has_no_identifier() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();
    let orchestrator = orchestrator().with_pre_release(Some(PreReleaseSetting::Flag(true)));

    orchestrator.run_tasks(&mut plugin, &mut ctx).await.unwrap();

    let options = plugin.last_options();
    assert!(options.is_pre_release);
    assert!(options.pre_release_id.is_none());
}

#[tokio::test]
async fn test_preset_tag_name_is_kept() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();
    ctx.set(keys::TAG_NAME, "release-candidate");

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.tag_name, "release-candidate");
    assert_eq!(ctx.get_str(keys::TAG_NAME), Some("release-candidate"));
}

#[tokio::test]
async fn test_tag_name_set_during_bump_is_kept() {
    let mut plugin = Recorder {
        tag_on_bump: Some("v1.0.1".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();

    let summary = orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(summary.tag_name, "v1.0.1");
}

#[tokio::test]
async fn test_tag_name_defaults_to_version() {
    let mut plugin = Recorder::default();
    let mut ctx = ReleaseContext::new();

    orchestrator().run_tasks(&mut plugin, &mut ctx).await.unwrap();

    assert_eq!(ctx.get_str(keys::TAG_NAME), Some("1.0.1"));
}

#[tokio::test]
async fn test_bump_failure_stops_release() {
    let mut plugin = Recorder {
        fail_bump: true,
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();

    let err = orchestrator()
        .run_tasks(&mut plugin, &mut ctx)
        .await
        .unwrap_err();

    match err {
        CoreError::Hook { hook, state, .. } => {
            assert_eq!(hook, "bump");
            assert_eq!(state, RunState::FinalVersionResolved);
        }
        other => panic!("Expected hook error, got {other:?}"),
    }
    assert!(!plugin.called("before_release"));
    assert!(!plugin.called("release"));
    assert!(!plugin.called("after_release"));
    assert!(!ctx.is_set(keys::TAG_NAME));
}

#[tokio::test]
async fn test_init_failure_leaves_context_untouched() {
    let mut plugin = Recorder {
        fail_init: true,
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();
    ctx.set("seed", 1);
    let before = ctx.clone();

    let err = orchestrator()
        .run_tasks(&mut plugin, &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Hook { hook: "init", .. }));
    assert_eq!(ctx, before);
    assert_eq!(plugin.journal(), vec!["init"]);
}

#[tokio::test]
async fn test_invalid_latest_version_is_reported() {
    let mut plugin = Recorder {
        latest: Some("latest".to_string()),
        ..Recorder::default()
    };
    let mut ctx = ReleaseContext::new();

    let err = orchestrator()
        .run_tasks(&mut plugin, &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidVersion { .. }));
    assert!(!plugin.called("bump"));
}

#[tokio::test]
async fn test_independent_runs_in_parallel() {
    let first = tokio::spawn(async {
        let mut plugin = Recorder {
            latest: Some("1.0.0".to_string()),
            increment: Some(Increment::Major),
            ..Recorder::default()
        };
        let mut ctx = ReleaseContext::new();
        orchestrator().run_tasks(&mut plugin, &mut ctx).await
    });
    let second = tokio::spawn(async {
        let mut plugin = Recorder {
            latest: Some("3.1.0".to_string()),
            ..Recorder::default()
        };
        let mut ctx = ReleaseContext::new();
        orchestrator().run_tasks(&mut plugin, &mut ctx).await
    });

    assert_eq!(first.await.unwrap().unwrap().version, "2.0.0");
    assert_eq!(second.await.unwrap().unwrap().version, "3.1.1");
}
