//! Integration tests for lane execution
//!
//! Hook ordering, error hooks, lane switching, the usage ledger and the
//! shared run context, driven through fixture Lanefiles whose lanes write
//! marker files into a temporary project.

mod common;

use common::{TestProject, ORDERED_HOOKS};
use laneway::core::collector::ActionCollector;
use laneway::core::lanefile::Lanefile;
use laneway::core::runner::Phase;
use laneway::core::value::Value;
use laneway::error::RunnerError;

fn log(lanefile: &Lanefile) -> Vec<String> {
    match lanefile.runner().context().get("log") {
        Some(Value::Array(items)) => items.iter().map(ToString::to_string).collect(),
        other => panic!("log is not an array: {other:?}"),
    }
}

// ============================================
// Different Lanefiles
// ============================================

#[test]
fn test_root_lanes_run_between_hooks() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("Lanefile1");

    lanefile.runner_mut().execute("deploy", None, None).unwrap();
    assert!(project.file_exists("before_all"));
    assert!(project.file_exists("deploy"));
    assert!(!project.file_exists("test"));
    assert_eq!(project.read_file("after_all"), "deploy");
    assert_eq!(lanefile.runner().phase(), Phase::Done);

    lanefile.runner_mut().execute("test", None, None).unwrap();
    assert!(project.file_exists("test"));
}

#[test]
fn test_error_hook_runs_and_failure_propagates() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("Lanefile1");

    let err = lanefile
        .runner_mut()
        .execute("error_causing_lane", None, None)
        .unwrap_err();

    assert_eq!(err.to_string(), "divided by 0");
    assert!(matches!(err, RunnerError::ActionFailure { ref action, .. } if action == "fail"));
    assert!(project.file_exists("before_all"));
    assert!(!project.file_exists("after_all"));
    assert_eq!(project.read_file("error"), "error_causing_lane");
    assert_eq!(lanefile.runner().phase(), Phase::Error);
}

// ============================================
// Grouped Lanefile
// ============================================

#[test]
fn test_platform_lane_mac_beta() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("LanefileGrouped");

    lanefile.runner_mut().execute("beta", Some("mac"), None).unwrap();

    assert!(project.file_exists("mac_beta.txt"));
    assert!(!project.file_exists("before_all_android.txt"));
    assert!(project.file_exists("before_all.txt"));
    assert_eq!(lanefile.runner().context().current_lane(), Some("mac beta"));
}

#[test]
fn test_platform_lane_android_beta() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("LanefileGrouped");

    lanefile.runner_mut().execute("beta", Some("android"), None).unwrap();

    assert!(project.file_exists("android_beta.txt"));
    assert_eq!(project.read_file("before_all_android.txt"), "beta");
    assert_eq!(project.read_file("after_all_android.txt"), "beta");
    assert!(project.file_exists("before_all.txt"));
    assert_eq!(lanefile.runner().context().current_lane(), Some("android beta"));
}

#[test]
fn test_all_error_hooks_run() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("LanefileGrouped");

    let err = lanefile
        .runner_mut()
        .execute("witherror", Some("android"), None)
        .unwrap_err();

    assert_eq!(err.to_string(), "my exception");
    assert!(project.file_exists("before_all_android.txt"));
    assert!(!project.file_exists("after_all_android.txt"));
    assert_eq!(project.read_file("android_error.txt"), "my exception");
    assert_eq!(project.read_file("error.txt"), "my exception");
    assert!(project.file_exists("before_all.txt"));
    assert_eq!(lanefile.runner().context().current_platform(), Some("android"));
}

#[test]
fn test_root_lane_without_platform() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("LanefileGrouped");

    lanefile.runner_mut().execute("anotherroot", None, None).unwrap();

    assert!(!project.file_exists("before_all_android.txt"));
    assert!(!project.file_exists("after_all_android.txt"));
    assert!(!project.file_exists("android_error.txt"));
    assert!(!project.file_exists("error.txt"));
    assert!(project.file_exists("before_all.txt"));
    assert!(project.file_exists("another_root.txt"));

    let context = lanefile.runner().context();
    assert_eq!(context.current_lane(), Some("anotherroot"));
    assert_eq!(context.current_platform(), None);
}

#[test]
fn test_unsupported_action_on_platform() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("LanefileGrouped");

    let err = lanefile
        .runner_mut()
        .execute("unsupported_action", Some("android"), None)
        .unwrap_err();

    assert!(matches!(err, RunnerError::UnsupportedPlatform { .. }));
    assert_eq!(
        err.to_string(),
        "Action 'frameit' doesn't support required operating system 'android'."
    );
}

// ============================================
// Hook ordering
// ============================================

#[test]
fn test_hook_order_for_platform_lane() {
    let project = TestProject::new();
    let mut lanefile = project.parse(ORDERED_HOOKS);

    lanefile.runner_mut().execute("build", Some("ios"), None).unwrap();
    assert_eq!(
        log(&lanefile),
        vec!["root before_all", "ios before_all", "body", "ios after_all", "root after_all"]
    );
}

#[test]
fn test_hook_order_for_root_lane() {
    let project = TestProject::new();
    let mut lanefile = project.parse(ORDERED_HOOKS);

    lanefile.runner_mut().execute("plain", None, None).unwrap();
    assert_eq!(log(&lanefile), vec!["root before_all", "body", "root after_all"]);
}

#[test]
fn test_hook_order_for_failing_lane() {
    let project = TestProject::new();
    let mut lanefile = project.parse(ORDERED_HOOKS);

    let err = lanefile.runner_mut().execute("broken", Some("ios"), None).unwrap_err();
    assert_eq!(err.to_string(), "broken body");
    assert_eq!(
        log(&lanefile),
        vec!["root before_all", "ios before_all", "ios error", "root error"]
    );
}

#[test]
fn test_before_all_sees_the_lane_about_to_run() {
    let project = TestProject::new();
    let mut lanefile = project.parse(
        "before_all { |lane|\n  set_shared_value \"seen_lane\", shared_value(\"LANE_NAME\")\n  set_shared_value \"seen_platform\", shared_value(\"PLATFORM_NAME\")\n}\nlane :first {\n}\nplatform :ios {\n  lane :second {\n  }\n}\n",
    );

    lanefile.runner_mut().execute("first", None, None).unwrap();
    let context = lanefile.runner().context();
    assert_eq!(context.get("seen_lane"), Some(&Value::from("first")));
    assert_eq!(context.get("seen_platform"), Some(&Value::Nil));

    lanefile.runner_mut().execute("second", Some("ios"), None).unwrap();
    let context = lanefile.runner().context();
    assert_eq!(context.get("seen_lane"), Some(&Value::from("ios second")));
    assert_eq!(context.get("seen_platform"), Some(&Value::symbol("ios")));
}

#[test]
fn test_failing_error_hook_skips_remaining_hooks() {
    let project = TestProject::new();
    let mut lanefile = project.parse(
        "error { |lane, message|\n  fail \"hook broke\"\n}\nplatform :ios {\n  error { |lane, message|\n    fail \"platform hook broke\"\n  }\n  lane :x {\n    fail \"body\"\n  }\n}\n",
    );

    let err = lanefile.runner_mut().execute("x", Some("ios"), None).unwrap_err();
    assert_eq!(err.to_string(), "platform hook broke");
}

#[test]
fn test_failing_after_all_propagates() {
    let project = TestProject::new();
    let mut lanefile = project.parse(
        "after_all { |lane|\n  fail \"after broke\"\n}\nerror { |lane, message|\n  write_file \"error\", message\n}\nlane :x {\n}\n",
    );

    let err = lanefile.runner_mut().execute("x", None, None).unwrap_err();
    assert_eq!(err.to_string(), "after broke");
    assert_eq!(lanefile.runner().phase(), Phase::Error);
    assert!(!project.file_exists("error"));
}

// ============================================
// Lane switching
// ============================================

#[test]
fn test_switch_passes_parameters_and_returns_result() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile.runner_mut().execute("lane1", Some("ios"), None).unwrap();
    assert_eq!(project.read_file("deliver_result.txt"), "Lane 2 + parameter");
    assert_eq!(lanefile.runner().context().current_lane(), Some("ios lane1"));
}

#[test]
fn test_switch_is_tracked_and_ledger_resets() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile.runner_mut().execute("switch_only", Some("ios"), None).unwrap();
    let launches: Vec<_> = lanefile
        .runner()
        .collector()
        .launches()
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    assert_eq!(launches, vec![("lane_switch".to_string(), 1)]);
    assert!(ActionCollector::is_official("lane_switch"));

    lanefile.runner_mut().execute("lane4", Some("ios"), None).unwrap();
    assert_eq!(lanefile.runner().collector().count("lane_switch"), 0);
    assert_eq!(lanefile.runner().collector().count("write_file"), 1);
}

#[test]
fn test_switch_without_parameters() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile.runner_mut().execute("lane3", Some("ios"), None).unwrap();
    assert_eq!(project.read_file("deliver_result.txt"), "Lane 2 + ");
}

#[test]
fn test_direct_call_of_lane_with_parameters() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile.runner_mut().execute("lane4", Some("ios"), None).unwrap();
    assert_eq!(project.read_file("deliver_result.txt"), "{}");
}

#[test]
fn test_switch_with_named_parameters() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile.runner_mut().execute("lane5", Some("ios"), None).unwrap();
    assert_eq!(project.read_file("deliver_result.txt"), "{key: :value}");
}

#[test]
fn test_switch_to_root_lane_from_platform() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    lanefile
        .runner_mut()
        .execute("call_general_lane", Some("ios"), None)
        .unwrap();
    assert_eq!(project.read_file("deliver_result.txt"), "{random: :value}");
}

#[test]
fn test_switch_to_lane_of_other_platform_fails() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    let err = lanefile.runner_mut().execute("invalid", Some("ios"), None).unwrap_err();
    assert!(matches!(err, RunnerError::UnresolvedIdentifier { ref name, .. } if name == "wrong_platform"));
    assert!(err
        .to_string()
        .starts_with("Could not find action or lane 'wrong_platform'."));
}

#[test]
fn test_switch_with_non_mapping_parameter_fails() {
    let project = TestProject::new();
    let mut lanefile = project.load_fixture("SwitcherLanefile");

    let err = lanefile
        .runner_mut()
        .execute("invalid_parameters", Some("ios"), None)
        .unwrap_err();
    assert!(matches!(err, RunnerError::InvalidLaneParameters { .. }));
    assert!(err.to_string().starts_with("Parameters for a lane must always be a mapping"));
}

/// Hooks that log the lane they run for, with lanes that switch into each other
const SWITCH_HOOKS: &str = r#"
set_shared_value "log", []

before_all { |lane|
  set_shared_value "log", shared_value("log") + ["root before " + lane]
}

after_all { |lane|
  set_shared_value "log", shared_value("log") + ["root after " + lane]
}

error { |lane, message|
  set_shared_value "log", shared_value("log") + ["root error " + lane + ": " + message]
}

platform :ios {
  before_all { |lane|
    set_shared_value "log", shared_value("log") + ["ios before " + lane]
  }

  error { |lane, message|
    set_shared_value "log", shared_value("log") + ["ios error " + lane + ": " + message]
  }

  lane :outer {
    inner
    set_shared_value "after_switch", shared_value("LANE_NAME")
  }

  lane :inner {
    set_shared_value "inner_saw", shared_value("LANE_NAME")
  }

  lane :outer_failing {
    inner_failing
  }

  lane :inner_failing {
    fail "boom"
  }
}
"#;

#[test]
fn test_switched_lane_runs_its_own_hooks() {
    let project = TestProject::new();
    let mut lanefile = project.parse(SWITCH_HOOKS);

    lanefile.runner_mut().execute("outer", Some("ios"), None).unwrap();
    assert_eq!(
        log(&lanefile),
        vec![
            "root before outer",
            "ios before outer",
            "root before inner",
            "ios before inner",
            "root after inner",
            "root after outer",
        ]
    );

    let context = lanefile.runner().context();
    assert_eq!(context.get("inner_saw"), Some(&Value::from("ios inner")));
    assert_eq!(context.get("after_switch"), Some(&Value::from("ios outer")));
    assert_eq!(context.current_lane(), Some("ios outer"));
    assert_eq!(context.current_platform(), Some("ios"));
    assert_eq!(lanefile.runner().phase(), Phase::Done);
}

#[test]
fn test_failure_in_switched_lane_reaches_error_hooks_at_both_levels() {
    let project = TestProject::new();
    let mut lanefile = project.parse(SWITCH_HOOKS);

    let err = lanefile
        .runner_mut()
        .execute("outer_failing", Some("ios"), None)
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(
        log(&lanefile),
        vec![
            "root before outer_failing",
            "ios before outer_failing",
            "root before inner_failing",
            "ios before inner_failing",
            "ios error inner_failing: boom",
            "root error inner_failing: boom",
            "ios error outer_failing: boom",
            "root error outer_failing: boom",
        ]
    );
    assert_eq!(lanefile.runner().context().current_lane(), Some("ios outer_failing"));
    assert_eq!(lanefile.runner().phase(), Phase::Error);
}

// ============================================
// Run context and actions
// ============================================

#[test]
fn test_context_survives_executions() {
    let project = TestProject::new();
    let mut lanefile = project.parse(
        "lane :store {\n  set_shared_value \"BUILD\", 42\n}\nlane :load {\n  shared_value \"BUILD\"\n}\n",
    );

    lanefile.runner_mut().execute("store", None, None).unwrap();
    let loaded = lanefile.runner_mut().execute("load", None, None).unwrap();
    assert_eq!(loaded, Value::Int(42));
}

#[test]
fn test_execute_parameters_reach_the_body() {
    let project = TestProject::new();
    let mut lanefile = project.parse("lane :echo { |options|\n  options[:name]\n}\n");

    let mut params = laneway::core::value::Map::new();
    params.insert("name".to_string(), Value::from("laneway"));
    let result = lanefile
        .runner_mut()
        .execute("echo", None, Some(Value::Map(params)))
        .unwrap();
    assert_eq!(result, Value::from("laneway"));
}

#[test]
fn test_shell_action_runs_in_working_directory() {
    let project = TestProject::new();
    project.create_file("marker.txt", "found");
    let mut lanefile = project.parse("lane :cat {\n  sh \"cat marker.txt\"\n}\n");

    let result = lanefile.runner_mut().execute("cat", None, None).unwrap();
    assert_eq!(result, Value::from("found"));
}

#[test]
fn test_failing_shell_command() {
    let project = TestProject::new();
    let mut lanefile = project.parse("lane :bad {\n  sh \"exit 3\"\n}\n");

    let err = lanefile.runner_mut().execute("bad", None, None).unwrap_err();
    assert!(matches!(err, RunnerError::ActionFailure { ref action, .. } if action == "sh"));
}

#[test]
fn test_dry_run_reports_commands() {
    let project = TestProject::new();
    let mut lanefile = project.parse("lane :pods {\n  cocoapods clean: true\n}\n");
    lanefile.runner_mut().options_mut().dry_run = true;

    let result = lanefile.runner_mut().execute("pods", None, None).unwrap();
    assert_eq!(result, Value::from("pod install --clean-install"));
}
