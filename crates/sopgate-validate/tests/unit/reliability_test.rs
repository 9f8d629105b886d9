//! Tests for Reliability Rules

use crate::test_utils::{assert_no_violations, run_category, violation_rules, warning_rules};
use sopgate_validate::Category;

#[test]
fn test_unguarded_json_parse() {
    let source = "\
function load(raw) {
  const data = JSON.parse(raw);
  try {
    return JSON.parse(raw);
  } catch (e) {
    return null;
  }
}
";
    let result = run_category(Category::Reliability, &[("loader.ts", source)]);
    assert_eq!(violation_rules(&result), ["REL001"]);
    assert_eq!(result.violations[0].line, 2);
}

#[test]
fn test_http_call_without_timeout() {
    let source = "\
const res = await fetch(url);
const ok = await fetch(url, { signal: AbortSignal.timeout(5000) });
const viaAxios = await axios.get(url, {
  timeout: 3000,
});
";
    let result = run_category(Category::Reliability, &[("client.ts", source)]);
    assert_eq!(warning_rules(&result), ["REL002"]);
    assert_eq!(result.warnings[0].line, 1);
}

#[test]
fn test_process_exit_outside_entry_point() {
    let source = "function stop() {\n  process.exit(1);\n}\n";
    let worker = run_category(Category::Reliability, &[("worker.ts", source)]);
    assert_eq!(violation_rules(&worker), ["REL003"]);

    let main = run_category(Category::Reliability, &[("src/main.ts", source)]);
    assert_no_violations(&main.violations, "entry point may exit");
}

#[test]
fn test_discarded_interval_handle() {
    let source = "setInterval(tick, 1000);\nconst handle = setInterval(tick, 1000);\n";
    let result = run_category(Category::Reliability, &[("timer.ts", source)]);
    assert_eq!(warning_rules(&result), ["REL004"]);
    assert_eq!(result.warnings[0].line, 1);
}
