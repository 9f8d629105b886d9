//! Tests for Security Rules

use crate::test_utils::{assert_close, assert_no_violations, run_category, violation_rules};
use sopgate_validate::{Category, Severity};

#[test]
fn test_hardcoded_secret_detection() {
    let result = run_category(
        Category::Security,
        &[("config.ts", "export const apiKey = 'sk_live_abcdef123';\n")],
    );
    assert_eq!(violation_rules(&result), ["SEC001"]);
    assert_eq!(result.violations[0].severity, Severity::Critical);
    assert_eq!(result.violations[0].line, 1);
    assert!(!result.passed);
    assert_close(result.score, 0.70);
}

#[test]
fn test_secret_from_environment_is_fine() {
    let result = run_category(
        Category::Security,
        &[(
            "config.ts",
            "export const apiKey = process.env.API_KEY;\nconst password = config.get('db.password');\n",
        )],
    );
    assert_no_violations(&result.violations, "env lookups");
    assert!(result.passed);
    assert_close(result.score, 1.0);
}

#[test]
fn test_sql_interpolation_detection() {
    let result = run_category(
        Category::Security,
        &[(
            "users.repo.ts",
            "const q = `SELECT * FROM users WHERE id = ${id}`;\nconst r = prisma.$queryRaw`SELECT * FROM users WHERE id = ${id}`;\n",
        )],
    );
    // Tagged templates are parameterized by the client
    assert_eq!(violation_rules(&result), ["SEC003"]);
    assert_eq!(result.violations[0].line, 1);
}

#[test]
fn test_plain_http_to_remote_host() {
    let result = run_category(
        Category::Security,
        &[(
            "client.ts",
            "const base = 'http://payments.example.com/api';\nconst local = 'http://localhost:3000';\n",
        )],
    );
    assert_eq!(violation_rules(&result), ["SEC004"]);
    assert_eq!(result.violations[0].line, 1);
    assert!(result.violations[0].fix.is_some());
}

#[test]
fn test_eval_and_logged_credentials() {
    let result = run_category(
        Category::Security,
        &[(
            "auth.ts",
            "const fn = eval(code);\nconsole.log('issued token', token);\n",
        )],
    );
    assert_eq!(violation_rules(&result), ["SEC002", "SEC005"]);
    // one critical and one high
    assert_close(result.score, 1.0 - 0.30 - 0.20);
}

#[test]
fn test_suggestions_come_from_fired_rules() {
    let result = run_category(Category::Security, &[("a.ts", "eval(x);\n")]);
    assert_eq!(result.suggestions.len(), 1);
}
