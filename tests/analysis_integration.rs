//! End-to-end pipeline tests over real fixture trees.

use std::path::Path;

use tempfile::TempDir;

use codegauge::pipeline::Orchestrator;
use codegauge::{baseline, Category, EngineConfig};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// A 60-line function with parameters over the limit and nesting past
/// the threshold must produce exactly the long-function, high-nesting,
/// and too-many-parameters findings — nothing else, no duplicates.
#[test]
fn test_structural_scenario_produces_exactly_expected_findings() {
    let temp = TempDir::new().unwrap();

    let mut body = String::new();
    for _ in 0..60 {
        body.push_str("\tx = x + 1\n");
    }
    let source = format!(
        "package scenario\n\n\
         func scenario(a int, b int, c int, d int, e int, f int) int {{\n\
         \tx := a\n\
         {}\
         \tfor i := 0; i < b; i++ {{\n\
         \t\tif c > 0 {{\n\
         \t\t\tif d > 0 {{\n\
         \t\t\t\tif e > 0 {{\n\
         \t\t\t\t\tif f > 0 {{\n\
         \t\t\t\t\t\tx = x + i\n\
         \t\t\t\t\t}}\n\
         \t\t\t\t}}\n\
         \t\t\t}}\n\
         \t\t}}\n\
         \t}}\n\
         \treturn x\n\
         }}\n",
        body
    );
    write(temp.path(), "scenario.go", &source);

    let run = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();

    let titles: Vec<&str> = run.findings.iter().map(|f| f.title.as_str()).collect();
    assert!(
        titles.contains(&"function 'scenario' is too long"),
        "missing long-function finding in {:?}",
        titles
    );
    assert!(
        titles.contains(&"function 'scenario' is nested too deeply"),
        "missing nesting finding in {:?}",
        titles
    );
    assert!(
        titles.contains(&"function 'scenario' has too many parameters"),
        "missing parameter finding in {:?}",
        titles
    );
    assert_eq!(run.findings.len(), 3, "unexpected extras: {:?}", titles);

    // No duplicates by id
    let mut ids: Vec<&str> = run.findings.iter().map(|f| f.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

/// Re-running analysis on an unchanged tree against its own baseline
/// yields no new ids, no resolved ids, and zero metric deltas.
#[test]
fn test_unchanged_tree_against_own_baseline_is_clean() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "src/data/dao.py",
        "def query_for(user_id):\n    return f\"SELECT name FROM users WHERE id = {user_id}\"\n",
    );
    write(temp.path(), "src/domain/rules.py", "class rules:\n    pass\n");

    let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
    let first = orchestrator.run(temp.path()).unwrap();
    assert!(!first.findings.is_empty());

    let baseline_path = temp.path().join("baseline.json");
    baseline::save(&baseline_path, &first.findings, &first.metrics).unwrap();

    let second = orchestrator.run(temp.path()).unwrap();
    let stored = baseline::load(&baseline_path).unwrap().unwrap();
    let cmp = baseline::compare(&second.findings, &second.metrics, &stored);

    assert!(cmp.is_unchanged());
    assert_eq!(cmp.total_findings.ratio, Some(0.0));
    assert_eq!(cmp.average_complexity.ratio, Some(0.0));
    assert_eq!(cmp.average_function_length.ratio, Some(0.0));
}

/// Finding ids are stable across independent runs over the same tree.
#[test]
fn test_finding_ids_deterministic_across_runs() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "cfg.go",
        "package cfg\n\nvar endpoint = \"http://api.corp-internal.net/v1\"\n",
    );

    let run_a = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();
    let run_b = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();

    let ids_a: Vec<&str> = run_a.findings.iter().map(|f| f.id.as_str()).collect();
    let ids_b: Vec<&str> = run_b.findings.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
}

/// One unreadable file produces one diagnostic; the two valid files are
/// still analyzed and the run does not abort.
#[test]
fn test_unreadable_file_does_not_abort_run() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "one.py", "class one_bad_name:\n    pass\n");
    write(temp.path(), "two.py", "class two_bad_name:\n    pass\n");
    std::os::unix::fs::symlink(temp.path().join("absent.py"), temp.path().join("gone.py"))
        .unwrap();

    let run = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();

    assert_eq!(run.files_analyzed, 2);
    assert_eq!(run.diagnostics.len(), 1);
    assert_eq!(run.files_skipped, 1);

    let flagged_files: Vec<&str> = run
        .findings
        .iter()
        .map(|f| f.file_path.as_str())
        .collect();
    assert!(flagged_files.contains(&"one.py"));
    assert!(flagged_files.contains(&"two.py"));
}

/// Layered fixtures exercise the architecture and persistence analyzers
/// together with layer classification from discovery.
#[test]
fn test_layered_fixture_cross_analyzer_findings() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "src/domain/LoadUser.java",
        "package app.domain;\n\n\
         import app.data.UserRepository;\n\n\
         public class LoadUser {\n}\n",
    );
    write(
        temp.path(),
        "src/data/UserDao.java",
        "package app.data;\n\n\
         public class UserDao {\n\
             String queryFor(String id) {\n\
                 return \"SELECT name FROM users WHERE id = \" + id;\n\
             }\n\
         }\n",
    );

    let run = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();

    assert!(run
        .findings
        .iter()
        .any(|f| f.category == Category::Architecture
            && f.file_path == "src/domain/LoadUser.java"));
    assert!(run
        .findings
        .iter()
        .any(|f| f.category == Category::Persistence
            && f.file_path == "src/data/UserDao.java"));

    // Critical-or-higher ordering: persistence (high) sorts before the
    // architecture finding only if priority says so; both are high here,
    // so category order applies: architecture precedes persistence.
    let arch_pos = run
        .findings
        .iter()
        .position(|f| f.category == Category::Architecture)
        .unwrap();
    let persist_pos = run
        .findings
        .iter()
        .position(|f| f.category == Category::Persistence)
        .unwrap();
    assert!(arch_pos < persist_pos);
}

/// The analyzer allowlist is honored end to end.
#[test]
fn test_allowlist_scenario() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "cfg.py",
        "class cfg:\n    pass\n",
    );

    let config = EngineConfig {
        analyzers: Some(vec!["security".to_string()]),
        ..Default::default()
    };
    let run = Orchestrator::new(config).unwrap().run(temp.path()).unwrap();
    // The naming smell exists but only security ran
    assert!(run.findings.is_empty());
}
