use std::path::Path;

use msd_project::{BUILTIN_NAMES, builtin, load_yaml, validate_scenario};

fn scenarios_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios")
}

#[test]
fn shipped_scenarios_load_and_validate() {
    for name in BUILTIN_NAMES {
        let path = scenarios_dir().join(format!("{name}.yaml"));
        let scenario =
            load_yaml(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        validate_scenario(&scenario)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
    }
}

#[test]
fn shipped_scenarios_match_builtins() {
    for name in BUILTIN_NAMES {
        let path = scenarios_dir().join(format!("{name}.yaml"));
        let from_file = load_yaml(&path).unwrap();
        let built_in = builtin(name).unwrap();
        assert_eq!(from_file, built_in, "{name}.yaml differs from the built-in");
    }
}
