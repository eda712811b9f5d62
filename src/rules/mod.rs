mod schema;
pub mod validation;

pub use schema::{
    CallPenalties, ClassConfig, ComboRules, ComboTemplate, CountLimit, DisciplineConfig,
    ElementLimits, EulerPosition, EulerRules, JumpTable, LevelTable, LevelledTable, RuleTables,
    SequenceRules,
};
pub use validation::validate_rules;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const BUILTIN_RULES: &str = include_str!("data/rules.yaml");

/// Get the config directory path (~/.config/skate-score/), if a home directory exists
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("skate-score"))
}

/// Get the user rules file path (~/.config/skate-score/rules.yaml)
pub fn get_rules_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("rules.yaml"))
}

impl RuleTables {
    /// Rule tables compiled into the binary.
    pub fn builtin() -> Result<Self> {
        parse_rules(BUILTIN_RULES).context("Failed to parse built-in rule tables")
    }
}

/// Parse rule tables from a YAML document.
pub fn parse_rules(content: &str) -> Result<RuleTables> {
    let rules: RuleTables = serde_saphyr::from_str(content)?;
    Ok(rules)
}

/// Load rule tables
///
/// # Arguments
///
/// * `path` - Optional path to a rules file. When given, the file must exist.
///   Otherwise `~/.config/skate-score/rules.yaml` is used if present, falling
///   back to the built-in tables.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit rules file does not exist
/// - The rules file cannot be read
/// - The YAML cannot be parsed into rule tables
pub fn load_rules(path: Option<PathBuf>) -> Result<RuleTables> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("Rules file not found at {}", path.display());
        }
        return load_rules_file(&path);
    }

    match get_rules_path() {
        Some(user_path) if user_path.exists() => load_rules_file(&user_path),
        _ => {
            debug!("No user rules file, using built-in rule tables");
            RuleTables::builtin()
        }
    }
}

fn load_rules_file(path: &Path) -> Result<RuleTables> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file at {}", path.display()))?;

    let rules = parse_rules(&content)
        .with_context(|| format!("Failed to parse rules: invalid YAML in {}", path.display()))?;

    info!(
        path = %path.display(),
        classes = rules.classes.len(),
        "Loaded rule tables"
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Discipline, JumpCode, Level};
    use std::env;

    #[test]
    fn test_builtin_rules_parse() {
        let rules = RuleTables::builtin().unwrap();
        assert_eq!(rules.jumps.base_value(JumpCode::Lutz, 3), Some(5.9));
        assert_eq!(rules.jumps.base_value(JumpCode::Euler, 1), Some(0.5));
        assert_eq!(rules.combo.max_atoms, 3);
        assert_eq!(rules.combo.goe_scale, 0.1);
        assert_eq!(rules.combo.sequence.base_multiplier, 0.8);
        assert_eq!(rules.spins.base_value("CCoSp", Level::Four), Some(4.4));
        assert_eq!(rules.steps.goe_row(Level::Basic).map(<[f64]>::len), Some(11));
    }

    #[test]
    fn test_builtin_rules_are_valid() {
        let rules = RuleTables::builtin().unwrap();
        assert_eq!(validate_rules(&rules), Ok(()));
    }

    #[test]
    fn test_builtin_catalog_lookup() {
        let rules = RuleTables::builtin().unwrap();
        assert!(rules.class_by_id("novice").is_some());
        assert!(rules.class_by_id("adult").is_none());

        let senior_sp = rules
            .discipline_config("senior", Discipline::ShortProgram)
            .unwrap();
        assert_eq!(senior_sp.max_elements, 7);
        assert!(rules.template("3Lz+3T").is_some());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp_path = env::temp_dir().join("skate_score_test_missing_rules.yaml");
        let _ = std::fs::remove_file(&temp_path);

        let result = load_rules(Some(temp_path));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_path = env::temp_dir().join("skate_score_test_rules.yaml");
        let mut rules = RuleTables::builtin().unwrap();
        rules.combo.goe_scale = 0.2;
        let yaml = serde_saphyr::to_string(&rules).unwrap();
        std::fs::write(&temp_path, yaml).unwrap();

        let loaded = load_rules(Some(temp_path.clone())).unwrap();
        assert_eq!(loaded.combo.goe_scale, 0.2);
        assert_eq!(loaded, rules);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let temp_path = env::temp_dir().join("skate_score_test_bad_rules.yaml");
        std::fs::write(&temp_path, "jumps: [not, a, table]").unwrap();

        let result = load_rules(Some(temp_path.clone()));
        assert!(result.is_err());

        let _ = std::fs::remove_file(&temp_path);
    }
}
