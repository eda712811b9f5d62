use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::{from_json, to_pretty_json};
use crate::model::Program;

/// Load a program from a pretty-printed JSON file.
///
/// The whole file must match the program schema; nothing is partially loaded.
pub fn import_program(path: &Path) -> Result<Program> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read program file at {}", path.display()))?;

    let program = from_json(&content)
        .with_context(|| format!("Failed to load program from {}", path.display()))?;

    Ok(program)
}

/// Save a program as pretty-printed JSON atomically
///
/// Uses atomic-write-file to ensure the file is never left in a corrupted state.
pub fn export_program(path: &Path, program: &Program) -> Result<()> {
    let json = to_pretty_json(program).context("Failed to serialize program")?;

    // Open atomic write file
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .context("Failed to write program")?;

    // Commit the write atomically
    file.commit().context("Failed to save program")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Discipline, Element, Goe, LevelledElement};
    use crate::rules::RuleTables;
    use std::env;

    #[test]
    fn test_export_and_import_roundtrip() {
        let temp_path = env::temp_dir().join("skate_score_test_program.json");
        let _ = std::fs::remove_file(&temp_path);

        let rules = RuleTables::builtin().unwrap();
        let program = Program::new_empty(&rules, "senior", Discipline::FreeSkating)
            .with_element(
                11,
                Element::Step(LevelledElement::new("ChSq", None, Goe::new(3).unwrap())),
            )
            .unwrap();

        export_program(&temp_path, &program).unwrap();
        let loaded = import_program(&temp_path).unwrap();
        assert_eq!(loaded, program);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_import_missing_file() {
        let temp_path = env::temp_dir().join("skate_score_test_missing_program.json");
        let _ = std::fs::remove_file(&temp_path);
        assert!(import_program(&temp_path).is_err());
    }

    #[test]
    fn test_import_rejects_invalid_file() {
        let temp_path = env::temp_dir().join("skate_score_test_invalid_program.json");
        std::fs::write(
            &temp_path,
            r#"{"classId":"novice","discipline":"SP","elements":[{"kind":"spin","code":"USp","goe":9}]}"#,
        )
        .unwrap();

        let err = import_program(&temp_path).unwrap_err();
        assert!(format!("{:#}", err).contains("program schema"));

        let _ = std::fs::remove_file(&temp_path);
    }
}
