use serde::Serialize;
use tracing::debug;

use super::combo::validate_combo;
use crate::model::{Element, Program};
use crate::rules::RuleTables;

/// Outcome of an advisory check; `valid` iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a program against its discipline's element limits.
/// Returns all rule violations at once (not just the first). Violations are
/// advisory: the program can still be scored.
pub fn validate_program(program: &Program, rules: &RuleTables) -> Validation {
    let mut errors = Vec::new();

    let Some(config) = rules.discipline_config(&program.class_id, program.discipline) else {
        errors.push(format!(
            "Unknown class or discipline: '{}' {}",
            program.class_id, program.discipline
        ));
        return Validation::from_errors(errors);
    };

    let counts = program.counts();
    let filled = counts.total();
    let limits = &config.limits;

    if filled > config.max_elements {
        errors.push(format!(
            "Too many elements: {} (maximum {})",
            filled, config.max_elements
        ));
    }

    let per_kind = [
        ("jumps", counts.jumps, limits.jumps),
        ("spins", counts.spins, limits.spins),
        ("steps", counts.steps, limits.steps),
    ];

    for (kind, count, limit) in per_kind {
        if count > limit.max {
            errors.push(format!("Too many {}: {} (maximum {})", kind, count, limit.max));
        }
    }

    for (index, slot) in program.elements.iter().enumerate() {
        if let Some(Element::Jump(jump)) = slot {
            if jump.atoms.is_empty() {
                errors.push(format!(
                    "Element {}: A jump element needs at least one jump",
                    index + 1
                ));
            } else if jump.atoms.len() > 1 {
                for error in validate_combo(&jump.atoms, &rules.combo).errors {
                    errors.push(format!("Element {}: {}", index + 1, error));
                }
            }
        }
    }

    // Minimums only apply once every slot is filled
    if filled == config.max_elements {
        for (kind, count, limit) in per_kind {
            if count < limit.min {
                errors.push(format!("Too few {}: {} (minimum {})", kind, count, limit.min));
            }
        }
    }

    debug!(
        class = %program.class_id,
        discipline = %program.discipline,
        violations = errors.len(),
        "Validated program"
    );
    Validation::from_errors(errors)
}
