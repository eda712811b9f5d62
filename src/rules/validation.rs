use std::collections::HashSet;

use super::schema::{LevelledTable, RuleTables};
use crate::model::Goe;

const GOE_ROW_LEN: usize = (Goe::MAX - Goe::MIN) as usize + 1;

/// Validate rule tables at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_rules(rules: &RuleTables) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Jumps
    let underrotated = rules.jumps.underrotated_multiplier;
    if !(underrotated > 0.0 && underrotated <= 1.0) {
        errors.push(format!(
            "jumps.underrotated_multiplier: must be in (0, 1], got {}",
            underrotated
        ));
    }
    for (code, values) in &rules.jumps.base_values {
        if values.is_empty() || values.len() > 3 {
            errors.push(format!(
                "jumps.base_values.{}: expected 1 to 3 entries, got {}",
                code,
                values.len()
            ));
        }
        if values.iter().any(|v| *v < 0.0) {
            errors.push(format!("jumps.base_values.{}: must be non-negative", code));
        }
    }

    validate_levelled("spins", &rules.spins, &mut errors);
    validate_levelled("steps", &rules.steps, &mut errors);

    // Combo
    let combo = &rules.combo;
    if combo.max_atoms == 0 {
        errors.push("combo.max_atoms: must be at least 1".to_string());
    }
    if combo.goe_scale <= 0.0 {
        errors.push(format!(
            "combo.goe_scale: must be positive, got {}",
            combo.goe_scale
        ));
    }
    let multiplier = combo.sequence.base_multiplier;
    if !(multiplier > 0.0 && multiplier <= 1.0) {
        errors.push(format!(
            "combo.sequence.base_multiplier: must be in (0, 1], got {}",
            multiplier
        ));
    }
    for (name, turns) in [
        ("min_turns_before", combo.euler.min_turns_before),
        ("min_turns_after", combo.euler.min_turns_after),
    ] {
        if turns > 3 {
            errors.push(format!(
                "combo.euler.{}: must be at most 3, got {}",
                name, turns
            ));
        }
    }
    for (i, template) in combo.templates.iter().enumerate() {
        if template.atoms.is_empty() {
            errors.push(format!("combo.templates[{}]: has no atoms", i));
        } else if template.atoms.len() > combo.max_atoms {
            errors.push(format!(
                "combo.templates[{}]: '{}' exceeds max_atoms ({})",
                i, template.label, combo.max_atoms
            ));
        }
    }

    // Classes
    if rules.classes.is_empty() {
        errors.push("classes: at least one class is required".to_string());
    }
    let mut class_ids = HashSet::new();
    for (i, class) in rules.classes.iter().enumerate() {
        if !class_ids.insert(class.id.as_str()) {
            errors.push(format!("classes[{}]: duplicate class id '{}'", i, class.id));
        }

        let mut discipline_ids = HashSet::new();
        for (j, discipline) in class.disciplines.iter().enumerate() {
            let path = format!("classes[{}].disciplines[{}]", i, j);
            if !discipline_ids.insert(discipline.id) {
                errors.push(format!(
                    "{}: duplicate discipline '{}' in class '{}'",
                    path, discipline.id, class.id
                ));
            }
            if discipline.max_elements == 0 {
                errors.push(format!("{}.max_elements: must be at least 1", path));
            }

            let limits = &discipline.limits;
            let named = [
                ("jumps", limits.jumps),
                ("spins", limits.spins),
                ("steps", limits.steps),
            ];
            for (kind, limit) in named {
                if limit.min > limit.max {
                    errors.push(format!(
                        "{}.limits.{}: min {} exceeds max {}",
                        path, kind, limit.min, limit.max
                    ));
                }
            }

            let max_total: usize = named.iter().map(|(_, l)| l.max).sum();
            let min_total: usize = named.iter().map(|(_, l)| l.min).sum();
            if max_total < discipline.max_elements {
                errors.push(format!(
                    "{}: per-kind maxima ({}) cannot fill max_elements ({})",
                    path, max_total, discipline.max_elements
                ));
            }
            if min_total > discipline.max_elements {
                errors.push(format!(
                    "{}: per-kind minima ({}) exceed max_elements ({})",
                    path, min_total, discipline.max_elements
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_levelled(name: &str, table: &LevelledTable, errors: &mut Vec<String>) {
    if table.default_base < 0.0 {
        errors.push(format!("{}.default_base: must be non-negative", name));
    }
    for (level, row) in table.goe.entries() {
        if row.len() != GOE_ROW_LEN {
            errors.push(format!(
                "{}.goe[{}]: expected {} entries (GOE -5..+5), got {}",
                name,
                level,
                GOE_ROW_LEN,
                row.len()
            ));
        }
    }
}
