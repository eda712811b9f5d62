use super::atom::score_atom;
use super::rounding::round2;
use super::validation::Validation;
use crate::model::{Goe, JumpAtom};
use crate::rules::{ComboRules, EulerPosition, RuleTables};

/// Base value of a jump element.
///
/// Sum of the atom scores; a sequence additionally takes the sequence
/// multiplier on the rounded sum.
pub fn compose_base(atoms: &[JumpAtom], is_sequence: bool, rules: &RuleTables) -> f64 {
    let base = unadjusted_base(atoms, rules);
    if is_sequence {
        round2(base * rules.combo.sequence.base_multiplier)
    } else {
        base
    }
}

/// GOE points of a jump element.
///
/// Scaled from the base value before any sequence discount.
pub fn compose_goe(atoms: &[JumpAtom], goe: Goe, rules: &RuleTables) -> f64 {
    let grade = effective_goe(atoms, goe, &rules.combo);
    round2(unadjusted_base(atoms, rules) * grade * rules.combo.goe_scale)
}

/// Requested GOE plus the penalty of every call on the atoms, kept in `[-5, 5]`.
///
/// Calls on an Euler are ignored, as they are for its base value.
pub fn effective_goe(atoms: &[JumpAtom], goe: Goe, combo: &ComboRules) -> f64 {
    let penalty: f64 = atoms
        .iter()
        .filter(|atom| !atom.code.is_euler())
        .filter_map(|atom| atom.call)
        .map(|call| combo.call_penalty(call))
        .sum();

    (f64::from(goe.get()) + penalty).clamp(f64::from(Goe::MIN), f64::from(Goe::MAX))
}

fn unadjusted_base(atoms: &[JumpAtom], rules: &RuleTables) -> f64 {
    let sum: f64 = atoms.iter().map(|atom| score_atom(atom, &rules.jumps)).sum();
    round2(sum)
}

/// Check how a jump combination is built.
///
/// Every broken rule is reported, nothing short-circuits.
pub fn validate_combo(atoms: &[JumpAtom], combo: &ComboRules) -> Validation {
    let mut errors = Vec::new();

    if atoms.len() > combo.max_atoms {
        errors.push(format!(
            "A jump combination allows at most {} jumps",
            combo.max_atoms
        ));
    }

    let euler = &combo.euler;
    let last = atoms.len().saturating_sub(1);
    for (index, atom) in atoms.iter().enumerate() {
        if !atom.code.is_euler() {
            continue;
        }

        if !euler.enabled {
            errors.push("Euler jumps are not permitted".to_string());
            continue;
        }

        if euler.position == EulerPosition::MiddleOnly && (index == 0 || index == last) {
            errors.push("An Euler may only be placed between two jumps".to_string());
        }

        if atom.turn.get() != 1 {
            errors.push("An Euler must be a single rotation".to_string());
        }

        if atom.call.is_some() {
            errors.push("An Euler cannot carry a call".to_string());
        }

        if index > 0 && atoms[index - 1].turn.get() < euler.min_turns_before {
            errors.push(format!(
                "The jump before an Euler needs at least {} rotation(s)",
                euler.min_turns_before
            ));
        }

        if index < last && atoms[index + 1].turn.get() < euler.min_turns_after {
            errors.push(format!(
                "The jump after an Euler needs at least {} rotation(s)",
                euler.min_turns_after
            ));
        }
    }

    for pair in atoms.windows(2) {
        if pair[0].code.is_euler() && pair[1].code.is_euler() {
            errors.push("Two Euler jumps cannot be placed back to back".to_string());
        }
    }

    Validation::from_errors(errors)
}
