use super::rounding::round2;
use crate::model::{Call, JumpAtom, Turn};
use crate::rules::JumpTable;

/// Scored base value of a single jump atom.
///
/// A downgrade (`<<`) on a double or triple scores the jump one rotation lower
/// with no further reduction. An under-rotation (`<`) scales the table value by
/// the table's under-rotation multiplier. Missing table entries score 0.
pub fn score_atom(atom: &JumpAtom, table: &JumpTable) -> f64 {
    let (turn, call) = effective_rotation(atom);

    let mut base = table.base_value(atom.code, turn.get()).unwrap_or(0.0);
    if call == Some(Call::UnderRotated) {
        base *= table.underrotated_multiplier;
    }

    round2(base)
}

/// Rotation and call actually looked up for an atom.
fn effective_rotation(atom: &JumpAtom) -> (Turn, Option<Call>) {
    if atom.code.is_euler() {
        return (Turn::SINGLE, None);
    }
    match atom.call {
        Some(Call::Downgraded) if atom.turn > Turn::SINGLE => (atom.turn.downgraded(), None),
        call => (atom.turn, call),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JumpCode;
    use crate::rules::RuleTables;

    fn table() -> JumpTable {
        RuleTables::builtin().unwrap().jumps
    }

    fn atom(turn: Turn, code: JumpCode) -> JumpAtom {
        JumpAtom::new(turn, code)
    }

    #[test]
    fn test_clean_atom_uses_table_value() {
        assert_eq!(score_atom(&atom(Turn::TRIPLE, JumpCode::Lutz), &table()), 5.9);
        assert_eq!(score_atom(&atom(Turn::DOUBLE, JumpCode::Axel), &table()), 3.3);
    }

    #[test]
    fn test_downgraded_triple_scores_as_clean_double() {
        let table = table();
        for code in JumpCode::ALL.into_iter().filter(|c| !c.is_euler()) {
            let downgraded = atom(Turn::TRIPLE, code).with_call(Call::Downgraded);
            assert_eq!(
                score_atom(&downgraded, &table),
                score_atom(&atom(Turn::DOUBLE, code), &table),
                "{} downgraded",
                code
            );
        }
    }

    #[test]
    fn test_downgraded_single_keeps_rotation() {
        let downgraded = atom(Turn::SINGLE, JumpCode::Toe).with_call(Call::Downgraded);
        assert_eq!(score_atom(&downgraded, &table()), 0.4);
    }

    #[test]
    fn test_underrotated_applies_multiplier() {
        let underrotated = atom(Turn::DOUBLE, JumpCode::Flip).with_call(Call::UnderRotated);
        assert_eq!(score_atom(&underrotated, &table()), round2(1.8 * 0.8));
        assert_eq!(score_atom(&underrotated, &table()), 1.44);
    }

    #[test]
    fn test_other_calls_leave_base_unchanged() {
        let table = table();
        for call in [Call::Quarter, Call::EdgeError, Call::Attention] {
            let called = atom(Turn::TRIPLE, JumpCode::Lutz).with_call(call);
            assert_eq!(score_atom(&called, &table), 5.9);
        }
    }

    #[test]
    fn test_euler_always_scores_as_single() {
        let table = table();
        assert_eq!(score_atom(&JumpAtom::euler(), &table), 0.5);

        let odd = atom(Turn::TRIPLE, JumpCode::Euler).with_call(Call::UnderRotated);
        assert_eq!(score_atom(&odd, &table), 0.5);
    }

    #[test]
    fn test_missing_entry_scores_zero() {
        let mut table = table();
        table.base_values.remove(&JumpCode::Loop);
        assert_eq!(score_atom(&atom(Turn::DOUBLE, JumpCode::Loop), &table), 0.0);

        table.base_values.insert(JumpCode::Salchow, vec![0.4]);
        assert_eq!(score_atom(&atom(Turn::TRIPLE, JumpCode::Salchow), &table), 0.0);
    }
}
