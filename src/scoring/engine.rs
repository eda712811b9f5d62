use serde::Serialize;

use super::combo::{compose_base, compose_goe};
use super::rounding::round2;
use crate::model::{Element, ElementCounts, JumpElement, LevelledElement, Program};
use crate::rules::{LevelledTable, RuleTables};

/// Score of one element, every component rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub base_value: f64,
    pub goe_value: f64,
    pub total_score: f64,
}

impl ScoreResult {
    pub fn from_components(base_value: f64, goe_value: f64) -> Self {
        let base_value = round2(base_value);
        let goe_value = round2(goe_value);
        Self {
            base_value,
            goe_value,
            total_score: round2(base_value + goe_value),
        }
    }
}

/// A filled slot on a score sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotScore {
    /// 1-based slot position in the program
    pub slot: usize,
    pub label: String,
    #[serde(flatten)]
    pub result: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet {
    pub slots: Vec<SlotScore>,
    pub counts: ElementCounts,
    pub base_total: f64,
    pub goe_total: f64,
    pub total_score: f64,
}

pub fn score_element(element: &Element, rules: &RuleTables) -> ScoreResult {
    match element {
        Element::Jump(jump) => score_jump(jump, rules),
        Element::Spin(spin) => score_levelled(spin, &rules.spins),
        Element::Step(step) => score_levelled(step, &rules.steps),
    }
}

/// Score a program slot; an empty slot has no score.
pub fn score_slot(slot: Option<&Element>, rules: &RuleTables) -> Option<ScoreResult> {
    slot.map(|element| score_element(element, rules))
}

pub fn score_jump(jump: &JumpElement, rules: &RuleTables) -> ScoreResult {
    let base_value = compose_base(&jump.atoms, jump.is_sequence, rules);
    let goe_value = compose_goe(&jump.atoms, jump.goe, rules);
    ScoreResult::from_components(base_value, goe_value)
}

/// Spins and steps: base value by `(code, level)` with the table default as
/// fallback, GOE points from the level's row at `GOE + 5` (0 when missing).
pub fn score_levelled(element: &LevelledElement, table: &LevelledTable) -> ScoreResult {
    let level = element.effective_level();
    let base_value = table
        .base_value(&element.code, level)
        .unwrap_or(table.default_base);
    let goe_value = table
        .goe_row(level)
        .and_then(|row| row.get(element.goe.index()))
        .copied()
        .unwrap_or(0.0);

    ScoreResult::from_components(base_value, goe_value)
}

/// Sum of element totals; empty slots contribute nothing.
pub fn total_score(elements: &[Option<Element>], rules: &RuleTables) -> f64 {
    let total: f64 = elements
        .iter()
        .filter_map(|slot| score_slot(slot.as_ref(), rules))
        .map(|score| score.total_score)
        .sum();
    round2(total)
}

pub fn score_program(program: &Program, rules: &RuleTables) -> ScoreSheet {
    let slots: Vec<SlotScore> = program
        .elements
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            let element = slot.as_ref()?;
            Some(SlotScore {
                slot: index + 1,
                label: element.label(),
                result: score_element(element, rules),
            })
        })
        .collect();

    let base_total = round2(slots.iter().map(|s| s.result.base_value).sum());
    let goe_total = round2(slots.iter().map(|s| s.result.goe_value).sum());
    let total_score = round2(slots.iter().map(|s| s.result.total_score).sum());

    ScoreSheet {
        slots,
        counts: program.counts(),
        base_total,
        goe_total,
        total_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, Discipline, Goe, JumpAtom, JumpCode, Level, Turn};
    use proptest::prelude::*;

    fn rules() -> RuleTables {
        RuleTables::builtin().unwrap()
    }

    fn atom(turn: u8, code: JumpCode) -> JumpAtom {
        JumpAtom::new(Turn::new(turn).unwrap(), code)
    }

    fn goe(value: i8) -> Goe {
        Goe::new(value).unwrap()
    }

    fn jump(atoms: Vec<JumpAtom>, is_sequence: bool, grade: i8) -> Element {
        Element::Jump(JumpElement {
            atoms,
            is_sequence,
            goe: goe(grade),
        })
    }

    fn spin(code: &str, level: Option<Level>, grade: i8) -> Element {
        Element::Spin(LevelledElement::new(code, level, goe(grade)))
    }

    fn step(code: &str, level: Option<Level>, grade: i8) -> Element {
        Element::Step(LevelledElement::new(code, level, goe(grade)))
    }

    #[test]
    fn test_single_triple_lutz_end_to_end() {
        let result = score_element(&jump(vec![atom(3, JumpCode::Lutz)], false, 2), &rules());
        assert_eq!(
            result,
            ScoreResult {
                base_value: 5.9,
                goe_value: 1.18,
                total_score: 7.08,
            }
        );
    }

    #[test]
    fn test_sequence_jump() {
        let element = jump(
            vec![atom(3, JumpCode::Flip), JumpAtom::euler(), atom(3, JumpCode::Salchow)],
            true,
            1,
        );
        let result = score_element(&element, &rules());
        assert_eq!(result.base_value, 8.08);
        assert_eq!(result.goe_value, 1.01); // 10.1 * 1 * 0.1
        assert_eq!(result.total_score, 9.09);
    }

    #[test]
    fn test_spin_by_code_and_level() {
        let result = score_element(&spin("CCoSp", Some(Level::Four), 3), &rules());
        assert_eq!(result.base_value, 4.4);
        assert_eq!(result.goe_value, 0.9);
        assert_eq!(result.total_score, 5.3);
    }

    #[test]
    fn test_spin_without_level_scores_as_basic() {
        let result = score_element(&spin("USp", None, -1), &rules());
        assert_eq!(result.base_value, 0.5);
        assert_eq!(result.goe_value, -0.1);
        assert_eq!(result.total_score, 0.4);
    }

    #[test]
    fn test_unknown_spin_code_uses_default_base() {
        let result = score_element(&spin("XSp", Some(Level::Two), 0), &rules());
        assert_eq!(result.base_value, 1.0);
        assert_eq!(result.goe_value, 0.0);
    }

    #[test]
    fn test_step_sequence() {
        let result = score_element(&step("StSq", Some(Level::Three), 2), &rules());
        assert_eq!(result.base_value, 3.3);
        assert_eq!(result.goe_value, 0.66);
        assert_eq!(result.total_score, 3.96);

        let unknown = score_element(&step("TwSq", None, 0), &rules());
        assert_eq!(unknown.base_value, 1.5);
    }

    #[test]
    fn test_missing_goe_row_contributes_zero() {
        let mut rules = rules();
        rules.steps.goe.level4 = None;
        let result = score_element(&step("StSq", Some(Level::Four), 5), &rules);
        assert_eq!(result.base_value, 3.9);
        assert_eq!(result.goe_value, 0.0);

        rules.steps.goe.level3 = Some(vec![0.1, 0.2]);
        let short = score_element(&step("StSq", Some(Level::Three), 5), &rules);
        assert_eq!(short.goe_value, 0.0);
    }

    #[test]
    fn test_empty_program_totals_are_positive_zero() {
        let rules = rules();
        let program = Program::new_empty(&rules, "senior", Discipline::ShortProgram);

        let total = total_score(&program.elements, &rules);
        assert!(total.is_sign_positive());

        let sheet = score_program(&program, &rules);
        assert!(sheet.base_total.is_sign_positive());
        assert!(sheet.goe_total.is_sign_positive());
        assert!(sheet.total_score.is_sign_positive());

        let json = serde_json::to_string(&sheet).unwrap();
        assert!(!json.contains("-0.0"), "{}", json);
    }

    #[test]
    fn test_zero_base_with_negative_goe_is_positive_zero() {
        let mut rules = rules();
        rules.jumps.base_values.clear();
        let result = score_element(&jump(vec![atom(3, JumpCode::Lutz)], false, -3), &rules);
        assert!(result.goe_value.is_sign_positive());
        assert!(result.total_score.is_sign_positive());
    }

    #[test]
    fn test_empty_slot_has_no_score() {
        assert_eq!(score_slot(None, &rules()), None);
    }

    #[test]
    fn test_total_score_skips_empty_slots() {
        let elements = vec![
            Some(jump(vec![atom(3, JumpCode::Lutz)], false, 2)),
            None,
            Some(spin("CCoSp", Some(Level::Four), 3)),
            None,
        ];
        assert_eq!(total_score(&elements, &rules()), 12.38);
        assert_eq!(total_score(&[None, None], &rules()), 0.0);
    }

    #[test]
    fn test_score_program_sheet() {
        let program = Program {
            class_id: "senior".to_string(),
            discipline: Discipline::ShortProgram,
            elements: vec![
                None,
                Some(jump(
                    vec![atom(3, JumpCode::Lutz), atom(3, JumpCode::Toe).with_call(Call::Quarter)],
                    false,
                    1,
                )),
                Some(step("StSq", Some(Level::Three), 2)),
            ],
        };
        let sheet = score_program(&program, &rules());

        assert_eq!(sheet.slots.len(), 2);
        assert_eq!(sheet.counts, ElementCounts { jumps: 1, spins: 0, steps: 1 });
        assert_eq!(sheet.slots[0].slot, 2);
        assert_eq!(sheet.slots[0].label, "3Lz+3Tq");
        // GOE +1 with a q penalty of -1 leaves 0
        assert_eq!(sheet.slots[0].result.goe_value, 0.0);
        assert_eq!(sheet.base_total, 13.4);
        assert_eq!(sheet.goe_total, 0.66);
        assert_eq!(sheet.total_score, 14.06);
    }

    fn any_atom() -> impl Strategy<Value = JumpAtom> {
        let calls = prop_oneof![
            Just(None),
            Just(Some(Call::Quarter)),
            Just(Some(Call::UnderRotated)),
            Just(Some(Call::Downgraded)),
            Just(Some(Call::EdgeError)),
            Just(Some(Call::Attention)),
        ];
        (1u8..=3, prop::sample::select(JumpCode::ALL.to_vec()), calls).prop_map(
            |(turn, code, call)| JumpAtom {
                turn: Turn::new(turn).unwrap(),
                code,
                call,
            },
        )
    }

    proptest! {
        #[test]
        fn test_total_is_sum_of_rounded_components(
            atoms in prop::collection::vec(any_atom(), 1..=3),
            is_sequence in any::<bool>(),
            grade in -5i8..=5,
        ) {
            let result = score_element(&jump(atoms, is_sequence, grade), &rules());
            prop_assert_eq!(result.total_score, round2(result.base_value + result.goe_value));
            prop_assert!((result.total_score - (result.base_value + result.goe_value)).abs() < 1e-9);
        }

        #[test]
        fn test_levelled_total_is_sum_of_components(
            level in prop::sample::select(vec![Level::Basic, Level::One, Level::Two, Level::Three, Level::Four]),
            grade in -5i8..=5,
        ) {
            let result = score_element(&spin("FCCoSp", Some(level), grade), &rules());
            prop_assert!((result.total_score - (result.base_value + result.goe_value)).abs() < 1e-9);
        }
    }
}
