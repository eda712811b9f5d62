//! Copy-on-write edits of programs and jump elements.
//!
//! Every operation borrows the current value and returns a new one; the caller
//! owns the editing state and decides what to keep.

use thiserror::Error;

use super::types::{Discipline, Element, Goe, JumpAtom, JumpCode, JumpElement, Program, Turn};
use crate::rules::{ComboTemplate, RuleTables};

pub const DEFAULT_CLASS: &str = "novice";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("slot {index} is out of range (program has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },
    #[error("jump {index} is out of range (element has {len} jumps)")]
    AtomOutOfRange { index: usize, len: usize },
    #[error("a jump element holds at most {max} jumps")]
    ElementFull { max: usize },
}

impl Program {
    /// Program with every slot empty, sized to the discipline's capacity.
    ///
    /// An unknown class/discipline pair yields a program with no slots.
    pub fn new_empty(rules: &RuleTables, class_id: &str, discipline: Discipline) -> Self {
        let slots = rules
            .discipline_config(class_id, discipline)
            .map(|config| config.max_elements)
            .unwrap_or(0);

        Self {
            class_id: class_id.to_string(),
            discipline,
            elements: vec![None; slots],
        }
    }

    pub fn default_program(rules: &RuleTables) -> Self {
        Self::new_empty(rules, DEFAULT_CLASS, Discipline::ShortProgram)
    }

    /// Switch class; all slots are reset.
    pub fn with_class(&self, rules: &RuleTables, class_id: &str) -> Self {
        Self::new_empty(rules, class_id, self.discipline)
    }

    /// Switch discipline; all slots are reset.
    pub fn with_discipline(&self, rules: &RuleTables, discipline: Discipline) -> Self {
        Self::new_empty(rules, &self.class_id, discipline)
    }

    pub fn with_element(&self, index: usize, element: Element) -> Result<Self, EditError> {
        self.with_slot(index, Some(element))
    }

    pub fn with_cleared(&self, index: usize) -> Result<Self, EditError> {
        self.with_slot(index, None)
    }

    fn with_slot(&self, index: usize, slot: Option<Element>) -> Result<Self, EditError> {
        if index >= self.elements.len() {
            return Err(EditError::SlotOutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        let mut next = self.clone();
        next.elements[index] = slot;
        Ok(next)
    }
}

impl JumpElement {
    pub fn new(atoms: Vec<JumpAtom>, goe: Goe) -> Self {
        Self {
            atoms: atoms.into_iter().map(normalize_atom).collect(),
            is_sequence: false,
            goe,
        }
    }

    pub fn from_template(template: &ComboTemplate, goe: Goe) -> Self {
        Self::new(template.atoms.clone(), goe)
    }

    /// Replace the atoms with a template's, keeping GOE and sequence flag.
    pub fn with_template(&self, template: &ComboTemplate) -> Self {
        Self {
            atoms: template.atoms.iter().copied().map(normalize_atom).collect(),
            ..self.clone()
        }
    }

    /// Append a single toe loop, the starting point for a new jump.
    pub fn with_atom_added(&self, max_atoms: usize) -> Result<Self, EditError> {
        self.with_atom_pushed(JumpAtom::new(Turn::SINGLE, JumpCode::Toe), max_atoms)
    }

    pub fn with_atom_pushed(&self, atom: JumpAtom, max_atoms: usize) -> Result<Self, EditError> {
        if self.atoms.len() >= max_atoms {
            return Err(EditError::ElementFull { max: max_atoms });
        }
        let mut next = self.clone();
        next.atoms.push(normalize_atom(atom));
        Ok(next)
    }

    pub fn with_atom_replaced(&self, index: usize, atom: JumpAtom) -> Result<Self, EditError> {
        self.check_atom(index)?;
        let mut next = self.clone();
        next.atoms[index] = normalize_atom(atom);
        Ok(next)
    }

    pub fn with_atom_removed(&self, index: usize) -> Result<Self, EditError> {
        self.check_atom(index)?;
        let mut next = self.clone();
        next.atoms.remove(index);
        Ok(next)
    }

    /// Move the atom at `from` so it ends up at `to`.
    pub fn with_atom_moved(&self, from: usize, to: usize) -> Result<Self, EditError> {
        self.check_atom(from)?;
        self.check_atom(to)?;
        let mut next = self.clone();
        let atom = next.atoms.remove(from);
        next.atoms.insert(to, atom);
        Ok(next)
    }

    pub fn with_sequence(&self, is_sequence: bool) -> Self {
        Self {
            is_sequence,
            ..self.clone()
        }
    }

    pub fn with_goe(&self, goe: Goe) -> Self {
        Self {
            goe,
            ..self.clone()
        }
    }

    fn check_atom(&self, index: usize) -> Result<(), EditError> {
        if index < self.atoms.len() {
            Ok(())
        } else {
            Err(EditError::AtomOutOfRange {
                index,
                len: self.atoms.len(),
            })
        }
    }
}

/// An Euler is always a single without a call.
fn normalize_atom(atom: JumpAtom) -> JumpAtom {
    if atom.code.is_euler() {
        JumpAtom::euler()
    } else {
        atom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, JumpCode, LevelledElement};

    fn rules() -> RuleTables {
        RuleTables::builtin().unwrap()
    }

    fn atom(turn: u8, code: JumpCode) -> JumpAtom {
        JumpAtom::new(Turn::new(turn).unwrap(), code)
    }

    fn spin() -> Element {
        Element::Spin(LevelledElement::new("USp", None, Goe::default()))
    }

    #[test]
    fn test_new_empty_sized_to_discipline() {
        let rules = rules();
        let program = Program::new_empty(&rules, "junior", Discipline::FreeSkating);
        assert_eq!(program.elements.len(), 11);
        assert!(program.elements.iter().all(Option::is_none));
    }

    #[test]
    fn test_new_empty_unknown_class_has_no_slots() {
        let program = Program::new_empty(&rules(), "adult", Discipline::ShortProgram);
        assert!(program.elements.is_empty());
    }

    #[test]
    fn test_default_program() {
        let program = Program::default_program(&rules());
        assert_eq!(program.class_id, "novice");
        assert_eq!(program.discipline, Discipline::ShortProgram);
        assert_eq!(program.elements.len(), 6);
    }

    #[test]
    fn test_with_element_leaves_original_untouched() {
        let original = Program::default_program(&rules());
        let edited = original.with_element(2, spin()).unwrap();

        assert!(original.elements[2].is_none());
        assert_eq!(edited.elements[2], Some(spin()));

        let cleared = edited.with_cleared(2).unwrap();
        assert!(cleared.elements[2].is_none());
        assert!(edited.elements[2].is_some());
    }

    #[test]
    fn test_with_element_out_of_range() {
        let program = Program::default_program(&rules());
        assert_eq!(
            program.with_element(6, spin()),
            Err(EditError::SlotOutOfRange { index: 6, len: 6 })
        );
    }

    #[test]
    fn test_class_and_discipline_change_resets_slots() {
        let rules = rules();
        let program = Program::default_program(&rules).with_element(0, spin()).unwrap();

        let senior = program.with_class(&rules, "senior");
        assert_eq!(senior.class_id, "senior");
        assert_eq!(senior.elements, vec![None; 7]);

        let free = senior.with_discipline(&rules, Discipline::FreeSkating);
        assert_eq!(free.elements.len(), 12);
        assert!(free.elements.iter().all(Option::is_none));
    }

    #[test]
    fn test_atom_added_until_full() {
        let jump = JumpElement::new(vec![], Goe::default());
        let jump = jump.with_atom_added(2).unwrap();
        let jump = jump.with_atom_added(2).unwrap();
        assert_eq!(jump.atoms, vec![atom(1, JumpCode::Toe); 2]);
        assert_eq!(jump.with_atom_added(2), Err(EditError::ElementFull { max: 2 }));
    }

    #[test]
    fn test_atom_moved() {
        let jump = JumpElement::new(
            vec![atom(3, JumpCode::Toe), atom(3, JumpCode::Lutz), atom(2, JumpCode::Loop)],
            Goe::default(),
        );
        let moved = jump.with_atom_moved(1, 0).unwrap();
        assert_eq!(
            moved.atoms,
            vec![atom(3, JumpCode::Lutz), atom(3, JumpCode::Toe), atom(2, JumpCode::Loop)]
        );
        assert!(jump.with_atom_moved(0, 3).is_err());
    }

    #[test]
    fn test_atom_removed_and_replaced() {
        let jump = JumpElement::new(
            vec![atom(3, JumpCode::Lutz), atom(3, JumpCode::Toe)],
            Goe::default(),
        );
        let removed = jump.with_atom_removed(1).unwrap();
        assert_eq!(removed.atoms, vec![atom(3, JumpCode::Lutz)]);

        let replaced = jump
            .with_atom_replaced(0, atom(3, JumpCode::Flip).with_call(Call::EdgeError))
            .unwrap();
        assert_eq!(replaced.atoms[0].call, Some(Call::EdgeError));
        assert_eq!(
            jump.with_atom_removed(5),
            Err(EditError::AtomOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_euler_is_normalized() {
        let jump = JumpElement::new(vec![atom(2, JumpCode::Loop)], Goe::default());
        let jump = jump
            .with_atom_pushed(atom(3, JumpCode::Euler).with_call(Call::Quarter), 3)
            .unwrap();
        assert_eq!(jump.atoms[1], JumpAtom::euler());
    }

    #[test]
    fn test_template_keeps_goe_and_flag() {
        let rules = rules();
        let template = rules.template("3Lo+1Eu+3S").unwrap();
        let jump = JumpElement::new(vec![atom(1, JumpCode::Toe)], Goe::new(2).unwrap())
            .with_sequence(true)
            .with_template(template);

        assert_eq!(jump.atoms.len(), 3);
        assert_eq!(jump.goe.get(), 2);
        assert!(jump.is_sequence);

        let fresh = JumpElement::from_template(template, Goe::default());
        assert_eq!(fresh.atoms, jump.atoms);
        assert!(!fresh.is_sequence);
    }
}
