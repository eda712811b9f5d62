pub mod atom;
pub mod combo;
pub mod engine;
pub mod rounding;
pub mod validation;

pub use atom::score_atom;
pub use combo::{compose_base, compose_goe, effective_goe, validate_combo};
pub use engine::{
    score_element, score_program, score_slot, total_score, ScoreResult, ScoreSheet, SlotScore,
};
pub use rounding::round2;
pub use validation::{validate_program, Validation};
