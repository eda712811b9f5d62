pub mod editor;
pub mod types;

pub use editor::{EditError, DEFAULT_CLASS};
pub use types::{
    combo_label, Call, Discipline, Element, ElementCounts, ElementKind, Goe, JumpAtom, JumpCode,
    JumpElement, Level, LevelledElement, Program, Turn,
};
