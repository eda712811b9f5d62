use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Jump type, serialized with its ISU abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum JumpCode {
    #[serde(rename = "T")]
    Toe,
    #[serde(rename = "S")]
    Salchow,
    #[serde(rename = "Lo")]
    Loop,
    #[serde(rename = "F")]
    Flip,
    #[serde(rename = "Lz")]
    Lutz,
    #[serde(rename = "A")]
    Axel,
    #[serde(rename = "Eu")]
    Euler,
}

impl JumpCode {
    pub const ALL: [JumpCode; 7] = [
        JumpCode::Toe,
        JumpCode::Salchow,
        JumpCode::Loop,
        JumpCode::Flip,
        JumpCode::Lutz,
        JumpCode::Axel,
        JumpCode::Euler,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            JumpCode::Toe => "T",
            JumpCode::Salchow => "S",
            JumpCode::Loop => "Lo",
            JumpCode::Flip => "F",
            JumpCode::Lutz => "Lz",
            JumpCode::Axel => "A",
            JumpCode::Euler => "Eu",
        }
    }

    pub fn is_euler(self) -> bool {
        self == JumpCode::Euler
    }

    /// Calls a judge panel can attach to this jump.
    ///
    /// Edge calls only exist for the edge jumps (Flip, Lutz); the Euler carries none.
    pub fn available_calls(self) -> &'static [Call] {
        match self {
            JumpCode::Euler => &[],
            JumpCode::Flip | JumpCode::Lutz => &[
                Call::Quarter,
                Call::UnderRotated,
                Call::Downgraded,
                Call::EdgeError,
                Call::Attention,
            ],
            _ => &[Call::Quarter, Call::UnderRotated, Call::Downgraded],
        }
    }
}

impl fmt::Display for JumpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Technical-panel call on a single jump.
///
/// The absence of a call is modelled as `Option::None` on the atom, never as a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Call {
    #[serde(rename = "q")]
    Quarter,
    #[serde(rename = "<")]
    UnderRotated,
    #[serde(rename = "<<")]
    Downgraded,
    #[serde(rename = "e")]
    EdgeError,
    #[serde(rename = "!")]
    Attention,
}

impl Call {
    pub fn symbol(self) -> &'static str {
        match self {
            Call::Quarter => "q",
            Call::UnderRotated => "<",
            Call::Downgraded => "<<",
            Call::EdgeError => "e",
            Call::Attention => "!",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "q" => Some(Call::Quarter),
            "<" => Some(Call::UnderRotated),
            "<<" => Some(Call::Downgraded),
            "e" => Some(Call::EdgeError),
            "!" => Some(Call::Attention),
            _ => None,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Accepts a call symbol, `"none"` or `null`; the latter two both mean no call.
fn deserialize_call<'de, D>(deserializer: D) -> Result<Option<Call>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("none") => Ok(None),
        Some(symbol) => Call::from_symbol(symbol).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown call '{}', expected one of none, q, <, <<, e, !",
                symbol
            ))
        }),
    }
}

/// A jump element holds at least one atom.
fn deserialize_atoms<'de, D>(deserializer: D) -> Result<Vec<JumpAtom>, D::Error>
where
    D: Deserializer<'de>,
{
    let atoms = Vec::<JumpAtom>::deserialize(deserializer)?;
    if atoms.is_empty() {
        return Err(serde::de::Error::invalid_length(0, &"at least one jump"));
    }
    Ok(atoms)
}

/// Rotation count of a jump atom: 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Turn(u8);

impl Turn {
    pub const SINGLE: Turn = Turn(1);
    pub const DOUBLE: Turn = Turn(2);
    pub const TRIPLE: Turn = Turn(3);

    pub fn new(turns: u8) -> Option<Self> {
        (1..=3).contains(&turns).then_some(Turn(turns))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One rotation fewer, never below a single.
    pub fn downgraded(self) -> Self {
        Turn(self.0.saturating_sub(1).max(1))
    }
}

impl TryFrom<u8> for Turn {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Turn::new(value).ok_or_else(|| format!("turn must be 1, 2 or 3, got {}", value))
    }
}

impl From<Turn> for u8 {
    fn from(turn: Turn) -> u8 {
        turn.0
    }
}

/// Grade of execution, an integer in `[-5, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct Goe(i8);

impl Goe {
    pub const MIN: i8 = -5;
    pub const MAX: i8 = 5;

    pub fn new(value: i8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Goe(value))
    }

    pub fn get(self) -> i8 {
        self.0
    }

    /// Position of this grade in an 11-entry GOE row.
    pub fn index(self) -> usize {
        (self.0 - Self::MIN) as usize
    }
}

impl TryFrom<i8> for Goe {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Goe::new(value).ok_or_else(|| format!("goe must be between -5 and 5, got {}", value))
    }
}

impl From<Goe> for i8 {
    fn from(goe: Goe) -> i8 {
        goe.0
    }
}

/// Spin or step level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
pub enum Level {
    #[default]
    #[serde(rename = "B")]
    Basic,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl Level {
    pub fn symbol(self) -> &'static str {
        match self {
            Level::Basic => "B",
            Level::One => "1",
            Level::Two => "2",
            Level::Three => "3",
            Level::Four => "4",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Discipline {
    #[serde(rename = "SP")]
    ShortProgram,
    #[serde(rename = "FS")]
    FreeSkating,
}

impl Discipline {
    pub fn id(self) -> &'static str {
        match self {
            Discipline::ShortProgram => "SP",
            Discipline::FreeSkating => "FS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Discipline::ShortProgram => "Short Program",
            Discipline::FreeSkating => "Free Skating",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Discipline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SP" => Ok(Discipline::ShortProgram),
            "FS" => Ok(Discipline::FreeSkating),
            other => Err(format!("unknown discipline '{}', expected SP or FS", other)),
        }
    }
}

/// One rotation unit inside a jump element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct JumpAtom {
    pub turn: Turn,
    pub code: JumpCode,
    #[serde(
        default,
        deserialize_with = "deserialize_call",
        skip_serializing_if = "Option::is_none"
    )]
    pub call: Option<Call>,
}

impl JumpAtom {
    pub fn new(turn: Turn, code: JumpCode) -> Self {
        Self {
            turn,
            code,
            call: None,
        }
    }

    pub fn with_call(mut self, call: Call) -> Self {
        self.call = Some(call);
        self
    }

    /// The connecting half-loop jump, always a single with no call.
    pub fn euler() -> Self {
        Self::new(Turn::SINGLE, JumpCode::Euler)
    }

    /// Label like `3Lz`, `2F<` or `1Eu`.
    pub fn label(&self) -> String {
        match self.call {
            Some(call) => format!("{}{}{}", self.turn.get(), self.code, call),
            None => format!("{}{}", self.turn.get(), self.code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpElement {
    #[serde(deserialize_with = "deserialize_atoms")]
    pub atoms: Vec<JumpAtom>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_sequence: bool,
    pub goe: Goe,
}

/// Spin or step sequence: a catalog code plus an optional level.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelledElement {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    pub goe: Goe,
}

impl LevelledElement {
    pub fn new(code: impl Into<String>, level: Option<Level>, goe: Goe) -> Self {
        Self {
            code: code.into(),
            level,
            goe,
        }
    }

    /// Level used for lookups; an unset level scores as Basic.
    pub fn effective_level(&self) -> Level {
        self.level.unwrap_or_default()
    }

    pub fn label(&self) -> String {
        match self.level {
            Some(level) => format!("{}{}", self.code, level),
            None => self.code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Jump,
    Spin,
    Step,
}

/// A program element. Empty slots are `Option::None` in [`Program::elements`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Jump(JumpElement),
    Spin(LevelledElement),
    Step(LevelledElement),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Jump(_) => ElementKind::Jump,
            Element::Spin(_) => ElementKind::Spin,
            Element::Step(_) => ElementKind::Step,
        }
    }

    /// Score-sheet label: `3Lz+3T`, `2A+1Eu+3S (SEQ)`, `CCoSp4`, `StSqB`.
    pub fn label(&self) -> String {
        match self {
            Element::Jump(jump) => {
                let label = combo_label(&jump.atoms);
                if jump.is_sequence {
                    format!("{} (SEQ)", label)
                } else {
                    label
                }
            }
            Element::Spin(e) | Element::Step(e) => e.label(),
        }
    }
}

/// Join atom labels with `+`.
pub fn combo_label(atoms: &[JumpAtom]) -> String {
    atoms
        .iter()
        .map(JumpAtom::label)
        .collect::<Vec<_>>()
        .join("+")
}

/// A skater's planned program: fixed-length slots, `None` for an empty slot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub class_id: String,
    pub discipline: Discipline,
    pub elements: Vec<Option<Element>>,
}

impl Program {
    pub fn filled(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().flatten()
    }

    pub fn counts(&self) -> ElementCounts {
        ElementCounts::of(self.filled())
    }
}

/// Number of non-empty elements per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ElementCounts {
    pub jumps: usize,
    pub spins: usize,
    pub steps: usize,
}

impl ElementCounts {
    pub fn of<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Self {
        let mut counts = Self::default();
        for element in elements {
            match element.kind() {
                ElementKind::Jump => counts.jumps += 1,
                ElementKind::Spin => counts.spins += 1,
                ElementKind::Step => counts.steps += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.jumps + self.spins + self.steps
    }
}
