use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Call, Discipline, JumpAtom, JumpCode, Level};

/// Complete set of rule tables the engine scores and validates against.
///
/// Read once at startup and only ever shared by reference afterwards.
///
/// Example YAML (abridged):
/// ```yaml
/// jumps:
///   base_values:
///     Lz: [0.60, 2.10, 5.90]
/// spins:
///   default_base: 1.0
///   goe:
///     basic: [-0.5, -0.4, -0.3, -0.2, -0.1, 0.0, 0.1, 0.2, 0.3, 0.4, 0.5]
/// combo:
///   max_atoms: 3
///   goe_scale: 0.1
///   euler: { enabled: true, position: middle_only, min_turns_before: 1, min_turns_after: 1 }
///   call_penalties: { under_rotated: -2 }
///   sequence: { base_multiplier: 0.8 }
/// classes:
///   - id: novice
///     label: Novice
///     disciplines:
///       - id: SP
///         max_elements: 6
///         limits: { jumps: { min: 3, max: 3 }, spins: { min: 2, max: 2 }, steps: { min: 1, max: 1 } }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleTables {
    pub jumps: JumpTable,
    pub spins: LevelledTable,
    pub steps: LevelledTable,
    pub combo: ComboRules,
    pub classes: Vec<ClassConfig>,
}

/// Scale of values for jumps.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JumpTable {
    /// Applied to the base value of an under-rotated (`<`) jump (default: 0.8)
    #[serde(default = "default_underrotated_multiplier")]
    pub underrotated_multiplier: f64,

    /// Base value per code, indexed by rotation count minus one
    pub base_values: BTreeMap<JumpCode, Vec<f64>>,
}

fn default_underrotated_multiplier() -> f64 {
    0.8
}

impl JumpTable {
    /// Base value for `(code, turns)`, `None` when the table has no entry.
    pub fn base_value(&self, code: JumpCode, turns: u8) -> Option<f64> {
        let index = usize::from(turns).checked_sub(1)?;
        self.base_values.get(&code)?.get(index).copied()
    }
}

/// Base values and GOE rows for an element kind scored by level (spins, steps).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LevelledTable {
    /// Base value used when a code/level pair has no entry
    pub default_base: f64,

    #[serde(default)]
    pub base_values: BTreeMap<String, LevelTable<f64>>,

    /// GOE points per level, 11 entries indexed by `GOE + 5`
    pub goe: LevelTable<Vec<f64>>,
}

impl LevelledTable {
    pub fn base_value(&self, code: &str, level: Level) -> Option<f64> {
        self.base_values.get(code)?.get(level).copied()
    }

    pub fn goe_row(&self, level: Level) -> Option<&[f64]> {
        self.goe.get(level).map(Vec::as_slice)
    }
}

/// One value per level; absent levels fall back to the caller's default.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LevelTable<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level1: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level3: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level4: Option<T>,
}

impl<T> LevelTable<T> {
    pub fn get(&self, level: Level) -> Option<&T> {
        match level {
            Level::Basic => self.basic.as_ref(),
            Level::One => self.level1.as_ref(),
            Level::Two => self.level2.as_ref(),
            Level::Three => self.level3.as_ref(),
            Level::Four => self.level4.as_ref(),
        }
    }

    /// Present entries with their level, Basic first.
    pub fn entries(&self) -> Vec<(Level, &T)> {
        [
            Level::Basic,
            Level::One,
            Level::Two,
            Level::Three,
            Level::Four,
        ]
        .into_iter()
        .filter_map(|level| self.get(level).map(|value| (level, value)))
        .collect()
    }
}

/// Combination and sequence construction rules.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComboRules {
    /// Maximum atoms in one jump element
    pub max_atoms: usize,

    /// Points per GOE grade as a fraction of the base value (0.1 = 10%)
    pub goe_scale: f64,

    pub euler: EulerRules,

    #[serde(default)]
    pub call_penalties: CallPenalties,

    pub sequence: SequenceRules,

    /// Commonly used combinations offered as starting points
    #[serde(default)]
    pub templates: Vec<ComboTemplate>,
}

impl ComboRules {
    pub fn call_penalty(&self, call: Call) -> f64 {
        self.call_penalties.get(call)
    }
}

/// GOE grades added for every atom carrying the call; unlisted calls add 0
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CallPenalties {
    /// `q`
    pub quarter: f64,
    /// `<`
    pub under_rotated: f64,
    /// `<<`
    pub downgraded: f64,
    /// `e`
    pub edge_error: f64,
    /// `!`
    pub attention: f64,
}

impl CallPenalties {
    pub fn get(&self, call: Call) -> f64 {
        match call {
            Call::Quarter => self.quarter,
            Call::UnderRotated => self.under_rotated,
            Call::Downgraded => self.downgraded,
            Call::EdgeError => self.edge_error,
            Call::Attention => self.attention,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EulerRules {
    pub enabled: bool,
    pub position: EulerPosition,
    pub min_turns_before: u8,
    pub min_turns_after: u8,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EulerPosition {
    /// Only strictly between two other jumps
    MiddleOnly,
    Any,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SequenceRules {
    /// Applied to the summed base value of a jump sequence
    pub base_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComboTemplate {
    pub label: String,
    pub atoms: Vec<JumpAtom>,
}

/// Competition class (novice, junior, ...) with its disciplines.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassConfig {
    pub id: String,
    pub label: String,
    pub disciplines: Vec<DisciplineConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisciplineConfig {
    pub id: Discipline,
    /// Number of element slots in a program
    pub max_elements: usize,
    pub limits: ElementLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ElementLimits {
    pub jumps: CountLimit,
    pub spins: CountLimit,
    pub steps: CountLimit,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CountLimit {
    pub min: usize,
    pub max: usize,
}

impl RuleTables {
    pub fn classes(&self) -> &[ClassConfig] {
        &self.classes
    }

    pub fn class_by_id(&self, class_id: &str) -> Option<&ClassConfig> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn discipline_config(
        &self,
        class_id: &str,
        discipline: Discipline,
    ) -> Option<&DisciplineConfig> {
        self.class_by_id(class_id)?
            .disciplines
            .iter()
            .find(|d| d.id == discipline)
    }

    pub fn template(&self, label: &str) -> Option<&ComboTemplate> {
        self.combo.templates.iter().find(|t| t.label == label)
    }
}
