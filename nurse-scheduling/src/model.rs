//! The `Scenario` input contract (spec §6.1) and its constituent types.
//!
//! IDs are heterogeneous (string or integer) in the YAML surface; per the
//! design notes we stringify integers at ingest and never let that
//! heterogeneity leak past this module.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// A person/shift-type/date identifier or keyword, normalized to a string
/// regardless of whether the YAML author wrote it as `15` or `"15"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub String);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token(value.to_string())
    }
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Token, E> {
        Ok(Token(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Token, E> {
        Ok(Token(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Token, E> {
        Ok(Token(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Token, E> {
        Ok(Token(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TokenVisitor)
    }
}

/// A field that accepts either a bare value or a list of values in YAML.
#[derive(Clone, Debug)]
pub struct OneOrMany<T>(pub Vec<T>);

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for OneOrMany<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            One(T),
            Many(Vec<T>),
        }
        match Repr::<T>::deserialize(deserializer)? {
            Repr::One(v) => Ok(OneOrMany(vec![v])),
            Repr::Many(v) => Ok(OneOrMany(v)),
        }
    }
}

/// Extended-real weight: a finite integer, or `+INF`/`-INF` compiling to a
/// hard constraint (spec §3 Invariant 6, §4.3 preamble).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    Finite(i64),
    PosInf,
    NegInf,
}

impl Weight {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Weight::PosInf | Weight::NegInf)
    }
}

struct WeightVisitor;

impl<'de> Visitor<'de> for WeightVisitor {
    type Value = Weight;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer weight, or the strings \"INF\"/\"-INF\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Weight, E> {
        match v {
            "INF" | "inf" | "+INF" => Ok(Weight::PosInf),
            "-INF" | "-inf" => Ok(Weight::NegInf),
            other => other
                .parse::<i64>()
                .map(Weight::Finite)
                .map_err(|_| E::custom(format!("invalid weight literal '{other}'"))),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Weight, E> {
        Ok(Weight::Finite(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Weight, E> {
        Ok(Weight::Finite(v as i64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Weight, E> {
        if v.is_infinite() {
            return Ok(if v > 0.0 { Weight::PosInf } else { Weight::NegInf });
        }
        Err(E::custom(format!(
            "weight must be an integer or +-INF, got float {v}"
        )))
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WeightVisitor)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DateGroup {
    pub id: Token,
    pub members: Vec<Token>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DatesContainer {
    pub range: DateRange,
    #[serde(default)]
    pub groups: Vec<DateGroup>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Person {
    pub id: Token,
    pub description: Option<String>,
    pub history: Option<Vec<Token>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PeopleGroup {
    pub id: Token,
    pub members: Vec<Token>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PeopleContainer {
    pub items: Vec<Person>,
    #[serde(default)]
    pub groups: Vec<PeopleGroup>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftType {
    pub id: Token,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftTypeGroup {
    pub id: Token,
    pub members: Vec<Token>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftTypesContainer {
    pub items: Vec<ShiftType>,
    #[serde(default)]
    pub groups: Vec<ShiftTypeGroup>,
}

fn default_weight_pos_one() -> Weight {
    Weight::Finite(1)
}

fn default_weight_neg_one() -> Weight {
    Weight::Finite(-1)
}

/// A pattern element of a `ShiftTypeSuccessions` preference: a single ID
/// or group, or a nested list of IDs/groups meaning "any of these".
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PatternElement {
    Single(Token),
    Nested(Vec<Token>),
}

impl PatternElement {
    pub fn tokens(&self) -> Vec<Token> {
        match self {
            PatternElement::Single(t) => vec![t.clone()],
            PatternElement::Nested(ts) => ts.clone(),
        }
    }
}

/// A `ShiftCount` target: a literal non-negative integer, or one of the
/// `AVG_SHIFTS_PER_PERSON` rounding keywords (spec §4.3.5).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Literal(i64),
    Keyword(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftTypeRequirementPreference {
    pub description: Option<String>,
    #[serde(rename = "shiftType")]
    pub shift_type: OneOrMany<Token>,
    #[serde(rename = "requiredNumPeople")]
    pub required_num_people: u32,
    #[serde(rename = "qualifiedPeople")]
    pub qualified_people: Option<OneOrMany<Token>>,
    #[serde(rename = "preferredNumPeople")]
    pub preferred_num_people: Option<u32>,
    pub date: Option<OneOrMany<Token>>,
    #[serde(default = "default_weight_neg_one")]
    pub weight: Weight,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftRequestPreference {
    pub description: Option<String>,
    pub person: OneOrMany<Token>,
    pub date: OneOrMany<Token>,
    #[serde(rename = "shiftType")]
    pub shift_type: OneOrMany<Token>,
    #[serde(default = "default_weight_pos_one")]
    pub weight: Weight,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftTypeSuccessionsPreference {
    pub description: Option<String>,
    pub person: OneOrMany<Token>,
    pub pattern: Vec<PatternElement>,
    pub date: Option<OneOrMany<Token>>,
    #[serde(default = "default_weight_pos_one")]
    pub weight: Weight,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftCountPreference {
    pub description: Option<String>,
    pub person: OneOrMany<Token>,
    #[serde(rename = "countDates")]
    pub count_dates: OneOrMany<Token>,
    #[serde(rename = "countShiftTypes")]
    pub count_shift_types: OneOrMany<Token>,
    pub expression: OneOrMany<String>,
    pub target: OneOrMany<TargetSpec>,
    #[serde(default = "default_weight_neg_one")]
    pub weight: Weight,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShiftAffinityPreference {
    pub description: Option<String>,
    pub people1: OneOrMany<Token>,
    pub people2: OneOrMany<Token>,
    pub dates: OneOrMany<Token>,
    #[serde(rename = "shiftTypes")]
    pub shift_types: OneOrMany<Token>,
    #[serde(default = "default_weight_pos_one")]
    pub weight: Weight,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Preference {
    #[serde(rename = "at most one shift per day")]
    AtMostOneShiftPerDay,
    #[serde(rename = "shift type requirement")]
    ShiftTypeRequirement(ShiftTypeRequirementPreference),
    #[serde(rename = "shift request")]
    ShiftRequest(ShiftRequestPreference),
    #[serde(rename = "shift type successions")]
    ShiftTypeSuccessions(ShiftTypeSuccessionsPreference),
    #[serde(rename = "shift count")]
    ShiftCount(ShiftCountPreference),
    #[serde(rename = "shift affinity")]
    ShiftAffinity(ShiftAffinityPreference),
}

impl Preference {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Preference::AtMostOneShiftPerDay => "at most one shift per day",
            Preference::ShiftTypeRequirement(_) => "shift type requirement",
            Preference::ShiftRequest(_) => "shift request",
            Preference::ShiftTypeSuccessions(_) => "shift type successions",
            Preference::ShiftCount(_) => "shift count",
            Preference::ShiftAffinity(_) => "shift affinity",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub description: Option<String>,
    pub dates: DatesContainer,
    pub country: Option<String>,
    pub people: PeopleContainer,
    #[serde(rename = "shiftTypes")]
    pub shift_types: ShiftTypesContainer,
    pub preferences: Vec<Preference>,
}
