//! Column properties.
//!
//! A property is the typed domain of a column together with its
//! generation bounds. Each variant can produce random valid literals,
//! both for sample rows and for selection predicates, and reports which
//! comparison operators apply to it.

use chrono::NaiveDate;
use quarry_core::{ComparisonOperator, Value};
use rand::Rng;

const RANDOM_STRING_LENGTH: usize = 9;
const ASCII_LETTERS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The typed domain of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// Integer within an inclusive range.
    Int { min: i64, max: i64 },
    /// Float within an inclusive range, sampled to two decimals.
    Float { min: f64, max: f64 },
    /// Free string beginning with one of the given characters.
    String { starting_characters: Vec<String> },
    /// One of a fixed, ordered set of members.
    Enum { values: Vec<String> },
    /// Calendar date within an inclusive range.
    Date { min: NaiveDate, max: NaiveDate },
}

impl Property {
    /// Human-readable type name, matching the configuration tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Property::Int { .. } => "int",
            Property::Float { .. } => "float",
            Property::String { .. } => "string",
            Property::Enum { .. } => "enum",
            Property::Date { .. } => "date",
        }
    }

    /// Returns true for properties whose values aggregate numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Property::Int { .. } | Property::Float { .. })
    }

    /// Comparison operators valid for this property type.
    pub fn comparison_operators(&self) -> &'static [ComparisonOperator] {
        use ComparisonOperator::*;
        match self {
            Property::Int { .. } | Property::Float { .. } => {
                &[Eq, Ne, Lt, Le, Gt, Ge]
            }
            Property::String { .. } => &[Eq, Ne, Contains],
            Property::Enum { .. } => &[Eq, Ne],
            Property::Date { .. } => &[Lt, Le, Gt, Ge],
        }
    }

    /// Draw a random value for a sample-data cell.
    pub fn sample_value(&self, rng: &mut impl Rng) -> Value {
        match self {
            Property::Int { min, max } => Value::Int(rng.gen_range(*min..=*max)),
            Property::Float { min, max } => {
                Value::Float(round2(rng.gen_range(*min..=*max)))
            }
            Property::String {
                starting_characters,
            } => {
                let start = &starting_characters[rng.gen_range(0..starting_characters.len())];
                let mut s = start.clone();
                for _ in 0..RANDOM_STRING_LENGTH {
                    s.push(ASCII_LETTERS[rng.gen_range(0..ASCII_LETTERS.len())] as char);
                }
                Value::Str(s)
            }
            Property::Enum { values } => {
                Value::Str(values[rng.gen_range(0..values.len())].clone())
            }
            Property::Date { min, max } => Value::Date(random_date(*min, *max, rng)),
        }
    }

    /// Draw a literal for a selection predicate using the given operator.
    ///
    /// For strings the literal is one of the declared starting
    /// characters, so substring and equality predicates stay satisfiable
    /// against sample data.
    pub fn condition_value(&self, _op: ComparisonOperator, rng: &mut impl Rng) -> Value {
        match self {
            Property::String {
                starting_characters,
            } => Value::Str(
                starting_characters[rng.gen_range(0..starting_characters.len())].clone(),
            ),
            _ => self.sample_value(rng),
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn random_date(min: NaiveDate, max: NaiveDate, rng: &mut impl Rng) -> NaiveDate {
    let span = (max - min).num_days();
    min + chrono::Duration::days(rng.gen_range(0..=span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_int_sample_in_range() {
        let prop = Property::Int { min: 10, max: 20 };
        let mut rng = rng();

        for _ in 0..50 {
            let v = prop.sample_value(&mut rng).as_int().unwrap();
            assert!((10..=20).contains(&v));
        }
    }

    #[test]
    fn test_float_sample_rounded() {
        let prop = Property::Float { min: 0.0, max: 1.0 };
        let mut rng = rng();

        for _ in 0..50 {
            let v = prop.sample_value(&mut rng).as_float().unwrap();
            assert!((0.0..=1.0).contains(&v));
            assert!((v * 100.0 - (v * 100.0).round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_string_sample_starts_with_declared_character() {
        let prop = Property::String {
            starting_characters: vec!["x".into(), "y".into()],
        };
        let mut rng = rng();

        for _ in 0..20 {
            let v = prop.sample_value(&mut rng);
            let s = v.as_str().unwrap();
            assert!(s.starts_with('x') || s.starts_with('y'));
            assert_eq!(s.len(), 1 + RANDOM_STRING_LENGTH);
        }
    }

    #[test]
    fn test_date_sample_in_range() {
        let min = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let max = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let prop = Property::Date { min, max };
        let mut rng = rng();

        for _ in 0..50 {
            let d = prop.sample_value(&mut rng).as_date().unwrap();
            assert!(d >= min && d <= max);
        }
    }

    #[test]
    fn test_operator_sets_by_type() {
        use ComparisonOperator::*;

        let int = Property::Int { min: 0, max: 1 };
        assert_eq!(int.comparison_operators(), &[Eq, Ne, Lt, Le, Gt, Ge]);

        let string = Property::String {
            starting_characters: vec!["a".into()],
        };
        assert_eq!(string.comparison_operators(), &[Eq, Ne, Contains]);

        let en = Property::Enum {
            values: vec!["a".into()],
        };
        assert_eq!(en.comparison_operators(), &[Eq, Ne]);

        let date = Property::Date {
            min: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            max: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
        };
        assert_eq!(date.comparison_operators(), &[Lt, Le, Gt, Ge]);
    }
}
