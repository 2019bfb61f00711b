/*!
Domains of holes, as read from type hints.

| Hint                                  | Domain                         |
|---------------------------------------|--------------------------------|
| `bool`, `boolean`                     | `false`, `true`                |
| `u8`, `i8`, `u16`, `i16`, `u32`, `i32` | The integers of the type       |
| `i64`                                 | The integers of the type       |
| `u64`                                 | The integers from 0 to `i64::MAX` |
| `usize`                               | The integers from 0            |
| `int`, `integer`, `isize`, `number`   | The integers                   |
| `unit`, `()`                          | A single value                 |
| `enum:a\|b\|c`                         | The listed values, as text     |

Any other hint gives an opaque domain, of unbounded size, about which nothing is known.
*/

use crate::structures::{constraint::Value, hole::SolutionSpace};

/// An inclusive interval of integers, where an absent bound is no bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Interval {
    pub const UNBOUNDED: Interval = Interval {
        min: None,
        max: None,
    };

    pub const EMPTY: Interval = Interval {
        min: Some(1),
        max: Some(0),
    };

    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Interval { min, max }
    }

    pub fn closed(min: i64, max: i64) -> Self {
        Interval {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| min <= value) && self.max.map_or(true, |max| value <= max)
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        let min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(std::cmp::max(a, b)),
            (a, b) => a.or(b),
        };
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
            (a, b) => a.or(b),
        };
        Interval { min, max }
    }

    pub fn is_disjoint_from(&self, other: &Interval) -> bool {
        self.intersect(other).is_empty()
    }

    pub fn is_subset_of(&self, other: &Interval) -> bool {
        if self.is_empty() {
            return true;
        }
        let min_ok = match (other.min, self.min) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer), Some(inner)) => outer <= inner,
        };
        let max_ok = match (other.max, self.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer), Some(inner)) => inner <= outer,
        };
        min_ok && max_ok
    }

    /// The count of integers in the interval, saturating at [u64::MAX].
    pub fn size(&self) -> SolutionSpace {
        match (self.min, self.max) {
            _ if self.is_empty() => SolutionSpace::Bounded(0),
            (Some(min), Some(max)) => {
                let count = (max as i128 - min as i128 + 1) as u128;
                SolutionSpace::Bounded(std::cmp::min(count, u64::MAX as u128) as u64)
            }
            _ => SolutionSpace::Unbounded,
        }
    }

    /// The count of integers in the interval, with an interval unbounded in both directions taken to hold `unbounded` integers.
    ///
    /// An interval bounded in one direction holds at most half as many.
    pub fn nominal_size(&self, unbounded: u64) -> u64 {
        if let SolutionSpace::Bounded(count) = self.size() {
            return count;
        }
        let ray = match (self.min, self.max) {
            (Some(min), None) => Interval::closed(min, i64::MAX),
            (None, Some(max)) => Interval::closed(i64::MIN, max),
            _ => return unbounded,
        };
        std::cmp::min(unbounded / 2, ray.size().count().unwrap_or(u64::MAX))
    }

    /// The integers of the interval, if there are at most `limit`.
    pub fn values(&self, limit: u64) -> Option<Vec<i64>> {
        match (self.size(), self.min, self.max) {
            (SolutionSpace::Bounded(0), _, _) => Some(Vec::default()),
            (SolutionSpace::Bounded(count), Some(min), Some(max)) if count <= limit => {
                Some((min..=max).collect())
            }
            _ => None,
        }
    }

    /// The integer values of the given values which are in the interval.
    pub fn filter<'v>(&self, values: &'v [Value]) -> impl Iterator<Item = i64> + 'v {
        let interval = *self;
        values.iter().filter_map(move |value| match value {
            Value::Int(int) if interval.contains(*int) => Some(*int),
            _ => None,
        })
    }
}

/// The values a hole may take, as far as is known from its type hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Domain {
    Integer(Interval),
    Choice(Vec<Value>),
    Opaque,
}

impl Domain {
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim();
        if let Some(variants) = hint.strip_prefix("enum:") {
            let mut values: Vec<Value> = Vec::default();
            for variant in variants.split('|').map(str::trim) {
                let value = Value::Text(variant.to_string());
                if !variant.is_empty() && !values.contains(&value) {
                    values.push(value);
                }
            }
            return Domain::Choice(values);
        }

        match hint.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Domain::Choice(vec![Value::Bool(false), Value::Bool(true)]),
            "u8" => Domain::Integer(Interval::closed(0, u8::MAX as i64)),
            "i8" => Domain::Integer(Interval::closed(i8::MIN as i64, i8::MAX as i64)),
            "u16" => Domain::Integer(Interval::closed(0, u16::MAX as i64)),
            "i16" => Domain::Integer(Interval::closed(i16::MIN as i64, i16::MAX as i64)),
            "u32" => Domain::Integer(Interval::closed(0, u32::MAX as i64)),
            "i32" => Domain::Integer(Interval::closed(i32::MIN as i64, i32::MAX as i64)),
            "i64" => Domain::Integer(Interval::closed(i64::MIN, i64::MAX)),
            "u64" => Domain::Integer(Interval::closed(0, i64::MAX)),
            "usize" => Domain::Integer(Interval::new(Some(0), None)),
            "int" | "integer" | "isize" | "number" => Domain::Integer(Interval::UNBOUNDED),
            "unit" | "()" => Domain::Choice(vec![Value::Text("()".to_string())]),
            _ => Domain::Opaque,
        }
    }

    pub fn size(&self) -> SolutionSpace {
        match self {
            Self::Integer(interval) => interval.size(),
            Self::Choice(values) => SolutionSpace::Bounded(values.len() as u64),
            Self::Opaque => SolutionSpace::Unbounded,
        }
    }

    pub fn interval(&self) -> Option<Interval> {
        match self {
            Self::Integer(interval) => Some(*interval),
            _ => None,
        }
    }

    /// Whether the domain admits the value, if known.
    pub fn admits(&self, value: &Value) -> Option<bool> {
        match self {
            Self::Integer(interval) => match value {
                Value::Int(int) => Some(interval.contains(*int)),
                _ => Some(false),
            },
            Self::Choice(values) => Some(values.contains(value)),
            Self::Opaque => None,
        }
    }

    /// True if the domains are known to share no value.
    pub fn is_disjoint_from(&self, other: &Domain) -> bool {
        match (self, other) {
            (Self::Opaque, _) | (_, Self::Opaque) => false,
            (Self::Integer(a), Self::Integer(b)) => a.is_disjoint_from(b),
            (Self::Integer(interval), Self::Choice(values))
            | (Self::Choice(values), Self::Integer(interval)) => {
                interval.filter(values).next().is_none()
            }
            (Self::Choice(a), Self::Choice(b)) => !a.iter().any(|value| b.contains(value)),
        }
    }
}
