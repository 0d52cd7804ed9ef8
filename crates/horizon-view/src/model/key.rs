//! Key values extracted from items for sorting and grouping.
//!
//! Sort and group descriptions reduce each item to a [`Key`] and compare keys
//! rather than items. Keys carry a default total order so that most rules can
//! be built from a key extractor alone.

use std::cmp::Ordering;
use std::fmt;

/// A type-erased key extracted from an item.
///
/// # Default Ordering
///
/// [`Key::compare`] defines a total order:
///
/// - `None` sorts before everything else
/// - `Bool` sorts before numbers, `false` before `true`
/// - `Int` and `Float` compare numerically against each other; floats use
///   IEEE total ordering so `NaN` has a stable place
/// - `String` sorts after numbers, lexicographically by bytes
///
/// # Example
///
/// ```
/// use horizon_view::model::Key;
/// use std::cmp::Ordering;
///
/// assert_eq!(Key::from(1).compare(&Key::from(2.5)), Ordering::Less);
/// assert_eq!(Key::None.compare(&Key::from(false)), Ordering::Less);
/// assert_eq!(Key::from("b").compare(&Key::from("a")), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Key {
    /// No key (for example, a missing optional field).
    #[default]
    None,
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// Floating point key.
    Float(f64),
    /// String key.
    String(String),
}

impl Key {
    /// Returns `true` if this is `Key::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Key::None)
    }

    /// Attempts to get the key as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the key as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the key as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Key::Float(n) => Some(*n),
            Key::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the key as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Key::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::None => 0,
            Key::Bool(_) => 1,
            Key::Int(_) | Key::Float(_) => 2,
            Key::String(_) => 3,
        }
    }

    /// Compares two keys using the default total order.
    pub fn compare(&self, other: &Key) -> Ordering {
        match (self, other) {
            (Key::None, Key::None) => Ordering::Equal,
            (Key::Bool(a), Key::Bool(b)) => a.cmp(b),
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Float(a), Key::Float(b)) => a.total_cmp(b),
            (Key::Int(a), Key::Float(b)) => compare_int_float(*a, *b),
            (Key::Float(a), Key::Int(b)) => compare_int_float(*b, *a).reverse(),
            (Key::String(a), Key::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_int_float(int: i64, float: f64) -> Ordering {
    if float.is_nan() {
        // total_cmp places positive NaN above every number, negative NaN below.
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    (int as f64).total_cmp(&float).then_with(|| {
        // Equal after widening: break the tie on the exact integer part.
        // `i64::MAX as f64` rounds up to 2^63, which exceeds every i64.
        let truncated = float.trunc();
        if truncated >= i64::MAX as f64 {
            Ordering::Less
        } else {
            int.cmp(&(truncated as i64))
        }
    })
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::None => write!(f, "<none>"),
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(n) => write!(f, "{n}"),
            Key::Float(n) => write!(f, "{n}"),
            Key::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::String(s.clone())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Key::Int(n as i64)
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Float(n)
    }
}

impl From<f32> for Key {
    fn from(n: f32) -> Self {
        Key::Float(n as f64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Key::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rank_order() {
        let mut keys = vec![
            Key::from("a"),
            Key::from(3),
            Key::None,
            Key::from(true),
            Key::from(-1.5),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                Key::None,
                Key::from(true),
                Key::from(-1.5),
                Key::from(3),
                Key::from("a"),
            ]
        );
    }

    #[test]
    fn test_int_float_mixed_compare() {
        assert_eq!(Key::from(2).compare(&Key::from(2.0)), Ordering::Equal);
        assert_eq!(Key::from(2).compare(&Key::from(2.5)), Ordering::Less);
        assert_eq!(Key::from(3.0).compare(&Key::from(2)), Ordering::Greater);
        assert_eq!(Key::from(5).compare(&Key::from(f64::NAN)), Ordering::Less);
    }

    #[test]
    fn test_int_float_compare_at_i64_bounds() {
        let two_pow_63 = Key::Float(9_223_372_036_854_775_808.0);
        assert_eq!(Key::Int(i64::MAX).compare(&two_pow_63), Ordering::Less);
        assert_eq!(Key::Int(i64::MAX - 1).compare(&two_pow_63), Ordering::Less);
        assert_eq!(two_pow_63.compare(&Key::Int(i64::MAX)), Ordering::Greater);
        assert_eq!(Key::Int(i64::MAX).compare(&Key::Int(i64::MAX - 1)), Ordering::Greater);

        let neg_two_pow_63 = Key::Float(-9_223_372_036_854_775_808.0);
        assert_eq!(Key::Int(i64::MIN).compare(&neg_two_pow_63), Ordering::Equal);
        assert_eq!(Key::Int(i64::MIN + 1).compare(&neg_two_pow_63), Ordering::Greater);
    }

    #[test]
    fn test_float_total_order() {
        assert_eq!(Key::from(f64::NAN).compare(&Key::from(f64::NAN)), Ordering::Equal);
        assert_eq!(Key::from(1.0).compare(&Key::from(f64::NAN)), Ordering::Less);
    }

    #[test]
    fn test_key_accessors() {
        assert_eq!(Key::from("x").as_str(), Some("x"));
        assert_eq!(Key::from(7).as_int(), Some(7));
        assert_eq!(Key::from(7).as_float(), Some(7.0));
        assert_eq!(Key::from(false).as_bool(), Some(false));
        assert!(Key::from(None::<i32>).is_none());
        assert_eq!(Key::from(Some("y")), Key::from("y"));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from("even").to_string(), "even");
        assert_eq!(Key::None.to_string(), "<none>");
        assert_eq!(Key::from(42).to_string(), "42");
    }
}
