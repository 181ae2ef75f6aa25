use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidateLength, ValidationErrors};

/// Represents optional field semantics in PATCH/UPDATE requests.
///
/// - `Unchanged` → field absent from the request body
/// - `SetToNull` → explicitly null
/// - `SetToValue` → set to provided value
///
/// Wire mapping relies on `#[serde(default)]` on the containing struct:
/// a missing field stays `Unchanged`, an explicit `null` becomes
/// `SetToNull`, anything else `SetToValue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OptionField<T> {
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => OptionField::SetToNull,
            Some(value) => OptionField::SetToValue(value),
        })
    }
}

impl<T> Default for OptionField<T> {
    fn default() -> Self {
        OptionField::Unchanged
    }
}

// ---------------------- Validation support ----------------------

impl<T> ValidateLength<u64> for OptionField<T>
where
    T: ValidateLength<u64>
{
    fn length(&self) -> Option<u64> {
        match self {
            OptionField::SetToValue(value) => value.length(),
            _ => None,
        }
    }
    fn validate_length(&self, min: Option<u64>, max: Option<u64>, equal: Option<u64>) -> bool {
        match self {
            OptionField::SetToValue(value) => value.validate_length(min, max, equal),
            _ => true,
        }
    }
}

impl<T: Validate> Validate for OptionField<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            OptionField::SetToValue(value) => value.validate(),
            _ => Ok(()),
        }
    }
}

// ---------------------- Core helpers ----------------------

impl<T> OptionField<T> {
    /// True when `Unchanged`.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// True when `SetToNull`.
    pub fn is_set_to_null(&self) -> bool {
        matches!(self, Self::SetToNull)
    }

    /// If `SetToValue`, returns a reference to inner value.
    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Convert into `Option<T>` (what SQLx expects)
    pub fn flatten(self) -> Option<T> {
        match self {
            OptionField::SetToValue(v) => Some(v),
            _ => None
        }
    }

    /// Borrowed flatten for references
    pub fn flatten_ref(&self) -> Option<&T> {
        match self {
            OptionField::SetToValue(v) => Some(v),
            _ => None
        }
    }
}

// ---------------------- Type-specific convenience ----------------------

impl OptionField<String> {
    pub fn flatten_str(&self) -> Option<&str> {
        self.flatten_ref().map(|s| s.as_str())
    }
}

impl<T> OptionField<Vec<T>> {
    pub fn flatten_slice(&self) -> Option<&[T]> {
        self.flatten_ref().map(|v| v.as_slice())
    }
}

impl OptionField<bool> {
    pub fn flatten_bool(&self) -> Option<bool> {
        self.flatten_ref().copied()
    }
}

impl OptionField<i32> {
    pub fn flatten_i32(&self) -> Option<i32> {
        self.flatten_ref().copied()
    }
}

// ---------------------- From conversions ----------------------

// From nested option into OptionField
impl<T> From<Option<Option<T>>> for OptionField<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => OptionField::Unchanged,
            Some(None) => OptionField::SetToNull,
            Some(Some(v)) => OptionField::SetToValue(v),
        }
    }
}
