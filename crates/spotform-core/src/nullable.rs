//! Tri-state slots for remote object graphs
//!
//! Remote APIs distinguish between an attribute that is not part of a
//! payload (server keeps or defaults it) and one that is explicitly `null`
//! (server clears it). [`Nullable`] carries that distinction through serde.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Nullable<T> {
    /// Not part of the payload
    #[default]
    Unset,
    /// Explicitly cleared
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Assign a value, or clear the slot when `None`
    pub fn set(&mut self, value: Option<T>) {
        *self = match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        };
    }

    /// Return the contained value, inserting one built by `f` when the slot
    /// is unset or null
    pub fn get_or_insert_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        if !matches!(self, Self::Value(_)) {
            *self = Self::Value(f());
        }
        match self {
            Self::Value(v) => v,
            _ => unreachable!("slot was just filled"),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}
