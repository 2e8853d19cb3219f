//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined
//! entirely by their attribute values. Two value objects with the same values are
//! considered equal. `Money { cents: 1100 }` is a value object; a `Unit` with a
//! `UnitId` is an entity.
//!
//! Value objects should be **immutable** - once created, they don't change. To
//! "modify" one, create a new one with the new values. This keeps them safe to
//! share across threads and lets them behave like primitives.

/// Marker trait for value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
