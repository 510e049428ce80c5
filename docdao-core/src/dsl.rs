//! Request-document construction for selectors, updates, and sorts.
//!
//! [`Dsl`] builds the operator documents the driver expects (`$gt`, `$in`,
//! `$set`, `$push`, ...) from typed field/value pairs, generically over the
//! document representation. Use the [`BsonDsl`] and [`JsonDsl`] aliases for
//! the two flavors.
//!
//! Every constructor is pure: values are encoded into the representation at
//! construction time (a value that cannot be encoded fails right there with
//! an encoding error), and combinators compose by building new documents -
//! a produced document is never mutated.
//!
//! # Example
//!
//! ```ignore
//! use docdao_core::dsl::BsonDsl;
//!
//! let adults = BsonDsl::gte("age", &18)?;
//! let rename = BsonDsl::set([BsonDsl::element("name", "Alice")?]);
//! ```

use serde::Serialize;
use std::marker::PhantomData;

use crate::{
    error::DaoResult,
    format::{BsonFormat, DocumentFormat, JsonFormat},
};

/// Sort direction for query results and index keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Asc }
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Non-equality comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
}

impl Comparison {
    /// The operator key as it appears in a request document.
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Ne => "$ne",
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }
}

/// A single field/value pair awaiting assembly into a document.
pub type Element<F> = (String, <F as DocumentFormat>::Value);

/// Request-document constructors over a document representation.
pub struct Dsl<F: DocumentFormat>(PhantomData<F>);

/// Builder over the BSON representation.
pub type BsonDsl = Dsl<BsonFormat>;
/// Builder over the JSON representation.
pub type JsonDsl = Dsl<JsonFormat>;

impl<F: DocumentFormat> Dsl<F> {
    /// Wraps a bare value as a field/value element.
    pub fn element<T: Serialize + ?Sized>(
        field: impl Into<String>,
        value: &T,
    ) -> DaoResult<Element<F>> {
        Ok((field.into(), F::encode_value(value)?))
    }

    /// The empty document; as a selector it matches everything.
    pub fn empty() -> F::Doc {
        F::empty()
    }

    /// Assembles elements into a document, preserving input order.
    ///
    /// Duplicate field names are not merged; the representation keeps the
    /// last value written under a repeated name.
    pub fn doc(elements: impl IntoIterator<Item = Element<F>>) -> F::Doc {
        let mut doc = F::empty();
        for (field, value) in elements {
            F::insert(&mut doc, &field, value);
        }
        doc
    }

    /// `{field: value}` equality selector.
    pub fn eq<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Ok(Self::doc([Self::element(field, value)?]))
    }

    /// `{field: {op: value}}` for the non-equality comparisons.
    pub fn comparison<T: Serialize + ?Sized>(
        op: Comparison,
        field: impl Into<String>,
        value: &T,
    ) -> DaoResult<F::Doc> {
        Ok(Self::wrapped(op.operator(), field, F::encode_value(value)?))
    }

    /// `{field: {"$ne": value}}`.
    pub fn ne<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Self::comparison(Comparison::Ne, field, value)
    }

    /// `{field: {"$gt": value}}`.
    pub fn gt<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Self::comparison(Comparison::Gt, field, value)
    }

    /// `{field: {"$gte": value}}`.
    pub fn gte<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Self::comparison(Comparison::Gte, field, value)
    }

    /// `{field: {"$lt": value}}`.
    pub fn lt<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Self::comparison(Comparison::Lt, field, value)
    }

    /// `{field: {"$lte": value}}`.
    pub fn lte<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Self::comparison(Comparison::Lte, field, value)
    }

    /// `{field: {"$in": [values...]}}`.
    pub fn is_in<T: Serialize>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> DaoResult<F::Doc> {
        Ok(Self::wrapped("$in", field, Self::encoded_array(values)?))
    }

    /// `{field: {"$nin": [values...]}}`.
    pub fn not_in<T: Serialize>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> DaoResult<F::Doc> {
        Ok(Self::wrapped("$nin", field, Self::encoded_array(values)?))
    }

    /// `{field: {"$exists": true}}`.
    pub fn exists(field: impl Into<String>) -> DaoResult<F::Doc> {
        Ok(Self::wrapped("$exists", field, F::encode_value(&true)?))
    }

    /// `{field: {"$exists": false}}`.
    pub fn not_exists(field: impl Into<String>) -> DaoResult<F::Doc> {
        Ok(Self::wrapped("$exists", field, F::encode_value(&false)?))
    }

    /// `{"$set": {elements...}}`.
    pub fn set(elements: impl IntoIterator<Item = Element<F>>) -> F::Doc {
        Self::doc([("$set".to_string(), F::into_value(Self::doc(elements)))])
    }

    /// `{"$unset": {field: "", ...}}`.
    pub fn unset(fields: impl IntoIterator<Item = impl Into<String>>) -> F::Doc {
        Self::doc([(
            "$unset".to_string(),
            F::into_value(Self::doc(
                fields
                    .into_iter()
                    .map(|field| (field.into(), F::string(""))),
            )),
        )])
    }

    /// `{"$push": {field: value}}`.
    pub fn push<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Ok(Self::doc([(
            "$push".to_string(),
            F::into_value(Self::doc([Self::element(field, value)?])),
        )]))
    }

    /// `{"$push": {field: {"$each": [values...]}}}`.
    pub fn push_each<T: Serialize>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> DaoResult<F::Doc> {
        Ok(Self::doc([(
            "$push".to_string(),
            F::into_value(Self::wrapped("$each", field, Self::encoded_array(values)?)),
        )]))
    }

    /// `{"$pull": {field: value}}`.
    pub fn pull<T: Serialize + ?Sized>(field: impl Into<String>, value: &T) -> DaoResult<F::Doc> {
        Ok(Self::doc([(
            "$pull".to_string(),
            F::into_value(Self::doc([Self::element(field, value)?])),
        )]))
    }

    /// `{"$or": [documents...]}`.
    pub fn or(documents: impl IntoIterator<Item = F::Doc>) -> F::Doc {
        Self::connective("$or", documents)
    }

    /// `{"$and": [documents...]}`.
    pub fn and(documents: impl IntoIterator<Item = F::Doc>) -> F::Doc {
        Self::connective("$and", documents)
    }

    /// `{"_id": id}` selector.
    pub fn by_id<T: Serialize + ?Sized>(id: &T) -> DaoResult<F::Doc> {
        Ok(Self::doc([Self::element("_id", id)?]))
    }

    fn wrapped(op: &str, field: impl Into<String>, value: F::Value) -> F::Doc {
        Self::doc([(
            field.into(),
            F::into_value(Self::doc([(op.to_string(), value)])),
        )])
    }

    fn encoded_array<T: Serialize>(values: impl IntoIterator<Item = T>) -> DaoResult<F::Value> {
        Ok(F::array(
            values
                .into_iter()
                .map(|value| F::encode_value(&value))
                .collect::<DaoResult<Vec<_>>>()?,
        ))
    }

    fn connective(op: &str, documents: impl IntoIterator<Item = F::Doc>) -> F::Doc {
        Self::doc([(
            op.to_string(),
            F::array(documents.into_iter().map(F::into_value).collect()),
        )])
    }
}
