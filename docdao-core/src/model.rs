//! The contract stored record types implement.

use serde::{Deserialize, Serialize};

/// A record type stored as documents in one collection.
///
/// Models carry their own serialization capability (Serde) and expose the
/// identifier addressing one instance within a collection. The identifier
/// carries encode/decode capability symmetric with the model's, so selectors
/// and stored documents agree on its representation. Because the identifier
/// is a plain field rather than an option, every persisted instance has one.
///
/// # Example
///
/// ```ignore
/// use docdao_core::model::Model;
/// use bson::Uuid;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub id: Uuid,
///     pub name: String,
///     pub email: String,
/// }
///
/// impl Model for User {
///     type Id = Uuid;
///
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
/// }
/// ```
pub trait Model: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Identifier type addressing one instance within a collection.
    type Id: Serialize + for<'de> Deserialize<'de> + PartialEq + Clone + Send + Sync + 'static;

    /// Returns this instance's identifier.
    fn id(&self) -> &Self::Id;
}
