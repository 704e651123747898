//! Macros for reducing boilerplate when defining entities

/// Declare a CRUD entity with automatic trait implementations
///
/// Generates a struct with the given fields plus:
/// - `id: Option<Uuid>`, assigned by the repository on first save
/// - `is_deleted: bool`, the soft-delete marker (`isDeleted` on the wire)
///
/// Fields serialize in camelCase. Field attributes (`#[serde(...)]`, doc
/// comments) are passed through.
///
/// # Example
///
/// ```rust,ignore
/// use crud::prelude::*;
///
/// impl_crud_entity!(
///     Company,
///     "companies",
///     {
///         name: String,
///         registration_number: String,
///     }
/// );
///
/// let company = Company::new("Acme".to_string(), "RN-1".to_string());
/// assert!(company.id.is_none());
/// ```
#[macro_export]
macro_rules! impl_crud_entity {
    (
        $type:ident,
        $resource_name:expr,
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $type {
            /// Unique identifier, `None` until saved
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<::uuid::Uuid>,

            /// Soft-delete marker
            #[serde(default)]
            pub is_deleted: bool,

            $( $(#[$field_meta])* pub $field : $field_type ),*
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $resource_name
            }

            fn id(&self) -> Option<::uuid::Uuid> {
                self.id
            }

            fn set_id(&mut self, id: ::uuid::Uuid) {
                self.id = Some(id);
            }

            fn is_deleted(&self) -> bool {
                self.is_deleted
            }

            fn set_deleted(&mut self, deleted: bool) {
                self.is_deleted = deleted;
            }
        }

        impl $type {
            /// Create an unsaved instance of this entity
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $field_type ),*) -> Self {
                Self {
                    id: None,
                    is_deleted: false,
                    $( $field ),*
                }
            }

            /// Flag this entity as deleted
            pub fn soft_delete(&mut self) {
                self.is_deleted = true;
            }

            /// Clear the deleted flag
            pub fn restore(&mut self) {
                self.is_deleted = false;
            }
        }
    };
}
