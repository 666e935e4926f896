//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_directory;
mod in_memory_record_store;
mod jwt_signed_parameters_verifier;

pub use in_memory_permission_directory::{
    ActorRoleAssignment, CollectionGrants, ConditionalGrant, CustomActionGrants,
    DirectorySnapshot, InMemoryPermissionDirectory, RenderingGrants, RoleGrants,
};
pub use in_memory_record_store::{InMemoryRecordStore, StoredRecord};
pub use jwt_signed_parameters_verifier::{
    JwtSignedParametersVerifier, MIN_SIGNING_SECRET_LENGTH,
};
