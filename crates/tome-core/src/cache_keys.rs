//! Cache key namespace for the read-through cache.
//!
//! Keys follow `wiki:<entity>:<id-or-qualifier>[:<view>]` and form an
//! implicit dependency graph. The invariant the enumerators below encode:
//! every mutation deletes a superset of the keys whose cached value it could
//! have staled, so a subsequent read always repopulates from the source of
//! truth.

use uuid::Uuid;

pub const PREFIX: &str = "wiki";

/// Full document detail view (metadata + content).
pub fn document_full(id: Uuid) -> String {
    format!("{PREFIX}:document:{id}:full")
}

/// Global document metadata listing.
pub fn documents_list() -> String {
    format!("{PREFIX}:documents:list")
}

/// Recently modified documents.
pub fn documents_recent() -> String {
    format!("{PREFIX}:documents:recent")
}

/// Most viewed documents.
pub fn documents_popular() -> String {
    format!("{PREFIX}:documents:popular")
}

/// Space listing.
pub fn spaces_list() -> String {
    format!("{PREFIX}:spaces:list")
}

/// Documents within one space.
pub fn space_documents(id: Uuid) -> String {
    format!("{PREFIX}:space:{id}:documents")
}

/// Folder/document tree of one space.
pub fn space_tree(id: Uuid) -> String {
    format!("{PREFIX}:space:{id}:tree")
}

/// Every key a document create/update/move can stale.
pub fn staled_by_document_write(document_id: Uuid, space_id: Uuid) -> Vec<String> {
    vec![
        document_full(document_id),
        documents_list(),
        documents_recent(),
        documents_popular(),
        space_documents(space_id),
        space_tree(space_id),
        // Space listing exposes the derived document count.
        spaces_list(),
    ]
}

/// Every key a space create/update can stale.
pub fn staled_by_space_write() -> Vec<String> {
    vec![spaces_list()]
}

/// Every key a folder mutation can stale.
pub fn staled_by_folder_write(space_id: Uuid) -> Vec<String> {
    vec![space_tree(space_id), space_documents(space_id)]
}
