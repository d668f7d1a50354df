//! Folder/document hierarchy for a space.
//!
//! Builds an ordered forest from the flat folder and document lists, and
//! carries the two tree mutations: folder creation and document moves.

use uuid::Uuid;

use tome_core::{
    slugify, Document, DocumentRepository, Error, Folder, FolderRepository, Result, TreeNode,
};

/// Builds and mutates the folder/document tree for a space.
#[derive(Clone)]
pub struct HierarchyManager<F, D> {
    folders: F,
    documents: D,
}

impl<F, D> HierarchyManager<F, D>
where
    F: FolderRepository,
    D: DocumentRepository,
{
    pub fn new(folders: F, documents: D) -> Self {
        Self { folders, documents }
    }

    /// Build the ordered forest for a space.
    ///
    /// Folders sort before documents at each level; each group is ordered
    /// alphabetically, case-insensitive. Every folder and document appears
    /// exactly once, at the depth implied by its parent chain.
    pub async fn tree(&self, space_id: Uuid) -> Result<Vec<TreeNode>> {
        let folders = self.folders.list_for_space(space_id).await?;
        let documents = self.documents.list_for_space(space_id).await?;

        Ok(build_level(&folders, &documents, ""))
    }

    /// Create a folder under `parent_path`.
    ///
    /// The folder's path is the parent path joined with the slugified name.
    /// An unknown `parent_path` falls back to the root rather than erroring;
    /// a duplicate path within the space is rejected.
    pub async fn create_folder(
        &self,
        space_id: Uuid,
        name: &str,
        parent_path: &str,
    ) -> Result<Folder> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(Error::InvalidInput(format!("unusable folder name: {name:?}")));
        }

        let parent_path = if parent_path.is_empty() {
            String::new()
        } else if self.folders.get_by_path(space_id, parent_path).await?.is_some() {
            parent_path.to_string()
        } else {
            // Unknown parents resolve to the root rather than failing the
            // request; callers relying on this get a root-level folder.
            tracing::warn!(
                space_id = %space_id,
                parent_path = %parent_path,
                "Parent folder not found, creating at root"
            );
            String::new()
        };

        let path = if parent_path.is_empty() {
            slug.clone()
        } else {
            format!("{parent_path}/{slug}")
        };

        // A folder may not sit inside itself.
        if parent_path == path || parent_path.starts_with(&format!("{path}/")) {
            return Err(Error::InvalidInput(format!(
                "folder {path:?} cannot be its own ancestor"
            )));
        }

        if self.folders.get_by_path(space_id, &path).await?.is_some() {
            return Err(Error::InvalidInput(format!(
                "folder {path:?} already exists in space"
            )));
        }

        let folder = Folder {
            id: Uuid::new_v4(),
            space_id,
            name: name.to_string(),
            path,
            parent_path,
        };
        self.folders.insert(folder.clone()).await?;
        Ok(folder)
    }

    /// Move a document into another folder.
    ///
    /// Only the metadata `folder_path` is rewritten; blob content is
    /// addressed by document id and never moves.
    pub async fn move_document(&self, document_id: Uuid, new_folder_path: &str) -> Result<Document> {
        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        if !new_folder_path.is_empty()
            && self
                .folders
                .get_by_path(document.space_id, new_folder_path)
                .await?
                .is_none()
        {
            return Err(Error::FolderNotFound(new_folder_path.to_string()));
        }

        self.documents
            .set_folder_path(document_id, new_folder_path)
            .await?;
        self.documents
            .get(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))
    }
}

/// Attach the folders and documents that live directly under `parent_path`.
fn build_level(folders: &[Folder], documents: &[Document], parent_path: &str) -> Vec<TreeNode> {
    let mut child_folders: Vec<TreeNode> = folders
        .iter()
        .filter(|f| f.parent_path == parent_path)
        .map(|f| TreeNode::Folder {
            folder: f.clone(),
            children: build_level(folders, documents, &f.path),
        })
        .collect();
    child_folders.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));

    let mut child_docs: Vec<TreeNode> = documents
        .iter()
        .filter(|d| d.folder_path == parent_path)
        .map(|d| TreeNode::Document(d.clone()))
        .collect();
    child_docs.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));

    child_folders.extend(child_docs);
    child_folders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemDocumentRepository, MemFolderRepository};
    use chrono::Utc;

    fn manager() -> HierarchyManager<MemFolderRepository, MemDocumentRepository> {
        HierarchyManager::new(MemFolderRepository::new(), MemDocumentRepository::new())
    }

    fn doc(space_id: Uuid, title: &str, folder_path: &str) -> Document {
        let id = Uuid::new_v4();
        Document {
            id,
            title: title.to_string(),
            space_id,
            space_name: "eng".to_string(),
            folder_path: folder_path.to_string(),
            excerpt: String::new(),
            author: "test".to_string(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            views: 0,
            last_viewed: None,
            tags: vec![],
            content_path: Document::blob_path(id),
        }
    }

    #[tokio::test]
    async fn create_folder_builds_slug_path() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        let parent = mgr.create_folder(space_id, "Design Docs", "").await.unwrap();
        assert_eq!(parent.path, "design-docs");
        assert_eq!(parent.parent_path, "");

        let child = mgr
            .create_folder(space_id, "API Notes", "design-docs")
            .await
            .unwrap();
        assert_eq!(child.path, "design-docs/api-notes");
        assert_eq!(child.parent_path, "design-docs");
    }

    #[tokio::test]
    async fn unknown_parent_falls_back_to_root() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        let folder = mgr
            .create_folder(space_id, "Orphan", "does/not/exist")
            .await
            .unwrap();
        assert_eq!(folder.parent_path, "");
        assert_eq!(folder.path, "orphan");
    }

    #[tokio::test]
    async fn duplicate_path_rejected() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        mgr.create_folder(space_id, "Notes", "").await.unwrap();
        let err = mgr.create_folder(space_id, "Notes", "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_slug_rejected() {
        let mgr = manager();
        let err = mgr
            .create_folder(Uuid::new_v4(), "!!!", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn tree_orders_folders_before_documents() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        mgr.create_folder(space_id, "zeta", "").await.unwrap();
        mgr.create_folder(space_id, "Alpha", "").await.unwrap();
        mgr.documents
            .insert(doc(space_id, "aardvark", ""))
            .await
            .unwrap();

        let tree = mgr.tree(space_id).await.unwrap();
        let names: Vec<&str> = tree.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Alpha", "zeta", "aardvark"]);
        assert!(tree[0].is_folder());
        assert!(tree[1].is_folder());
        assert!(!tree[2].is_folder());
    }

    #[tokio::test]
    async fn tree_nests_children_at_correct_depth() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        mgr.create_folder(space_id, "guides", "").await.unwrap();
        mgr.create_folder(space_id, "deploy", "guides").await.unwrap();
        mgr.documents
            .insert(doc(space_id, "runbook", "guides/deploy"))
            .await
            .unwrap();

        let tree = mgr.tree(space_id).await.unwrap();
        assert_eq!(tree.len(), 1);
        let TreeNode::Folder { folder, children } = &tree[0] else {
            panic!("expected folder at root");
        };
        assert_eq!(folder.path, "guides");

        let TreeNode::Folder { folder, children } = &children[0] else {
            panic!("expected nested folder");
        };
        assert_eq!(folder.path, "guides/deploy");
        assert_eq!(children[0].name(), "runbook");
    }

    #[tokio::test]
    async fn move_document_rewrites_folder_path_only() {
        let mgr = manager();
        let space_id = Uuid::new_v4();

        mgr.create_folder(space_id, "archive", "").await.unwrap();
        let d = doc(space_id, "old notes", "");
        let content_path = d.content_path.clone();
        mgr.documents.insert(d.clone()).await.unwrap();

        let moved = mgr.move_document(d.id, "archive").await.unwrap();
        assert_eq!(moved.folder_path, "archive");
        assert_eq!(moved.content_path, content_path);
    }

    #[tokio::test]
    async fn move_into_missing_folder_fails() {
        let mgr = manager();
        let space_id = Uuid::new_v4();
        let d = doc(space_id, "notes", "");
        mgr.documents.insert(d.clone()).await.unwrap();

        let err = mgr.move_document(d.id, "nope").await.unwrap_err();
        assert!(matches!(err, Error::FolderNotFound(_)));
    }

    #[tokio::test]
    async fn move_to_root_always_allowed() {
        let mgr = manager();
        let space_id = Uuid::new_v4();
        mgr.create_folder(space_id, "inbox", "").await.unwrap();
        let d = doc(space_id, "notes", "inbox");
        mgr.documents.insert(d.clone()).await.unwrap();

        let moved = mgr.move_document(d.id, "").await.unwrap();
        assert_eq!(moved.folder_path, "");
    }
}
