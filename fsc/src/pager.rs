//! Drains paginated remote listings into a single sequence.

use std::sync::Arc;

use fsc_sdk::{ChildEntry, DirectoryRef, ShareEntry, StorageClient};

use crate::error::FscResult;

/// Hides continuation-token pagination behind a blocking "give me all
/// items" contract. Pages are fetched strictly in order: the token from
/// page N is required to request page N+1.
pub struct PagedLister {
    client: Arc<dyn StorageClient>,
}

impl PagedLister {
    #[must_use]
    pub fn new(client: Arc<dyn StorageClient>) -> Self {
        Self { client }
    }

    pub async fn list_shares(&self) -> FscResult<Vec<ShareEntry>> {
        let mut all = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.client.list_shares(token.as_deref()).await?;
            all.extend(page.entries);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(all)
    }

    pub async fn list_children(&self, dir: &DirectoryRef) -> FscResult<Vec<ChildEntry>> {
        let mut all = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.client.list_children(dir, token.as_deref()).await?;
            all.extend(page.entries);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsc_sdk::{EntryKind, MemoryClient};

    #[tokio::test]
    async fn share_listing_drains_all_pages_in_order() {
        let client = MemoryClient::new().with_page_size(2);
        for name in ["a", "b", "c", "d", "e", "f", "g"] {
            client.add_share(name);
        }

        let lister = PagedLister::new(Arc::new(client));
        let names: Vec<String> = lister
            .list_shares()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();

        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[tokio::test]
    async fn child_listing_yields_pages_times_size_entries() {
        let client = MemoryClient::new().with_page_size(3);
        for i in 0..9 {
            client.insert_file("s", &format!("f{i}.txt"), b"x");
        }
        let root = client.share_ref("s").root_directory();

        let lister = PagedLister::new(Arc::new(client));
        let children = lister.list_children(&root).await.unwrap();

        assert_eq!(children.len(), 9);
        assert!(children.iter().all(|c| c.kind == EntryKind::File));
        // Page order preserved, no duplicates across token boundaries.
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["f0.txt", "f1.txt", "f2.txt", "f3.txt", "f4.txt", "f5.txt", "f6.txt", "f7.txt", "f8.txt"]
        );
    }

    #[tokio::test]
    async fn missing_directory_listing_propagates_not_found() {
        let client = MemoryClient::new();
        client.add_share("s");
        let ghost = client.share_ref("s").root_directory().subdirectory("ghost");

        let lister = PagedLister::new(Arc::new(client));
        let err = lister.list_children(&ghost).await.unwrap_err();
        assert!(matches!(err, crate::error::FscError::NotFound(_)));
    }
}
