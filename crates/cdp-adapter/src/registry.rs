//! Pages attached by the adapter and the CDP sessions that drive them.

use dashmap::DashMap;

use crate::ids::PageId;

/// Target and flattened session backing one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachedPage {
    pub target_id: String,
    pub cdp_session: String,
}

#[derive(Default)]
pub struct Registry {
    pages: DashMap<PageId, AttachedPage>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, page: PageId, attached: AttachedPage) {
        self.pages.insert(page, attached);
    }

    pub fn remove(&self, page: &PageId) -> Option<AttachedPage> {
        self.pages.remove(page).map(|(_, attached)| attached)
    }

    pub fn cdp_session(&self, page: &PageId) -> Option<String> {
        self.pages.get(page).map(|entry| entry.cdp_session.clone())
    }

    pub fn clear(&self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_session_until_removed() {
        let registry = Registry::new();
        let page = PageId::new();
        registry.insert(
            page,
            AttachedPage {
                target_id: "t1".into(),
                cdp_session: "s1".into(),
            },
        );

        assert_eq!(registry.cdp_session(&page).as_deref(), Some("s1"));
        assert_eq!(registry.remove(&page).map(|a| a.target_id).as_deref(), Some("t1"));
        assert!(registry.cdp_session(&page).is_none());
    }
}
