//! Ordered forest of pages belonging to a single notebook.
//!
//! Pages are stored in a map keyed by id. A children-by-parent index is
//! derived from that map and rebuilt after every mutation, so structural
//! queries (children, ancestors, cascade delete, cycle checks) never chase
//! pointers.
//!
//! Siblings sort by `(order, insertion sequence)`. Mutations never leave two
//! siblings with the same order. Gaps left behind by deletes or moves are
//! repaired lazily: the next insert into a sibling group renumbers it densely
//! before appending.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{NotebookId, PageId, WorkspaceError};

/// Title given to pages created without one.
pub const UNTITLED_PAGE: &str = "Untitled";

/// A node in a notebook's page hierarchy.
///
/// Content is stored elsewhere; the tree only tracks identity, title, and
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Page {
    id: PageId,
    title: String,
    parent_id: Option<PageId>,
    notebook_id: NotebookId,
    order: u32,
}

impl Page {
    /// Build a page record, typically when rehydrating from storage.
    ///
    /// Structural validity is checked by [`PageTree::from_pages`].
    pub fn new(
        id: PageId,
        notebook_id: NotebookId,
        parent_id: Option<PageId>,
        title: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            parent_id,
            notebook_id,
            order,
        }
    }

    /// Page identifier.
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Parent page, or `None` for root pages.
    pub fn parent_id(&self) -> Option<PageId> {
        self.parent_id
    }

    /// Owning notebook.
    pub fn notebook_id(&self) -> NotebookId {
        self.notebook_id
    }

    /// Position among siblings.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Whether the page sits at the top level of the notebook.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Trim a requested page title and enforce the length limit.
///
/// Blank titles fall back to [`UNTITLED_PAGE`].
pub fn normalise_page_title(raw: &str, max_chars: usize) -> Result<String, WorkspaceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(UNTITLED_PAGE.to_owned());
    }
    if trimmed.chars().count() > max_chars {
        return Err(WorkspaceError::validation(
            "page title",
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone)]
struct PageNode {
    page: Page,
    seq: u64,
}

/// Well-formed forest of pages for one notebook.
///
/// ## Invariants
/// - Every page belongs to `notebook_id`.
/// - Every `parent_id` resolves to a page in the same tree.
/// - The parent graph is acyclic.
/// - Siblings never share an `order` value after a mutation.
#[derive(Debug, Clone)]
pub struct PageTree {
    notebook_id: NotebookId,
    nodes: HashMap<PageId, PageNode>,
    children: HashMap<Option<PageId>, Vec<PageId>>,
    next_seq: u64,
}

impl PartialEq for PageTree {
    fn eq(&self, other: &Self) -> bool {
        self.notebook_id == other.notebook_id
            && self.iter().eq(other.iter())
    }
}

impl Eq for PageTree {}

impl PageTree {
    /// Create an empty tree for `notebook_id`.
    pub fn new(notebook_id: NotebookId) -> Self {
        Self {
            notebook_id,
            nodes: HashMap::new(),
            children: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Rebuild a tree from a flat page list, validating every invariant.
    ///
    /// List position supplies the insertion sequence used to break order
    /// ties between siblings.
    pub fn from_pages(
        notebook_id: NotebookId,
        pages: impl IntoIterator<Item = Page>,
    ) -> Result<Self, WorkspaceError> {
        let mut tree = Self::new(notebook_id);
        for page in pages {
            if page.notebook_id != notebook_id {
                return Err(WorkspaceError::PageOutsideNotebook {
                    page_id: page.id,
                    expected: notebook_id,
                    actual: page.notebook_id,
                });
            }
            let page_id = page.id;
            let seq = tree.bump_seq();
            if tree.nodes.insert(page_id, PageNode { page, seq }).is_some() {
                return Err(WorkspaceError::DuplicatePage { page_id });
            }
        }

        for node in tree.nodes.values() {
            if let Some(parent_id) = node.page.parent_id
                && !tree.nodes.contains_key(&parent_id)
            {
                return Err(WorkspaceError::InvalidParent {
                    notebook_id,
                    parent_id,
                });
            }
        }
        tree.ensure_acyclic()?;
        tree.rebuild_index();
        Ok(tree)
    }

    /// Notebook the tree belongs to.
    pub fn notebook_id(&self) -> NotebookId {
        self.notebook_id
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the notebook has no pages.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `page_id` exists in this tree.
    pub fn contains(&self, page_id: &PageId) -> bool {
        self.nodes.contains_key(page_id)
    }

    /// Look up a page by id.
    pub fn get(&self, page_id: &PageId) -> Option<&Page> {
        self.nodes.get(page_id).map(|node| &node.page)
    }

    /// Ordered children of `parent_id`; `None` lists the root pages.
    pub fn children(&self, parent_id: Option<&PageId>) -> Vec<&Page> {
        self.children
            .get(&parent_id.copied())
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Ordered root pages.
    pub fn roots(&self) -> Vec<&Page> {
        self.children(None)
    }

    /// Ancestors of `page_id`, nearest parent first.
    pub fn ancestors(&self, page_id: &PageId) -> Result<Vec<&Page>, WorkspaceError> {
        let page = self.require(page_id)?;
        let mut chain = Vec::new();
        let mut cursor = page.parent_id;
        while let Some(parent_id) = cursor {
            let Some(parent) = self.get(&parent_id) else {
                break;
            };
            chain.push(parent);
            cursor = parent.parent_id;
        }
        Ok(chain)
    }

    /// Transitive descendants of `page_id` in pre-order, excluding the page.
    pub fn descendants(&self, page_id: &PageId) -> Result<Vec<&Page>, WorkspaceError> {
        self.require(page_id)?;
        let mut out = Vec::new();
        self.walk(Some(*page_id), &mut out);
        Ok(out)
    }

    /// Depth of `page_id`, counting root pages as depth 1.
    pub fn depth(&self, page_id: &PageId) -> Result<usize, WorkspaceError> {
        Ok(self.ancestors(page_id)?.len() + 1)
    }

    /// Every page in pre-order: each root followed by its subtree.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(None, &mut out);
        out.into_iter()
    }

    /// Deterministic landing page: the root with the lowest order.
    pub fn first_page(&self) -> Result<&Page, WorkspaceError> {
        self.roots()
            .into_iter()
            .next()
            .ok_or(WorkspaceError::EmptyNotebook {
                notebook_id: self.notebook_id,
            })
    }

    /// Append a page to the sibling group of `parent_id`.
    ///
    /// The new page receives `max sibling order + 1` after the group's gaps
    /// are repaired. `title` must already be normalised.
    pub fn add_page(
        &mut self,
        title: String,
        parent_id: Option<PageId>,
        max_depth: usize,
    ) -> Result<&Page, WorkspaceError> {
        self.check_parent(parent_id, 1, max_depth)?;

        let page_id = PageId::random();
        let order = self.next_order(parent_id);
        let seq = self.bump_seq();
        let page = Page::new(page_id, self.notebook_id, parent_id, title, order);
        self.nodes.insert(page_id, PageNode { page, seq });
        self.rebuild_index();
        self.require(&page_id)
    }

    /// Change the title of an existing page.
    pub fn rename(&mut self, page_id: &PageId, title: String) -> Result<(), WorkspaceError> {
        let node = self.require_node_mut(page_id)?;
        node.page.title = title;
        Ok(())
    }

    /// Move a page (with its subtree) under `new_parent_id`.
    ///
    /// The page is appended to the end of its new sibling group. Moving a page
    /// to its current parent leaves the tree untouched.
    pub fn reparent(
        &mut self,
        page_id: &PageId,
        new_parent_id: Option<PageId>,
        max_depth: usize,
    ) -> Result<(), WorkspaceError> {
        let current_parent = self.require(page_id)?.parent_id;
        if let Some(target) = new_parent_id {
            if target == *page_id {
                return Err(WorkspaceError::CycleDetected {
                    page_id: *page_id,
                    new_parent_id: target,
                });
            }
            if !self.contains(&target) {
                return Err(WorkspaceError::InvalidParent {
                    notebook_id: self.notebook_id,
                    parent_id: target,
                });
            }
            if self.is_descendant(&target, page_id) {
                return Err(WorkspaceError::CycleDetected {
                    page_id: *page_id,
                    new_parent_id: target,
                });
            }
        }
        if current_parent == new_parent_id {
            return Ok(());
        }

        let height = self.height(page_id);
        self.check_parent(new_parent_id, height, max_depth)?;

        let order = self.next_order(new_parent_id);
        let node = self.require_node_mut(page_id)?;
        node.page.parent_id = new_parent_id;
        node.page.order = order;
        self.rebuild_index();
        Ok(())
    }

    /// Move a page to `position` within its sibling group.
    ///
    /// Positions past the end clamp to the last slot. The whole group is
    /// renumbered densely from zero.
    pub fn reorder(&mut self, page_id: &PageId, position: usize) -> Result<(), WorkspaceError> {
        let parent_id = self.require(page_id)?.parent_id;
        let mut group: Vec<PageId> = self
            .children
            .get(&parent_id)
            .cloned()
            .unwrap_or_default();
        group.retain(|id| id != page_id);
        let slot = position.min(group.len());
        group.insert(slot, *page_id);
        self.renumber(&group);
        self.rebuild_index();
        Ok(())
    }

    /// Remove a page and all of its descendants.
    ///
    /// Returns the removed ids in pre-order (the page itself first) so content
    /// storage can clean up.
    pub fn delete_page(&mut self, page_id: &PageId) -> Result<Vec<PageId>, WorkspaceError> {
        self.require(page_id)?;
        let mut removed = vec![*page_id];
        removed.extend(self.descendants(page_id)?.into_iter().map(Page::id));
        for id in &removed {
            self.nodes.remove(id);
        }
        self.rebuild_index();
        Ok(removed)
    }

    fn require(&self, page_id: &PageId) -> Result<&Page, WorkspaceError> {
        self.get(page_id).ok_or(WorkspaceError::PageNotFound {
            notebook_id: self.notebook_id,
            page_id: *page_id,
        })
    }

    fn require_node_mut(&mut self, page_id: &PageId) -> Result<&mut PageNode, WorkspaceError> {
        let notebook_id = self.notebook_id;
        self.nodes
            .get_mut(page_id)
            .ok_or(WorkspaceError::PageNotFound {
                notebook_id,
                page_id: *page_id,
            })
    }

    /// Validate that `parent_id` resolves and that hanging a subtree of
    /// `height` levels under it stays within `max_depth`.
    fn check_parent(
        &self,
        parent_id: Option<PageId>,
        height: usize,
        max_depth: usize,
    ) -> Result<(), WorkspaceError> {
        let Some(parent_id) = parent_id else {
            return if height > max_depth {
                Err(WorkspaceError::DepthExceeded {
                    parent_id: None,
                    max_depth,
                })
            } else {
                Ok(())
            };
        };
        if !self.contains(&parent_id) {
            return Err(WorkspaceError::InvalidParent {
                notebook_id: self.notebook_id,
                parent_id,
            });
        }
        if self.depth(&parent_id)? + height > max_depth {
            return Err(WorkspaceError::DepthExceeded {
                parent_id: Some(parent_id),
                max_depth,
            });
        }
        Ok(())
    }

    /// Whether `candidate` sits somewhere below `ancestor`.
    fn is_descendant(&self, candidate: &PageId, ancestor: &PageId) -> bool {
        let mut cursor = self.get(candidate).and_then(Page::parent_id);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.get(&id).and_then(Page::parent_id);
        }
        false
    }

    /// Number of levels in the subtree rooted at `page_id` (a leaf is 1).
    fn height(&self, page_id: &PageId) -> usize {
        let mut tallest = 0;
        let mut pending = vec![(*page_id, 1_usize)];
        while let Some((id, level)) = pending.pop() {
            tallest = tallest.max(level);
            if let Some(ids) = self.children.get(&Some(id)) {
                pending.extend(ids.iter().map(|child| (*child, level + 1)));
            }
        }
        tallest
    }

    /// Repair the sibling group of `parent_id` and return the next free order.
    fn next_order(&mut self, parent_id: Option<PageId>) -> u32 {
        let group = self.children.get(&parent_id).cloned().unwrap_or_default();
        self.renumber(&group);
        group
            .iter()
            .filter_map(|id| self.get(id))
            .map(Page::order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    fn renumber(&mut self, group: &[PageId]) {
        for (order, id) in (0_u32..).zip(group) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.page.order = order;
            }
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }

    fn rebuild_index(&mut self) {
        let mut children: HashMap<Option<PageId>, Vec<PageId>> = HashMap::new();
        for (id, node) in &self.nodes {
            children.entry(node.page.parent_id).or_default().push(*id);
        }
        for group in children.values_mut() {
            group.sort_by_key(|id| {
                self.nodes
                    .get(id)
                    .map(|node| (node.page.order, node.seq))
                    .unwrap_or((u32::MAX, u64::MAX))
            });
        }
        self.children = children;
    }

    /// Pre-order walk below `parent_id` without recursion.
    fn walk<'a>(&'a self, parent_id: Option<PageId>, out: &mut Vec<&'a Page>) {
        let mut pending: Vec<PageId> = Vec::new();
        if let Some(ids) = self.children.get(&parent_id) {
            pending.extend(ids.iter().rev());
        }
        while let Some(id) = pending.pop() {
            let Some(page) = self.get(&id) else {
                continue;
            };
            out.push(page);
            if let Some(ids) = self.children.get(&Some(id)) {
                pending.extend(ids.iter().rev());
            }
        }
    }

    fn ensure_acyclic(&self) -> Result<(), WorkspaceError> {
        let mut acyclic: HashSet<PageId> = HashSet::new();
        for start in self.nodes.keys() {
            let mut path: Vec<PageId> = Vec::new();
            let mut on_path: HashSet<PageId> = HashSet::new();
            let mut cursor = Some(*start);
            while let Some(id) = cursor {
                if acyclic.contains(&id) {
                    break;
                }
                if !on_path.insert(id) {
                    let parent = self.get(&id).and_then(Page::parent_id).unwrap_or(id);
                    return Err(WorkspaceError::CycleDetected {
                        page_id: id,
                        new_parent_id: parent,
                    });
                }
                path.push(id);
                cursor = self.get(&id).and_then(Page::parent_id);
            }
            acyclic.extend(path);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "page_tree_tests.rs"]
mod tests;
