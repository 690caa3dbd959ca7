//! Trie of normalized labels.
//!
//! Nodes live in a shared arena. A [`Node`] handle owns the whole tree, so
//! any descendant keeps its ancestors (and its name) alive after the root
//! handle is dropped. Parent and child links are arena indices, which keeps
//! the tree free of reference cycles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use enscribe_core::constants::{HASH_SIZE, LABEL_SELF, SIGIL_COIN, SIGIL_MAGIC};
use enscribe_core::error::{EnscribeError, Result};
use enscribe_core::traits::LabelNormalizer;
use enscribe_crypto::{dns_encode, labelhash, namehash_labels, namesplit, BasicNormalizer};
use enscribe_record::Record;

const ROOT_TAG: &str = "root";
const SEPARATOR: char = '.';
const ROOT_ID: usize = 0;

// ═══════════════════════════════════════════════════════════════════════════════
// NODE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Children {
    order: Vec<usize>,
    index: HashMap<String, usize>,
}

struct Slot {
    label: String,
    parent: Option<usize>,
    record: RwLock<Option<Record>>,
    children: RwLock<Children>,
}

impl Slot {
    fn new(label: String, parent: Option<usize>) -> Arc<Slot> {
        Arc::new(Slot {
            label,
            parent,
            record: RwLock::new(None),
            children: RwLock::new(Children::default()),
        })
    }
}

struct Tree {
    normalizer: Arc<dyn LabelNormalizer>,
    // append-only; an index is valid for the life of the tree
    slots: RwLock<Vec<Arc<Slot>>>,
}

/// A node in the name tree.
///
/// Cloning a `Node` clones the handle, not the subtree.
#[derive(Clone)]
pub struct Node {
    tree: Arc<Tree>,
    slot: Arc<Slot>,
    id: usize,
}

impl Node {
    /// Creates a root labeled `[tag]` (default `[root]`) using [`BasicNormalizer`].
    pub fn new_root(tag: Option<&str>) -> Node {
        Self::new_root_with(tag, Arc::new(BasicNormalizer))
    }

    /// Creates a root with a custom label normalizer, inherited by every descendant.
    pub fn new_root_with(tag: Option<&str>, normalizer: Arc<dyn LabelNormalizer>) -> Node {
        let slot = Slot::new(format!("[{}]", tag.unwrap_or(ROOT_TAG)), None);
        let tree = Arc::new(Tree {
            normalizer,
            slots: RwLock::new(vec![Arc::clone(&slot)]),
        });
        Node { tree, slot, id: ROOT_ID }
    }

    /// Node for a dotted name under a fresh default root.
    ///
    /// The returned handle keeps its ancestors alive, so the root need not be held.
    pub fn from_name(name: &str) -> Result<Node> {
        Self::new_root(None).create(name)
    }

    fn at(&self, id: usize) -> Node {
        let slot = Arc::clone(&self.tree.slots.read()[id]);
        Node {
            tree: Arc::clone(&self.tree),
            slot,
            id,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NAVIGATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// This node's label. The root's label is its bracketed tag.
    pub fn label(&self) -> &str {
        &self.slot.label
    }

    /// Parent node, or `None` for a root.
    pub fn parent(&self) -> Option<Node> {
        self.slot.parent.map(|id| self.at(id))
    }

    /// True if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.slot.parent.is_none()
    }

    /// The topmost ancestor.
    pub fn root(&self) -> Node {
        self.at(ROOT_ID)
    }

    /// Number of ancestors below the root.
    pub fn depth(&self) -> usize {
        self.path(false).len()
    }

    /// This node and its ancestors, most specific first.
    ///
    /// The root is included only when `include_root` is set.
    pub fn path(&self, include_root: bool) -> Vec<Node> {
        let mut path = Vec::new();
        let mut node = Some(self.clone());
        while let Some(x) = node {
            let parent = x.parent();
            if parent.is_some() || include_root {
                path.push(x);
            }
            node = parent;
        }
        path
    }

    /// Existing child with exactly this (already normalized) label.
    pub fn get(&self, label: &str) -> Option<Node> {
        let id = self.slot.children.read().index.get(label).copied();
        id.map(|id| self.at(id))
    }

    /// Gets or creates the child for a single label.
    pub fn child(&self, label: &str) -> Result<Node> {
        let label = self.tree.normalizer.normalize(label)?;
        if label.contains(SEPARATOR) {
            return Err(EnscribeError::InvalidLabel {
                label,
                reason: "expected single label".into(),
            });
        }
        if let Some(node) = self.get(&label) {
            return Ok(node);
        }

        let mut children = self.slot.children.write();
        // another writer may have inserted it between the read and write lock
        if let Some(&id) = children.index.get(&label) {
            drop(children);
            return Ok(self.at(id));
        }
        let slot = Slot::new(label.clone(), Some(self.id));
        let id = {
            let mut slots = self.tree.slots.write();
            slots.push(Arc::clone(&slot));
            slots.len() - 1
        };
        children.index.insert(label, id);
        children.order.push(id);
        Ok(Node {
            tree: Arc::clone(&self.tree),
            slot,
            id,
        })
    }

    /// Descends to `a` in `"a.b.c"`, creating missing nodes from the right.
    pub fn create(&self, name: &str) -> Result<Node> {
        namesplit(name)
            .into_iter()
            .rev()
            .try_fold(self.clone(), |node, label| node.child(label))
    }

    /// Finds `a` in `"a.b.c"` without creating anything. `find("")` is this node.
    pub fn find(&self, name: &str) -> Option<Node> {
        namesplit(name)
            .into_iter()
            .rev()
            .try_fold(self.clone(), |node, label| node.get(label))
    }

    /// Children in insertion order.
    pub fn children(&self) -> Vec<Node> {
        let ids = self.slot.children.read().order.clone();
        ids.into_iter().map(|id| self.at(id)).collect()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.slot.children.read().order.len()
    }

    /// True if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NAMES & HASHES
    // ═══════════════════════════════════════════════════════════════════════════

    fn labels(&self) -> Vec<String> {
        self.path(false).iter().map(|x| x.slot.label.clone()).collect()
    }

    /// Dotted name below the root. The root's name is empty.
    pub fn name(&self) -> String {
        self.labels().join(".")
    }

    /// Display form of the name from the tree's normalizer.
    pub fn pretty_name(&self) -> String {
        self.tree.normalizer.beautify(&self.name())
    }

    /// Hash of this label; zero for the root.
    pub fn labelhash(&self) -> [u8; 32] {
        if self.is_root() {
            [0u8; HASH_SIZE]
        } else {
            labelhash(&self.slot.label)
        }
    }

    /// Namehash of [`name`](Self::name).
    pub fn namehash(&self) -> [u8; 32] {
        namehash_labels(&self.labels())
    }

    /// DNS wire encoding of [`name`](Self::name).
    pub fn dns(&self) -> Result<Vec<u8>> {
        dns_encode(&self.name())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RECORD
    // ═══════════════════════════════════════════════════════════════════════════

    /// A copy of this node's record.
    pub fn record(&self) -> Option<Record> {
        self.slot.record.read().clone()
    }

    /// True if this node owns a record.
    pub fn has_record(&self) -> bool {
        self.slot.record.read().is_some()
    }

    /// Replaces this node's record.
    pub fn set_record(&self, record: Option<Record>) {
        *self.slot.record.write() = record;
    }

    /// Reads the record without copying it.
    pub fn with_record<T>(&self, f: impl FnOnce(Option<&Record>) -> T) -> T {
        f(self.slot.record.read().as_ref())
    }

    /// Mutates the record slot in place.
    pub fn update_record<T>(&self, f: impl FnOnce(&mut Option<Record>) -> T) -> T {
        f(&mut self.slot.record.write())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // IMPORT / EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Imports a nested JSON object.
    ///
    /// - `"."` replaces this node's record.
    /// - A non-record key with an object value names one or more
    ///   whitespace-separated (possibly dotted) children to import into.
    /// - Everything else is a field of this node's record.
    ///
    /// Failures are wrapped with the name of the node being imported.
    #[instrument(skip_all, fields(name = %self.name()))]
    pub fn import(&self, value: &Value) -> Result<()> {
        self.import_inner(value)
            .map_err(|e| EnscribeError::import(self.name(), e))
    }

    fn import_inner(&self, value: &Value) -> Result<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| EnscribeError::Format("expected object".into()))?;

        let mut rest = Map::new();
        for (k, v) in obj {
            if k == LABEL_SELF {
                self.set_record(Some(Record::from_json(v)?));
            } else if !is_record_key(k) && v.is_object() {
                let labels = k.trim();
                if labels.is_empty() {
                    return Err(EnscribeError::InvalidLabel {
                        label: k.clone(),
                        reason: "expected label".into(),
                    });
                }
                for name in labels.split_whitespace() {
                    self.create(name)?.import(v)?;
                }
            } else {
                rest.insert(k.clone(), v.clone());
            }
        }

        if !rest.is_empty() {
            debug!(fields = rest.len(), "Importing record fields");
            self.update_record(|slot| slot.get_or_insert_with(Record::new).import(&Value::Object(rest)))?;
        }
        Ok(())
    }

    /// Nested JSON mirroring [`import`](Self::import).
    ///
    /// A leaf with a record becomes the record itself. Otherwise the record
    /// sits under `"."` beside the children.
    pub fn to_json(&self, human: bool) -> Result<Value> {
        let children = self.children();
        let record = self.record();
        if let (Some(record), true) = (&record, children.is_empty()) {
            return record.to_json(human);
        }

        let mut obj = Map::new();
        if let Some(record) = &record {
            obj.insert(LABEL_SELF.into(), record.to_json(human)?);
        }
        for child in children {
            obj.insert(child.slot.label.clone(), child.to_json(human)?);
        }
        Ok(Value::Object(obj))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRAVERSAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Depth-first pre-order walk calling `f(node, level)`, children in
    /// insertion order. The tree may be mutated from inside `f`.
    pub fn scan<F: FnMut(&Node, usize)>(&self, mut f: F) {
        self.scan_at(&mut f, 0);
    }

    fn scan_at<F: FnMut(&Node, usize)>(&self, f: &mut F, level: usize) {
        f(self, level);
        for child in self.children() {
            child.scan_at(f, level + 1);
        }
    }

    /// Values returned by `f` during a [`scan`](Self::scan), skipping `None`.
    pub fn collect<T, F: FnMut(&Node, usize) -> Option<T>>(&self, mut f: F) -> Vec<T> {
        let mut v = Vec::new();
        self.scan(|node, level| v.extend(f(node, level)));
        v
    }

    /// Every node of the subtree in scan order, starting with this one.
    pub fn flat(&self) -> Vec<Node> {
        self.collect(|node, _| Some(node.clone()))
    }

    /// Number of nodes in the subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.scan(|_, _| n += 1);
        n
    }

    /// Indented outline: `label*` marks a record, `(n)` counts children.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.scan(|node, level| {
            out.push_str(&"  ".repeat(level));
            out.push_str(node.label());
            if node.has_record() {
                out.push('*');
            }
            let n = node.len();
            if n > 0 {
                out.push_str(&format!(" ({n})"));
            }
            out.push('\n');
        });
        out
    }

    /// Writes [`render`](Self::render) to stdout.
    pub fn print(&self) {
        print!("{}", self.render());
    }
}

fn is_record_key(key: &str) -> bool {
    key.starts_with(SIGIL_COIN) || key.starts_with(SIGIL_MAGIC)
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.slot.label)
            .field("name", &self.name())
            .field("children", &self.len())
            .field("record", &self.has_record())
            .finish()
    }
}
