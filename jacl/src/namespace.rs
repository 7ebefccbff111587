//! Namespaces
//!
//! Commands live in a tree of namespaces rooted at the global namespace, `::`.  A
//! namespace holds its command bindings, its child namespaces, and the list of patterns
//! naming the commands it exports for [`import`](../import/index.html).
//!
//! Qualified names use `::` as the separator.  A name beginning with `::` is absolute;
//! any other qualified name is resolved first relative to the current namespace and
//! then relative to the global namespace, and an unqualified command name is looked up
//! in the current namespace and then in the global namespace.

use crate::command::WrappedCommand;
use crate::types::TclHasher;
use crate::util::glob_match;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use indexmap::IndexMap;

/// A namespace: a named container of commands and child namespaces.
pub struct Namespace {
    name: String,
    full_name: String,
    parent: Weak<Namespace>,
    children: RefCell<IndexMap<String, Rc<Namespace>, TclHasher>>,
    commands: RefCell<IndexMap<String, Rc<WrappedCommand>, TclHasher>>,
    exports: RefCell<Vec<String>>,
    deleted: Cell<bool>,
}

impl Namespace {
    /// Creates a new global namespace.
    pub(crate) fn global() -> Rc<Namespace> {
        Rc::new(Self {
            name: String::new(),
            full_name: "::".into(),
            parent: Weak::new(),
            children: RefCell::new(IndexMap::default()),
            commands: RefCell::new(IndexMap::default()),
            exports: RefCell::new(Vec::new()),
            deleted: Cell::new(false),
        })
    }

    /// The namespace's simple name; empty for the global namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace's fully-qualified name, e.g., `::foo::bar`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn parent(&self) -> Option<Rc<Namespace>> {
        self.parent.upgrade()
    }

    pub fn is_global(&self) -> bool {
        self.parent.upgrade().is_none() && self.name.is_empty()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }

    /// Returns the fully-qualified form of a name in this namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.name.is_empty() {
            format!("::{}", name)
        } else {
            format!("{}::{}", self.full_name, name)
        }
    }

    //--------------------------------------------------------------------------------------
    // Children

    /// The child namespace with the given simple name.
    pub fn child(&self, name: &str) -> Option<Rc<Namespace>> {
        self.children.borrow().get(name).cloned()
    }

    /// The child namespaces, in creation order.
    pub fn children(&self) -> Vec<Rc<Namespace>> {
        self.children.borrow().values().cloned().collect()
    }

    /// Returns the named child, creating it if need be.
    pub(crate) fn ensure_child(self: &Rc<Self>, name: &str) -> Rc<Namespace> {
        if let Some(child) = self.child(name) {
            return child;
        }

        let child = Rc::new(Self {
            name: name.into(),
            full_name: self.qualify(name),
            parent: Rc::downgrade(self),
            children: RefCell::new(IndexMap::default()),
            commands: RefCell::new(IndexMap::default()),
            exports: RefCell::new(Vec::new()),
            deleted: Cell::new(false),
        });
        self.children
            .borrow_mut()
            .insert(name.into(), child.clone());
        child
    }

    /// Follows a path of simple names down from this namespace.
    pub(crate) fn descend(self: &Rc<Self>, path: &str) -> Option<Rc<Namespace>> {
        let mut ns = self.clone();
        for part in path_components(path) {
            ns = ns.child(part)?;
        }
        Some(ns)
    }

    /// Follows a path of simple names down from this namespace, creating namespaces as
    /// needed.
    pub(crate) fn ensure_path(self: &Rc<Self>, path: &str) -> Rc<Namespace> {
        let mut ns = self.clone();
        for part in path_components(path) {
            ns = ns.ensure_child(part);
        }
        ns
    }

    //--------------------------------------------------------------------------------------
    // Commands

    /// The command bound to the given simple name in this namespace, if any.
    pub fn find_command(&self, name: &str) -> Option<Rc<WrappedCommand>> {
        self.commands.borrow().get(name).cloned()
    }

    /// The names of the commands in this namespace, in creation order.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }

    /// The command bindings in this namespace, in creation order.
    pub fn commands(&self) -> Vec<Rc<WrappedCommand>> {
        self.commands.borrow().values().cloned().collect()
    }

    pub(crate) fn insert_command(&self, name: &str, binding: Rc<WrappedCommand>) {
        self.commands.borrow_mut().insert(name.into(), binding);
    }

    /// Removes the binding from the table, provided the name is still bound to it.
    pub(crate) fn unlink_command(&self, name: &str, binding: &Rc<WrappedCommand>) {
        let mut commands = self.commands.borrow_mut();
        if commands
            .get(name)
            .map(|cmd| Rc::ptr_eq(cmd, binding))
            .unwrap_or(false)
        {
            commands.shift_remove(name);
        }
    }

    //--------------------------------------------------------------------------------------
    // Exports

    /// The export patterns, in the order they were added.
    pub fn export_patterns(&self) -> Vec<String> {
        self.exports.borrow().clone()
    }

    /// Adds export patterns, first clearing the existing ones if `clear` is set.
    pub(crate) fn export(&self, patterns: &[&str], clear: bool) {
        let mut exports = self.exports.borrow_mut();
        if clear {
            exports.clear();
        }
        for pattern in patterns {
            if !exports.iter().any(|p| p == pattern) {
                exports.push((*pattern).into());
            }
        }
    }

    /// Whether the simple command name matches one of the export patterns.
    pub fn is_exported(&self, name: &str) -> bool {
        self.exports.borrow().iter().any(|p| glob_match(p, name))
    }

    //--------------------------------------------------------------------------------------
    // Teardown

    /// Deletes every command in the namespace and its descendants, and detaches the
    /// namespace from its parent.
    pub(crate) fn teardown(&self) {
        if self.deleted.replace(true) {
            return;
        }

        self.delete_commands();

        loop {
            let child = self.children.borrow_mut().pop();
            match child {
                Some((_, child)) => child.teardown(),
                None => break,
            }
        }

        if let Some(parent) = self.parent.upgrade() {
            parent.children.borrow_mut().shift_remove(&self.name);
        }
    }

    /// Deletes every command in the namespace.  Deleting one command may delete others
    /// (its importers, the commands of a disposed slave), so the table is re-read each
    /// time.
    pub(crate) fn delete_commands(&self) {
        loop {
            let next = self.commands.borrow_mut().pop();
            match next {
                Some((_, cmd)) => cmd.delete(),
                None => break,
            }
        }
    }
}

impl core::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.full_name)
            .field("commands", &self.commands.borrow().len())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

//------------------------------------------------------------------------------------------
// Qualified names

/// Whether the name is absolute, i.e., begins with `::`.
pub fn is_absolute(name: &str) -> bool {
    name.starts_with("::")
}

/// Splits a possibly-qualified name into its namespace part and its simple tail.  The
/// namespace part is `None` for an unqualified name, and `::` for a name like `::foo`.
///
/// ```
/// use rejacl::namespace::split_name;
///
/// assert_eq!(split_name("foo"), (None, "foo"));
/// assert_eq!(split_name("::foo"), (Some("::"), "foo"));
/// assert_eq!(split_name("a::b::c"), (Some("a::b"), "c"));
/// ```
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.rfind("::") {
        Some(idx) => {
            let tail = &name[idx + 2..];
            let quals = name[..idx].trim_end_matches(':');
            if quals.is_empty() {
                (Some("::"), tail)
            } else {
                (Some(quals), tail)
            }
        }
        None => (None, name),
    }
}

/// The namespace qualifiers of a name, as returned by `namespace qualifiers`.
pub fn qualifiers(name: &str) -> &str {
    match name.rfind("::") {
        Some(idx) => name[..idx].trim_end_matches(':'),
        None => "",
    }
}

/// The simple tail of a name, as returned by `namespace tail`.
pub fn tail(name: &str) -> &str {
    split_name(name).1
}

/// The non-empty components of a namespace path.
pub(crate) fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split("::").filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        let global = Namespace::global();
        assert!(global.is_global());
        assert_eq!(global.qualify("foo"), "::foo");

        let child = global.ensure_child("a").ensure_child("b");
        assert_eq!(child.full_name(), "::a::b");
        assert_eq!(child.qualify("foo"), "::a::b::foo");
        assert!(!child.is_global());
    }

    #[test]
    fn test_descend() {
        let global = Namespace::global();
        assert!(global.descend("a::b").is_none());

        let created = global.ensure_path("a::b");
        let found = global.descend("::a::b").expect("found");
        assert!(Rc::ptr_eq(&created, &found));
    }

    #[test]
    fn test_names() {
        assert_eq!(qualifiers("::a::b::c"), "::a::b");
        assert_eq!(qualifiers("::c"), "");
        assert_eq!(qualifiers("c"), "");
        assert_eq!(tail("::a::b"), "b");
        assert_eq!(tail("b"), "b");
        assert!(is_absolute("::x"));
        assert!(!is_absolute("x::y"));
    }

    #[test]
    fn test_exports() {
        let global = Namespace::global();
        let ns = global.ensure_child("util");
        ns.export(&["get*", "put"], false);
        assert!(ns.is_exported("getx"));
        assert!(ns.is_exported("put"));
        assert!(!ns.is_exported("putx"));

        ns.export(&["put*"], true);
        assert!(!ns.is_exported("getx"));
        assert_eq!(ns.export_patterns(), vec!["put*".to_string()]);
    }

    #[test]
    fn test_teardown_detaches() {
        let global = Namespace::global();
        let child = global.ensure_child("gone");
        child.teardown();
        assert!(child.is_deleted());
        assert!(global.child("gone").is_none());
    }
}
