//! Built-in import graph builder for Rust crates.
//!
//! Every source file under `src/` becomes a module node (`src/lib.rs` and
//! `src/main.rs` are `crate`, `src/a.rs` and `src/a/mod.rs` are `crate::a`),
//! as does every inline `mod x { ... }`. Each module's imports are the modules
//! named by its `use` declarations and by `crate::`/`self::`/`super::` paths
//! in its items, resolved to the longest known module prefix. Imports of
//! other crates are recorded by crate root name (`std`, `serde`, ...).
//!
//! A path may start from a name bound by an earlier `use` in the same module
//! (`use std::io;` then `use io::Write;` records `std`). Names that come into
//! scope through glob imports or through a `use` further down the file are
//! not followed.

use crate::error::{ImportMapsError, Result};
use crate::graph::Graph;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use syn::visit::Visit;
use syn::{ExprPath, Item, ItemMod, ItemUse, TypePath, UseTree};
use walkdir::WalkDir;

const CRATE_ROOT: &str = "crate";

/// A single path named by a `use` declaration and the name it binds.
struct UsePath {
    segments: Vec<String>,
    binding: Option<String>,
}

struct SourceModule {
    path: String,
    ast: syn::File,
}

/// Extracts the module import graph of the crate at `root`.
///
/// `root` may be the crate directory (containing `src/`) or the source
/// directory itself. Files that fail to parse are skipped with a warning.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn extract_rust_crate(root: &Path) -> Result<Graph> {
    let src_dir = if root.join("src").is_dir() {
        root.join("src")
    } else {
        root.to_path_buf()
    };

    let sources = parse_sources(&src_dir)?;

    let mut modules = BTreeSet::new();
    for source in &sources {
        modules.insert(source.path.clone());
        collect_inline_modules(&source.ast.items, &source.path, &mut modules);
    }
    tracing::debug!(modules = modules.len(), "Discovered modules");

    let mut imports: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for source in &sources {
        let mut visitor = ImportVisitor {
            modules: &modules,
            scope: source.path.split("::").map(String::from).collect(),
            bindings: BTreeMap::new(),
            imports: &mut imports,
        };
        visitor.imports.entry(source.path.clone()).or_default();
        visitor.visit_file(&source.ast);
    }

    let mut graph = Graph::new();
    for (module, targets) in imports {
        graph.insert_edges(module, targets);
    }

    tracing::info!(
        modules = graph.len(),
        edges = graph.edge_count(),
        "Extracted import graph from Rust sources"
    );
    Ok(graph)
}

fn parse_sources(src_dir: &Path) -> Result<Vec<SourceModule>> {
    let mut sources = Vec::new();

    for path in collect_rust_files(src_dir)? {
        let path = path.as_path();
        let content = fs::read_to_string(path).map_err(|e| {
            ImportMapsError::io_error_with_source("read source file", path.to_path_buf(), e)
        })?;

        match syn::parse_file(&content) {
            Ok(ast) => sources.push(SourceModule {
                path: module_path(path, src_dir),
                ast,
            }),
            Err(err) => {
                tracing::warn!(
                    file = %path.display(),
                    error = %err,
                    "Failed to parse source file, skipping"
                );
            }
        }
    }

    Ok(sources)
}

/// Maps a source file to its module path.
///
/// - `src/lib.rs`, `src/main.rs` → `crate`
/// - `src/a.rs`, `src/a/mod.rs`  → `crate::a`
/// - `src/a/b.rs`                → `crate::a::b`
fn module_path(file: &Path, src_dir: &Path) -> String {
    let rel = file.strip_prefix(src_dir).unwrap_or(file);

    let mut parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = parts.last_mut() {
        if let Some(stem) = last.strip_suffix(".rs") {
            *last = stem.to_string();
        }
    }
    if parts.last().is_some_and(|last| last == "mod") {
        parts.pop();
    }
    if parts.len() == 1 && (parts[0] == "lib" || parts[0] == "main") {
        parts.clear();
    }

    std::iter::once(CRATE_ROOT.to_string())
        .chain(parts)
        .collect::<Vec<_>>()
        .join("::")
}

fn collect_inline_modules(items: &[Item], parent: &str, out: &mut BTreeSet<String>) {
    for item in items {
        if let Item::Mod(ItemMod {
            ident,
            content: Some((_, inner)),
            ..
        }) = item
        {
            let path = format!("{}::{}", parent, ident);
            collect_inline_modules(inner, &path, out);
            out.insert(path);
        }
    }
}

fn flatten_use_tree(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<UsePath>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            flatten_use_tree(&p.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(n) => {
            let segments = leaf_path(prefix, &n.ident);
            let binding = segments.last().cloned();
            out.push(UsePath { segments, binding });
        }
        UseTree::Rename(r) => out.push(UsePath {
            segments: leaf_path(prefix, &r.ident),
            binding: Some(r.rename.to_string()).filter(|name| name != "_"),
        }),
        UseTree::Glob(_) => out.push(UsePath {
            segments: prefix.clone(),
            binding: None,
        }),
        UseTree::Group(g) => {
            for item in &g.items {
                flatten_use_tree(item, prefix, out);
            }
        }
    }
}

fn leaf_path(prefix: &[String], ident: &syn::Ident) -> Vec<String> {
    let mut path = prefix.to_vec();
    // `use a::{self}` names `a` itself.
    if ident != "self" || path.is_empty() {
        path.push(ident.to_string());
    }
    path
}

fn is_crate_name(segment: &str) -> bool {
    segment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
}

struct ImportVisitor<'a> {
    modules: &'a BTreeSet<String>,
    scope: Vec<String>,
    /// Names bound by `use`, per module, mapped to the path they stand for.
    bindings: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    imports: &'a mut BTreeMap<String, Vec<String>>,
}

impl<'ast> Visit<'ast> for ImportVisitor<'_> {
    fn visit_item_mod(&mut self, item: &'ast ItemMod) {
        // `mod foo;` is discovered from the file system.
        if item.content.is_some() {
            self.scope.push(item.ident.to_string());
            self.imports.entry(self.scope.join("::")).or_default();
            syn::visit::visit_item_mod(self, item);
            self.scope.pop();
        }
    }

    fn visit_item_use(&mut self, item: &'ast ItemUse) {
        let mut paths = Vec::new();
        flatten_use_tree(&item.tree, &mut Vec::new(), &mut paths);

        for UsePath { segments, binding } in paths {
            let absolute = if item.leading_colon.is_some() {
                Some(segments)
            } else {
                self.absolutize(&segments)
            };
            let Some(absolute) = absolute else {
                continue;
            };
            if let Some(target) = self.target_of(&absolute, true) {
                self.record(target);
            }
            if let Some(name) = binding {
                self.bindings
                    .entry(self.scope.join("::"))
                    .or_default()
                    .insert(name, absolute);
            }
        }
    }

    fn visit_expr_path(&mut self, expr: &'ast ExprPath) {
        self.visit_inline_path(&expr.path);
        syn::visit::visit_expr_path(self, expr);
    }

    fn visit_type_path(&mut self, ty: &'ast TypePath) {
        self.visit_inline_path(&ty.path);
        syn::visit::visit_type_path(self, ty);
    }
}

impl ImportVisitor<'_> {
    fn visit_inline_path(&mut self, path: &syn::Path) {
        if path.leading_colon.is_some() || path.segments.len() < 2 {
            return;
        }
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let target = self
            .absolutize(&segments)
            .and_then(|absolute| self.target_of(&absolute, false));
        if let Some(target) = target {
            self.record(target);
        }
    }

    /// Rewrites a path relative to the current module into one starting at
    /// `crate` or at an external crate root.
    fn absolutize(&self, segments: &[String]) -> Option<Vec<String>> {
        let first = segments.first()?;

        match first.as_str() {
            "crate" => Some(segments.to_vec()),
            "self" => Some(self.scope.iter().chain(&segments[1..]).cloned().collect()),
            "super" => {
                let mut base = self.scope.clone();
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if base.len() <= 1 {
                        return None;
                    }
                    base.pop();
                    rest = &rest[1..];
                }
                base.extend(rest.iter().cloned());
                Some(base)
            }
            _ => {
                let child = format!("{}::{}", self.scope.join("::"), first);
                if self.modules.contains(&child) {
                    Some(self.scope.iter().chain(segments).cloned().collect())
                } else if let Some(bound) = self.binding(first) {
                    Some(bound.iter().chain(&segments[1..]).cloned().collect())
                } else {
                    Some(segments.to_vec())
                }
            }
        }
    }

    /// The module an absolute path names. Paths outside this crate resolve to
    /// the external crate's root, for `use` declarations only.
    fn target_of(&self, absolute: &[String], is_use: bool) -> Option<String> {
        let first = absolute.first()?;
        if first == CRATE_ROOT {
            self.longest_known_prefix(absolute)
        } else if is_use && is_crate_name(first) {
            Some(first.clone())
        } else {
            None
        }
    }

    fn binding(&self, name: &str) -> Option<&Vec<String>> {
        self.bindings.get(&self.scope.join("::"))?.get(name)
    }

    fn longest_known_prefix(&self, parts: &[String]) -> Option<String> {
        let current = self.scope.join("::");
        (1..=parts.len())
            .rev()
            .map(|n| parts[..n].join("::"))
            .find(|candidate| self.modules.contains(candidate))
            .filter(|module| *module != current)
    }

    fn record(&mut self, target: String) {
        let imports = self.imports.entry(self.scope.join("::")).or_default();
        if !imports.contains(&target) {
            tracing::trace!(source = %self.scope.join("::"), target = %target, "Import");
            imports.push(target);
        }
    }
}

/// Lists every `.rs` file under `dir`, sorted.
pub fn collect_rust_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "rs") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
