//! Reading and migrating Visual C++ project files (`.vcxproj`).
//!
//! A [`Vcxproj`] owns the raw XML source.  Reads parse it with `roxmltree`;
//! [`Vcxproj::migrate`] walks the parsed tree once, records every change as a
//! byte-range edit (see [`crate::splice`]) and splices them into the source,
//! so whitespace, comments, attribute order and line endings outside the
//! touched spans come through unchanged.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use roxmltree::{Node, NodeId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::condition::{self, BuildIdentity};
use crate::profile::MigrationProfile;
use crate::splice::{Splice, SpliceError};

const BOM: char = '\u{feff}';

// ═══════════════════════════════════════════════════════════════════════════════
//  Error
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum VcxprojError {
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <Project>")]
    NotAProject(String),

    #[error("migrated project is no longer well-formed: {0}")]
    Malformed(#[source] roxmltree::Error),

    #[error("conflicting edits: {0}")]
    Splice(#[from] SpliceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  MigrationContext – state shared by every project of one run
// ═══════════════════════════════════════════════════════════════════════════════

/// Carries the `Debug|x64 → DebugRhino|x64` rename guard across projects.
///
/// The guard starts enabled.  The first project that already contains the
/// migrated configuration switches it off, and it stays off for every project
/// migrated afterwards with the same context, so the rename happens at most
/// once per run.  Projects must be fed in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationContext {
    rename_in_progress: bool,
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self { rename_in_progress: true }
    }
}

impl MigrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename_in_progress(&self) -> bool {
        self.rename_in_progress
    }

    /// Switch the rename guard off for the rest of the run.
    pub fn disable_renames(&mut self) {
        self.rename_in_progress = false;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Vcxproj – top-level handle
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Vcxproj {
    /// XML source without the byte-order mark.
    source: String,
    bom: bool,
}

/// A `<ProjectConfiguration>` entry of the configuration list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfiguration {
    /// The `Include` key, e.g. `Debug|x64`.
    pub include: String,
    /// Text of the nested `<Configuration>` element.
    pub configuration: Option<String>,
    /// Text of the nested `<Platform>` element.
    pub platform: Option<String>,
}

impl ProjectConfiguration {
    pub fn identity(&self) -> Option<BuildIdentity> {
        BuildIdentity::parse(&self.include)
    }
}

/// What [`Vcxproj::migrate`] did to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// The source text differs from what was loaded.
    pub changed: bool,
    pub renamed: Vec<(BuildIdentity, BuildIdentity)>,
    /// Renames skipped because the target configuration already exists.
    pub refused: Vec<BuildIdentity>,
    pub removed: usize,
    pub retargeted_conditions: usize,
    pub added_target_version_header: bool,
    pub added_sdk_path_macro: bool,
}

impl Vcxproj {
    /// Parse a `.vcxproj` from its XML source string.
    pub fn parse(source: impl Into<String>) -> Result<Self, VcxprojError> {
        let mut source = source.into();
        let bom = source.starts_with(BOM);
        if bom {
            source.drain(..BOM.len_utf8());
        }
        {
            let doc = roxmltree::Document::parse(&source)?;
            project_root(&doc)?;
        }
        Ok(Self { source, bom })
    }

    /// Load a `.vcxproj` file from disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, VcxprojError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(source)
    }

    /// The current XML source (reflects any migration), without BOM.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The full file contents, with the byte-order mark if the input had one.
    pub fn to_file_contents(&self) -> String {
        if self.bom {
            format!("{BOM}{}", self.source)
        } else {
            self.source.clone()
        }
    }

    pub fn has_bom(&self) -> bool {
        self.bom
    }

    // ─── Listing helpers ─────────────────────────────────────────────────

    /// The `ToolsVersion` attribute of the `<Project>` root.
    pub fn tools_version(&self) -> Result<Option<String>, VcxprojError> {
        let doc = roxmltree::Document::parse(&self.source)?;
        Ok(doc.root_element().attribute("ToolsVersion").map(String::from))
    }

    /// All `<ProjectConfiguration>` entries in document order.
    pub fn project_configurations(&self) -> Result<Vec<ProjectConfiguration>, VcxprojError> {
        let doc = roxmltree::Document::parse(&self.source)?;
        let configurations = child_elements(doc.root_element(), "ItemGroup")
            .flat_map(|group| child_elements(group, "ProjectConfiguration"))
            .filter_map(|entry| {
                Some(ProjectConfiguration {
                    include: entry.attribute("Include")?.to_string(),
                    configuration: find_child_text(entry, "Configuration"),
                    platform: find_child_text(entry, "Platform"),
                })
            })
            .collect();
        Ok(configurations)
    }

    /// Every `Condition` attribute in the project, in document order.
    pub fn conditions(&self) -> Result<Vec<String>, VcxprojError> {
        let doc = roxmltree::Document::parse(&self.source)?;
        Ok(doc
            .descendants()
            .filter_map(|n| n.attribute("Condition"))
            .map(String::from)
            .collect())
    }

    /// Number of elements with the given local name.
    pub fn count_elements(&self, tag: &str) -> Result<usize, VcxprojError> {
        let doc = roxmltree::Document::parse(&self.source)?;
        Ok(doc.descendants().filter(|n| is_tag(n, tag)).count())
    }

    // ─── Migration ───────────────────────────────────────────────────────

    /// Apply every migration rule to this project.
    ///
    /// `ctx` is read and possibly downgraded (see [`MigrationContext`]); pass
    /// the same context to every project of a run.  Running `migrate` again
    /// on its own output changes nothing.
    pub fn migrate(
        &mut self,
        ctx: &mut MigrationContext,
        profile: &MigrationProfile,
    ) -> Result<MigrationSummary, VcxprojError> {
        let (splice, mut summary) = {
            let doc = roxmltree::Document::parse(&self.source)?;
            let root = project_root(&doc)?;
            let mut planner = Planner::new(&self.source, root, profile);
            planner.plan(ctx);
            (planner.splice, planner.summary)
        };

        if splice.is_empty() {
            return Ok(summary);
        }

        let migrated = splice.apply(&self.source)?;
        roxmltree::Document::parse(&migrated).map_err(VcxprojError::Malformed)?;

        summary.changed = migrated != self.source;
        self.source = migrated;
        Ok(summary)
    }
}

fn project_root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Result<Node<'a, 'input>, VcxprojError> {
    let root = doc.root_element();
    match root.tag_name().name() {
        "Project" => Ok(root),
        other => Err(VcxprojError::NotAProject(other.to_string())),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Planner – walks the tree and records edits
// ═══════════════════════════════════════════════════════════════════════════════

/// Line ending and indentation step of the document being edited, so inserted
/// markup blends in.
#[derive(Debug, Clone)]
struct Style {
    newline: &'static str,
    indent: String,
}

impl Style {
    fn detect(src: &str, root: Node) -> Self {
        let newline = if src.contains("\r\n") { "\r\n" } else { "\n" };
        let root_indent = line_indent(src, root.range().start);
        let indent = root
            .children()
            .find(|n| n.is_element())
            .map(|child| line_indent(src, child.range().start))
            .and_then(|child| child.strip_prefix(root_indent))
            .filter(|step| !step.is_empty())
            .unwrap_or("  ")
            .to_string();
        Self { newline, indent }
    }
}

struct Planner<'a, 'input> {
    src: &'input str,
    root: Node<'a, 'input>,
    profile: &'a MigrationProfile,
    style: Style,
    splice: Splice,
    summary: MigrationSummary,
    /// Nodes scheduled for deletion, in marking order.
    marked: Vec<Node<'a, 'input>>,
    marked_ids: HashSet<NodeId>,
    /// Identities whose configuration rename was refused; their conditions
    /// are left alone.
    refused: HashSet<BuildIdentity>,
}

impl<'a, 'input> Planner<'a, 'input> {
    fn new(src: &'input str, root: Node<'a, 'input>, profile: &'a MigrationProfile) -> Self {
        Self {
            src,
            root,
            profile,
            style: Style::detect(src, root),
            splice: Splice::new(),
            summary: MigrationSummary::default(),
            marked: Vec::new(),
            marked_ids: HashSet::new(),
            refused: HashSet::new(),
        }
    }

    fn plan(&mut self, ctx: &mut MigrationContext) {
        self.stamp_tools_version();
        self.guard_duplicate_migration(ctx);
        self.rewrite_project_configurations(ctx);
        self.clean_up_conditions(ctx);
        self.stamp_platform_toolset();
        self.register_target_version_header();
        self.register_sdk_path_macro();
        self.remove_marked();
    }

    // ─── Rules ───────────────────────────────────────────────────────────

    fn stamp_tools_version(&mut self) {
        let profile = self.profile;
        self.set_attribute(self.root, "ToolsVersion", &profile.tools_version);
    }

    /// A project that already has `DebugRhino|x64` was migrated before; from
    /// here on no `Debug|x64` may be renamed in this run.
    fn guard_duplicate_migration(&self, ctx: &mut MigrationContext) {
        let migrated = self.profile.migrated_debug_target().to_string();
        let already_migrated = self.root.descendants().any(|n| {
            is_tag(&n, "ProjectConfiguration") && n.attribute("Include") == Some(migrated.as_str())
        });
        if already_migrated && ctx.rename_in_progress() {
            debug!("project already defines {migrated}; configuration renames disabled for this run");
            ctx.disable_renames();
        }
    }

    fn rewrite_project_configurations(&mut self, ctx: &MigrationContext) {
        let profile = self.profile;
        let debug = profile.debug_target();
        let migrated = profile.migrated_debug_target();
        let staging = profile.staging_debug_target();

        let entries: Vec<Node> = child_elements(self.root, "ItemGroup")
            .flat_map(|group| child_elements(group, "ProjectConfiguration"))
            .collect();

        // Surviving keys with multiplicity, to keep renames from creating
        // duplicates.
        let mut keys: HashMap<String, usize> = HashMap::new();
        for include in entries.iter().filter_map(|e| e.attribute("Include")) {
            *keys.entry(include.to_string()).or_default() += 1;
        }

        let mut to_migrated = Vec::new();
        let mut to_canonical = Vec::new();
        for entry in entries {
            let Some(id) = entry.attribute("Include").and_then(BuildIdentity::parse) else {
                continue;
            };
            if id.platform == profile.legacy_platform {
                release_key(&mut keys, &id.to_string());
                self.mark_for_removal(entry);
            } else if id == debug && ctx.rename_in_progress() {
                to_migrated.push((entry, id));
            } else if id == staging {
                to_canonical.push((entry, id));
            }
        }

        let mut renamed_from = HashSet::new();
        let mut refused = HashSet::new();
        for (renames, target) in [(to_migrated, &migrated), (to_canonical, &debug)] {
            let target_key = target.to_string();
            for (entry, from) in renames {
                if keys.get(&target_key).copied().unwrap_or(0) > 0 {
                    warn!("not renaming {from} to {target}: {target} already exists");
                    refused.insert(from);
                    continue;
                }
                release_key(&mut keys, &from.to_string());
                *keys.entry(target_key.clone()).or_default() += 1;

                self.rename_configuration(entry, target);
                debug!("renamed configuration {from} to {target}");
                self.summary.renamed.push((from.clone(), target.clone()));
                renamed_from.insert(from);
            }
        }

        for id in refused {
            if !renamed_from.contains(&id) {
                self.summary.refused.push(id.clone());
                self.refused.insert(id);
            }
        }
    }

    /// Key and `<Configuration>` value change together.
    fn rename_configuration(&mut self, entry: Node<'a, 'input>, target: &BuildIdentity) {
        self.set_attribute(entry, "Include", &target.to_string());
        if let Some(value) = child_elements(entry, "Configuration").next() {
            self.set_text(value, &target.configuration);
        }
    }

    fn clean_up_conditions(&mut self, ctx: &MigrationContext) {
        let profile = self.profile;
        let legacy = profile.legacy_identities();
        let debug = profile.debug_target();
        let migrated = profile.migrated_debug_target();
        let staging = profile.staging_debug_target();

        let precompiled_headers = child_elements(self.root, "ItemGroup")
            .flat_map(|group| child_elements(group, "ClCompile"))
            .filter(|c| c.attribute("Include") == Some(profile.precompiled_source.as_str()))
            .flat_map(|c| child_elements(c, "PrecompiledHeader"));

        let groups: Vec<Node> = self
            .root
            .children()
            .filter(|n| is_tag(n, "PropertyGroup") || is_tag(n, "ItemDefinitionGroup"))
            .chain(precompiled_headers)
            .chain(self.property_sheet_groups())
            .collect();

        for group in groups {
            let Some(cond) = group.attribute("Condition") else {
                continue;
            };

            if let Some(id) = condition::find_selected(cond, &legacy) {
                debug!("removing <{}> conditioned on {id}", group.tag_name().name());
                self.mark_for_removal(group);
                continue;
            }

            let retarget = if ctx.rename_in_progress() && debug.is_selected_by(cond) {
                Some((&debug, &migrated))
            } else if staging.is_selected_by(cond) {
                Some((&staging, &debug))
            } else {
                None
            };
            let Some((from, to)) = retarget else {
                continue;
            };
            if self.refused.contains(from) {
                continue;
            }

            let rewritten = condition::retarget(cond, from, to);
            self.set_attribute(group, "Condition", &rewritten);
            self.summary.retargeted_conditions += 1;
        }
    }

    fn stamp_platform_toolset(&mut self) {
        let profile = self.profile;
        let toolset = profile.platform_toolset.as_str();
        let groups: Vec<Node> = child_elements(self.root, "PropertyGroup")
            .filter(|g| !self.marked_ids.contains(&g.id()))
            .collect();

        for group in groups {
            match child_elements(group, "PlatformToolset").next() {
                Some(element) => self.set_text(element, toolset),
                None if group.attribute("Label") == Some("Configuration") => {
                    let markup =
                        format!("<PlatformToolset>{}</PlatformToolset>", escape_text(toolset));
                    self.append_child(group, &markup);
                }
                None => {}
            }
        }
    }

    fn register_target_version_header(&mut self) {
        let profile = self.profile;
        let header = profile.target_version_header.as_str();
        let includes: Vec<Node> = self
            .root
            .descendants()
            .filter(|n| is_tag(n, "ClInclude"))
            .collect();

        if includes.iter().any(|n| includes_file(n, header)) {
            return;
        }
        let Some(stub) = includes
            .iter()
            .find(|n| includes_file(n, &profile.precompiled_header))
        else {
            debug!("no <ClInclude> for {}; not registering {header}", profile.precompiled_header);
            return;
        };

        let markup = format!("<ClInclude Include=\"{}\" />", escape_attribute(header, '"'));
        self.insert_after(*stub, &markup);
        self.summary.added_target_version_header = true;
    }

    fn register_sdk_path_macro(&mut self) {
        let profile = self.profile;
        if self
            .root
            .descendants()
            .any(|n| is_tag(&n, &profile.sdk_path_macro))
        {
            return;
        }

        let nl = self.style.newline;
        let outer = self.child_indent(self.root);
        let inner = format!("{outer}{}", self.style.indent);
        let version = &profile.sdk_version_macro;
        let path = &profile.sdk_path_macro;
        let group = format!(
            "<PropertyGroup>{nl}\
             {inner}<{version}>{}</{version}>{nl}\
             {inner}<{path}>{}</{path}>{nl}\
             {outer}</PropertyGroup>",
            escape_text(&profile.sdk_version),
            escape_text(&profile.sdk_path_expression()),
        );
        self.prepend_child(self.root, &group);
        self.summary.added_sdk_path_macro = true;

        let import = format!(
            "<Import Project=\"{}\" />",
            escape_attribute(&profile.property_sheet_import(), '"')
        );
        for sheets in self.property_sheet_groups() {
            if self.marked_ids.contains(&sheets.id()) {
                continue;
            }
            let imported = child_elements(sheets, "Import").any(|i| {
                i.attribute("Project")
                    .is_some_and(|project| project.ends_with(profile.property_sheet.as_str()))
            });
            if !imported {
                self.append_child(sheets, &import);
            }
        }
    }

    fn remove_marked(&mut self) {
        for node in std::mem::take(&mut self.marked) {
            self.splice.remove(removal_range(self.src, node.range()));
            self.summary.removed += 1;
        }
    }

    // ─── Tree queries ────────────────────────────────────────────────────

    fn property_sheet_groups(&self) -> Vec<Node<'a, 'input>> {
        self.root
            .descendants()
            .filter(|n| is_tag(n, "ImportGroup") && n.attribute("Label") == Some("PropertySheets"))
            .collect()
    }

    fn mark_for_removal(&mut self, node: Node<'a, 'input>) {
        if self.marked_ids.insert(node.id()) {
            self.marked.push(node);
        }
    }

    // ─── Edit primitives ─────────────────────────────────────────────────

    fn replace(&mut self, range: Range<usize>, text: String) {
        if self.src[range.clone()] != *text {
            self.splice.replace(range, text);
        }
    }

    fn set_attribute(&mut self, node: Node, name: &str, value: &str) {
        match node.attributes().find(|a| a.name() == name) {
            Some(attr) => {
                let range = attr.range_value();
                let quote = self.src[..range.start].chars().next_back().unwrap_or('"');
                self.replace(range, escape_attribute(value, quote));
            }
            None => {
                let start = node.range().start;
                let at = start + 1 + qualified_name(&self.src[start..]).len();
                self.splice
                    .insert(at, format!(" {name}=\"{}\"", escape_attribute(value, '"')));
            }
        }
    }

    /// Set the text content of a leaf element.
    fn set_text(&mut self, node: Node, value: &str) {
        let escaped = escape_text(value);
        if let Some(text) = node.children().find(|n| n.is_text()) {
            self.replace(text.range(), escaped);
            return;
        }

        let range = node.range();
        match self_closing_tail(self.src, range.clone()) {
            Some(tail) => {
                let name = qualified_name(&self.src[range]);
                self.splice.replace(tail, format!(">{escaped}</{name}>"));
            }
            None => {
                let at = start_tag_end(self.src, range.start);
                self.splice.insert(at, escaped);
            }
        }
    }

    /// Indentation for a new child of `node`.
    fn child_indent(&self, node: Node) -> String {
        format!("{}{}", line_indent(self.src, node.range().start), self.style.indent)
    }

    /// Insert `markup` on its own line right after `node`.
    fn insert_after(&mut self, node: Node, markup: &str) {
        let range = node.range();
        let indent = line_indent(self.src, range.start);
        let nl = self.style.newline;
        self.splice.insert(range.end, format!("{nl}{indent}{markup}"));
    }

    /// Insert `markup` as the first child element of `node`.
    fn prepend_child(&mut self, node: Node, markup: &str) {
        if !node.children().any(|n| n.is_element()) {
            self.append_child(node, markup);
            return;
        }
        let at = start_tag_end(self.src, node.range().start);
        let nl = self.style.newline;
        let indent = self.child_indent(node);
        self.splice.insert(at, format!("{nl}{indent}{markup}"));
    }

    /// Insert `markup` as the last child element of `node`.
    fn append_child(&mut self, node: Node, markup: &str) {
        let nl = self.style.newline;
        let range = node.range();

        if let Some(last) = node.children().filter(|n| n.is_element()).last() {
            let indent = match line_indent(self.src, last.range().start) {
                "" => self.child_indent(node),
                indent => indent.to_string(),
            };
            self.splice.insert(last.range().end, format!("{nl}{indent}{markup}"));
            return;
        }

        let indent = line_indent(self.src, range.start);
        let child = self.child_indent(node);
        let raw = &self.src[range.clone()];
        if let Some(tail) = self_closing_tail(self.src, range.clone()) {
            // `<PropertyGroup Label="Configuration" />`
            let name = qualified_name(raw);
            self.splice
                .replace(tail, format!(">{nl}{child}{markup}{nl}{indent}</{name}>"));
            return;
        }

        let content_start = start_tag_end(self.src, range.start);
        let content_end = raw.rfind("</").map_or(range.end, |i| range.start + i);
        let content = content_start..content_end;
        if self.src[content.clone()].trim().is_empty() {
            self.splice.replace(content, format!("{nl}{child}{markup}{nl}{indent}"));
        } else {
            self.splice.insert(content_end, format!("{nl}{child}{markup}{nl}{indent}"));
        }
    }
}

fn release_key(keys: &mut HashMap<String, usize>, key: &str) {
    if let Some(count) = keys.get_mut(key) {
        *count = count.saturating_sub(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn is_tag(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

fn child_elements<'a, 'input>(
    parent: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent.children().filter(move |n| is_tag(n, tag))
}

/// `true` if `node` has `Include="<file>"`, ignoring ASCII case.
fn includes_file(node: &Node, file: &str) -> bool {
    node.attribute("Include")
        .is_some_and(|include| include.eq_ignore_ascii_case(file))
}

/// Return the text content of the first child element with the given tag name.
fn find_child_text(parent: Node, tag: &'static str) -> Option<String> {
    child_elements(parent, tag)
        .next()
        .and_then(|c| c.text())
        .map(String::from)
}

/// Whitespace between the start of the line and `pos`, or `""` when `pos`
/// is not the first thing on its line.
fn line_indent(src: &str, pos: usize) -> &str {
    let before = &src[..pos];
    let start = before.trim_end_matches([' ', '\t']).len();
    if start == 0 || before[..start].ends_with('\n') {
        &before[start..]
    } else {
        ""
    }
}

/// Grow an element's range backwards over its indentation and the preceding
/// line break so that deleting it leaves no blank line.
fn removal_range(src: &str, range: Range<usize>) -> Range<usize> {
    let trimmed = src[..range.start].trim_end_matches([' ', '\t']);
    let start = match trimmed.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line).len(),
        None => range.start,
    };
    start..range.end
}

/// Byte offset just past the `>` closing the start tag that begins at `start`.
fn start_tag_end(src: &str, start: usize) -> usize {
    let mut quote = None;
    for (i, c) in src[start..].char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return start + i + 1,
            _ => {}
        }
    }
    src.len()
}

/// The `/>` of a self-closing element plus the whitespace before it.  Edits
/// to the element's attributes never reach into this range.
fn self_closing_tail(src: &str, range: Range<usize>) -> Option<Range<usize>> {
    let open = src[range.clone()].strip_suffix("/>")?;
    Some(range.start + open.trim_end().len()..range.end)
}

/// The (possibly prefixed) element name of the tag that `raw` starts with.
fn qualified_name(raw: &str) -> &str {
    let name = raw.strip_prefix('<').unwrap_or(raw);
    let end = name
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(name.len());
    &name[..end]
}

fn escape_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
