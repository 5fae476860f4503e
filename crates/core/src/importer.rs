//! Import orchestrator: runs each node through filter, mapping, association
//! resolution and rewriting, then hands it to the store.
//!
//! Nodes are processed strictly in document order: a term reference can only
//! resolve against term nodes registered earlier in the same run. Per-node
//! failures are folded into the [`ImportReport`]; only a document that
//! cannot be parsed (or invalid defaults) aborts the run.

use crate::associations::{partition_references, resolve, resolve_author, AssociationKind};
use crate::context::RunContext;
use crate::document::{Document, MetaEntry, NestedReference, RawNode};
use crate::error::CoreError;
use crate::filter::{filter_children, is_node_valid};
use crate::fragment::FragmentRenderer;
use crate::mapper::{map_fields, ImportDefaults, WP_ID_ATTRIBUTE};
use crate::node_kind::NodeKind;
use crate::report::{ImportReport, NodeAction, NodeFailure, NodeStage};
use crate::rewriter::rewrite;
use crate::store::{IdentityDirectory, RecordStore};
use crate::types::RecordShell;

/// Result of one node: an action, or the stage it failed in.
type NodeResult = Result<NodeAction, (NodeStage, CoreError)>;

/// Drives import runs against a set of collaborators.
pub struct Importer<S, D, R> {
    store: S,
    directory: D,
    renderer: R,
    defaults: ImportDefaults,
}

impl<S, D, R> Importer<S, D, R>
where
    S: RecordStore,
    D: IdentityDirectory,
    R: FragmentRenderer,
{
    pub fn new(store: S, directory: D, renderer: R, defaults: ImportDefaults) -> Self {
        Self {
            store,
            directory,
            renderer,
            defaults,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn defaults(&self) -> &ImportDefaults {
        &self.defaults
    }

    /// Parse an export document and import it with a fresh run context.
    pub async fn run_xml(&self, xml: &str) -> Result<ImportReport, CoreError> {
        let document = Document::parse(xml)?;
        self.run(&document).await
    }

    /// Import a parsed document with a fresh run context.
    pub async fn run(&self, document: &Document) -> Result<ImportReport, CoreError> {
        let mut ctx = RunContext::new();
        self.run_with_context(document, &mut ctx).await
    }

    /// Import a parsed document using the caller's run context.
    pub async fn run_with_context(
        &self,
        document: &Document,
        ctx: &mut RunContext,
    ) -> Result<ImportReport, CoreError> {
        self.defaults.check()?;

        let mut report = ImportReport::new();
        tracing::info!(
            run_id = %report.run_id,
            nodes = document.len(),
            blog_id = self.defaults.blog_id,
            "Import run started"
        );

        for node in &document.nodes {
            report.seen += 1;
            let kind = NodeKind::classify(node);

            match self.import_node(ctx, kind, node).await {
                Ok(action) => {
                    tracing::debug!(source_id = %node.source_id(), %kind, %action, "Node processed");
                    report.record(action);
                }
                Err((stage, error)) => {
                    tracing::warn!(
                        source_id = %node.source_id(),
                        %kind,
                        %stage,
                        error = %error,
                        "Node import failed"
                    );
                    report.record_failure(NodeFailure::new(node, kind, stage, &error));
                }
            }
        }

        report.warnings.extend(ctx.take_warnings());
        report.finish();

        tracing::info!(
            run_id = %report.run_id,
            seen = report.seen,
            registered = report.registered,
            skipped = report.skipped,
            duplicates = report.duplicates,
            imported = report.imported,
            failed = report.failed,
            "Import run finished"
        );

        Ok(report)
    }

    async fn import_node(&self, ctx: &mut RunContext, kind: NodeKind, node: &RawNode) -> NodeResult {
        // Filtered
        if !is_node_valid(kind, node) {
            return Ok(NodeAction::Skipped);
        }
        if let Some(term_kind) = kind.registers_as() {
            return Ok(if ctx.register(term_kind, node) {
                NodeAction::Registered
            } else {
                NodeAction::Skipped
            });
        }
        let Some(record_type) = kind.record_type() else {
            return Ok(NodeAction::Skipped);
        };
        let children = filter_children(kind, node);

        // Mapped
        let mut attributes = map_fields(node, &self.defaults)
            .map_err(|e| (NodeStage::Mapped, CoreError::from(e)))?;

        if let Some(wp_id) = attributes.get_i64(WP_ID_ATTRIBUTE) {
            let existing = self
                .store
                .find_entry_by_wp_id(wp_id)
                .await
                .map_err(|e| (NodeStage::Persisted, CoreError::from(e)))?;
            if existing.is_some() {
                return Ok(NodeAction::Duplicate);
            }
        }

        // AssociationsResolved
        let mut shell = RecordShell::new(record_type);
        resolve_author(&self.directory, node, &mut attributes).await;

        let references: Vec<NestedReference> = children
            .iter()
            .filter_map(|child| NestedReference::from_child(child))
            .collect();
        let partitioned = partition_references(&references);

        for &association in kind.association_kinds() {
            let Some(refs) = partitioned.get(&association) else {
                continue;
            };
            let records = resolve(ctx, &self.store, &self.defaults, association, refs)
                .await
                .map_err(|e| (NodeStage::AssociationsResolved, e))?;
            match association {
                AssociationKind::Tag => shell.tags.extend(records),
                AssociationKind::Category => shell.blog_categories.extend(records),
            }
        }

        // ContentRewritten
        let meta: Vec<MetaEntry> = children
            .iter()
            .filter_map(|child| MetaEntry::from_child(child))
            .collect();
        rewrite(&mut attributes, &mut shell, &meta, &self.renderer)
            .map_err(|e| (NodeStage::ContentRewritten, e))?;

        // Persisted
        let record = self
            .store
            .persist(&shell, &attributes)
            .await
            .map_err(|e| (NodeStage::Persisted, CoreError::from(e)))?;
        tracing::debug!(source_id = %node.source_id(), id = record.id, "Persisted entry");

        Ok(NodeAction::Imported)
    }
}
