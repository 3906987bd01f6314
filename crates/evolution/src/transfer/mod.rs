//! Entity-link transfer from the legacy schema into the time schema.
//!
//! Legacy links tie a target to an entity stored in one of six per-field
//! tables. The time schema models the same thing as a user owning a
//! resource. For every link the transfer resolves the entity's name, finds
//! the resource with that name in the target's field and records the
//! association for the configured user.
//!
//! Only the initial link query and the phase lookup abort a run. Everything
//! that goes wrong for a single row is logged and the row is skipped, so a
//! run makes as much progress as it can. Nothing wraps the run in a
//! transaction; re-running is safe because existing associations are
//! detected before inserting.

pub mod resolver;
pub mod store;

pub use resolver::{EntityTableResolver, NameResolver, NameResolvers, ENTITY_TABLES};
pub use store::{LinkSource, MysqlLinkSource, MysqlResourceSink, ResourceSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EvolutionError, Result};
use crate::models::legacy::TargetEntityLinkJoin;
use crate::models::time::UserResource;

/// User that receives migrated resources unless configured otherwise.
pub const DEFAULT_USER_ID: i64 = 1;

/// Per-outcome row counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Link rows returned by the source query.
    pub links_read: usize,
    /// Associations inserted.
    pub inserted: usize,
    /// Rows whose association already existed.
    pub already_linked: usize,
    /// Rows whose target no longer exists.
    pub missing_target: usize,
    /// Rows whose field-type code has no registered resolver.
    pub unknown_field_type: usize,
    /// Rows whose entity row is missing or unnamed.
    pub missing_entity: usize,
    /// Rows with no resource of the entity's name in the field.
    pub missing_resource: usize,
    /// Rows skipped after a failed lookup or insert.
    pub failed: usize,
}

impl TransferStats {
    fn record(&mut self, outcome: RowOutcome) {
        let counter = match outcome {
            RowOutcome::Inserted => &mut self.inserted,
            RowOutcome::AlreadyLinked => &mut self.already_linked,
            RowOutcome::MissingTarget => &mut self.missing_target,
            RowOutcome::UnknownFieldType => &mut self.unknown_field_type,
            RowOutcome::MissingEntity => &mut self.missing_entity,
            RowOutcome::MissingResource => &mut self.missing_resource,
            RowOutcome::Failed => &mut self.failed,
        };
        *counter += 1;
    }

    /// Rows that did not produce a new association.
    pub fn skipped(&self) -> usize {
        self.links_read - self.inserted
    }
}

/// Result of a transfer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReport {
    /// Unique run identifier.
    pub run_id: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// User the associations were created for.
    pub user_id: i64,

    /// Row counters.
    pub stats: TransferStats,

    /// Lowest-level phase id per field. Looked up and cached for every
    /// field seen, but associations carry no phase column yet.
    pub field_phases: BTreeMap<i64, i64>,
}

impl TransferReport {
    /// Number of associations inserted.
    pub fn inserted(&self) -> usize {
        self.stats.inserted
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Inserted,
    AlreadyLinked,
    MissingTarget,
    UnknownFieldType,
    MissingEntity,
    MissingResource,
    Failed,
}

/// One-shot transfer of legacy target–entity links into user resources.
pub struct EntityLinkTransfer<'a> {
    source: &'a dyn LinkSource,
    sink: &'a dyn ResourceSink,
    resolvers: NameResolvers,
    user_id: i64,
}

impl<'a> EntityLinkTransfer<'a> {
    /// Transfer with the built-in resolvers and the default user.
    pub fn new(source: &'a dyn LinkSource, sink: &'a dyn ResourceSink) -> Self {
        Self {
            source,
            sink,
            resolvers: NameResolvers::builtin(),
            user_id: DEFAULT_USER_ID,
        }
    }

    /// Create associations for another user.
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Replace the resolver registry.
    pub fn with_resolvers(mut self, resolvers: NameResolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Run the transfer.
    ///
    /// # Errors
    ///
    /// Fails when the link query fails, or when a field referenced by any
    /// link has no phase in the destination. Both happen before the first
    /// insert.
    pub async fn run(&self) -> Result<TransferReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        let links = self
            .source
            .load_links()
            .await
            .map_err(|e| EvolutionError::transfer("loading target entity links", e))?;
        info!(run_id = %run_id, links = links.len(), "Loaded target entity links");

        let field_phases = self.resolve_phases(&links).await?;

        let mut stats = TransferStats {
            links_read: links.len(),
            ..Default::default()
        };
        for row in &links {
            stats.record(self.transfer_row(row).await);
        }

        info!(
            run_id = %run_id,
            inserted = stats.inserted,
            skipped = stats.skipped(),
            "Target and entity transfer finished"
        );

        Ok(TransferReport {
            run_id,
            started_at,
            completed_at: Utc::now(),
            duration_seconds: start.elapsed().as_secs_f64(),
            user_id: self.user_id,
            stats,
            field_phases,
        })
    }

    /// First phase id of every field referenced by the links, memoized per
    /// field.
    async fn resolve_phases(&self, links: &[TargetEntityLinkJoin]) -> Result<BTreeMap<i64, i64>> {
        let mut field_phases = BTreeMap::new();
        for field in links.iter().filter_map(TargetEntityLinkJoin::field_id) {
            if field_phases.contains_key(&field) {
                continue;
            }
            let phase = self.sink.first_phase(field).await.map_err(|e| {
                EvolutionError::transfer(format!("phase lookup for field {}", field), e)
            })?;
            let phase = phase.ok_or(EvolutionError::PhaseMissing(field))?;
            debug!(field, phase_id = phase.id, level = phase.level, "Resolved first phase");
            field_phases.insert(field, phase.id);
        }
        Ok(field_phases)
    }

    async fn transfer_row(&self, row: &TargetEntityLinkJoin) -> RowOutcome {
        let link = &row.link;
        let Some(field) = row.field_id() else {
            warn!(
                link_id = link.id,
                target_id = link.target_id,
                "Link points at a missing target, skipping"
            );
            return RowOutcome::MissingTarget;
        };
        let entity_id = row.entity_id();

        let Some(resolver) = self.resolvers.get(field) else {
            debug!(link_id = link.id, field, "No entity table for field type, skipping");
            return RowOutcome::UnknownFieldType;
        };

        let name = match resolver.resolve(self.source, entity_id).await {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => {
                warn!(
                    field,
                    entity_id,
                    table = resolver.label(),
                    "Entity not found, skipping"
                );
                return RowOutcome::MissingEntity;
            }
            Err(e) => {
                warn!(
                    field,
                    entity_id,
                    table = resolver.label(),
                    "Entity lookup failed, skipping: {}",
                    e
                );
                return RowOutcome::Failed;
            }
        };

        let resource = match self.sink.find_resource(field, &name).await {
            Ok(Some(join)) => join.resource,
            Ok(None) => {
                warn!(field, name = %name, "No resource with this name in field, skipping");
                return RowOutcome::MissingResource;
            }
            Err(e) => {
                warn!(field, name = %name, "Resource lookup failed, skipping: {}", e);
                return RowOutcome::Failed;
            }
        };

        match self.sink.user_resource_exists(self.user_id, resource.id).await {
            Ok(true) => {
                debug!(resource_id = resource.id, "Association exists");
                return RowOutcome::AlreadyLinked;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(resource_id = resource.id, "Association check failed, skipping: {}", e);
                return RowOutcome::Failed;
            }
        }

        let record = UserResource {
            id: 0,
            user_id: self.user_id,
            resource_id: resource.id,
            created_at: link.ctime,
            updated_at: link.utime,
        };
        match self.sink.insert_user_resource(&record).await {
            Ok(()) => RowOutcome::Inserted,
            Err(e) => {
                warn!(resource_id = resource.id, "Association insert failed, skipping: {}", e);
                RowOutcome::Failed
            }
        }
    }
}
