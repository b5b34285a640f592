//! # Post-Fixer System
//!
//! Batches arrive already applied to the tree, so illegal states can exist
//! transiently. After every batch the post-fixers scan its change records and
//! repair schema violations in place.
//!
//! ## Design
//!
//! - A fixer applies at most **one** correction per call and reports whether
//!   it did. Every correction invalidates the assumptions of the next one, so
//!   the engine restarts the scan from the first fixer.
//! - Content is preserved: a misplaced container with children is unwrapped,
//!   only an empty one is removed.
//! - The engine stops at a fixed point (a full scan with no correction) or
//!   fails with [`EditorError::Consistency`] once the correction cap is hit.

use crate::errors::EditorError;
use crate::schema::SchemaRegistry;
use postkit_common::descendant_paths;
use postkit_model::{Change, Document as ModelDocument, ModelResult, Path};
use tracing::{debug, error};

/// Corrections allowed per batch before the repair pass gives up
pub const DEFAULT_MAX_CORRECTIONS: usize = 256;

/// Repair rule run after every batch
pub trait PostFixer: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply the first needed correction; `true` if the tree changed
    fn fix(&self, doc: &mut ModelDocument, schema: &SchemaRegistry) -> ModelResult<bool>;
}

#[derive(Debug, Clone, PartialEq)]
enum Repair {
    Remove(Path),
    Unwrap(Path),
}

impl Repair {
    fn apply(self, doc: &mut ModelDocument) -> ModelResult<()> {
        match self {
            Repair::Remove(path) => {
                doc.remove(&path)?;
            }
            Repair::Unwrap(path) => doc.unwrap(&path)?,
        }
        Ok(())
    }
}

fn apply_first(doc: &mut ModelDocument, repair: Option<Repair>, fixer: &'static str) -> ModelResult<bool> {
    let Some(repair) = repair else {
        return Ok(false);
    };
    debug!(fixer, repair = ?repair, "applying correction");
    repair.apply(doc)?;
    Ok(true)
}

/// Whether the element at `path` may stay where it is
fn is_legal_at(doc: &ModelDocument, schema: &SchemaRegistry, path: &Path, name: &str) -> bool {
    path.parent()
        .and_then(|parent| doc.context(&parent))
        .is_some_and(|context| schema.is_legal_child(&context, name))
}

/// Keeps non-nestable containers (quotes) out of each other and drops the
/// ones left empty
#[derive(Debug, Default)]
pub struct NonNestableIntegrity;

impl NonNestableIntegrity {
    fn repair_inserted(doc: &ModelDocument, schema: &SchemaRegistry, path: &Path) -> Option<Repair> {
        let element = doc.element(path)?;

        if schema.is_non_nestable(&element.name) {
            if element.is_empty() {
                return Some(Repair::Remove(path.clone()));
            }
            if !is_legal_at(doc, schema, path, &element.name) {
                return Some(Repair::Unwrap(path.clone()));
            }
        }

        descendant_paths(path, element, |child| schema.is_non_nestable(&child.name))
            .into_iter()
            .find(|descendant| {
                doc.element(descendant)
                    .is_some_and(|child| !is_legal_at(doc, schema, descendant, &child.name))
            })
            .map(Repair::Unwrap)
    }

    fn repair_removed(doc: &ModelDocument, schema: &SchemaRegistry, parent: &Path) -> Option<Repair> {
        if parent.is_root() {
            return None;
        }
        let element = doc.element(parent)?;
        (schema.is_non_nestable(&element.name) && element.is_empty())
            .then(|| Repair::Remove(parent.clone()))
    }
}

impl PostFixer for NonNestableIntegrity {
    fn name(&self) -> &'static str {
        "non-nestable-integrity"
    }

    fn fix(&self, doc: &mut ModelDocument, schema: &SchemaRegistry) -> ModelResult<bool> {
        let repair = doc.changes().iter().find_map(|change| match change {
            Change::Insert { path, .. } => Self::repair_inserted(doc, schema, path),
            Change::Remove { position, .. } => Self::repair_removed(doc, schema, &position.parent),
            Change::Attribute { .. } => None,
        });
        apply_first(doc, repair, self.name())
    }
}

/// Removes objects that lack an identifying attribute (an attachment without
/// `upload-id`, an emotion without `emotion-id`)
#[derive(Debug, Default)]
pub struct ObjectIntegrity;

impl ObjectIntegrity {
    fn is_incomplete(doc: &ModelDocument, schema: &SchemaRegistry, path: &Path) -> bool {
        doc.element(path)
            .is_some_and(|element| !schema.missing_required_attributes(element).is_empty())
    }

    fn repair_inserted(doc: &ModelDocument, schema: &SchemaRegistry, path: &Path) -> Option<Repair> {
        if path.is_root() {
            return None;
        }
        if Self::is_incomplete(doc, schema, path) {
            return Some(Repair::Remove(path.clone()));
        }

        let element = doc.element(path)?;
        descendant_paths(path, element, |child| {
            !schema.missing_required_attributes(child).is_empty()
        })
        .into_iter()
        .next()
        .map(Repair::Remove)
    }
}

impl PostFixer for ObjectIntegrity {
    fn name(&self) -> &'static str {
        "object-integrity"
    }

    fn fix(&self, doc: &mut ModelDocument, schema: &SchemaRegistry) -> ModelResult<bool> {
        let repair = doc.changes().iter().find_map(|change| match change {
            Change::Insert { path, .. } => Self::repair_inserted(doc, schema, path),
            Change::Attribute { path, .. } if !path.is_root() => {
                Self::is_incomplete(doc, schema, path).then(|| Repair::Remove(path.clone()))
            }
            _ => None,
        });
        apply_first(doc, repair, self.name())
    }
}

/// Runs the fixers to a fixed point
#[derive(Debug)]
pub struct PostFixerEngine {
    fixers: Vec<Box<dyn PostFixer>>,
    max_corrections: usize,
}

impl PostFixerEngine {
    /// Engine with the standard fixers
    pub fn new() -> Self {
        Self::with_fixers(vec![Box::new(NonNestableIntegrity), Box::new(ObjectIntegrity)])
    }

    pub fn with_fixers(fixers: Vec<Box<dyn PostFixer>>) -> Self {
        Self {
            fixers,
            max_corrections: DEFAULT_MAX_CORRECTIONS,
        }
    }

    pub fn with_max_corrections(mut self, max_corrections: usize) -> Self {
        self.max_corrections = max_corrections;
        self
    }

    pub fn fixer_names(&self) -> Vec<&'static str> {
        self.fixers.iter().map(|fixer| fixer.name()).collect()
    }

    /// Repair the tree against the changes recorded so far and return the
    /// number of corrections applied
    ///
    /// Corrections are recorded as changes too, so a later scan also sees
    /// what an earlier correction did (e.g. children lifted by an unwrap).
    pub fn run(&self, doc: &mut ModelDocument, schema: &SchemaRegistry) -> Result<usize, EditorError> {
        let mut corrections = 0;

        'scan: loop {
            for fixer in &self.fixers {
                if !fixer.fix(doc, schema)? {
                    continue;
                }

                corrections += 1;
                if corrections > self.max_corrections {
                    error!(
                        fixer = fixer.name(),
                        corrections, "document did not reach a fixed point, aborting repair"
                    );
                    return Err(EditorError::Consistency {
                        iterations: self.max_corrections,
                    });
                }
                continue 'scan;
            }

            if corrections > 0 {
                debug!(corrections, "repair pass reached a fixed point");
            }
            return Ok(corrections);
        }
    }
}

impl Default for PostFixerEngine {
    fn default() -> Self {
        Self::new()
    }
}
