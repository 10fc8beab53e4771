//! SPARQL parsing and classification logic.
//!
//! Uses spargebra to parse the text first as a SPARQL 1.1 query, then as a
//! SPARQL 1.1 update, and classifies the result by its safety level.

use spargebra::{GraphUpdateOperation, Query, Update};

use super::{ClassificationResult, SafetyLevel, StatementType};

/// SPARQL classifier that parses and classifies requests.
#[derive(Debug, Default, Clone)]
pub struct SparqlClassifier {
    base_iri: Option<String>,
}

impl SparqlClassifier {
    /// Creates a new SPARQL classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier resolving relative IRIs against `base_iri`.
    pub fn with_base_iri(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: Some(base_iri.into()),
        }
    }

    /// Classifies a SPARQL string and returns the classification result.
    ///
    /// Text that parses neither as a query nor as an update is treated as
    /// destructive (conservative default) with a warning message.
    pub fn classify(&self, sparql: &str) -> ClassificationResult {
        if sparql.trim().is_empty() {
            return ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                "Empty SPARQL request",
            );
        }

        let base_iri = self.base_iri.as_deref();

        if let Ok(query) = Query::parse(sparql, base_iri) {
            return ClassificationResult::new(SafetyLevel::Safe, classify_query(&query));
        }

        match Update::parse(sparql, base_iri) {
            Ok(update) => classify_update(&update),
            Err(e) => ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                format!("Could not parse SPARQL ({e}). Please review carefully."),
            ),
        }
    }
}

/// Convenience function to classify SPARQL without creating a classifier instance.
pub fn classify_sparql(sparql: &str) -> ClassificationResult {
    SparqlClassifier::new().classify(sparql)
}

fn classify_query(query: &Query) -> StatementType {
    match query {
        Query::Select { .. } => StatementType::Select,
        Query::Construct { .. } => StatementType::Construct,
        Query::Ask { .. } => StatementType::Ask,
        Query::Describe { .. } => StatementType::Describe,
    }
}

fn classify_update(update: &Update) -> ClassificationResult {
    let classified: Vec<_> = update.operations.iter().map(classify_operation).collect();

    let (level, stmt_type) = match classified.len() {
        0 => (SafetyLevel::Safe, StatementType::Unknown),
        1 => classified[0].clone(),
        _ => {
            // Multiple operations: keep the first of the most dangerous ones
            let mut max = classified[0].clone();
            for (level, stmt_type) in &classified[1..] {
                if *level > max.0 {
                    max = (*level, stmt_type.clone());
                }
            }
            (max.0, StatementType::Multiple(Box::new(max.1)))
        }
    };

    if level == SafetyLevel::Destructive {
        ClassificationResult::with_warning(level, stmt_type, "This action cannot be undone.")
    } else {
        ClassificationResult::new(level, stmt_type)
    }
}

/// Classifies a single update operation.
fn classify_operation(operation: &GraphUpdateOperation) -> (SafetyLevel, StatementType) {
    match operation {
        GraphUpdateOperation::InsertData { .. } => {
            (SafetyLevel::Mutating, StatementType::InsertData)
        }
        GraphUpdateOperation::DeleteData { .. } => {
            (SafetyLevel::Destructive, StatementType::DeleteData)
        }
        GraphUpdateOperation::DeleteInsert { delete, .. } => {
            if delete.is_empty() {
                (SafetyLevel::Mutating, StatementType::Modify { deletes: false })
            } else {
                (SafetyLevel::Destructive, StatementType::Modify { deletes: true })
            }
        }
        GraphUpdateOperation::Load { .. } => (SafetyLevel::Mutating, StatementType::Load),
        GraphUpdateOperation::Create { .. } => (SafetyLevel::Mutating, StatementType::Create),
        GraphUpdateOperation::Clear { .. } => (SafetyLevel::Destructive, StatementType::Clear),
        GraphUpdateOperation::Drop { .. } => (SafetyLevel::Destructive, StatementType::Drop),
    }
}
