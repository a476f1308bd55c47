//! Assertion helpers with diagnostic output.
//!
//! Failures name the node, the expected and actual values, and the degeneracies
//! recorded for the node's tree.

use cross_section::{DegeneracyKind, DocumentReport, SubtreeReport};

use crate::helpers::HarnessError;
use crate::workflow::DocumentBuilder;

/// Assert a node's written-back cross-section radius.
pub fn assert_radius(b: &DocumentBuilder, oid: &str, expected: u64, ctx: &str) -> Result<(), HarnessError> {
    let actual = b.radius(oid)?;
    if actual == Some(expected) {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        detail: format!(
            "[{ctx}] node {oid}: expected radius {expected}, got {actual:?}; warnings: {}",
            warnings_for(b.last_report(), oid)
        ),
    })
}

/// Assert a node's radius lies in `lo..=hi`.
pub fn assert_radius_between(
    b: &DocumentBuilder,
    oid: &str,
    lo: u64,
    hi: u64,
    ctx: &str,
) -> Result<(), HarnessError> {
    match b.radius(oid)? {
        Some(r) if (lo..=hi).contains(&r) => Ok(()),
        actual => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] node {oid}: expected radius in {lo}..={hi}, got {actual:?}; warnings: {}",
                warnings_for(b.last_report(), oid)
            ),
        }),
    }
}

/// Assert a node's flat radius within `tol`.
pub fn assert_flat_radius(
    b: &DocumentBuilder,
    oid: &str,
    expected: f64,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    match b.flat_radius(oid)? {
        Some(r) if (r - expected).abs() <= tol => Ok(()),
        actual => Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] node {oid}: expected flat radius {expected:.4} (tol={tol}), got {actual:?}"),
        }),
    }
}

/// Assert the tree finished with no degeneracies of `kind`.
pub fn assert_no_degeneracy(report: &SubtreeReport, kind: DegeneracyKind, ctx: &str) -> Result<(), HarnessError> {
    let hits: Vec<String> = report
        .degeneracies
        .iter()
        .filter(|d| d.kind == kind)
        .map(|d| d.to_string())
        .collect();
    if hits.is_empty() {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        detail: format!("[{ctx}] tree {}: {}", report.oid, hits.join("; ")),
    })
}

/// The completed report for `tree`, or an error describing why there is none.
pub fn subtree_report<'a>(report: &'a DocumentReport, tree: &str) -> Result<&'a SubtreeReport, HarnessError> {
    let outcome = report
        .subtree(tree)
        .ok_or_else(|| HarnessError::TreeNotFound { name: tree.into() })?;
    outcome.result.as_ref().map_err(|err| HarnessError::AssertionFailed {
        detail: format!("tree {tree} failed: {err}"),
    })
}

fn warnings_for(report: Option<&DocumentReport>, oid: &str) -> String {
    let Some(report) = report else {
        return "no run yet".into();
    };
    let lines: Vec<String> = report
        .completed()
        .flat_map(|s| s.degeneracies.iter())
        .filter(|d| d.oid == oid)
        .map(|d| d.to_string())
        .collect();
    if lines.is_empty() {
        "none".into()
    } else {
        lines.join("; ")
    }
}
