//! Pure join of workflow statuses against their templates.

use std::collections::HashMap;

use uuid::Uuid;

use super::types::{Status, StatusTemplate, WorkflowStatusView};

/// Name given to a status whose template cannot be found.
pub const TEMPLATE_ASSOCIATION_ERROR: &str = "Error with template association";

/// Resolves the display name of each status from its template.
///
/// The order of `statuses` is preserved. A status whose `template_id` does
/// not match any template gets [`TEMPLATE_ASSOCIATION_ERROR`] as its name.
///
/// # Examples
///
/// ```
/// use refcache_core::dataset::{resolve_workflow_statuses, Status, StatusTemplate};
///
/// let open = StatusTemplate::new("Open", "#2196f3");
/// let status = Status::new(open.id, "Report", 0);
/// let views = resolve_workflow_statuses(&[open], vec![status]);
/// assert_eq!(views[0].name, "Open");
/// ```
pub fn resolve_workflow_statuses(
    templates: &[StatusTemplate],
    statuses: Vec<Status>,
) -> Vec<WorkflowStatusView> {
    let names: HashMap<Uuid, &str> = templates
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();

    statuses
        .into_iter()
        .map(|status| {
            let name = names
                .get(&status.template_id)
                .copied()
                .unwrap_or(TEMPLATE_ASSOCIATION_ERROR)
                .to_string();
            WorkflowStatusView { status, name }
        })
        .collect()
}
