//! Batch import of `(pattern, type_name)` tables
//!
//! An uploaded two-column table becomes one choice block with a string
//! child per row, in row order.

use crate::error::ImportError;
use crate::grammar::{Combinator, GrammarNode, UiVariant};
use crate::workspace::{Attachment, Workspace};

/// Split a `pattern,type_name` table into pairs.
///
/// Blank lines are skipped. Columns past the second are ignored.
pub fn parse_table(text: &str) -> Result<Vec<(String, String)>, ImportError> {
    let mut pairs = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut cells = line.split(',');
        let pattern = cells.next().map(str::trim).unwrap_or_default();
        let Some(type_name) = cells.next().map(str::trim) else {
            return Err(ImportError::MalformedRow {
                line: index + 1,
                content: line.to_string(),
            });
        };
        pairs.push((pattern.to_string(), type_name.to_string()));
    }
    Ok(pairs)
}

/// Build a detached choice node for `pairs`, drawing fresh ids from
/// `workspace`.
pub fn choice_from_pairs(
    workspace: &mut Workspace,
    pairs: &[(String, String)],
    child_variant: &UiVariant,
) -> Result<GrammarNode, ImportError> {
    let mut choice = GrammarNode::choice(workspace.fresh_id(), Vec::new());
    for (pattern, type_name) in pairs {
        let combinator = Combinator::string(pattern.as_str(), type_name.as_str())?;
        let child = GrammarNode::leaf(workspace.fresh_id(), child_variant.clone(), combinator);
        choice.push(child)?;
    }
    Ok(choice)
}

/// Import `pairs` as a new choice block, attached at `at` when given.
pub fn import_pairs(
    workspace: &mut Workspace,
    pairs: &[(String, String)],
    at: Option<Attachment>,
    child_variant: &UiVariant,
) -> Result<crate::grammar::NodeId, ImportError> {
    let choice = choice_from_pairs(workspace, pairs, child_variant)?;
    log::debug!("importing {} abbreviations as choice `{}`", pairs.len(), choice.id);
    Ok(workspace.insert_tree(choice, at)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ValidationError, WorkspaceError};
    use crate::grammar::variant::IMPORTED_STRING;
    use crate::grammar::{NodeId, NodeKind};

    fn pairs() -> Vec<(String, String)> {
        vec![
            ("A".to_string(), "TypeX".to_string()),
            ("B".to_string(), "TypeY".to_string()),
        ]
    }

    #[test]
    fn builds_one_string_child_per_pair_in_order() {
        let mut workspace = Workspace::new();
        let variant = UiVariant::new(IMPORTED_STRING);
        let choice = choice_from_pairs(&mut workspace, &pairs(), &variant).unwrap();

        assert_eq!(choice.kind(), NodeKind::Choice);
        assert_eq!(choice.children().len(), 2);
        let fields: Vec<_> = choice
            .children()
            .iter()
            .map(|child| child.combinator.clone())
            .collect();
        assert_eq!(
            fields,
            vec![
                Combinator::string("A", "TypeX").unwrap(),
                Combinator::string("B", "TypeY").unwrap(),
            ]
        );
        let ids = [
            &choice.id,
            &choice.children()[0].id,
            &choice.children()[1].id,
        ];
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn import_attaches_at_requested_slot() {
        let root = GrammarNode::sequence(
            NodeId::new("root"),
            vec![GrammarNode::rest(NodeId::new("tail"), "Tail").unwrap()],
        );
        let mut workspace = Workspace::from_tree(root).unwrap();
        let choice = import_pairs(
            &mut workspace,
            &pairs(),
            Some(Attachment::at(NodeId::new("root"), 0)),
            &UiVariant::new(IMPORTED_STRING),
        )
        .unwrap();

        assert_eq!(
            workspace.get(&NodeId::new("root")).unwrap().children(),
            &[choice.clone(), NodeId::new("tail")]
        );
        assert_eq!(workspace.len(), 5);
    }

    #[test]
    fn import_after_rest_is_refused_and_leaves_tree_alone() {
        let root = GrammarNode::sequence(
            NodeId::new("root"),
            vec![GrammarNode::rest(NodeId::new("tail"), "Tail").unwrap()],
        );
        let mut workspace = Workspace::from_tree(root).unwrap();
        let err = import_pairs(
            &mut workspace,
            &pairs(),
            Some(Attachment::append(NodeId::new("root"))),
            &UiVariant::new(IMPORTED_STRING),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ImportError::Workspace(WorkspaceError::RestNotLast {
                parent: NodeId::new("root")
            })
        );
        assert_eq!(workspace.len(), 2);
    }

    #[test]
    fn empty_cells_are_rejected() {
        let mut workspace = Workspace::new();
        let err = choice_from_pairs(
            &mut workspace,
            &[("".to_string(), "TypeX".to_string())],
            &UiVariant::new(IMPORTED_STRING),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ImportError::Validation(ValidationError::EmptyField { field: "s" })
        );
    }

    #[test]
    fn table_rows_become_pairs() {
        let table = "AHU,Air_Handling_Unit\r\nVAV,Variable_Air_Volume_Box,extra\n\n";
        assert_eq!(
            parse_table(table).unwrap(),
            vec![
                ("AHU".to_string(), "Air_Handling_Unit".to_string()),
                ("VAV".to_string(), "Variable_Air_Volume_Box".to_string()),
            ]
        );
    }

    #[test]
    fn single_column_row_is_reported_with_its_line() {
        let err = parse_table("AHU,Air_Handling_Unit\nVAV\n").unwrap_err();
        assert_eq!(
            err,
            ImportError::MalformedRow {
                line: 2,
                content: "VAV".to_string()
            }
        );
    }
}
