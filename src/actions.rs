//! Ordered list of geometric actions.
//!
//! Actions run in the order they were given on the command line; the list is
//! never re-sorted. An action that cannot change any image is dropped at parse
//! time, before any image has been probed.

use crate::types::{Action, ActionKind, Dimension};

/// What [`ActionListBuilder::add`] did with a requested action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Both axes say "no change"; the action was not appended.
    IgnoredNoOp { kind: ActionKind },
}

impl AddOutcome {
    /// Warning text for a dropped action, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            AddOutcome::Added => None,
            AddOutcome::IgnoredNoOp { kind } => Some(format!(
                "Action {} will not change the image -- ignoring",
                kind.name()
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionListBuilder {
    actions: Vec<Action>,
}

impl ActionListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an action.
    pub fn add(
        &mut self,
        kind: ActionKind,
        width: Dimension,
        height: Dimension,
        pad_colour: &str,
    ) -> AddOutcome {
        if is_no_op(width, height) {
            log::debug!("dropping no-op {kind} action ({width:?}, {height:?})");
            return AddOutcome::IgnoredNoOp { kind };
        }

        self.actions.push(Action {
            kind,
            width,
            height,
            pad_colour: pad_colour.to_string(),
        });
        AddOutcome::Added
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn build(self) -> Vec<Action> {
        self.actions
    }
}

/// Static check on the unresolved dimensions.
fn is_no_op(width: Dimension, height: Dimension) -> bool {
    matches!(
        (width, height),
        (Dimension::UseNative, Dimension::UseNative)
            | (Dimension::DeriveFromHeight, Dimension::DeriveFromWidth)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_by_native_is_never_appended() {
        let mut builder = ActionListBuilder::new();
        for kind in [ActionKind::Crop, ActionKind::Pad, ActionKind::Scale] {
            let outcome = builder.add(kind, Dimension::UseNative, Dimension::UseNative, "FFFFFF");
            assert_eq!(outcome, AddOutcome::IgnoredNoOp { kind });
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn paired_aspect_derivation_is_a_no_op() {
        let mut builder = ActionListBuilder::new();
        let outcome = builder.add(
            ActionKind::Scale,
            Dimension::DeriveFromHeight,
            Dimension::DeriveFromWidth,
            "FFFFFF",
        );
        assert!(matches!(outcome, AddOutcome::IgnoredNoOp { .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn no_op_warning_names_the_action() {
        let outcome = AddOutcome::IgnoredNoOp {
            kind: ActionKind::Pad,
        };
        assert_eq!(
            outcome.warning().as_deref(),
            Some("Action pad will not change the image -- ignoring")
        );
        assert_eq!(AddOutcome::Added.warning(), None);
    }

    #[test]
    fn single_native_axis_is_kept() {
        let mut builder = ActionListBuilder::new();
        let outcome = builder.add(
            ActionKind::Crop,
            Dimension::UseNative,
            Dimension::Literal(1000),
            "FFFFFF",
        );
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn insertion_order_is_execution_order() {
        let mut builder = ActionListBuilder::new();
        builder.add(
            ActionKind::Scale,
            Dimension::Literal(400),
            Dimension::DeriveFromWidth,
            "FFFFFF",
        );
        builder.add(
            ActionKind::Pad,
            Dimension::Literal(500),
            Dimension::Literal(500),
            "000000",
        );
        builder.add(
            ActionKind::Crop,
            Dimension::Literal(450),
            Dimension::UseNative,
            "000000",
        );

        let kinds: Vec<ActionKind> = builder.build().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Scale, ActionKind::Pad, ActionKind::Crop]
        );
    }

    #[test]
    fn action_keeps_the_colour_it_was_added_with() {
        let mut builder = ActionListBuilder::new();
        builder.add(
            ActionKind::Pad,
            Dimension::Literal(10),
            Dimension::Literal(10),
            "A1B2C3",
        );
        assert_eq!(builder.build()[0].pad_colour, "A1B2C3");
    }
}
