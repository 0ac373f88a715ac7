use std::fmt::Debug;

use foundation::ids::EntityId;

/// How much of the detail panel is visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Presentation {
    Closed,
    /// Summary only. Reachable on compact layouts.
    Collapsed,
    Expanded,
}

/// Device class, chosen once per session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Layout {
    Compact,
    Wide,
}

impl Layout {
    pub fn for_viewport_width(width_px: f64, compact_below_px: f64) -> Self {
        if width_px < compact_below_px {
            Layout::Compact
        } else {
            Layout::Wide
        }
    }
}

/// Transition table of the detail panel.
///
/// Both layouts share transition names; each implementation only knows its
/// own reachable states. Implementations are pure.
pub trait PanelMachine: Debug + Send + Sync {
    fn layout(&self) -> Layout;

    /// A new entity was picked on the map.
    fn pick(&self, _from: Presentation) -> Presentation {
        Presentation::Expanded
    }

    fn dismiss(&self, from: Presentation) -> Presentation;

    fn show_more(&self, from: Presentation) -> Presentation;

    fn close(&self, _from: Presentation) -> Presentation {
        Presentation::Closed
    }

    /// "View all of this category/group" was used from the panel.
    fn filter_shortcut(&self, from: Presentation) -> Presentation;
}

/// Bottom-sheet style panel: dismiss collapses before it closes.
#[derive(Debug)]
pub struct CompactPanel;

impl PanelMachine for CompactPanel {
    fn layout(&self) -> Layout {
        Layout::Compact
    }

    fn dismiss(&self, from: Presentation) -> Presentation {
        match from {
            Presentation::Expanded => Presentation::Collapsed,
            Presentation::Collapsed | Presentation::Closed => Presentation::Closed,
        }
    }

    fn show_more(&self, from: Presentation) -> Presentation {
        match from {
            Presentation::Collapsed => Presentation::Expanded,
            other => other,
        }
    }

    fn filter_shortcut(&self, _from: Presentation) -> Presentation {
        Presentation::Closed
    }
}

/// Side drawer: open or closed, nothing in between.
#[derive(Debug)]
pub struct WidePanel;

impl PanelMachine for WidePanel {
    fn layout(&self) -> Layout {
        Layout::Wide
    }

    fn dismiss(&self, _from: Presentation) -> Presentation {
        Presentation::Closed
    }

    fn show_more(&self, from: Presentation) -> Presentation {
        from
    }

    fn filter_shortcut(&self, from: Presentation) -> Presentation {
        from
    }
}

static COMPACT_PANEL: CompactPanel = CompactPanel;
static WIDE_PANEL: WidePanel = WidePanel;

pub fn panel_machine(layout: Layout) -> &'static dyn PanelMachine {
    match layout {
        Layout::Compact => &COMPACT_PANEL,
        Layout::Wide => &WIDE_PANEL,
    }
}

/// Side effect requested by a transition. The caller applies it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionEffect {
    Highlight(Option<EntityId>),
    FocusCamera(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Presentation,
    pub to: Presentation,
    pub selected: Option<EntityId>,
    pub effects: Vec<SelectionEffect>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to || !self.effects.is_empty()
    }
}

/// Selected-entity workflow: pick, highlight, focus, collapse, close.
///
/// Invariant: `selected().is_some()` iff `state() != Presentation::Closed`.
#[derive(Debug)]
pub struct SelectionLifecycle {
    machine: &'static dyn PanelMachine,
    state: Presentation,
    selected: Option<EntityId>,
}

impl SelectionLifecycle {
    pub fn new(layout: Layout) -> Self {
        Self {
            machine: panel_machine(layout),
            state: Presentation::Closed,
            selected: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.machine.layout()
    }

    pub fn state(&self) -> Presentation {
        self.state
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn pick(&mut self, id: EntityId) -> Transition {
        let from = self.state;
        self.state = self.machine.pick(from);
        self.selected = Some(id);
        Transition {
            from,
            to: self.state,
            selected: self.selected,
            effects: vec![
                SelectionEffect::Highlight(Some(id)),
                SelectionEffect::FocusCamera(id),
            ],
        }
    }

    pub fn dismiss(&mut self) -> Transition {
        let to = self.machine.dismiss(self.state);
        self.settle(to)
    }

    pub fn show_more(&mut self) -> Transition {
        let to = self.machine.show_more(self.state);
        self.settle(to)
    }

    pub fn close(&mut self) -> Transition {
        let to = self.machine.close(self.state);
        self.settle(to)
    }

    pub fn filter_shortcut(&mut self) -> Transition {
        let to = self.machine.filter_shortcut(self.state);
        self.settle(to)
    }

    fn settle(&mut self, to: Presentation) -> Transition {
        let from = self.state;
        self.state = to;
        let mut effects = Vec::new();
        if to == Presentation::Closed && self.selected.take().is_some() {
            effects.push(SelectionEffect::Highlight(None));
        }
        Transition {
            from,
            to,
            selected: self.selected,
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Layout, Presentation, SelectionEffect, SelectionLifecycle};
    use foundation::EntityId;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn compact_pick_dismiss_dismiss() {
        let mut s = SelectionLifecycle::new(Layout::Compact);

        let t = s.pick(EntityId(2));
        assert_eq!(t.to, Presentation::Expanded);
        assert_eq!(s.selected(), Some(EntityId(2)));
        assert_eq!(
            t.effects,
            vec![
                SelectionEffect::Highlight(Some(EntityId(2))),
                SelectionEffect::FocusCamera(EntityId(2)),
            ]
        );

        let t = s.dismiss();
        assert_eq!(t.to, Presentation::Collapsed);
        assert_eq!(s.selected(), Some(EntityId(2)));
        assert!(t.effects.is_empty());

        let t = s.dismiss();
        assert_eq!(t.to, Presentation::Closed);
        assert_eq!(s.selected(), None);
        assert_eq!(t.effects, vec![SelectionEffect::Highlight(None)]);
    }

    #[test]
    fn compact_show_more_reexpands_without_effects() {
        let mut s = SelectionLifecycle::new(Layout::Compact);
        s.pick(EntityId(7));
        s.dismiss();
        let t = s.show_more();
        assert_eq!((t.from, t.to), (Presentation::Collapsed, Presentation::Expanded));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn compact_filter_shortcut_closes() {
        let mut s = SelectionLifecycle::new(Layout::Compact);
        s.pick(EntityId(7));
        let t = s.filter_shortcut();
        assert_eq!(t.to, Presentation::Closed);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn wide_dismiss_closes_and_shortcut_keeps_panel() {
        let mut s = SelectionLifecycle::new(Layout::Wide);
        s.pick(EntityId(1));
        let t = s.filter_shortcut();
        assert!(!t.changed());
        assert_eq!(s.state(), Presentation::Expanded);

        let t = s.dismiss();
        assert_eq!(t.to, Presentation::Closed);
        assert_eq!(t.effects, vec![SelectionEffect::Highlight(None)]);
    }

    #[test]
    fn closing_when_closed_is_a_no_op() {
        let mut s = SelectionLifecycle::new(Layout::Compact);
        let t = s.close();
        assert!(!t.changed());
    }

    #[test]
    fn layout_is_chosen_from_viewport_width() {
        assert_eq!(Layout::for_viewport_width(390.0, 600.0), Layout::Compact);
        assert_eq!(Layout::for_viewport_width(1280.0, 600.0), Layout::Wide);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Pick(u64),
        Dismiss,
        ShowMore,
        Close,
        Shortcut,
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (0u64..5).prop_map(Action::Pick),
            Just(Action::Dismiss),
            Just(Action::ShowMore),
            Just(Action::Close),
            Just(Action::Shortcut),
        ]
    }

    proptest! {
        #[test]
        fn selection_invariant_holds_for_any_sequence(
            compact in any::<bool>(),
            actions in prop::collection::vec(arb_action(), 0..40),
        ) {
            let layout = if compact { Layout::Compact } else { Layout::Wide };
            let mut s = SelectionLifecycle::new(layout);
            for a in actions {
                let t = match a {
                    Action::Pick(id) => s.pick(EntityId(id)),
                    Action::Dismiss => s.dismiss(),
                    Action::ShowMore => s.show_more(),
                    Action::Close => s.close(),
                    Action::Shortcut => s.filter_shortcut(),
                };
                prop_assert_eq!(t.selected, s.selected());
                prop_assert_eq!(s.selected().is_some(), s.state() != Presentation::Closed);
                if layout == Layout::Wide {
                    prop_assert_ne!(s.state(), Presentation::Collapsed);
                }
            }
        }
    }
}
