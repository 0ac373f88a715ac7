use foundation::ids::EntityId;

/// User-controlled filter and selection state.
///
/// All four fields are independent; no combination is rejected. Setters only
/// update their field and report whether the value actually changed, so the
/// owner can decide what to recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    category: Option<String>,
    group: Option<String>,
    address_query: String,
    selected: Option<EntityId>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn address_query(&self) -> &str {
        &self.address_query
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn is_any_filter_active(&self) -> bool {
        self.category.is_some() || self.group.is_some()
    }

    pub fn set_category(&mut self, category: Option<String>) -> bool {
        replace_if_changed(&mut self.category, category)
    }

    pub fn set_group(&mut self, group: Option<String>) -> bool {
        replace_if_changed(&mut self.group, group)
    }

    pub fn set_address_query(&mut self, query: impl Into<String>) -> bool {
        replace_if_changed(&mut self.address_query, query.into())
    }

    pub fn set_selected(&mut self, selected: Option<EntityId>) -> bool {
        replace_if_changed(&mut self.selected, selected)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::FilterState;
    use foundation::EntityId;

    #[test]
    fn setters_report_changes_only() {
        let mut f = FilterState::new();
        assert!(!f.is_any_filter_active());

        assert!(f.set_category(Some("Oak".into())));
        assert!(!f.set_category(Some("Oak".into())));
        assert!(f.is_any_filter_active());

        assert!(f.set_group(Some("Mission".into())));
        assert!(f.set_category(None));
        assert!(f.is_any_filter_active());

        assert!(f.set_address_query("Market"));
        assert!(!f.set_address_query("Market"));
        assert!(f.set_selected(Some(EntityId(4))));
        assert_eq!(f.selected(), Some(EntityId(4)));
    }
}
