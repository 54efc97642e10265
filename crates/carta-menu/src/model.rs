//! Native menu structure: a fixed table of labeled entries.

/// A single menu entry: the display label plus the payload handed to the
/// activation path when the user selects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Text rendered by the native widget.
    pub label: String,
    /// Payload reported on activation.
    pub payload: String,
}

/// The native menu's item table.
///
/// Entries and their order are fixed at construction. Backends build their
/// widget graph from this table once and address entries by index
/// afterwards; the table owns all entry data, so activation callbacks
/// carry nothing but an integer.
#[derive(Debug, Clone)]
pub struct MenuModel {
    entries: Vec<MenuEntry>,
}

impl MenuModel {
    /// Create a model from an ordered entry list.
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self { entries }
    }

    /// The three-item demo menu: labels `MenuItem 0`..`MenuItem 2`, payload
    /// equal to the label.
    pub fn standard() -> Self {
        let entries = (0..3)
            .map(|i| {
                let label = format!("MenuItem {i}");
                MenuEntry {
                    payload: label.clone(),
                    label,
                }
            })
            .collect();
        Self { entries }
    }

    /// All entries in menu order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the menu has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in menu order, cloned for display-call records.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    /// Activation path for the entry at `index`.
    ///
    /// Emits the diagnostic event and returns the payload that was
    /// emitted. Out-of-range indices return `None` without logging — this
    /// runs inside the foreign toolkit's dispatch, where a fault would
    /// corrupt the loop, so it must never panic.
    pub fn activate(&self, index: usize) -> Option<&str> {
        let entry = self.entries.get(index)?;
        tracing::info!(payload = %entry.payload, "menu item activated");
        Some(entry.payload.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_menu_labels_in_order() {
        let model = MenuModel::standard();
        assert_eq!(model.len(), 3);
        assert_eq!(
            model.labels(),
            vec!["MenuItem 0", "MenuItem 1", "MenuItem 2"]
        );
    }

    #[test]
    fn standard_payload_equals_label() {
        let model = MenuModel::standard();
        for entry in model.entries() {
            assert_eq!(entry.payload, entry.label);
        }
    }

    #[test]
    fn activate_returns_payload() {
        let model = MenuModel::standard();
        assert_eq!(model.activate(1), Some("MenuItem 1"));
    }

    #[test]
    fn activate_out_of_range_is_safe() {
        let model = MenuModel::standard();
        assert_eq!(model.activate(3), None);
        assert_eq!(model.activate(usize::MAX), None);
    }

    #[test]
    fn custom_entries_keep_order() {
        let model = MenuModel::new(vec![
            MenuEntry {
                label: "Copy".into(),
                payload: "edit.copy".into(),
            },
            MenuEntry {
                label: "Paste".into(),
                payload: "edit.paste".into(),
            },
        ]);
        assert_eq!(model.labels(), vec!["Copy", "Paste"]);
        assert_eq!(model.activate(0), Some("edit.copy"));
    }
}
