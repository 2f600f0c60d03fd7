use std::collections::{BTreeMap, BTreeSet};

use super::value::Value;

/// Check boxes; any subset of the items may be checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiCheck {
    items: Vec<String>,
    checked: BTreeSet<usize>,
}

impl MultiCheck {
    #[must_use]
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            checked: BTreeSet::new(),
        }
    }

    /// Check the item at `index`. Out-of-range indices are ignored.
    #[must_use]
    pub fn check(mut self, index: usize) -> Self {
        if index < self.items.len() {
            self.checked.insert(index);
        }
        self
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.contains(&index)
    }

    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    #[must_use]
    pub fn resolve(&self, value: &Value) -> Option<usize> {
        resolve_item(&self.items, value)
    }
}

/// A single selection out of a list, used by both drop-downs and radio groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choice {
    items: Vec<String>,
    selected: Option<usize>,
}

impl Choice {
    #[must_use]
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            selected: None,
        }
    }

    /// Select the item at `index`. Out-of-range indices clear the selection.
    #[must_use]
    pub fn select(mut self, index: usize) -> Self {
        self.selected = (index < self.items.len()).then_some(index);
        self
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Label of the current selection; empty when nothing is selected.
    #[must_use]
    pub fn selected_label(&self) -> &str {
        self.selected
            .and_then(|i| self.items.get(i))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn resolve(&self, value: &Value) -> Option<usize> {
        resolve_item(&self.items, value)
    }
}

/// Numeric literals address items by index; anything else is looked up by label.
fn resolve_item(items: &[String], value: &Value) -> Option<usize> {
    if let Some(index) = value.as_int().and_then(|i| usize::try_from(i).ok())
        && index < items.len()
    {
        return Some(index);
    }
    items.iter().position(|item| item == value.literal())
}

/// The typed value of one form sub-field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFieldValue {
    Text(String),
    MultiCheck(MultiCheck),
    SingleChoice(Choice),
    Radio(Choice),
}

/// Form values owned by a content unit, keyed by sub-field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    fields: BTreeMap<String, FormFieldValue>,
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, name: &str, value: FormFieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: FormFieldValue) {
        self.fields.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormFieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
