//! In-memory document model for the dashboard.
//!
//! Mirrors the handful of element kinds the dashboard page needs: tabs,
//! panels, and forms made of fields. Handlers read and write this model; the
//! web layer renders it to HTML and feeds submitted values back into it.

pub mod layout;
pub mod tabs;

/// Kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Password,
    Checkbox,
    Select,
    TextArea,
}

impl FieldKind {
    /// Whether the field is an `<input>` element. Selects and text areas are
    /// not, and are skipped by the configuration form helpers.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Number | Self::Password | Self::Checkbox
        )
    }
}

/// A single form control.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    /// Choices for [`FieldKind::Select`].
    pub options: Vec<String>,
}

impl Field {
    pub fn new(id: &str, name: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            label: name.to_string(),
            kind,
            value: String::new(),
            checked: false,
            options: Vec::new(),
        }
    }

    pub fn text(id: &str, name: &str) -> Self {
        Self::new(id, name, FieldKind::Text)
    }

    pub fn checkbox(id: &str, name: &str) -> Self {
        Self::new(id, name, FieldKind::Checkbox)
    }

    pub fn select(id: &str, name: &str, options: &[&str]) -> Self {
        let mut field = Self::new(id, name, FieldKind::Select);
        field.options = options.iter().map(|o| o.to_string()).collect();
        field.value = field.options.first().cloned().unwrap_or_default();
        field
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }
}

/// A form: an id plus its fields in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub id: String,
    pub fields: Vec<Field>,
}

impl Form {
    pub fn new(id: &str, fields: Vec<Field>) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Current value of the field with the given id, or `""` if absent.
    pub fn value_of(&self, id: &str) -> &str {
        self.field(id).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Set a field's value by id. Returns `false` when no such field exists.
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.value = value.to_string();
                true
            }
            None => false,
        }
    }
}

/// A clickable tab selecting the panel whose id equals `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub target: String,
    pub label: String,
    pub active: bool,
}

/// A named section of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: String,
    pub active: bool,
}

/// The whole page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub tabs: Vec<Tab>,
    pub panels: Vec<Panel>,
    pub forms: Vec<Form>,
}

impl Document {
    pub fn form(&self, id: &str) -> Option<&Form> {
        self.forms.iter().find(|f| f.id == id)
    }

    pub fn form_mut(&mut self, id: &str) -> Option<&mut Form> {
        self.forms.iter_mut().find(|f| f.id == id)
    }

    /// Id of the active panel, if exactly one is active.
    pub fn active_panel(&self) -> Option<&str> {
        let mut active = self.panels.iter().filter(|p| p.active);
        match (active.next(), active.next()) {
            (Some(panel), None) => Some(panel.id.as_str()),
            _ => None,
        }
    }
}
