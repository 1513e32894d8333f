//! Post create/edit form.
//!
//! Fields are described by a static schema and every field goes through the
//! same bind pipeline: trim, required check, field validator.

use std::collections::HashMap;

use serde::Serialize;

use super::group::Group;
use super::post::Post;

const REQUIRED_MESSAGE: &str = "This field is required.";
const EMPTY_CHOICE_LABEL: &str = "---------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FieldKind {
    Char,
    Choice,
}

type FieldValidator = fn(&str, &[Group]) -> Result<(), &'static str>;

pub(crate) struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    validator: FieldValidator,
}

pub(crate) static POST_FORM_FIELDS: [FieldSpec; 2] = [
    FieldSpec {
        name: "text",
        kind: FieldKind::Char,
        required: true,
        validator: validate_text,
    },
    FieldSpec {
        name: "group",
        kind: FieldKind::Choice,
        required: false,
        validator: validate_group_choice,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct BoundField {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    pub(crate) value: String,
    pub(crate) errors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Choice {
    pub(crate) value: String,
    pub(crate) label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PostForm {
    pub(crate) fields: Vec<BoundField>,
    pub(crate) group_choices: Vec<Choice>,
}

/// Values of a form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostFormData {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}

impl PostForm {
    /// Empty form for `/create/`.
    pub(crate) fn blank(groups: &[Group]) -> Self {
        Self::from_values(groups, |_| String::new())
    }

    /// Form pre-filled with an existing post for `/posts/{id}/edit/`.
    pub(crate) fn for_post(post: &Post, groups: &[Group]) -> Self {
        Self::from_values(groups, |name| match name {
            "text" => post.text.clone(),
            "group" => post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
    }

    /// Binds submitted values and runs every field through its validator.
    pub(crate) fn bind(raw: &HashMap<String, String>, groups: &[Group]) -> Self {
        let fields = POST_FORM_FIELDS
            .iter()
            .map(|spec| {
                let value = raw
                    .get(spec.name)
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default();
                let errors = if value.is_empty() {
                    if spec.required {
                        vec![REQUIRED_MESSAGE]
                    } else {
                        Vec::new()
                    }
                } else {
                    (spec.validator)(&value, groups).err().into_iter().collect()
                };
                BoundField {
                    name: spec.name,
                    kind: spec.kind,
                    required: spec.required,
                    value,
                    errors,
                }
            })
            .collect();

        Self {
            fields,
            group_choices: group_choices(groups),
        }
    }

    pub(crate) fn field(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.fields.iter().all(|field| field.errors.is_empty())
    }

    pub(crate) fn cleaned(&self) -> Option<PostFormData> {
        if !self.is_valid() {
            return None;
        }
        let text = self.field("text")?.value.clone();
        let group_id = match self.field("group").map(|field| field.value.as_str()) {
            None | Some("") => None,
            Some(value) => Some(value.parse().ok()?),
        };
        Some(PostFormData { text, group_id })
    }

    fn from_values(groups: &[Group], value_of: impl Fn(&str) -> String) -> Self {
        let fields = POST_FORM_FIELDS
            .iter()
            .map(|spec| BoundField {
                name: spec.name,
                kind: spec.kind,
                required: spec.required,
                value: value_of(spec.name),
                errors: Vec::new(),
            })
            .collect();

        Self {
            fields,
            group_choices: group_choices(groups),
        }
    }
}

fn group_choices(groups: &[Group]) -> Vec<Choice> {
    let empty = Choice {
        value: String::new(),
        label: EMPTY_CHOICE_LABEL.to_string(),
    };
    std::iter::once(empty)
        .chain(groups.iter().map(|group| Choice {
            value: group.id.to_string(),
            label: group.title.clone(),
        }))
        .collect()
}

fn validate_text(value: &str, _groups: &[Group]) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    Ok(())
}

fn validate_group_choice(value: &str, groups: &[Group]) -> Result<(), &'static str> {
    const INVALID_CHOICE: &str = "Select a valid choice.";
    let id: i64 = value.parse().map_err(|_| INVALID_CHOICE)?;
    if groups.iter().any(|group| group.id == id) {
        Ok(())
    } else {
        Err(INVALID_CHOICE)
    }
}
