use crate::{Choice, Field, FormFieldValue, FormValues, MultiCheck, Operator, Value};

/// Evaluate an `<extension>.<subfield>` comparison against a document's form.
///
/// The document must have the named extension and own a value for the sub-field.
pub(crate) fn form_field(
    extension: Option<&str>,
    form: Option<&FormValues>,
    field: &Field,
    op: Operator,
    value: &Value,
) -> bool {
    let Some((wanted, subfield)) = field.form_parts() else {
        return false;
    };
    if extension != Some(wanted) {
        return false;
    }
    let Some(field_value) = form.and_then(|form| form.get(subfield)) else {
        return false;
    };

    match field_value {
        FormFieldValue::Text(raw) => op.test_equality(raw == value.literal()),
        FormFieldValue::MultiCheck(boxes) => multi_check(boxes, op, value),
        FormFieldValue::SingleChoice(choice) => single_choice(choice, op, value, false),
        FormFieldValue::Radio(choice) => single_choice(choice, op, value, true),
    }
}

fn multi_check(boxes: &MultiCheck, op: Operator, value: &Value) -> bool {
    if op.may_equal() {
        return boxes
            .resolve(value)
            .is_some_and(|index| op.test_equality(boxes.is_checked(index)));
    }
    let Some(wanted) = value.as_int() else {
        return false;
    };
    let count = i64::try_from(boxes.checked_count()).unwrap_or(i64::MAX);
    op.test(count.cmp(&wanted))
}

/// Radio groups refuse targets that do not name an item; drop-downs compare
/// the raw strings when neither side has a selection.
fn single_choice(choice: &Choice, op: Operator, value: &Value, strict: bool) -> bool {
    let target = choice.resolve(value);
    if strict && target.is_none() {
        return false;
    }
    if choice.selected().is_none() && target.is_none() {
        return op.test_equality(choice.selected_label() == value.literal());
    }
    op.test(ordinal(choice.selected()).cmp(&ordinal(target)))
}

fn ordinal(index: Option<usize>) -> i64 {
    index.map_or(-1, |i| i64::try_from(i).unwrap_or(i64::MAX))
}
