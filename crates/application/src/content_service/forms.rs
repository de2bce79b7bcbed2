use folio_domain::{
    CellValue, EditForm, FieldMetadata, FormField, FormMode, ID_FIELD, ListColumn,
    MANAGEMENT_FIELDS, Row, WidgetKind,
};

/// Builds an edit form from ordered field metadata and an optional row.
///
/// Normal mode keeps fields with a non-negative form position and uses their
/// labels, widgets and flags. Engineer mode lists every field, and the row's
/// management columns, by raw name as read-only text.
#[must_use]
pub fn build_edit_form(
    table_name: &str,
    fields: &[FieldMetadata],
    row: Option<&Row>,
    mode: FormMode,
) -> EditForm {
    let form_fields = match mode {
        FormMode::Normal => normal_fields(fields, row),
        FormMode::Engineer => engineer_fields(fields, row),
    };

    EditForm {
        table_name: table_name.to_owned(),
        row_id: row.map(Row::id),
        mode,
        fields: form_fields,
    }
}

/// Returns listing columns with a non-negative list position, in order.
#[must_use]
pub fn build_list_columns(fields: &[FieldMetadata]) -> Vec<ListColumn> {
    let mut listed: Vec<&FieldMetadata> = fields.iter().filter(|field| field.is_in_list()).collect();
    listed.sort_by(|left, right| {
        left.list_position()
            .cmp(&right.list_position())
            .then_with(|| left.field_name().cmp(right.field_name()))
    });

    listed
        .into_iter()
        .map(|field| ListColumn {
            name: field.field_name().as_str().to_owned(),
            label: field.display_name().as_str().to_owned(),
        })
        .collect()
}

fn normal_fields(fields: &[FieldMetadata], row: Option<&Row>) -> Vec<FormField> {
    let mut shown: Vec<&FieldMetadata> = fields.iter().filter(|field| field.is_in_form()).collect();
    sort_by_form_position(&mut shown);

    shown
        .into_iter()
        .map(|field| FormField {
            name: field.field_name().as_str().to_owned(),
            label: field.display_name().as_str().to_owned(),
            description: field.description().to_owned(),
            widget: field.widget(),
            required: field.is_required(),
            read_only: row.is_some() && field.is_read_only(),
            value: initial_value(field, row),
        })
        .collect()
}

fn engineer_fields(fields: &[FieldMetadata], row: Option<&Row>) -> Vec<FormField> {
    let mut all: Vec<&FieldMetadata> = fields.iter().collect();
    sort_by_form_position(&mut all);

    let mut form_fields: Vec<FormField> = all
        .into_iter()
        .map(|field| raw_field(field.field_name().as_str(), initial_value(field, row)))
        .collect();

    if let Some(row) = row {
        form_fields.extend(
            MANAGEMENT_FIELDS
                .iter()
                .filter(|name| **name != ID_FIELD)
                .map(|name| raw_field(name, row.get(name).cloned().unwrap_or(CellValue::Null))),
        );
    }

    form_fields
}

fn raw_field(name: &str, value: CellValue) -> FormField {
    FormField {
        name: name.to_owned(),
        label: name.to_owned(),
        description: String::new(),
        widget: WidgetKind::Text,
        required: false,
        read_only: true,
        value,
    }
}

fn initial_value(field: &FieldMetadata, row: Option<&Row>) -> CellValue {
    match row {
        Some(row) => row
            .get(field.field_name().as_str())
            .cloned()
            .unwrap_or(CellValue::Null),
        None => field
            .default_value()
            .map(|value| CellValue::Text(value.to_owned()))
            .unwrap_or(CellValue::Null),
    }
}

fn sort_by_form_position(fields: &mut [&FieldMetadata]) {
    fields.sort_by(|left, right| {
        left.form_position()
            .cmp(&right.form_position())
            .then_with(|| left.field_name().cmp(right.field_name()))
    });
}
