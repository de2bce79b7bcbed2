use folio_core::{AppError, Identity, UserId};
use folio_domain::{CellValue, FormMode, GroupName, Row, RowData, UserRecord};
use serde_json::json;

use super::{
    CreateFieldRequest, CreateTableRequest, CurrentUserResponse, FieldResponse, FormQuery,
    PageQuery, TableResponse, row_to_json,
};

#[test]
fn create_table_request_builds_guarded_metadata() {
    let request = serde_json::from_value::<CreateTableRequest>(json!({
        "table_name": "widgets",
        "display_name": "Widgets",
        "read_groups": ["everyone"],
        "write_groups": ["admin", "admin"],
    }))
    .unwrap_or_else(|_| unreachable!());

    let table = request
        .into_table_metadata()
        .unwrap_or_else(|_| unreachable!());
    let response = TableResponse::from(table);

    assert_eq!(response.table_name, "widgets");
    assert_eq!(response.read_groups, vec!["everyone".to_owned()]);
    assert_eq!(response.write_groups, vec!["admin".to_owned()]);
    assert_eq!(response.description, "");
    assert!(response.created.is_none());
}

#[test]
fn create_table_request_rejects_unsafe_names() {
    let request = serde_json::from_value::<CreateTableRequest>(json!({
        "table_name": "widgets; DROP TABLE _user",
        "display_name": "Widgets",
    }))
    .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        request.into_table_metadata(),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn create_field_request_applies_widget_and_positions() {
    let request = serde_json::from_value::<CreateFieldRequest>(json!({
        "field_name": "price",
        "display_name": "Price",
        "db_type": "DECIMAL(10,2)",
        "widget": "number",
        "form_position": 2,
        "list_position": -1,
        "is_required": true,
        "default_value": "0",
    }))
    .unwrap_or_else(|_| unreachable!());

    let field = request
        .into_field_metadata("widgets".to_owned())
        .unwrap_or_else(|_| unreachable!());
    let response = FieldResponse::from(field);

    assert_eq!(response.widget, "number");
    assert_eq!(response.form_position, 2);
    assert_eq!(response.list_position, -1);
    assert!(response.is_required);
    assert!(!response.is_read_only);
    assert_eq!(response.default_value.as_deref(), Some("0"));
}

#[test]
fn unknown_widget_is_a_validation_error() {
    let request = serde_json::from_value::<CreateFieldRequest>(json!({
        "field_name": "price",
        "display_name": "Price",
        "db_type": "INTEGER",
        "widget": "slider",
    }))
    .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        request.into_field_metadata("widgets".to_owned()),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn rows_render_as_flat_objects() {
    let row = Row::new(
        3,
        RowData::from([
            ("name".to_owned(), CellValue::Text("Gear".to_owned())),
            ("read_groups".to_owned(), CellValue::Null),
        ]),
    );

    assert_eq!(
        row_to_json(&row),
        json!({"id": 3, "name": "Gear", "read_groups": null})
    );
}

#[test]
fn query_defaults() {
    let query = PageQuery::default();
    assert_eq!(query.page(), 1);
    assert_eq!(query.page_size(), super::content::DEFAULT_PAGE_SIZE);

    assert!(matches!(FormQuery::default().mode(), Ok(FormMode::Normal)));
    let engineer = FormQuery {
        mode: Some("engineer".to_owned()),
    };
    assert!(matches!(engineer.mode(), Ok(FormMode::Engineer)));
    let unknown = FormQuery {
        mode: Some("raw".to_owned()),
    };
    assert!(unknown.mode().is_err());
}

#[test]
fn current_user_describes_anonymous_and_users() {
    let anonymous =
        CurrentUserResponse::new(Identity::Anonymous, None, vec![GroupName::everyone()]);
    assert!(!anonymous.authenticated);
    assert_eq!(anonymous.user_id, None);
    assert_eq!(anonymous.groups, vec!["everyone".to_owned()]);

    let user_id = UserId::new(9);
    let record = UserRecord {
        id: user_id,
        username: "ada".to_owned(),
        display_name: "Ada".to_owned(),
        password_hash: "$argon2id$...".to_owned(),
    };
    let groups = vec![
        GroupName::everyone(),
        GroupName::new("admin").unwrap_or_else(|_| unreachable!()),
    ];
    let user = CurrentUserResponse::new(Identity::user(user_id), Some(record), groups);
    assert!(user.authenticated);
    assert_eq!(user.user_id, Some(9));
    assert_eq!(user.username.as_deref(), Some("ada"));
    assert_eq!(user.groups.len(), 2);
}
