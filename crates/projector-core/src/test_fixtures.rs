//! Shared shapes and rows for unit tests.

use crate::{
    model::{FieldModel, ShapeModel},
    value::{Record, Value, ValueKind},
};

pub(crate) static ENTITY: ShapeModel = ShapeModel::new(
    "Entity",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::scalar("value", ValueKind::Text),
    ],
);

pub(crate) static ENTITY_DTO: ShapeModel = ShapeModel::new(
    "EntityDto",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::scalar("value", ValueKind::Text),
        FieldModel::scalar("user_name", ValueKind::Text),
    ],
);

pub(crate) static ADDRESS: ShapeModel = ShapeModel::new(
    "Address",
    &[
        FieldModel::scalar("city", ValueKind::Text),
        FieldModel::scalar("zip", ValueKind::Uint),
    ],
);

pub(crate) static ORDER: ShapeModel = ShapeModel::new(
    "Order",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::shape("ship_to", &ADDRESS),
        FieldModel::scalar("paid", ValueKind::Bool),
    ],
);

pub(crate) static ORDER_VIEW: ShapeModel = ShapeModel::new(
    "OrderView",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::scalar("city", ValueKind::Text),
        FieldModel::scalar("channel", ValueKind::Text),
        FieldModel::scalar("paid", ValueKind::Bool),
    ],
);

pub(crate) fn entity_row(id: i64, value: &str) -> Record {
    Record::from_fields([("id", Value::from(id)), ("value", Value::from(value))])
        .expect("entity row")
}

pub(crate) fn order_row(id: i64, city: &str, paid: bool) -> Record {
    let ship_to = Record::from_fields([("city", Value::from(city)), ("zip", Value::Uint(1000))])
        .expect("address row");

    Record::from_fields([
        ("id", Value::from(id)),
        ("ship_to", Value::Record(ship_to)),
        ("paid", Value::from(paid)),
    ])
    .expect("order row")
}
