//! Building typed results from decoded responses

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ClientError;

/// Builds a value of `Self` from a decoded JSON response
pub trait Instantiate: Sized {
    fn instantiate(value: Value) -> Result<Self, ClientError>;
}

impl<T: DeserializeOwned> Instantiate for T {
    fn instantiate(value: Value) -> Result<Self, ClientError> {
        serde_json::from_value(value).map_err(|e| ClientError::Instantiate {
            index: None,
            message: e.to_string(),
        })
    }
}

/// One instance from the whole response.
pub fn instantiate<T: Instantiate>(value: Value) -> Result<T, ClientError> {
    T::instantiate(value)
}

/// One instance per element of an array response, in order.
pub fn instantiate_each<T: Instantiate>(value: Value) -> Result<Vec<T>, ClientError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ClientError::Instantiate {
                index: None,
                message: format!("expected an array, got {}", kind_of(&other)),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            T::instantiate(item).map_err(|e| match e {
                ClientError::Instantiate { message, .. } => ClientError::Instantiate {
                    index: Some(index),
                    message,
                },
                other => other,
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Widget {
        id: i64,
    }

    #[test]
    fn test_instantiate_single() {
        let widget: Widget = instantiate(json!({"id": 3})).unwrap();
        assert_eq!(widget, Widget { id: 3 });

        let err = instantiate::<Widget>(json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, ClientError::Instantiate { index: None, .. }));
    }

    #[test]
    fn test_instantiate_each_preserves_order() {
        let widgets: Vec<Widget> = instantiate_each(json!([{"id": 2}, {"id": 1}])).unwrap();
        assert_eq!(widgets, [Widget { id: 2 }, Widget { id: 1 }]);

        let empty: Vec<Widget> = instantiate_each(json!([])).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_instantiate_each_reports_failing_index() {
        let err = instantiate_each::<Widget>(json!([{"id": 1}, {"id": "two"}])).unwrap_err();
        assert!(matches!(err, ClientError::Instantiate { index: Some(1), .. }));

        let err = instantiate_each::<Widget>(json!({"id": 1})).unwrap_err();
        assert!(err.to_string().contains("expected an array, got an object"));
    }
}
